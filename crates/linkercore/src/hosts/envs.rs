//! Envs.sh uploader. Anonymous; the response body is the link itself.

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use std::path::Path;
use url::Url;

use super::{file_part, parse_link, HostKind, ImageHost, UploadError};

pub const DEFAULT_ENDPOINT: &str = "https://envs.sh/";

pub struct EnvsHost {
    client: Client,
    endpoint: String,
}

impl EnvsHost {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Envs.sh sometimes answers with a bare "envs.sh/abc.jpg".
fn normalize_link(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[async_trait]
impl ImageHost for EnvsHost {
    fn kind(&self) -> HostKind {
        HostKind::Envs
    }

    async fn upload(&self, path: &Path) -> Result<Url, UploadError> {
        let host = self.kind();
        let form = Form::new().part("file", file_part(host, path).await?);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|source| UploadError::Request { host, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status { host, status });
        }
        let body = response
            .text()
            .await
            .map_err(|source| UploadError::Request { host, source })?;
        if body.trim().is_empty() {
            return Err(UploadError::Rejected {
                host,
                reason: "empty response body".to_string(),
            });
        }

        parse_link(host, &normalize_link(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_normalize_link() {
        assert_eq!(normalize_link("https://envs.sh/a.jpg\n"), "https://envs.sh/a.jpg");
        assert_eq!(normalize_link("envs.sh/a.jpg"), "https://envs.sh/a.jpg");
        assert_eq!(normalize_link("  http://envs.sh/b.png "), "http://envs.sh/b.png");
    }

    #[tokio::test]
    async fn test_upload_returns_plain_text_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("https://envs.sh/Xy1.png\n"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("shot.png");
        std::fs::write(&file, b"\x89PNGfake").unwrap();

        let host = EnvsHost::new(Client::new()).with_endpoint(server.uri());
        let link = host.upload(&file).await.unwrap();
        assert_eq!(link.as_str(), "https://envs.sh/Xy1.png");
    }

    #[tokio::test]
    async fn test_upload_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("shot.png");
        std::fs::write(&file, b"png").unwrap();

        let host = EnvsHost::new(Client::new()).with_endpoint(server.uri());
        let err = host.upload(&file).await.unwrap_err();
        assert!(matches!(err, UploadError::Status { host: HostKind::Envs, .. }));
    }

    #[tokio::test]
    async fn test_upload_empty_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("shot.png");
        std::fs::write(&file, b"png").unwrap();

        let host = EnvsHost::new(Client::new()).with_endpoint(server.uri());
        let err = host.upload(&file).await.unwrap_err();
        assert!(matches!(err, UploadError::Rejected { .. }));
    }
}
