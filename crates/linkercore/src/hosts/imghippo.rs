//! ImgHippo uploader (api.imghippo.com/v1/upload).

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use url::Url;

use super::{file_part, json_body, parse_link, HostKind, ImageHost, UploadError};

pub const DEFAULT_ENDPOINT: &str = "https://api.imghippo.com/v1/upload";

#[derive(Debug, Deserialize)]
struct ImghippoResponse {
    #[serde(default)]
    success: bool,
    data: Option<ImghippoData>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImghippoData {
    url: Option<String>,
    view_url: Option<String>,
}

pub struct ImghippoHost {
    client: Client,
    api_key: Option<SecretString>,
    endpoint: String,
}

impl ImghippoHost {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.map(SecretString::from),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ImageHost for ImghippoHost {
    fn kind(&self) -> HostKind {
        HostKind::Imghippo
    }

    async fn upload(&self, path: &Path) -> Result<Url, UploadError> {
        let host = self.kind();
        let Some(key) = self.api_key.as_ref() else {
            return Err(UploadError::Declined {
                host,
                reason: "IMGHIPPO_API_KEY is not configured".to_string(),
            });
        };

        let form = Form::new()
            .text("api_key", key.expose_secret().to_string())
            .part("file", file_part(host, path).await?);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|source| UploadError::Request { host, source })?;

        let body: ImghippoResponse = json_body(host, response).await?;
        if !body.success {
            return Err(UploadError::Rejected {
                host,
                reason: body.message.unwrap_or_else(|| "success=false".to_string()),
            });
        }
        // direct link first, the viewer page only as a fallback
        let link = body
            .data
            .and_then(|d| d.url.or(d.view_url))
            .ok_or_else(|| UploadError::Rejected {
                host,
                reason: "response has no data.url".to_string(),
            })?;
        parse_link(host, &link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn staged(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let file = dir.path().join("hippo.webp");
        std::fs::write(&file, b"RIFFfakeWEBP").unwrap();
        file
    }

    #[tokio::test]
    async fn test_upload_returns_direct_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("hippo-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "status": 200,
                "data": {
                    "url": "https://i.imghippo.com/files/abc.webp",
                    "view_url": "https://www.imghippo.com/i/abc"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let host = ImghippoHost::new(Client::new(), Some("hippo-key".to_string())).with_endpoint(server.uri());
        let link = host.upload(&staged(&dir)).await.unwrap();
        assert_eq!(link.as_str(), "https://i.imghippo.com/files/abc.webp");
    }

    #[tokio::test]
    async fn test_upload_falls_back_to_view_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "view_url": "https://www.imghippo.com/i/xyz" }
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let host = ImghippoHost::new(Client::new(), Some("k".to_string())).with_endpoint(server.uri());
        let link = host.upload(&staged(&dir)).await.unwrap();
        assert_eq!(link.as_str(), "https://www.imghippo.com/i/xyz");
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let host = ImghippoHost::new(Client::new(), Some("k".to_string())).with_endpoint(server.uri());
        let err = host.upload(&staged(&dir)).await.unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }
}
