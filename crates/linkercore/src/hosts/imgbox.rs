//! Imgbox uploader (imgbox.com JSON upload API).

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use url::Url;

use super::{file_part, json_body, parse_link, HostKind, ImageHost, UploadError};

pub const DEFAULT_ENDPOINT: &str = "https://imgbox.com/api/json/upload.php";

#[derive(Debug, Deserialize)]
struct ImgboxResponse {
    #[serde(default)]
    success: bool,
    image: Option<ImgboxImage>,
    error: Option<ImgboxFailure>,
}

#[derive(Debug, Deserialize)]
struct ImgboxImage {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImgboxFailure {
    message: Option<String>,
}

pub struct ImgboxHost {
    client: Client,
    api_key: Option<SecretString>,
    endpoint: String,
}

impl ImgboxHost {
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
impl ImageHost for ImgboxHost {
    fn kind(&self) -> HostKind {
        HostKind::Imgbox
    }

    async fn upload(&self, path: &Path) -> Result<Url, UploadError> {
        let host = self.kind();
        let Some(key) = self.api_key.as_ref() else {
            return Err(UploadError::Declined {
                host,
                reason: "IMGBOX_API_KEY is not configured".to_string(),
            });
        };

        let form = Form::new()
            .text("key", key.expose_secret().to_string())
            .text("action", "upload")
            .part("source", file_part(host, path).await?);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|source| UploadError::Request { host, source })?;

        let body: ImgboxResponse = json_body(host, response).await?;
        if !body.success {
            let reason = body
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "success=false".to_string());
            return Err(UploadError::Rejected { host, reason });
        }
        let link = body.image.and_then(|i| i.url).ok_or_else(|| UploadError::Rejected {
            host,
            reason: "response has no image.url".to_string(),
        })?;
        parse_link(host, &link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_upload_sends_key_and_action() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/json/upload.php"))
            .and(body_string_contains("box-key"))
            .and(body_string_contains("upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "image": { "url": "https://images2.imgbox.com/aa/bb/cc_o.jpg" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pic.jpg");
        std::fs::write(&file, b"jpeg").unwrap();

        let host = ImgboxHost::new(Client::new(), Some("box-key".to_string()))
            .with_endpoint(format!("{}/api/json/upload.php", server.uri()));
        let link = host.upload(&file).await.unwrap();
        assert_eq!(link.as_str(), "https://images2.imgbox.com/aa/bb/cc_o.jpg");
    }

    #[tokio::test]
    async fn test_missing_image_url_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pic.jpg");
        std::fs::write(&file, b"jpeg").unwrap();

        let host = ImgboxHost::new(Client::new(), Some("k".to_string())).with_endpoint(server.uri());
        let err = host.upload(&file).await.unwrap_err();
        assert!(matches!(err, UploadError::Rejected { host: HostKind::Imgbox, .. }));
    }

    #[tokio::test]
    async fn test_without_key_is_declined() {
        let host = ImgboxHost::new(Client::new(), None).with_endpoint("http://127.0.0.1:9");
        let err = host.upload(Path::new("whatever.jpg")).await.unwrap_err();
        assert!(matches!(err, UploadError::Declined { .. }));
    }
}
