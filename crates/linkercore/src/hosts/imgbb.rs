//! ImgBB uploader (api.imgbb.com/1/upload).

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use url::Url;

use super::{file_part, json_body, parse_link, HostKind, ImageHost, UploadError};

pub const DEFAULT_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

#[derive(Debug, Deserialize)]
struct ImgbbResponse {
    #[serde(default)]
    success: bool,
    data: Option<ImgbbData>,
    error: Option<ImgbbFailure>,
}

#[derive(Debug, Deserialize)]
struct ImgbbData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImgbbFailure {
    message: Option<String>,
}

pub struct ImgbbHost {
    client: Client,
    api_key: Option<SecretString>,
    endpoint: String,
}

impl ImgbbHost {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.map(SecretString::from),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Points the uploader at another endpoint (used by tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ImageHost for ImgbbHost {
    fn kind(&self) -> HostKind {
        HostKind::Imgbb
    }

    async fn upload(&self, path: &Path) -> Result<Url, UploadError> {
        let host = self.kind();
        let Some(key) = self.api_key.as_ref() else {
            return Err(UploadError::Declined {
                host,
                reason: "IMGBB_API_KEY is not configured".to_string(),
            });
        };

        let form = Form::new().part("image", file_part(host, path).await?);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", key.expose_secret())])
            .multipart(form)
            .send()
            .await
            .map_err(|source| UploadError::Request { host, source })?;

        let body: ImgbbResponse = json_body(host, response).await?;
        if !body.success {
            let reason = body
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "success=false".to_string());
            return Err(UploadError::Rejected { host, reason });
        }
        match body.data.and_then(|d| d.url) {
            Some(link) => parse_link(host, &link),
            None => Err(UploadError::Rejected {
                host,
                reason: "response has no data.url".to_string(),
            }),
        }
    }
}
