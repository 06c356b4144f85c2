//! Image host abstraction layer.
//!
//! Provides the `ImageHost` trait for pluggable upload backends and a
//! `HostRegistry` built once at startup that maps each `HostKind` to its
//! implementation. New hosts are added by implementing `ImageHost`, adding a
//! `HostKind` variant and registering the implementation in `from_config`.
//!
//! Built-in hosts:
//! - `ImgbbHost`: api.imgbb.com (API key required)
//! - `EnvsHost`: envs.sh (anonymous)
//! - `ImgboxHost`: imgbox.com JSON API (API key required)
//! - `ImghippoHost`: api.imghippo.com v1 (API key required)

pub mod envs;
pub mod imgbb;
pub mod imgbox;
pub mod imghippo;

use async_trait::async_trait;
use reqwest::multipart::Part;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;
use url::Url;

use crate::config;

pub use envs::EnvsHost;
pub use imgbb::ImgbbHost;
pub use imgbox::ImgboxHost;
pub use imghippo::ImghippoHost;

/// Supported image hosts. The lowercase name is the wire form used in callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum HostKind {
    Imgbb,
    Envs,
    Imgbox,
    Imghippo,
}

impl HostKind {
    /// Wire name, e.g. "imgbb"
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Human-readable name shown on buttons and in messages
    pub fn label(&self) -> &'static str {
        match self {
            HostKind::Imgbb => "ImgBB",
            HostKind::Envs => "Envs.sh",
            HostKind::Imgbox => "Imgbox",
            HostKind::Imghippo => "ImgHippo",
        }
    }
}

/// Why a single upload attempt did not produce a link.
///
/// All variants are reported to the user the same way ("upload to X failed");
/// the distinction only matters for logs.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The host refused to try, e.g. no API key configured
    #[error("{host} declined the upload: {reason}")]
    Declined { host: HostKind, reason: String },

    /// Non-success HTTP status
    #[error("{host} returned HTTP {status}")]
    Status { host: HostKind, status: StatusCode },

    /// The host answered but reported failure or returned no usable link
    #[error("{host} rejected the upload: {reason}")]
    Rejected { host: HostKind, reason: String },

    /// Transport-level failure
    #[error("request to {host} failed: {source}")]
    Request {
        host: HostKind,
        #[source]
        source: reqwest::Error,
    },

    /// The staged file is missing or unreadable
    #[error("cannot read staged file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No implementation registered for the requested host
    #[error("no uploader registered for {0}")]
    UnsupportedHost(HostKind),
}

/// Trait for image host implementations.
///
/// Each host encapsulates its own authentication, request shape and response
/// parsing. Implementations must not touch the staged file beyond reading it.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Which host this is
    fn kind(&self) -> HostKind;

    /// Uploads the file at `path` and returns its public link.
    async fn upload(&self, path: &Path) -> Result<Url, UploadError>;
}

/// Static table from host kind to implementation.
///
/// Registration order is the order hosts appear in the selection menu.
#[derive(Default)]
pub struct HostRegistry {
    hosts: Vec<Arc<dyn ImageHost>>,
}

impl HostRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a host, replacing any earlier registration of the same kind.
    pub fn register(&mut self, host: Arc<dyn ImageHost>) {
        let kind = host.kind();
        match self.hosts.iter().position(|h| h.kind() == kind) {
            Some(idx) => self.hosts[idx] = host,
            None => self.hosts.push(host),
        }
    }

    /// Find the implementation for `kind`.
    pub fn resolve(&self, kind: HostKind) -> Option<Arc<dyn ImageHost>> {
        self.hosts.iter().find(|h| h.kind() == kind).cloned()
    }

    /// Registered kinds in menu order.
    pub fn kinds(&self) -> Vec<HostKind> {
        self.hosts.iter().map(|h| h.kind()).collect()
    }

    /// Create the production registry from environment configuration.
    pub fn from_config(client: Client) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ImgbbHost::new(
            client.clone(),
            config::hosts::IMGBB_API_KEY.clone(),
        )));
        registry.register(Arc::new(EnvsHost::new(client.clone())));
        registry.register(Arc::new(ImgboxHost::new(
            client.clone(),
            config::hosts::IMGBOX_API_KEY.clone(),
        )));
        registry.register(Arc::new(ImghippoHost::new(
            client,
            config::hosts::IMGHIPPO_API_KEY.clone(),
        )));
        registry
    }
}

/// Guess MIME type from file extension.
pub(crate) fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Reads the staged file into a multipart part carrying its name and MIME type.
pub(crate) async fn file_part(host: HostKind, path: &Path) -> Result<Part, UploadError> {
    let bytes = fs_err::tokio::read(path).await.map_err(|source| UploadError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();

    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime_from_extension(path))
        .map_err(|source| UploadError::Request { host, source })
}

/// Checks the status and decodes a JSON body.
pub(crate) async fn json_body<T: DeserializeOwned>(host: HostKind, response: Response) -> Result<T, UploadError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UploadError::Status { host, status });
    }
    let text = response
        .text()
        .await
        .map_err(|source| UploadError::Request { host, source })?;
    serde_json::from_str(&text).map_err(|e| UploadError::Rejected {
        host,
        reason: format!("malformed response: {}", e),
    })
}

/// Parses a link returned by a host.
pub(crate) fn parse_link(host: HostKind, raw: &str) -> Result<Url, UploadError> {
    Url::parse(raw.trim()).map_err(|e| UploadError::Rejected {
        host,
        reason: format!("invalid link {:?}: {}", raw, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    struct Dummy(HostKind, &'static str);

    #[async_trait]
    impl ImageHost for Dummy {
        fn kind(&self) -> HostKind {
            self.0
        }

        async fn upload(&self, _path: &Path) -> Result<Url, UploadError> {
            parse_link(self.0, self.1)
        }
    }

    #[test]
    fn test_host_kind_wire_names() {
        let names: Vec<&str> = HostKind::iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["imgbb", "envs", "imgbox", "imghippo"]);
        assert_eq!(HostKind::from_str("imghippo").unwrap(), HostKind::Imghippo);
        assert!(HostKind::from_str("catbox").is_err());
        assert_eq!(HostKind::Envs.to_string(), "envs");
    }

    #[test]
    fn test_registry_keeps_order_and_replaces_same_kind() {
        let mut registry = HostRegistry::new();
        registry.register(Arc::new(Dummy(HostKind::Envs, "https://a.example/1")));
        registry.register(Arc::new(Dummy(HostKind::Imgbb, "https://b.example/1")));
        registry.register(Arc::new(Dummy(HostKind::Envs, "https://c.example/1")));

        assert_eq!(registry.kinds(), vec![HostKind::Envs, HostKind::Imgbb]);
        assert!(registry.resolve(HostKind::Imgbox).is_none());
    }

    #[tokio::test]
    async fn test_registry_resolves_replacement() {
        let mut registry = HostRegistry::new();
        registry.register(Arc::new(Dummy(HostKind::Envs, "https://a.example/1")));
        registry.register(Arc::new(Dummy(HostKind::Envs, "https://c.example/1")));

        let host = registry.resolve(HostKind::Envs).unwrap();
        let link = host.upload(Path::new("unused.jpg")).await.unwrap();
        assert_eq!(link.as_str(), "https://c.example/1");
    }

    #[test]
    fn test_from_config_registers_every_host() {
        let registry = HostRegistry::from_config(Client::new());
        assert_eq!(registry.kinds(), HostKind::iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("a.png")), "image/png");
        assert_eq!(mime_from_extension(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_from_extension(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_parse_link_rejects_garbage() {
        let err = parse_link(HostKind::Envs, "not a url").unwrap_err();
        assert!(matches!(err, UploadError::Rejected { host: HostKind::Envs, .. }));
    }
}
