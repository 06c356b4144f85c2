//! Upload dispatcher: routes one staged file to the host the user picked.
//!
//! The dispatcher makes exactly one attempt and reports exactly one result.
//! It never touches the staging store and never deletes the file; cleanup
//! belongs to the session controller.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::hosts::{HostKind, HostRegistry, UploadError};

pub struct UploadDispatcher {
    registry: Arc<HostRegistry>,
}

impl UploadDispatcher {
    pub fn new(registry: Arc<HostRegistry>) -> Self {
        Self { registry }
    }

    /// Hosts offered in the selection menu, in registration order.
    pub fn hosts(&self) -> Vec<HostKind> {
        self.registry.kinds()
    }

    /// Uploads `path` to `host` once.
    ///
    /// Fails without contacting the host when the file is missing or no
    /// implementation is registered for `host`.
    pub async fn dispatch(&self, host: HostKind, path: &Path) -> Result<Url, UploadError> {
        if let Err(source) = fs_err::tokio::metadata(path).await {
            return Err(UploadError::File {
                path: path.to_path_buf(),
                source,
            });
        }
        let uploader = self.registry.resolve(host).ok_or(UploadError::UnsupportedHost(host))?;

        log::info!("📤 Uploading {} to {}", path.display(), host.label());
        let started = Instant::now();
        let result = uploader.upload(path).await;

        match &result {
            Ok(link) => log::info!(
                "✅ {} upload finished in {:.2}s: {}",
                host.label(),
                started.elapsed().as_secs_f64(),
                link
            ),
            Err(e) => log::warn!("❌ {} upload failed after {:.2}s: {}", host.label(), started.elapsed().as_secs_f64(), e),
        }
        result
    }
}
