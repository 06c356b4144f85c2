//! Upload session lifecycle.
//!
//! A session goes `Staged → Uploading → Terminal`:
//!
//! 1. [`SessionController::stage`] writes the inbound image to the staging
//!    directory, registers it under a fresh [`SessionKey`] and shows the host menu.
//! 2. [`SessionController::select_host`] claims the session, makes a single
//!    upload attempt and cleans up whatever the outcome.
//! 3. [`SessionController::delete`] discards a session that is still staged.
//!
//! Cleanup (store entry and file) is always finished before the terminal
//! notice is shown, so a user who sees "uploaded" or "deleted" can rely on the
//! file being gone. Transport concerns stay behind two seams: [`FileSource`]
//! produces the bytes and [`SessionView`] renders notices.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

use crate::dispatcher::UploadDispatcher;
use crate::error::{AppError, StagingError};
use crate::hosts::{HostKind, UploadError};
use crate::staging::{SessionKey, SessionState, StagingStore, StoreError};

/// Where the inbound image bytes come from (a Telegram file, a test buffer...).
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Extension for the staged file, without the dot
    fn extension(&self) -> &str;

    /// Writes the image to `dest`, returning the number of bytes written.
    async fn write_to(&self, dest: &Path) -> Result<u64, StagingError>;
}

/// Renders lifecycle notices to the user, usually by editing one status message.
#[async_trait]
pub trait SessionView: Send + Sync {
    async fn show(&self, notice: &Notice) -> Result<(), AppError>;
}

/// User-visible lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Image is on disk; offer `hosts` for session `key`
    Staged { key: SessionKey, hosts: Vec<HostKind> },
    StagingFailed(String),
    Uploading(HostKind),
    Uploaded { host: HostKind, link: Url },
    UploadFailed(HostKind),
    Deleted,
    NotFound,
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::Staged { .. } => "✨ Image downloaded. Choose an image host:".to_string(),
            Notice::StagingFailed(reason) => format!("❌ Error downloading image: {}", reason),
            Notice::Uploading(host) => format!("⬆️ Uploading to {}...", host.label()),
            Notice::Uploaded { host, link } => format!("🔗 Your {} link:\n{}", host.label(), link),
            Notice::UploadFailed(host) => format!("❌ Failed to upload to {}.", host.label()),
            Notice::Deleted => "🗑️ Image deleted from server. You can send another image.".to_string(),
            Notice::NotFound => "⚠️ Image file not found or already processed. Please send the image again.".to_string(),
        }
    }
}

/// Result of a host selection or delete event.
#[derive(Debug)]
pub enum SessionOutcome {
    Uploaded { host: HostKind, link: Url },
    Failed { host: HostKind, error: UploadError },
    Deleted,
    /// Unknown key, or the session was already consumed by another event
    NotFound,
}

pub struct SessionController {
    store: StagingStore,
    dispatcher: UploadDispatcher,
    staging_dir: PathBuf,
}

impl SessionController {
    pub fn new(dispatcher: UploadDispatcher, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: StagingStore::new(),
            dispatcher,
            staging_dir: staging_dir.into(),
        }
    }

    pub fn store(&self) -> &StagingStore {
        &self.store
    }

    pub fn hosts(&self) -> Vec<HostKind> {
        self.dispatcher.hosts()
    }

    /// Stages an inbound image and presents the host menu.
    ///
    /// On failure nothing is registered, the partial file is gone and the view
    /// shows a staging error.
    pub async fn stage(
        &self,
        owner: i64,
        source: &dyn FileSource,
        view: &dyn SessionView,
    ) -> Result<SessionKey, StagingError> {
        match self.write_session(owner, source).await {
            Ok(key) => {
                present(
                    view,
                    &Notice::Staged {
                        key: key.clone(),
                        hosts: self.hosts(),
                    },
                )
                .await;
                Ok(key)
            }
            Err(e) => {
                log::error!("❌ Failed to stage image from user {}: {}", owner, e);
                present(view, &Notice::StagingFailed(e.to_string())).await;
                Err(e)
            }
        }
    }

    /// Runs the single upload attempt for `key` on `host`.
    pub async fn select_host(&self, key: &SessionKey, host: HostKind, view: &dyn SessionView) -> SessionOutcome {
        let path = match self.store.claim(key) {
            Ok(path) => path,
            Err(e) => return self.not_found(e, view).await,
        };

        present(view, &Notice::Uploading(host)).await;
        let result = self.dispatcher.dispatch(host, &path).await;

        self.discard(key).await;

        match result {
            Ok(link) => {
                present(
                    view,
                    &Notice::Uploaded {
                        host,
                        link: link.clone(),
                    },
                )
                .await;
                SessionOutcome::Uploaded { host, link }
            }
            Err(error) => {
                present(view, &Notice::UploadFailed(host)).await;
                SessionOutcome::Failed { host, error }
            }
        }
    }

    /// Discards a staged session without uploading it.
    ///
    /// A session whose upload is already running is left alone and no notice is
    /// shown, since the upload will report its own result on the same message.
    pub async fn delete(&self, key: &SessionKey, view: &dyn SessionView) -> SessionOutcome {
        if let Err(e) = self.store.claim(key) {
            if self.store.state(key) == SessionState::Uploading {
                log::info!("ℹ️ Ignoring delete for session {}: upload in progress", key);
                return SessionOutcome::NotFound;
            }
            return self.not_found(e, view).await;
        }
        self.discard(key).await;
        log::info!("🗑️ Session {} deleted by user", key);
        present(view, &Notice::Deleted).await;
        SessionOutcome::Deleted
    }

    /// Stages and immediately uploads, for flows without a host menu.
    pub async fn upload_now(
        &self,
        owner: i64,
        source: &dyn FileSource,
        host: HostKind,
        view: &dyn SessionView,
    ) -> Result<SessionOutcome, StagingError> {
        let key = match self.write_session(owner, source).await {
            Ok(key) => key,
            Err(e) => {
                log::error!("❌ Failed to stage image from user {}: {}", owner, e);
                present(view, &Notice::StagingFailed(e.to_string())).await;
                return Err(e);
            }
        };
        Ok(self.select_host(&key, host, view).await)
    }

    /// Removes files left in the staging directory by a previous run.
    ///
    /// Sessions do not survive restarts, so a session-named file that no live
    /// session owns is garbage. Files not named after a session key are never
    /// touched. Returns the number of files removed.
    pub async fn purge_orphans(&self) -> io::Result<usize> {
        fs_err::tokio::create_dir_all(&self.staging_dir).await?;

        let live: Vec<PathBuf> = self.store.paths();
        let mut entries = tokio::fs::read_dir(&self.staging_dir).await?;
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_session_file = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(SessionKey::is_generated);
            if !is_session_file || !entry.file_type().await?.is_file() || live.contains(&path) {
                continue;
            }
            match fs_err::tokio::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("⚠️ Could not remove orphaned file {}: {}", path.display(), e),
            }
        }
        if removed > 0 {
            log::info!("🧹 Removed {} orphaned file(s) from {}", removed, self.staging_dir.display());
        }
        Ok(removed)
    }

    async fn write_session(&self, owner: i64, source: &dyn FileSource) -> Result<SessionKey, StagingError> {
        self.write_session_as(SessionKey::generate(), owner, source).await
    }

    /// Registers `key` first, then writes its file, so a colliding key never
    /// touches the live session's file.
    async fn write_session_as(
        &self,
        key: SessionKey,
        owner: i64,
        source: &dyn FileSource,
    ) -> Result<SessionKey, StagingError> {
        fs_err::tokio::create_dir_all(&self.staging_dir).await?;

        let path = self.staging_dir.join(format!("{}.{}", key, source.extension()));
        self.store.put(key.clone(), &path, owner)?;

        let bytes = match source.write_to(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.discard(&key).await;
                return Err(e);
            }
        };

        log::info!("📥 Staged {} bytes for user {} as session {}", bytes, owner, key);
        Ok(key)
    }

    async fn not_found(&self, error: StoreError, view: &dyn SessionView) -> SessionOutcome {
        log::info!("ℹ️ {}", error);
        present(view, &Notice::NotFound).await;
        SessionOutcome::NotFound
    }

    /// Terminal cleanup: drop the store entry, then the file.
    async fn discard(&self, key: &SessionKey) {
        if let Some(path) = self.store.remove(key) {
            remove_file_if_exists(&path).await;
        }
    }
}

async fn present(view: &dyn SessionView, notice: &Notice) {
    if let Err(e) = view.show(notice).await {
        log::warn!("⚠️ Failed to show {:?} notice: {}", notice, e);
    }
}

async fn remove_file_if_exists(path: &Path) {
    match fs_err::tokio::remove_file(path).await {
        Ok(()) => log::debug!("Removed staged file {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("⚠️ Failed to remove staged file {}: {}", path.display(), e),
    }
}
