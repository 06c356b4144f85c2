use thiserror::Error;

use crate::hosts::UploadError;
use crate::staging::StoreError;

/// Centralized error types for the application
///
/// Domain errors convert into this enum,
/// so handlers can use `?` and decide at the boundary which chat message to show.
///
/// # Example
///
/// ```no_run
/// use linkercore::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[cfg(feature = "telegram")]
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Inbound file could not be staged
    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),

    /// Session store errors (unknown key, duplicate key)
    #[error("Session error: {0}")]
    Store(#[from] StoreError),

    /// Image host upload errors
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Subscription gate lookup errors
    #[error("Membership check error: {0}")]
    Membership(#[from] MembershipError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Failure while bringing an inbound image onto local disk.
///
/// A session never reaches `Staged` when one of these is returned, and any
/// partially written file has already been removed.
#[derive(Error, Debug)]
pub enum StagingError {
    /// The remote file could not be resolved or downloaded
    #[error("failed to fetch inbound file: {0}")]
    Fetch(String),

    /// Local filesystem write failed
    #[error("failed to write staged file: {0}")]
    Write(#[from] std::io::Error),

    /// The generated key collided with a live session
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Remote membership query failed. The gate treats this as "not a member".
#[derive(Error, Debug)]
#[error("membership lookup failed: {0}")]
pub struct MembershipError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::SessionKey;

    #[test]
    fn test_store_error_converts_into_app_error() {
        let key = SessionKey::from("abc");
        let err: AppError = StoreError::NotFound(key).into();
        assert!(matches!(err, AppError::Store(StoreError::NotFound(_))));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_staging_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StagingError = io.into();
        assert!(matches!(err, StagingError::Write(_)));
        assert!(err.to_string().contains("denied"));
    }
}
