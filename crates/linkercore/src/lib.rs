//! Linkercore - staging sessions and image host uploads for the image linker bot
//!
//! Everything here is independent of Telegram: the bot crate plugs in a
//! file source, a view and a membership lookup through the traits below.
//!
//! # Module Structure
//!
//! - `staging`: session keys and the in-memory staging store
//! - `hosts`: image host trait, registry and provider clients
//! - `dispatcher`: single-attempt routing of a staged file to one host
//! - `session`: the lifecycle controller (stage, select host, delete)
//! - `action`: callback data codec
//! - `subscription`: channel-membership gate
//! - `users`, `broadcast`: owner tooling
//! - `config`, `error`, `logging`: ambient setup

pub mod action;
pub mod broadcast;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hosts;
pub mod logging;
pub mod session;
pub mod staging;
pub mod subscription;
pub mod users;

// Re-export commonly used types for convenience
pub use action::{Action, ActionParseError};
pub use dispatcher::UploadDispatcher;
pub use error::{AppError, AppResult, MembershipError, StagingError};
pub use hosts::{HostKind, HostRegistry, ImageHost, UploadError};
pub use session::{FileSource, Notice, SessionController, SessionOutcome, SessionView};
pub use staging::{SessionKey, SessionState, StagingStore, StoreError};
pub use subscription::{MembershipLookup, SubscriptionGate};
pub use users::{create_pool, get_connection, DbConnection, DbPool};
