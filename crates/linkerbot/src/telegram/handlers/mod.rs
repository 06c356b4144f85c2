//! Telegram update handlers
//!
//! - `schema`: dispatcher tree
//! - `types`: shared dependencies and helpers
//! - `commands`: /start and reply-upload commands
//! - `images`: private chat images
//! - `callbacks`: host menu presses

mod callbacks;
mod commands;
mod images;
pub mod schema;
pub mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
