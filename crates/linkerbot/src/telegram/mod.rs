pub mod admin;
pub mod bot;
pub mod files;
pub mod handlers;
pub mod membership;
pub mod view;
pub mod webhook;

pub type Bot = teloxide::Bot;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
