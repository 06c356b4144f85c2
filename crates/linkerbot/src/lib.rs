//! Image Linker - Telegram front end for linkercore
//!
//! # Module Structure
//!
//! - `cli`: command line interface
//! - `telegram`: bot setup, dispatcher schema, handlers and the Telegram
//!   implementations of linkercore's file source, view and membership seams

pub mod cli;
pub mod telegram;

pub use telegram::{create_bot, schema, setup_bot_commands, Bot, HandlerDeps, HandlerError};
