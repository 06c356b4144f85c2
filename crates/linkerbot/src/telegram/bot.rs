//! Bot initialization and the command set
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command menu registration

use linkercore::config;
use linkercore::HostKind;
use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::telegram::Bot;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "total number of users (owner only)")]
    Users,
    #[command(description = "send a message to every user (owner only)")]
    Broadcast(String),
    #[command(description = "reply to an image to upload it to ImgBB")]
    Imgbb,
    #[command(description = "reply to an image to upload it to Envs.sh")]
    Envs,
    #[command(description = "reply to an image to upload it to Imgbox")]
    Imgbox,
    #[command(description = "reply to an image to upload it to ImgHippo")]
    Imghippo,
}

impl Command {
    /// Host behind a reply-upload command
    pub fn host(&self) -> Option<HostKind> {
        match self {
            Command::Imgbb => Some(HostKind::Imgbb),
            Command::Envs => Some(HostKind::Envs),
            Command::Imgbox => Some(HostKind::Imgbox),
            Command::Imghippo => Some(HostKind::Imghippo),
            Command::Start | Command::Users | Command::Broadcast(_) => None,
        }
    }
}

/// Creates a Bot instance from BOT_TOKEN
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Token missing or HTTP client could not be built
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(config::BOT_TOKEN.as_str(), client))
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_host_commands() {
        assert_eq!(Command::parse("/imgbb", "linker_bot").unwrap(), Command::Imgbb);
        assert_eq!(Command::parse("/imghippo@linker_bot", "linker_bot").unwrap(), Command::Imghippo);
        assert_eq!(Command::Envs.host(), Some(HostKind::Envs));
        assert_eq!(Command::Start.host(), None);
    }

    #[test]
    fn test_parse_broadcast_keeps_whole_text() {
        assert_eq!(
            Command::parse("/broadcast New hosts are live!", "linker_bot").unwrap(),
            Command::Broadcast("New hosts are live!".to_string())
        );
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Command::parse("/catbox", "linker_bot").is_err());
    }

    #[test]
    fn test_menu_lists_every_command() {
        let names: Vec<String> = Command::bot_commands().into_iter().map(|c| c.command).collect();
        assert_eq!(names.len(), 7);
        assert!(names.iter().any(|n| n.ends_with("imghippo")));
    }
}
