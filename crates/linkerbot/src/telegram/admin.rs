//! Owner-only commands: `/users` and `/broadcast`.

use linkercore::broadcast::broadcast;
use linkercore::config;
use linkercore::users;
use teloxide::prelude::*;
use teloxide::types::Message;

use crate::telegram::handlers::types::{reply, HandlerDeps, HandlerError};
use crate::telegram::Bot;

pub const OWNER_ONLY_IN_GROUPS: &str = "🚫 This command can only be used by the bot owner in groups.";
pub const BROADCAST_USAGE: &str = "Usage: /broadcast [your message]";

/// Check if user is the configured owner
pub fn is_owner(user_id: Option<i64>, owner: Option<i64>) -> bool {
    match (user_id, owner) {
        (Some(user), Some(owner)) => user == owner,
        _ => false,
    }
}

/// Broadcast body, if the owner actually wrote one
pub fn broadcast_text(args: &str) -> Option<&str> {
    let text = args.trim();
    (!text.is_empty()).then_some(text)
}

pub async fn handle_users_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let count = users::get_connection(&deps.db_pool)
        .map_err(linkercore::AppError::from)
        .and_then(|conn| users::count_users(&conn).map_err(linkercore::AppError::from));

    match count {
        Ok(count) => {
            reply(bot, msg, format!("📊 Total users in database: {}", count)).await?;
        }
        Err(e) => {
            log::error!("Error in /users command: {}", e);
            reply(bot, msg, format!("❌ Error fetching user count: {}", e)).await?;
        }
    }
    Ok(())
}

pub async fn handle_broadcast_command(
    bot: &Bot,
    msg: &Message,
    args: &str,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let Some(text) = broadcast_text(args) else {
        reply(bot, msg, BROADCAST_USAGE).await?;
        return Ok(());
    };

    let recipients = {
        let conn = users::get_connection(&deps.db_pool)?;
        users::get_all_users(&conn)?
    };
    log::info!("📣 Broadcasting to {} users", recipients.len());

    let status = reply(bot, msg, "🚀 Starting broadcast...").await?;
    let report = broadcast(&recipients, deps.owner, config::broadcast::delay(), |user_id| {
        let request = bot.send_message(ChatId(user_id), text.to_string());
        async move { request.await.map(|_| ()) }
    })
    .await;

    bot.edit_message_text(msg.chat.id, status.id, report.summary()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_owner() {
        assert!(is_owner(Some(10), Some(10)));
        assert!(!is_owner(Some(11), Some(10)));
        assert!(!is_owner(Some(10), None));
        assert!(!is_owner(None, Some(10)));
    }

    #[test]
    fn test_broadcast_text() {
        assert_eq!(broadcast_text("  hello all "), Some("hello all"));
        assert_eq!(broadcast_text(""), None);
        assert_eq!(broadcast_text("   "), None);
    }
}
