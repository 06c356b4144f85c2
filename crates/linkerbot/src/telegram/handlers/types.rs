//! Handler types, dependencies, and user helpers

use std::sync::Arc;

use linkercore::users::{self, DbPool};
use linkercore::{SessionController, SubscriptionGate};
use teloxide::prelude::*;
use teloxide::types::{Message, ReplyParameters};

use crate::telegram::view::build_join_keyboard;
use crate::telegram::Bot;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub controller: Arc<SessionController>,
    pub db_pool: Arc<DbPool>,
    pub gate: SubscriptionGate,
    /// Configured bot owner, if any
    pub owner: Option<i64>,
}

impl HandlerDeps {
    pub fn new(
        controller: Arc<SessionController>,
        db_pool: Arc<DbPool>,
        gate: SubscriptionGate,
        owner: Option<i64>,
    ) -> Self {
        Self {
            controller,
            db_pool,
            gate,
            owner,
        }
    }

    pub fn is_owner(&self, user_id: Option<i64>) -> bool {
        crate::telegram::admin::is_owner(user_id, self.owner)
    }
}

/// Telegram ID of the message author
pub fn sender_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok())
}

/// Registers the user, logging instead of failing.
pub fn ensure_user_exists(db_pool: &DbPool, user_id: i64) {
    match users::get_connection(db_pool) {
        Ok(conn) => {
            if let Err(e) = users::add_user(&conn, user_id) {
                log::error!("Failed to add user {}: {}", user_id, e);
            }
        }
        Err(e) => log::error!("Failed to get DB connection for user {}: {}", user_id, e),
    }
}

/// Sends `text` as a reply to `msg`.
pub async fn reply(bot: &Bot, msg: &Message, text: impl Into<String>) -> Result<Message, teloxide::RequestError> {
    bot.send_message(msg.chat.id, text)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await
}

/// Tells a non-member to join the gated channel.
pub async fn send_join_prompt(bot: &Bot, msg: &Message, deps: &HandlerDeps, text: &str) -> Result<(), HandlerError> {
    let mut request = bot
        .send_message(msg.chat.id, text)
        .reply_parameters(ReplyParameters::new(msg.id));
    if let Some(keyboard) = build_join_keyboard(deps.gate.join_link().as_deref()) {
        request = request.reply_markup(keyboard);
    }
    request.await?;
    Ok(())
}
