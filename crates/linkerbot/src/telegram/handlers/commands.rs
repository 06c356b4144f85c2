//! Command handlers: /start and the reply-upload commands

use linkercore::HostKind;
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{ensure_user_exists, reply, send_join_prompt, sender_id, HandlerDeps, HandlerError};
use crate::telegram::files::TelegramFile;
use crate::telegram::view::MessageView;
use crate::telegram::Bot;

const GREETING: &str = "👋 Hello! I'm your image linking bot.\n\n\
    In private chat: send me an image, and I'll give you options to upload it to various hosting sites.\n\
    In groups: reply to an image with /imgbb, /envs, /imgbox or /imghippo, and I'll provide a link.";

const JOIN_TO_START: &str = "Hello! Please join our channel to use this bot. Once you join, click 'Start' again.";

pub async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user_id) = sender_id(msg) else {
        return Ok(());
    };
    ensure_user_exists(&deps.db_pool, user_id);

    if !deps.gate.is_member(user_id).await {
        send_join_prompt(bot, msg, deps, JOIN_TO_START).await?;
        return Ok(());
    }

    reply(bot, msg, GREETING).await?;
    Ok(())
}

/// `/imgbb` etc. sent as a reply to an image: stage and upload in one go.
pub async fn handle_reply_upload(bot: &Bot, msg: &Message, host: HostKind, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let source = msg
        .reply_to_message()
        .and_then(|original| TelegramFile::from_message(bot, original));

    let Some(source) = source else {
        reply(
            bot,
            msg,
            format!("Please reply to an image with /{} to get a {} link.", host, host.label()),
        )
        .await?;
        return Ok(());
    };

    let status = reply(bot, msg, format!("📥 Downloading image for {} upload...", host.label())).await?;
    let view = MessageView::new(bot.clone(), msg.chat.id, status.id);
    let owner = sender_id(msg).unwrap_or_default();

    // staging failures are already shown in the status message
    let _ = deps.controller.upload_now(owner, &source, host, &view).await;
    Ok(())
}
