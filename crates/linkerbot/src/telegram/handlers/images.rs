//! Private chat images: download, then offer the host menu.

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{reply, send_join_prompt, sender_id, HandlerDeps, HandlerError};
use crate::telegram::files::TelegramFile;
use crate::telegram::view::MessageView;
use crate::telegram::Bot;

pub(super) fn private_image_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private() && TelegramFile::is_image(&msg))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_private_image(&bot, &msg, &deps).await }
        })
}

async fn handle_private_image(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user_id) = sender_id(msg) else {
        return Ok(());
    };
    if !deps.gate.is_member(user_id).await {
        send_join_prompt(bot, msg, deps, "Please join our channel to use this bot!").await?;
        return Ok(());
    }
    let Some(source) = TelegramFile::from_message(bot, msg) else {
        return Ok(());
    };

    log::info!("🖼️ Image received from user {}", user_id);
    let status = reply(bot, msg, "📥 Downloading your image...").await?;
    let view = MessageView::new(bot.clone(), msg.chat.id, status.id);

    // failures are rendered into the status message by the controller
    let _ = deps.controller.stage(user_id, &source, &view).await;
    Ok(())
}
