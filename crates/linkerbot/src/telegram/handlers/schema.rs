//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::callbacks::callback_handler;
use super::commands::{handle_reply_upload, handle_start_command};
use super::images::private_image_handler;
use super::types::{reply, sender_id, HandlerDeps, HandlerError};
use crate::telegram::admin::{handle_broadcast_command, handle_users_command, OWNER_ONLY_IN_GROUPS};
use crate::telegram::bot::Command;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same tree is used for long polling and for webhooks.
///
/// # Arguments
/// * `deps` - Handler dependencies (session controller, database pool, gate)
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler(deps.clone()))
        .branch(private_image_handler(deps.clone()))
        .branch(callback_handler(deps))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

                if let Some(host) = cmd.host() {
                    return handle_reply_upload(&bot, &msg, host, &deps).await;
                }

                let is_owner = deps.is_owner(sender_id(&msg));
                if !msg.chat.is_private() {
                    // only the owner may use these in groups, and even then they do nothing there
                    if !is_owner {
                        reply(&bot, &msg, OWNER_ONLY_IN_GROUPS).await?;
                    }
                    return Ok(());
                }

                match cmd {
                    Command::Start => handle_start_command(&bot, &msg, &deps).await?,
                    Command::Users if is_owner => handle_users_command(&bot, &msg, &deps).await?,
                    Command::Broadcast(text) if is_owner => handle_broadcast_command(&bot, &msg, &text, &deps).await?,
                    Command::Users | Command::Broadcast(_) => {
                        log::warn!("Owner command {:?} rejected for chat {}", cmd, msg.chat.id);
                    }
                    Command::Imgbb | Command::Envs | Command::Imgbox | Command::Imghippo => {}
                }
                Ok(())
            }
        },
    ))
}
