//! Inline keyboard presses on the host menu.

use linkercore::{Action, SessionOutcome, SessionState};
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::view::MessageView;
use crate::telegram::Bot;

const UPLOAD_IN_PROGRESS: &str = "Upload already in progress.";

pub(super) fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            handle_callback(&bot, &q, &deps).await;
            Ok(())
        }
    })
}

async fn handle_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) {
    let user_id = i64::try_from(q.from.id.0).unwrap_or_default();

    if !deps.gate.is_member(user_id).await {
        answer(bot, q, Some("Please join our channel to use this bot!"), true).await;
        return;
    }

    let action = match q.data.as_deref().map(Action::parse) {
        Some(Ok(action)) => action,
        Some(Err(e)) => {
            log::warn!("Ignoring callback from user {}: {}", user_id, e);
            answer(bot, q, None, false).await;
            return;
        }
        None => {
            answer(bot, q, None, false).await;
            return;
        }
    };

    let Some(message) = q.regular_message() else {
        log::warn!("Callback {} has no accessible message", action);
        answer(bot, q, Some("This menu has expired. Please send the image again."), false).await;
        return;
    };
    let view = MessageView::new(bot.clone(), message.chat.id, message.id);

    match action {
        Action::Upload { host, key } => {
            // answer first, the upload can outlive the spinner timeout
            answer(bot, q, None, false).await;
            log::info!("🎯 User {} chose {} for session {}", user_id, host.label(), key);
            deps.controller.select_host(&key, host, &view).await;
        }
        Action::Delete { key } => {
            let text = match deps.controller.delete(&key, &view).await {
                SessionOutcome::Deleted => Some("Image deleted."),
                // the status message belongs to the running upload
                _ if deps.controller.store().state(&key) == SessionState::Uploading => {
                    Some(UPLOAD_IN_PROGRESS)
                }
                _ => None,
            };
            answer(bot, q, text, false).await;
        }
    }
}

async fn answer(bot: &Bot, q: &CallbackQuery, text: Option<&str>, alert: bool) {
    let mut request = bot.answer_callback_query(q.id.clone());
    if let Some(text) = text {
        request = request.text(text).show_alert(alert);
    }
    if let Err(e) = request.await {
        log::warn!("Failed to answer callback query: {}", e);
    }
}
