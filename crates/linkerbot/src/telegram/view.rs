//! Renders session notices by editing the bot's status message.

use async_trait::async_trait;
use linkercore::{Action, AppError, HostKind, Notice, SessionKey, SessionView};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use url::Url;

use crate::telegram::Bot;

/// One status message that follows a session from download to outcome.
pub struct MessageView {
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
}

impl MessageView {
    pub fn new(bot: Bot, chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            bot,
            chat_id,
            message_id,
        }
    }
}

#[async_trait]
impl SessionView for MessageView {
    async fn show(&self, notice: &Notice) -> Result<(), AppError> {
        // an edit without markup also strips the old buttons
        let mut request = self.bot.edit_message_text(self.chat_id, self.message_id, notice.text());
        if let Some(keyboard) = notice_keyboard(notice) {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }
}

/// Buttons attached to a notice, if any.
pub fn notice_keyboard(notice: &Notice) -> Option<InlineKeyboardMarkup> {
    match notice {
        Notice::Staged { key, hosts } => Some(build_host_keyboard(key, hosts)),
        Notice::Uploaded { link, .. } => Some(build_link_keyboard(link)),
        _ => None,
    }
}

/// One row per host, then a delete row.
pub fn build_host_keyboard(key: &SessionKey, hosts: &[HostKind]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = hosts
        .iter()
        .map(|&host| {
            vec![InlineKeyboardButton::callback(
                format!("🔗 Upload to {}", host.label()),
                Action::Upload { host, key: key.clone() }.encode(),
            )]
        })
        .collect();

    rows.push(vec![InlineKeyboardButton::callback(
        "🗑️ Delete Downloaded Image",
        Action::Delete { key: key.clone() }.encode(),
    )]);

    InlineKeyboardMarkup::new(rows)
}

pub fn build_link_keyboard(link: &Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url("Open Link", link.clone())]])
}

/// Join button for the subscription prompt. `None` when the channel has no public link.
pub fn build_join_keyboard(join_link: Option<&str>) -> Option<InlineKeyboardMarkup> {
    let url = Url::parse(join_link?).ok()?;
    Some(InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        "📢 Join Channel",
        url,
    )]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use teloxide::types::InlineKeyboardButtonKind;

    /// Helper: extract all callback_data strings from a keyboard
    fn callback_data(keyboard: &InlineKeyboardMarkup) -> Vec<Vec<String>> {
        keyboard
            .inline_keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|btn| match &btn.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    /// Helper: extract all URL buttons from a keyboard
    fn url_buttons(keyboard: &InlineKeyboardMarkup) -> Vec<(String, String)> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|btn| match &btn.kind {
                InlineKeyboardButtonKind::Url(url) => Some((btn.text.clone(), url.to_string())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_host_keyboard_rows() {
        let key = SessionKey::from("abc");
        let kb = build_host_keyboard(&key, &[HostKind::Imgbb, HostKind::Envs, HostKind::Imgbox]);
        let data = callback_data(&kb);

        assert_eq!(data.len(), 4, "three hosts plus delete");
        assert_eq!(data[0], vec!["upload_imgbb:abc"]);
        assert_eq!(data[1], vec!["upload_envs:abc"]);
        assert_eq!(data[2], vec!["upload_imgbox:abc"]);
        assert_eq!(data[3], vec!["delete_image:abc"]);
        assert_eq!(kb.inline_keyboard[1][0].text, "🔗 Upload to Envs.sh");
    }

    #[test]
    fn test_host_keyboard_without_hosts_still_offers_delete() {
        let kb = build_host_keyboard(&SessionKey::from("k"), &[]);
        assert_eq!(callback_data(&kb), vec![vec!["delete_image:k".to_string()]]);
    }

    #[test]
    fn test_uploaded_notice_gets_open_link_button() {
        let link = Url::parse("https://i.ibb.co/x/y.jpg").unwrap();
        let kb = notice_keyboard(&Notice::Uploaded {
            host: HostKind::Imgbb,
            link,
        })
        .unwrap();
        assert_eq!(
            url_buttons(&kb),
            vec![("Open Link".to_string(), "https://i.ibb.co/x/y.jpg".to_string())]
        );
    }

    #[test]
    fn test_intermediate_and_failure_notices_have_no_buttons() {
        assert!(notice_keyboard(&Notice::Uploading(HostKind::Envs)).is_none());
        assert!(notice_keyboard(&Notice::UploadFailed(HostKind::Envs)).is_none());
        assert!(notice_keyboard(&Notice::NotFound).is_none());
    }

    #[test]
    fn test_join_keyboard() {
        let kb = build_join_keyboard(Some("https://t.me/news")).unwrap();
        assert_eq!(
            url_buttons(&kb),
            vec![("📢 Join Channel".to_string(), "https://t.me/news".to_string())]
        );
        assert!(build_join_keyboard(None).is_none());
    }
}
