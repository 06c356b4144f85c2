use async_trait::async_trait;
use linkercore::{MembershipError, MembershipLookup};
use teloxide::prelude::*;
use teloxide::types::Recipient;

use crate::telegram::Bot;

/// Channel membership via `getChatMember`. The bot must be an admin of the channel.
pub struct ChannelLookup {
    bot: Bot,
}

impl ChannelLookup {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MembershipLookup for ChannelLookup {
    async fn is_member(&self, channel: &str, user_id: i64) -> Result<bool, MembershipError> {
        let user = u64::try_from(user_id)
            .map(UserId)
            .map_err(|_| MembershipError(format!("invalid user id {}", user_id)))?;

        let member = self
            .bot
            .get_chat_member(channel_recipient(channel), user)
            .await
            .map_err(|e| MembershipError(e.to_string()))?;

        Ok(member.kind.is_present())
    }
}

/// "-100123" → chat ID, "name" or "@name" → channel username
pub fn channel_recipient(channel: &str) -> Recipient {
    match channel.trim().parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(format!("@{}", channel.trim().trim_start_matches('@'))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_channel_recipient() {
        assert_eq!(channel_recipient("-1001234"), Recipient::Id(ChatId(-1001234)));
        assert_eq!(
            channel_recipient("@news"),
            Recipient::ChannelUsername("@news".to_string())
        );
        assert_eq!(
            channel_recipient("news"),
            Recipient::ChannelUsername("@news".to_string())
        );
    }
}
