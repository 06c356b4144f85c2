//! Channel-membership gate.
//!
//! When a channel is configured, only its members may use the bot. The
//! membership query itself is behind [`MembershipLookup`] so the gate can be
//! tested without Telegram.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::MembershipError;

/// Remote "is this user in that channel" query.
#[async_trait]
pub trait MembershipLookup: Send + Sync {
    async fn is_member(&self, channel: &str, user_id: i64) -> Result<bool, MembershipError>;
}

#[derive(Clone)]
pub struct SubscriptionGate {
    channel: Option<String>,
    lookup: Arc<dyn MembershipLookup>,
}

impl SubscriptionGate {
    /// `channel` is a public username ("@name" or "name") or a numeric chat ID.
    /// `None` disables the gate.
    pub fn new(channel: Option<String>, lookup: Arc<dyn MembershipLookup>) -> Self {
        Self { channel, lookup }
    }

    /// Whether `user_id` may use the bot.
    ///
    /// Always true without a configured channel. Lookup errors count as
    /// "not a member".
    pub async fn is_member(&self, user_id: i64) -> bool {
        let Some(channel) = self.channel.as_deref() else {
            return true;
        };
        match self.lookup.is_member(channel, user_id).await {
            Ok(member) => member,
            Err(e) => {
                log::warn!("⚠️ Subscription check for user {} in {} failed: {}", user_id, channel, e);
                false
            }
        }
    }

    /// `https://t.me/<channel>` for the join button. Numeric IDs have no public link.
    pub fn join_link(&self) -> Option<String> {
        let channel = self.channel.as_deref()?.trim_start_matches('@');
        if channel.is_empty() || channel.starts_with('-') || channel.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(format!("https://t.me/{}", channel))
    }
}
