//! Owner broadcast: one message to every known user, sent one at a time.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

impl BroadcastReport {
    pub fn summary(&self) -> String {
        format!(
            "✅ Broadcast complete!\n➡️ Sent to: {} users\n❌ Failed to send to: {} users",
            self.sent, self.failed
        )
    }
}

/// Sends to each recipient in order, skipping `owner`, pausing `delay` after
/// every successful send. A failed send is counted and the loop moves on.
pub async fn broadcast<F, Fut, E>(recipients: &[i64], owner: Option<i64>, delay: Duration, mut send: F) -> BroadcastReport
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut report = BroadcastReport::default();
    for &user_id in recipients {
        if Some(user_id) == owner {
            continue;
        }
        match send(user_id).await {
            Ok(()) => {
                report.sent += 1;
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                report.failed += 1;
                log::warn!("Failed to send broadcast to user {}: {}", user_id, e);
            }
        }
    }
    log::info!("📣 Broadcast finished: {} sent, {} failed", report.sent, report.failed);
    report
}
