use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Public base URL of the deployed bot, used to build the webhook URL
/// Read from PUBLIC_URL, then RENDER_EXTERNAL_URL, then K_SERVICE_URL
pub static PUBLIC_URL: Lazy<Option<String>> = Lazy::new(|| {
    ["PUBLIC_URL", "RENDER_EXTERNAL_URL", "K_SERVICE_URL"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim_end_matches('/').to_string())
        .find(|value| !value.is_empty())
});

/// Port the webhook HTTP server listens on
/// Read from PORT environment variable
/// Default: 5000
pub static PORT: Lazy<u16> = Lazy::new(|| env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(5000));

/// Directory where inbound images are staged until a host is chosen
/// Read from STAGING_DIR environment variable
/// Default: downloads
pub static STAGING_DIR: Lazy<String> = Lazy::new(|| env::var("STAGING_DIR").unwrap_or_else(|_| "downloads".to_string()));

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: users.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "users.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: combined.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "combined.log".to_string()));

/// Log level: error, warn, info, debug, trace
/// Read from LOG_LEVEL environment variable
/// Default: info
pub static LOG_LEVEL: Lazy<String> = Lazy::new(|| env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

/// Channel users must join before using the bot (e.g. "@my_channel" or "-100123...")
/// Read from FORCE_SUB_CHANNEL environment variable
/// Unset or empty disables the subscription gate
pub static FORCE_SUB_CHANNEL: Lazy<Option<String>> = Lazy::new(|| {
    env::var("FORCE_SUB_CHANNEL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
});

/// Owner configuration
pub mod owner {
    use super::*;

    /// Telegram user ID of the bot owner (for /broadcast and /users)
    /// Read from OWNER_ID environment variable
    /// 0 means no owner is configured and owner commands are rejected for everyone
    pub static OWNER_ID: Lazy<i64> = Lazy::new(|| {
        env::var("OWNER_ID")
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0)
    });

    /// Returns the owner ID if one is configured
    pub fn id() -> Option<i64> {
        match *OWNER_ID {
            0 => None,
            id => Some(id),
        }
    }
}

/// Image host credentials
///
/// Keys are optional: a host without its key declines every upload.
pub mod hosts {
    use super::*;

    fn non_empty(name: &str) -> Option<String> {
        env::var(name).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    }

    /// Read from IMGBB_API_KEY environment variable
    pub static IMGBB_API_KEY: Lazy<Option<String>> = Lazy::new(|| non_empty("IMGBB_API_KEY"));

    /// Read from IMGBOX_API_KEY environment variable
    pub static IMGBOX_API_KEY: Lazy<Option<String>> = Lazy::new(|| non_empty("IMGBOX_API_KEY"));

    /// Read from IMGHIPPO_API_KEY environment variable
    pub static IMGHIPPO_API_KEY: Lazy<Option<String>> = Lazy::new(|| non_empty("IMGHIPPO_API_KEY"));
}

/// Broadcast configuration
pub mod broadcast {
    use super::Duration;

    /// Pause between two consecutive broadcast messages (milliseconds)
    pub const DELAY_MS: u64 = 100;

    /// Broadcast pause duration
    pub fn delay() -> Duration {
        Duration::from_millis(DELAY_MS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of dispatcher restarts after a panic
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher restarts (seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }

    /// Base for exponential backoff between restarts
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for Telegram Bot API requests (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
