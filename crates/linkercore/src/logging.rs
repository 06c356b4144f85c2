//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + combined file + error-only file)
//! - Log level parsing from configuration
//! - A startup summary of which image hosts are usable

use anyhow::Result;
use simplelog::*;
use std::path::Path;
use std::str::FromStr;

use crate::config;

/// Name of the error-only log written next to the combined log
pub const ERROR_LOG_FILE_NAME: &str = "error.log";

/// Parses a textual log level, falling back to `Info` for unknown values
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

/// Initialize logger for console and file output
///
/// Everything at `level` and above goes to the terminal and to `log_file_path`;
/// errors are additionally written to `error.log` in the same directory.
///
/// # Arguments
/// * `log_file_path` - Path to the combined log file
/// * `level` - Minimum level, e.g. "info" or "debug"
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create a log file or a logger was already set
pub fn init_logger(log_file_path: &str, level: &str) -> Result<()> {
    let level = parse_level(level);
    let log_file = fs_err::File::create(log_file_path)?.into_parts().0;

    let error_log_path = Path::new(log_file_path)
        .parent()
        .map(|dir| dir.join(ERROR_LOG_FILE_NAME))
        .unwrap_or_else(|| Path::new(ERROR_LOG_FILE_NAME).to_path_buf());
    let error_file = fs_err::File::create(&error_log_path)?.into_parts().0;

    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), log_file),
        WriteLogger::new(LevelFilter::Error, Config::default(), error_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs which image hosts have credentials at application startup
///
/// Hosts without a key stay in the menu but decline every upload, so a missing
/// key is worth a warning rather than an error.
pub fn log_hosts_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🖼️  Image hosts configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let keyed = [
        ("IMGBB_API_KEY", config::hosts::IMGBB_API_KEY.is_some()),
        ("IMGBOX_API_KEY", config::hosts::IMGBOX_API_KEY.is_some()),
        ("IMGHIPPO_API_KEY", config::hosts::IMGHIPPO_API_KEY.is_some()),
    ];
    for (name, present) in keyed {
        if present {
            log::info!("✅ {}: set", name);
        } else {
            log::warn!("⚠️  {}: not set, uploads to this host will be declined", name);
        }
    }
    log::info!("✅ Envs.sh: no key required");

    match config::FORCE_SUB_CHANNEL.as_deref() {
        Some(channel) => log::info!("🛡️  Subscription gate enabled for {}", channel),
        None => log::info!("🛡️  Subscription gate disabled (FORCE_SUB_CHANNEL not set)"),
    }
    match config::owner::id() {
        Some(id) => log::info!("👤 Owner ID: {}", id),
        None => log::warn!("⚠️  OWNER_ID not set, /users and /broadcast are disabled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_known_values() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level(" error "), LevelFilter::Error);
    }

    #[test]
    fn test_parse_level_falls_back_to_info() {
        assert_eq!(parse_level("verbose"), LevelFilter::Info);
        assert_eq!(parse_level(""), LevelFilter::Info);
    }
}
