//! Webhook mode: teloxide's axum listener plus a health route on the same port.

use anyhow::Result;
use axum::routing::get;
use linkercore::config;
use std::net::SocketAddr;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use url::Url;

use crate::telegram::{Bot, HandlerError};

/// Webhook URL: `<PUBLIC_URL>/<BOT_TOKEN>`
pub fn webhook_url(base: Option<&str>, token: &str) -> Result<Url> {
    let base = base.ok_or_else(|| {
        anyhow::anyhow!("PUBLIC_URL (or RENDER_EXTERNAL_URL / K_SERVICE_URL) must be set for webhook mode")
    })?;
    let url = Url::parse(&format!("{}/{}", base.trim_end_matches('/'), token))?;
    Ok(url)
}

/// URL built from the environment
pub fn configured_webhook_url() -> Result<Url> {
    webhook_url(config::PUBLIC_URL.as_deref(), &config::BOT_TOKEN)
}

async fn health() -> &'static str {
    "Bot is running!"
}

/// Registers the webhook, serves it and dispatches updates until Ctrl-C.
pub async fn run_webhook(bot: Bot, handler: UpdateHandler<HandlerError>) -> Result<()> {
    let url = configured_webhook_url()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], *config::PORT));
    log::info!("🌐 Starting webhook server on {}", addr);

    let options = webhooks::Options::new(addr, url);
    let (listener, stop_flag, router) = webhooks::axum_to_router(bot.clone(), options).await?;
    let app = router.route("/", get(health));

    let tcp = tokio::net::TcpListener::bind(addr).await?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(tcp, app).with_graceful_shutdown(stop_flag).await {
            log::error!("Webhook server error: {}", e);
        }
    });

    log::info!("📡 Webhook set, ready to receive updates!");
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the webhook listener"),
        )
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_webhook_url_appends_token() {
        let url = webhook_url(Some("https://linker.onrender.com/"), "123:ABC").unwrap();
        assert_eq!(url.as_str(), "https://linker.onrender.com/123:ABC");
    }

    #[test]
    fn test_webhook_url_requires_base() {
        assert!(webhook_url(None, "123:ABC").is_err());
    }
}
