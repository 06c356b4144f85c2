use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use image_linker::cli::{Cli, Commands};
use image_linker::telegram::membership::ChannelLookup;
use image_linker::telegram::webhook::{configured_webhook_url, run_webhook};
use image_linker::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use linkercore::logging::{init_logger, log_hosts_configuration};
use linkercore::{config, create_pool, HostRegistry, SessionController, SubscriptionGate, UploadDispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    let cli = Cli::parse_args();

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    init_logger(&config::LOG_FILE_PATH, &config::LOG_LEVEL)?;

    match cli.command {
        Some(Commands::Run { webhook }) => {
            log::info!("Running bot (webhook: {})", webhook);
            run_bot(webhook).await
        }
        Some(Commands::SetWebhook) => set_webhook().await,
        Some(Commands::DeleteWebhook { drop_pending_updates }) => delete_webhook(drop_pending_updates).await,
        None => {
            log::info!("No command specified, running bot in long polling mode");
            run_bot(false).await
        }
    }
}

async fn set_webhook() -> Result<()> {
    let bot = create_bot()?;
    let url = configured_webhook_url()?;
    bot.set_webhook(url).await?;
    log::info!("✅ Webhook registered");
    Ok(())
}

async fn delete_webhook(drop_pending_updates: bool) -> Result<()> {
    let bot = create_bot()?;
    bot.delete_webhook().drop_pending_updates(drop_pending_updates).await?;
    log::info!("✅ Webhook removed (dropped pending updates: {})", drop_pending_updates);
    Ok(())
}

async fn run_bot(use_webhook: bool) -> Result<()> {
    let bot_init_start = std::time::Instant::now();
    log::info!("Starting bot...");

    log_hosts_configuration();

    let bot = create_bot()?;
    let me = bot.get_me().await?;
    log::info!("Bot username: {:?}, Bot ID: {}", me.username, me.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!("image-linker/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let registry = Arc::new(HostRegistry::from_config(http));
    let controller = Arc::new(SessionController::new(
        UploadDispatcher::new(registry),
        config::STAGING_DIR.as_str(),
    ));
    if let Err(e) = controller.purge_orphans().await {
        log::warn!("Failed to clean staging directory {}: {}", config::STAGING_DIR.as_str(), e);
    }

    let gate = SubscriptionGate::new(
        config::FORCE_SUB_CHANNEL.clone(),
        Arc::new(ChannelLookup::new(bot.clone())),
    );
    let handler_deps = HandlerDeps::new(controller, db_pool, gate, config::owner::id());
    let handler = schema(handler_deps);

    if use_webhook {
        log::info!("🎉 Bot initialization complete in {:.2}s", bot_init_start.elapsed().as_secs_f64());
        return run_webhook(bot, handler).await;
    }

    // a webhook left over from a previous deployment would block getUpdates
    if let Err(e) = bot.delete_webhook().await {
        log::warn!("Failed to delete webhook before polling: {}", e);
    }

    log::info!("Starting bot in long polling mode");
    log::info!("================================================");
    log::info!("🎉 Bot initialization complete in {:.2}s", bot_init_start.elapsed().as_secs_f64());
    log::info!("📡 Ready to receive updates!");
    log::info!("================================================");

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    log::error!("Dispatcher panicked: {}", join_err);

                    if retry_count < max_retries {
                        retry_count += 1;
                        log::info!(
                            "Retrying dispatcher after panic (attempt {}/{})...",
                            retry_count,
                            max_retries
                        );
                        exponential_backoff(retry_count).await;
                    } else {
                        log::error!("Max retries reached after panic. Exiting...");
                        break;
                    }
                } else {
                    log::warn!("Dispatcher task was cancelled: {}", join_err);
                    break;
                }
            }
        }

        if retry_count > 0 {
            sleep(config::retry::dispatcher_delay()).await;
        }
    }

    Ok(())
}

async fn exponential_backoff(retry_count: u32) {
    let delay = Duration::from_secs(config::retry::EXPONENTIAL_BACKOFF_BASE.pow(retry_count));
    sleep(delay).await;
}
