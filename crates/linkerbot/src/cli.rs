use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "image-linker")]
#[command(author, version, about = "Telegram bot that uploads your images to free image hosts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling by default)
    Run {
        /// Receive updates through a webhook at PUBLIC_URL instead of long polling
        #[arg(long)]
        webhook: bool,
    },

    /// Register the webhook for PUBLIC_URL with Telegram and exit
    SetWebhook,

    /// Remove the webhook so the bot can use long polling again
    DeleteWebhook {
        /// Also drop updates queued while no one was listening
        #[arg(long)]
        drop_pending_updates: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
