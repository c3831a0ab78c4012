//! Minimal gateway bot
//!
//! Run with:
//! ```bash
//! FERROCORD_TOKEN=... cargo run -p ferrocord-bot
//! ```
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honored). `RUST_LOG` controls log filtering.

use ferrocord_client::{Client, ClientOptions, Embed};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Bot failed to start");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let token = std::env::var("FERROCORD_TOKEN")
        .map_err(|_| anyhow::anyhow!("FERROCORD_TOKEN is not set"))?;

    let client = Client::new(token, ClientOptions::default())?;

    client.on("ready", |user| {
        info!(user = %user["username"], "Bot is ready");
    });

    client.command("ping", |ctx| async move {
        let _ = ctx.reply("Pong!").await;
        Ok(())
    });

    client.command("!about", |ctx| async move {
        let _ = ctx
            .embed(Embed::new("ferrocord", "A gateway client written in Rust."))
            .await;
        Ok(())
    });

    info!("Logging in");
    client.login().await;

    Ok(())
}
