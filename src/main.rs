use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homework_bot::config::Config;
use homework_bot::poller::Poller;
use homework_bot::practicum::PracticumClient;
use homework_bot::telegram::TelegramNotifier;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Missing credentials are fatal before the loop ever starts
    let config = Config::from_env().context("refusing to start with incomplete configuration")?;

    init_logging(&config.log_path)?;
    info!("Starting homework status bot");

    let practicum = PracticumClient::new(config.endpoint.clone(), config.practicum_token.clone());
    let notifier = TelegramNotifier::new(
        config.telegram_token.clone(),
        config.telegram_chat_id.clone(),
    );

    Poller::new(&config, practicum, notifier).run().await;
    Ok(())
}

/// Logs go to stdout and to an append-mode file at the same time.
fn init_logging(log_path: &Path) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homework_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    Ok(())
}
