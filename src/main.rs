use clap::Parser;
use dotenv::dotenv;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;
mod core;
mod correlator;
mod generator;
mod language;
mod lifecycle;
mod orchestrator;
mod platform;
mod providers;
mod session;
#[cfg(test)]
mod testing;

use crate::app::Application;
use crate::cli::Args;
use crate::config::Config;
use crate::core::error::BotError;
use crate::generator::ImageGenerator;
use crate::orchestrator::Orchestrator;
use crate::platform::telegram::TelegramClient;
use crate::providers::openai::OpenAIImageProvider;
use crate::session::SessionStore;

fn init_logging(verbose: bool) {
    let default = if verbose { "pixbot=debug" } else { "pixbot=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), BotError> {
    dotenv().ok();

    let args = Args::parse();
    init_logging(args.verbose);

    let config = Config::load(args.config.as_deref())?.with_env_overrides();
    let credentials = config.credentials()?;

    let telegram = Arc::new(TelegramClient::new(
        config.telegram_api_base(),
        credentials.bot_token,
    ));
    let provider = Arc::new(OpenAIImageProvider::with_endpoint(
        config.openai.base_url().to_string(),
        credentials.openai_api_key,
        config.openai.model().to_string(),
    ));

    let sessions = Arc::new(SessionStore::new());
    let generator = ImageGenerator::new(provider, config.openai.size());
    let orchestrator = Arc::new(Orchestrator::new(sessions, telegram.clone(), generator));

    Application::new(telegram, orchestrator, config.telegram.poll_timeout_secs)
        .run()
        .await
}
