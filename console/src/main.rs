//! Jifeng console - member app and admin console on the command line

mod cli;
mod commands;
mod config;
mod context;
mod output;
mod prompt;

use clap::Parser;
use cli::Cli;
use config::ClientConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jifeng_console=info,jifeng_engine=info,jifeng_networking=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref())?;
    tracing::debug!("Using backend {}", config.base_url);

    commands::run(&config, cli.command).await
}
