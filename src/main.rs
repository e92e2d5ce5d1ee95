//! Savoir-Vin command-line client wiring configuration, session, API client and shell.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use savoir_vin_client::{
    config::ClientConfig,
    dao::{http::HttpScoringApi, scoring_api::ScoringApi},
    services::{event_watcher::EventWatchers, shell_service::AppShell},
    session::SessionStore,
};

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ClientConfig::load().with_overrides(|key| cli.override_for(key));
    let session = SessionStore::open(&config.session_path).await;
    let http = HttpScoringApi::new(&config.api_client(), session.clone())
        .context("building scoring API client")?;
    debug!(api_base = http.base_url(), "scoring API client ready");

    let api: Arc<dyn ScoringApi> = Arc::new(http.clone());
    let watchers = EventWatchers::new(api.clone(), config.poll_settings());
    let app = AppShell::new(api, session, watchers, config.flow_options());
    app.restore().await;

    cli::run(cli.command, &app, &http).await
}

/// Configure tracing subscribers. Logs go to stderr so command output stays clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{default_level},reqwest=warn").into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
