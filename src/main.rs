use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod catalog;
mod config;
mod feeds;
mod models;
mod orchestrator;
mod scheduler;

use api::AppState;
use catalog::ChannelCatalog;
use config::Config;
use feeds::{CricApi, EspnCricinfo, MatchListProvider, MatchProvider, MultiSourceFeeds};
use orchestrator::{Cadences, LiveMatchOrchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    if config.cricapi_key.is_none() {
        warn!("CRICAPI_KEY not set – the CricAPI provider will fail over to the next source");
    }

    // Catalog and provider adapters, wired at the composition root.
    let catalog = Arc::new(ChannelCatalog::new());

    let cricapi = Arc::new(CricApi::new(
        config.cricapi_key.as_deref(),
        Some(&config.cricapi_url),
        &config.tracked_team1,
        &config.tracked_team2,
    )?);
    let espn = Arc::new(EspnCricinfo::new(
        Some(&config.espn_api_url),
        &config.tracked_team1,
        &config.tracked_team2,
    )?);

    let match_providers: Vec<Arc<dyn MatchProvider>> =
        vec![Arc::clone(&cricapi) as _, Arc::clone(&espn) as _];
    let list_providers: Vec<Arc<dyn MatchListProvider>> = vec![cricapi as _, espn as _];
    info!(
        "Configured {} match provider(s) tracking {} vs {}",
        match_providers.len(),
        config.tracked_team1,
        config.tracked_team2
    );

    let feeds = Arc::new(MultiSourceFeeds::new(
        match_providers,
        list_providers,
        Arc::clone(&catalog),
        Duration::from_millis(config.synth_latency_ms),
    ));

    // Orchestrator: initial fan-out fetch, then per-feed polling while live.
    let orchestrator = LiveMatchOrchestrator::new(
        Arc::clone(&feeds),
        Cadences {
            snapshot: Duration::from_secs(config.snapshot_poll_secs),
            commentary: Duration::from_secs(config.commentary_poll_secs),
            chat: Duration::from_secs(config.chat_poll_secs),
        },
    );
    orchestrator.start().await;

    let state = AppState {
        view: orchestrator.view_handle(),
        feeds,
        catalog,
    };
    let app = api::router(state);
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Blocks until shutdown; the orchestrator's timers live alongside.
    axum::serve(listener, app).await?;

    Ok(())
}
