mod api;
mod cache;
mod config;
mod error;
mod etherscan;
mod fallback;
mod models;
mod parser;
mod portfolio;
mod price;
mod reconstruct;
mod source;
mod synthetic;
mod timeline;

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::cache::UpstreamCache;
use crate::portfolio::Portfolio;
use crate::source::LiveSource;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Wallet PnL service starting...");

    let cfg = config::load();

    // Without a live wallet every request is answered from fallback data
    let portfolio = match &cfg.live {
        Some(live) => match LiveSource::new(live) {
            Ok(source) => {
                let cache = UpstreamCache::new(cfg.cache_ttl);
                let portfolio = Portfolio::new(Arc::new(source), cache, live.identity(), cfg.live_data_threshold_usd);
                info!("Serving live data for {}", portfolio.identity().public_key);
                Some(Arc::new(portfolio))
            }
            Err(e) => {
                warn!("Could not build upstream clients: {}", e);
                None
            }
        },
        None => None,
    };

    let state = AppState {
        portfolio,
        status: cfg.status.clone(),
    };

    let api_handle = tokio::spawn(api::serve(cfg.port, state));

    // Graceful shutdown
    tokio::select! {
        res = api_handle => match res {
            Ok(Ok(_)) => info!("API exited cleanly"),
            Ok(Err(e)) => error!("API error: {:?}", e),
            Err(e) => error!("API task panicked: {:?}", e),
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    info!("Wallet PnL service stopped.");
    Ok(())
}
