mod api;
mod config;
mod store;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{app_router, AppState};
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_tracing(&config.log_filter);
    config.validate()?;

    let state = AppState::new(
        config.match_defaults(),
        config.max_dimension,
        config.max_matches,
    );
    let app = app_router(state, &config.static_dir);

    let listener = TcpListener::bind(config.addr).await?;
    info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
