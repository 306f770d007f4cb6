//! Shift Scheduling - Axum Server
//!
//! Run with: cargo run
//! Then open: http://localhost:7860/health

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shift_scheduling::api;
use shift_scheduling::solver::SolverConfig;

const ADDR_ENV: &str = "SHIFT_SCHEDULING_ADDR";
const DEFAULT_ADDR: &str = "0.0.0.0:7860";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("shift_scheduling=info".parse()?))
        .init();

    let config = SolverConfig::from_env();
    info!(
        time_limit_secs = config.time_limit.as_secs(),
        objective = ?config.objective,
        "Solver configured"
    );

    let state = Arc::new(api::AppState::new(config));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(state).layer(cors);

    let addr: SocketAddr = std::env::var(ADDR_ENV)
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;
    info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
