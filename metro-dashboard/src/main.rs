use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use metro_dashboard::config::DashboardConfig;
use metro_dashboard::session::DashboardSession;
use metro_dashboard::web::{AppState, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("metro_dashboard=info")),
        )
        .init();

    let config = DashboardConfig::from_env().context("invalid configuration")?;

    // Build the station index and load trips once (fail fast if unavailable)
    let session = DashboardSession::load(&config).with_context(|| {
        format!(
            "failed to load {} and {}",
            config.stations_path.display(),
            config.trips_path.display()
        )
    })?;

    let app = create_router(AppState::new(session), &config.static_dir);

    let addr = config.bind_addr;
    info!("Metro trip dashboard listening on http://{addr}");
    info!("API endpoints:");
    info!("  GET  /health        - Health check");
    info!("  GET  /api/stations  - Search stop names");
    info!("  GET  /api/lines     - List metro lines");
    info!("  GET  /api/trips     - Filter trips");
    info!("  GET  /api/route     - Route between two stops");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
