use tracing_subscriber::EnvFilter;

use wellness_admin::config::config;
use wellness_admin::server::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up API_BASE_URL, WELLNESS_PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting wellness console in {:?} mode", config.environment);

    let state = AppState::new(config.clone())?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!(backend = %config.api.base_url, "console listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
