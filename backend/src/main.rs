use alarm_sync_backend::{config::AppConfig, create_router, initialize_backend};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Alarm sync backend listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
