//! TempoLink webhook server binary

use tempolink_api::{build_router, AppContext};
use tempolink_domain::{Result, TempoLinkError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = tempolink_infra::config::load()?;
    let bind_addr = config.server.bind_addr.clone();
    let context = AppContext::new(config)?;
    let router = build_router(context);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| TempoLinkError::Config(format!("failed to bind {bind_addr}: {e}")))?;
    tracing::info!(addr = %bind_addr, "tempolink listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| TempoLinkError::Internal(format!("server error: {e}")))
}
