// ============================
// coderoom-backend-bin/src/main.rs
// ============================
use coderoom_backend_lib::{config::Settings, transport::WsTransport, ws_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    let state = Arc::new(AppState::new(WsTransport::new(), settings.clone()));
    let app = ws_router::create_router(state);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
