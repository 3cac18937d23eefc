use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use service::analytics::AnalyticsService;
use service::runtime;
use service::storage::DocumentStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the document store, load it once (running any pending upgrade) and
/// make sure the mock user exists.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    runtime::ensure_env(&cfg.storage).await?;
    let store: Arc<DocumentStore> = DocumentStore::from_config(&cfg.storage);
    let metadata = store.load().await?;
    info!(
        data_file = %store.data_path().display(),
        users = metadata.total_users,
        posts = metadata.total_posts,
        migrations = store.migrations_applied(),
        "document loaded"
    );
    let state = ServerState::new(store, cfg.app.clone(), AnalyticsService::default());
    state.users.ensure_mock_user(&cfg.app).await?;
    Ok(state)
}

pub fn app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg).await?;
    let addr = bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr).await.map_err(|e| anyhow::anyhow!("bind {addr}: {e}"))?;
    info!(%addr, "bailanysta listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;
    Ok(())
}
