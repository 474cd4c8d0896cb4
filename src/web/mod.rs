//! HTTP surface: the arrivals line and a health check.

mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;

use tokio::net::TcpListener;
use tracing::info;

/// Serves `state` on `listener` until ctrl-c.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let arrivals_path = state.pipeline.config().arrivals_path.clone();
    let app = create_router(state);

    info!(addr = %listener.local_addr()?, %arrivals_path, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
