use axum::Router;
use lingvo_config::Config;
use std::net::SocketAddr;
use tokio::signal;

use crate::routes::{content_routes, document_routes, health_routes, lesson_routes};
use crate::{AppState, WebError};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(content_routes())
        .merge(lesson_routes())
        .merge(document_routes())
        .with_state(state)
        .merge(health_routes())
}

pub async fn start_server(config: &Config) -> Result<(), WebError> {
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let addr: SocketAddr = config
        .web
        .bind_address()
        .parse()
        .map_err(|e| WebError::Address(format!("{}: {e}", config.web.bind_address())))?;

    log::info!("Serving {} on http://{addr}", config.content_path.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("HTTP server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
