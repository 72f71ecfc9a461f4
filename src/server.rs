//! Listener lifecycle: bind, serve until shutdown, report.

use crate::config::QuillConfig;
use crate::errors::{QuillError, QuillResult};
use crate::web::{build_router, embed_snippet, AppState};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Bind the configured address. A port already in use is a startup failure.
pub async fn bind(config: &QuillConfig) -> QuillResult<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| QuillError::Startup {
            addr: config.bind_addr(),
            source,
        })
}

/// Serve requests on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, config: QuillConfig, shutdown: F) -> QuillResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr().map_err(|source| QuillError::Serve { source })?;
    let state = Arc::new(AppState::new(config, local.port()));
    let app = build_router(state);

    info!(addr = %local, "console capture server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|source| QuillError::Serve { source })?;

    info!("console capture server shut down");
    Ok(())
}

/// Bind, print the startup banner and serve until Ctrl+C or SIGTERM.
pub async fn run(config: QuillConfig) -> QuillResult<()> {
    let listener = bind(&config).await?;
    let port = listener
        .local_addr()
        .map_err(|source| QuillError::Serve { source })?
        .port();

    println!("Console Quill server running on http://localhost:{port}");
    println!("Logging to: {}", config.logfile.display());
    println!("Include this script in your HTML: {}", embed_snippet(port));
    info!(logfile = %config.logfile.display(), access_log = config.access_log, "capture configured");

    serve(listener, config, shutdown_signal()).await?;

    println!("\nServer stopped.");
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
