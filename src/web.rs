use crate::config::{QuillConfig, SCRIPT_ROUTE};
use crate::errors::{QuillError, QuillResult};
use crate::log_sink::{LogEvent, LogSubmission, LogWriter};
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::io::ErrorKind;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, warn, Level};

pub const JAVASCRIPT_CONTENT_TYPE: &str = "application/javascript";

/// Immutable state shared by every handler.
#[derive(Debug)]
pub struct AppState {
    pub config: QuillConfig,
    /// Port actually bound; differs from `config.port` when that is 0.
    pub port: u16,
    pub writer: LogWriter,
}

impl AppState {
    pub fn new(config: QuillConfig, port: u16) -> Self {
        let writer = LogWriter::new(config.logfile.clone());
        Self {
            config,
            port,
            writer,
        }
    }
}

pub fn script_url(port: u16) -> String {
    format!("http://localhost:{port}{SCRIPT_ROUTE}")
}

pub fn embed_snippet(port: u16) -> String {
    format!("<script src=\"{}\"></script>", script_url(port))
}

fn render_status_page(port: u16) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Console Quill Status</title>
</head>
<body>
    <h1>Console Quill Server</h1>
    <p>Server is running and ready to receive console logs.</p>
    <p>Include this script in your HTML page:</p>
    <code>&lt;script src="{url}"&gt;&lt;/script&gt;</code>
</body>
</html>
"#,
        url = script_url(port)
    )
}

/// Build the capture router: status page, capture script and log submission.
/// Every other path or method answers 404.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let access_log = state.config.access_log;

    // axum answers HEAD through the GET handler unless HEAD is routed explicitly.
    // CORS wraps matched routes only, so preflights to unknown paths still 404.
    let router = Router::new()
        .route("/", get(status_page).head(not_found).fallback(not_found))
        .route(
            SCRIPT_ROUTE,
            get(capture_script).head(not_found).fallback(not_found),
        )
        .route("/log", post(submit_log).fallback(not_found))
        .route_layer(cors)
        .fallback(not_found)
        .with_state(state);

    if access_log {
        router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    } else {
        router
    }
}

async fn not_found() -> QuillError {
    QuillError::NotFound
}

async fn status_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_status_page(state.port))
}

async fn capture_script(State(state): State<Arc<AppState>>) -> QuillResult<impl IntoResponse> {
    let path = &state.config.script_path;
    let content = tokio::fs::read(path).await.map_err(|source| {
        let err = match source.kind() {
            ErrorKind::NotFound => QuillError::AssetMissing { path: path.clone() },
            _ => QuillError::AssetRead {
                path: path.clone(),
                source,
            },
        };
        warn!(error = %err, "capture script unavailable");
        err
    })?;

    Ok(([(header::CONTENT_TYPE, JAVASCRIPT_CONTENT_TYPE)], content))
}

#[axum::debug_handler]
async fn submit_log(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> QuillResult<Json<serde_json::Value>> {
    match accept_submission(state, &headers, body).await {
        Ok(()) => Ok(Json(serde_json::json!({ "status": "ok" }))),
        Err(err) => {
            warn!(error = %err, "dropped console log submission");
            Err(err)
        }
    }
}

async fn accept_submission(state: Arc<AppState>, headers: &HeaderMap, body: Body) -> QuillResult<()> {
    let declared = declared_length(headers)?;
    if declared > state.config.max_body_bytes {
        return Err(QuillError::malformed(format!(
            "payload of {declared} bytes exceeds limit of {} bytes",
            state.config.max_body_bytes
        )));
    }

    let bytes = axum::body::to_bytes(body, declared)
        .await
        .map_err(|e| QuillError::malformed(format!("failed to read request body: {e}")))?;

    let event = LogEvent::received(LogSubmission::from_slice(&bytes)?);

    // File I/O stays off the async workers
    tokio::task::spawn_blocking(move || {
        state.writer.append(&event)?;
        debug!(level = %event.level, path = %state.writer.path().display(), "appended console log");
        Ok::<_, QuillError>(())
    })
    .await??;

    Ok(())
}

fn declared_length(headers: &HeaderMap) -> QuillResult<usize> {
    let value = headers
        .get(header::CONTENT_LENGTH)
        .ok_or_else(|| QuillError::malformed("missing Content-Length header"))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .ok_or_else(|| QuillError::malformed("invalid Content-Length header"))
}
