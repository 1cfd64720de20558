//! Axum HTTP server: router, listener, config reload, graceful shutdown.
//!
//! The HTTP surface is read-only. The configuration is replaced only by the
//! operator, through SIGHUP and the config file.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use reqid::{ConfigHandle, IdConfig, RequestIdLayer, RequestVars};
use tower_http::trace::TraceLayer;
use tracing::Span;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config_path: String,
    pub ids: ConfigHandle,
}

/// Build the router. `request_ids` is the outermost layer so the trace span
/// and every handler see the injected identifiers.
pub fn router(state: AppState, request_ids: RequestIdLayer) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/ids", get(handle_ids))
        .route("/api/config", get(handle_get_config))
        .with_state(Arc::new(state))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(record_response),
        )
        .layer(request_ids)
}

/// Build and run the HTTP server.
pub async fn run(listen_addr: &str, state: AppState, request_ids: RequestIdLayer) -> anyhow::Result<()> {
    #[cfg(unix)]
    spawn_sighup_reload(state.config_path.clone(), state.ids.clone());

    let app = router(state, request_ids);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(address = %listen_addr, "reqid-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("reqid-server shut down gracefully");
    Ok(())
}

fn make_request_span(req: &Request) -> Span {
    let request_id = req
        .extensions()
        .get::<RequestVars>()
        .and_then(|vars| vars.request_id())
        .unwrap_or("-");
    reqid_tracing::http_request_span!(req.method(), req.uri().path(), request_id)
}

fn record_response(res: &Response, latency: Duration, span: &Span) {
    span.record("status", res.status().as_u16());
    span.record("latency_ms", latency.as_millis() as u64);
    tracing::info!("request completed");
}

/// Health check endpoint.
async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// GET /api/ids: echo the identifiers injected for this request.
async fn handle_ids(Extension(vars): Extension<RequestVars>) -> Json<RequestVars> {
    Json(vars)
}

/// GET /api/config: the configuration new requests are using.
async fn handle_get_config(State(state): State<Arc<AppState>>) -> Json<IdConfig> {
    Json(IdConfig::clone(&state.ids.snapshot()))
}

/// Load `config_path` and install its request_id section. On error the
/// active configuration stays in place.
pub fn reload_from_file(config_path: &str, ids: &ConfigHandle) -> anyhow::Result<Arc<IdConfig>> {
    let settings = crate::config::ServerSettings::load(config_path)?;
    Ok(ids.reload(&settings.request_id)?)
}

/// Re-read the config file on SIGHUP. A bad file keeps the current config.
#[cfg(unix)]
fn spawn_sighup_reload(config_path: String, ids: ConfigHandle) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGHUP handler, reload disabled");
            return;
        }
    };

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            tracing::info!(config_path = %config_path, "SIGHUP received, reloading configuration");
            if let Err(e) = reload_from_file(&config_path, &ids) {
                tracing::error!(error = %e, "Reload failed, keeping previous configuration");
            }
        }
    });
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, draining connections...");
}
