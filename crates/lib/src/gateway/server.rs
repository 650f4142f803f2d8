//! HTTP routes and server lifecycle for the control plane.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::config::Config;
use crate::deribit::{ChannelUpdate, DeribitService, SubscribeRequest};
use crate::sink::FileSink;

/// Shared state for the gateway (config, deribit service).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub deribit: Arc<DeribitService>,
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (e.g. Ctrl+C); the subscription session is closed
/// before the server exits.
pub async fn run_gateway(config: Config) -> Result<()> {
    let sink = FileSink::new(config.sink.path.clone());
    let deribit = Arc::new(DeribitService::new(config.deribit.url.clone(), sink));

    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = GatewayState {
        config: Arc::new(config),
        deribit: deribit.clone(),
    };

    let app = Router::new()
        .route("/", get(health_http))
        .route("/deribit/start", post(start_deribit))
        .route("/deribit/update", post(update_deribit))
        .route("/deribit/stop", get(stop_deribit))
        .route("/deribit/state", get(deribit_state))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(deribit))
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or
/// SIGTERM). Closes the subscription session before the server drains.
async fn shutdown_signal(deribit: Arc<DeribitService>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, closing subscription session");
    deribit.shutdown().await;
    log::info!("subscription session closed");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
    }))
}

/// POST /deribit/start: dial and subscribe in the background; poll
/// /deribit/state for the outcome.
async fn start_deribit(
    State(state): State<GatewayState>,
    Json(req): Json<SubscribeRequest>,
) -> (StatusCode, &'static str) {
    state.deribit.start(req.channels).await;
    (StatusCode::ACCEPTED, "attempting to start")
}

/// POST /deribit/update: adjust the live subscription; 409 when no session
/// is active.
async fn update_deribit(
    State(state): State<GatewayState>,
    Json(updates): Json<Vec<ChannelUpdate>>,
) -> Response {
    match state.deribit.update(&updates).await {
        Ok(rendered) => (StatusCode::OK, rendered).into_response(),
        Err(e) => (StatusCode::CONFLICT, e.to_string()).into_response(),
    }
}

/// GET /deribit/stop: queue a graceful close, return the state snapshot.
async fn stop_deribit(State(state): State<GatewayState>) -> String {
    state.deribit.stop().await
}

/// GET /deribit/state: rendered session state.
async fn deribit_state(State(state): State<GatewayState>) -> String {
    state.deribit.state().await.to_string()
}
