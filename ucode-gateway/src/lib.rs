//! uCode Gateway - Authentication, backend selection, and gRPC forwarding.
//!
//! This crate provides the HTTP API gateway of the uCode platform:
//! - Bearer, API-key and delegated authentication
//! - Per-request service-resource resolution and backend-bundle selection
//! - Commit envelopes and version-info enrichment for versioned entities
//! - Asynchronous version-history recording
//! - A project-scoped Redis cache bridge
//!
//! ## Architecture
//!
//! ```text
//! Client → Gateway (auth → context → resolve → select bundle) → gRPC backend
//!                                                   ↓
//!                                         version history (async)
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod auth;
pub mod cache;
pub mod commit;
pub mod context;
pub mod enrich;
pub mod grpc;
pub mod handlers;
pub mod history;
pub mod proxy;
pub mod resolver;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod status;
pub mod storage;
pub mod trace;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{Claims, Principal};
pub use context::{RequestCtx, Scope};
pub use response::{handle_response, ApiError, ApiResponse, ApiResult};
pub use state::{AppState, StateParts};
pub use status::Status;

use std::net::SocketAddr;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use ucode_common::Config;

/// Build the gateway router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::build_all_routes(state).layer(cors)
}

/// Start the gateway server and serve until a shutdown signal arrives.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config.bind_address().parse()?;
    let state = AppState::from_config(config).await?;
    let history = state.history.clone();

    let router = build_router(state);

    tracing::info!("Starting uCode Gateway on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Draining version history");
    history.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}
