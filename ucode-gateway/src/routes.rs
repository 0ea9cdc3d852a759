//! Route definitions for the uCode gateway.
//!
//! Public routes (health, config, sleep hook, transcoder webhook) skip
//! authentication; everything else passes through [`auth_middleware`] once.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::auth::auth_middleware;
use crate::handlers::{
    api_reference, cache, chat, fare, misc, query, scenario, sms, transcoder,
};
use crate::state::AppState;
use crate::trace::trace_middleware;

/// Routes reachable without credentials.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(misc::ping))
        .route("/health", get(misc::health))
        .route("/config", get(misc::config))
        .route("/v1/sleep", get(misc::sleep))
        .route("/v1/transcoder/webhook", post(transcoder::webhook))
}

/// API reference and query routes.
fn versioned_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/api-reference",
            post(api_reference::create)
                .get(api_reference::list)
                .put(api_reference::update),
        )
        .route(
            "/v1/api-reference/:api_reference_id",
            get(api_reference::get).delete(api_reference::delete),
        )
        .route(
            "/v1/api-reference/history/:api_reference_id",
            get(api_reference::history).post(api_reference::history),
        )
        .route("/v1/api-reference/revert", post(api_reference::revert))
        .route(
            "/v1/api-reference/select-versions",
            post(api_reference::select_versions),
        )
        .route(
            "/v1/query",
            post(query::create).get(query::list).put(query::update),
        )
        .route("/v1/query/:query_id", get(query::get).delete(query::delete))
        .route(
            "/v1/query/history/:query_id",
            get(query::history).post(query::history),
        )
        .route("/v1/query/revert", post(query::revert))
        .route("/v1/query/select-versions", post(query::select_versions))
}

/// Routes behind authentication.
pub fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(versioned_routes())
        .route(
            "/v1/scenario",
            post(scenario::create)
                .get(scenario::list)
                .put(scenario::update),
        )
        .route(
            "/v1/scenario/:scenario_id",
            get(scenario::get).delete(scenario::delete),
        )
        .route("/v1/scenario/:scenario_id/run", post(scenario::run))
        .route("/v1/chat", post(chat::create_chat).get(chat::list_chats))
        .route("/v1/chat/:chat_id", get(chat::get_chat))
        .route("/v1/chat/:chat_id/message", post(chat::send_message))
        .route("/v1/sms/send", post(sms::send_otp))
        .route("/v1/sms/verify", post(sms::verify_otp))
        .route("/v1/transcoder/pipeline", post(transcoder::create_pipeline))
        .route("/v1/cache", post(cache::cache))
        .route(
            "/v1/fare",
            post(fare::create_fare)
                .get(fare::list_fares)
                .put(fare::update_fare),
        )
        .route(
            "/v1/fare/:fare_id",
            get(fare::get_fare).delete(fare::delete_fare),
        )
        .route("/v1/payment/intent", post(misc::payment_intent))
        .route("/v1/minio/:bucket_name/size", get(misc::bucket_size))
        .route("/v1/n8n/workflows", get(misc::n8n_workflows))
        // after routing, so MatchedPath is set for the access check
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
}

/// Build the complete router with all routes.
pub fn build_all_routes(state: AppState) -> Router {
    let body_limit = state.config.http.body_limit_bytes;

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(middleware::from_fn(trace_middleware))
        .with_state(state)
}
