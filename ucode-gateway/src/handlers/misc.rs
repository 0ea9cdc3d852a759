//! Health, configuration and the small self-contained endpoints.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::Response,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use ucode_common::RunMode;

use crate::context::RequestCtx;
use crate::response::{handle_response, ApiError, ApiResult, JsonBody};
use crate::services::ServiceType;
use crate::state::AppState;
use crate::status::Status;
use crate::storage::bytes_to_mb;

const RELEASE_CONFIG_PLACEHOLDER: &str = "configuration is hidden in release mode";
const DEFAULT_AMOUNT: i64 = 1000;
const DEFAULT_CURRENCY: &str = "usd";

/// `GET /ping`
pub async fn ping() -> Response {
    handle_response(Status::Ok, "pong")
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    handle_response(
        Status::Ok,
        json!({
            "status": "healthy",
            "service": "ucode-gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "namespaces": state.nodes.namespaces().collect::<Vec<_>>(),
        }),
    )
}

/// `GET /config`
///
/// Debug and test modes expose the configuration with secrets masked;
/// release mode exposes nothing.
pub async fn config(State(state): State<AppState>) -> ApiResult<Response> {
    match state.config.run_mode() {
        Some(RunMode::Debug | RunMode::Test) => {
            Ok(handle_response(Status::Ok, state.config.redacted()))
        }
        Some(RunMode::Release) => Ok(handle_response(Status::Ok, RELEASE_CONFIG_PLACEHOLDER)),
        None => Err(ApiError::bad_environment(format!(
            "unknown run mode '{}'",
            state.config.http.mode
        ))),
    }
}

/// `GET /v1/sleep`: holds the request open for the configured duration.
pub async fn sleep(State(state): State<AppState>) -> Response {
    let secs = state.config.http.sleep_secs;
    tokio::time::sleep(Duration::from_secs(secs)).await;
    handle_response(Status::Ok, json!({ "slept_secs": secs }))
}

// ============================================================================
// Payment mock
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PaymentIntentBody {
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// A synthetic payment intent, not backed by any processor.
pub fn mock_payment_intent(body: PaymentIntentBody) -> PaymentIntent {
    let id = format!("pi_{}", random_token(24));
    PaymentIntent {
        client_secret: format!("{id}_secret_{}", random_token(24)),
        id,
        amount: body.amount.unwrap_or(DEFAULT_AMOUNT),
        currency: body
            .currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        status: "requires_payment_method".into(),
    }
}

/// `POST /v1/payment/intent`
pub async fn payment_intent(
    _ctx: RequestCtx,
    JsonBody(body): JsonBody<PaymentIntentBody>,
) -> Response {
    handle_response(Status::Ok, mock_payment_intent(body))
}

// ============================================================================
// Object storage and workflows
// ============================================================================

/// `GET /v1/minio/:bucket_name/size`
pub async fn bucket_size(
    State(state): State<AppState>,
    _ctx: RequestCtx,
    Path(bucket_name): Path<String>,
) -> ApiResult<Response> {
    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| ApiError::internal("object storage is not configured"))?;
    let bytes = storage
        .bucket_size_bytes(&bucket_name)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(handle_response(
        Status::Ok,
        json!({ "bucket": bucket_name, "total_size_mb": bytes_to_mb(bytes) }),
    ))
}

/// `GET /v1/n8n/workflows`
pub async fn n8n_workflows(
    State(state): State<AppState>,
    ctx: RequestCtx,
) -> ApiResult<Response> {
    let scope = ctx.scope(None)?;
    let resource = state
        .resolver
        .resolve(
            &scope.project_id,
            &scope.environment_id,
            ServiceType::BuilderService,
        )
        .await?;

    let workflows: Value = state
        .n8n
        .list_workflows(&resource.resource_environment_id)
        .await?;
    Ok(handle_response(Status::Ok, workflows))
}
