//! `POST /v1/cache`: project-scoped GET/SET/DEL against the shared cache.

use std::time::Duration;

use axum::{extract::State, response::Response};
use serde::Deserialize;
use serde_json::Value;

use crate::response::{handle_response, ApiError, ApiResult, JsonBody};
use crate::state::AppState;
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheMethod {
    Get,
    Set,
    Del,
}

#[derive(Debug, Deserialize)]
pub struct CacheRequest {
    pub method: CacheMethod,
    pub key: String,
    pub project_id: String,
    #[serde(default)]
    pub value: Value,
    /// Seconds; absent means the configured default.
    #[serde(default)]
    pub ttl: Option<u64>,
}

pub async fn cache(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CacheRequest>,
) -> ApiResult<Response> {
    if body.project_id.trim().is_empty() {
        return Err(ApiError::invalid_argument("project_id is required"));
    }
    if body.key.trim().is_empty() {
        return Err(ApiError::invalid_argument("key is required"));
    }

    let cache = &state.cache;
    let ttl = body
        .ttl
        .map(Duration::from_secs)
        .unwrap_or_else(|| cache.default_ttl());

    match body.method {
        CacheMethod::Get => {
            if let Some(stored) = cache.get(&body.key, &body.project_id).await? {
                let value = serde_json::from_str(&stored).unwrap_or(Value::String(stored));
                return Ok(handle_response(Status::Ok, value));
            }
            // Miss: store the supplied value and return it.
            if !body.value.is_null() {
                cache
                    .set_x(&body.key, &encode(&body.value)?, ttl, &body.project_id)
                    .await?;
            }
            Ok(handle_response(Status::Ok, body.value))
        }
        CacheMethod::Set => {
            cache
                .set_x(&body.key, &encode(&body.value)?, ttl, &body.project_id)
                .await?;
            Ok(handle_response(Status::Ok, body.value))
        }
        CacheMethod::Del => {
            cache.del(&body.key, &body.project_id).await?;
            Ok(handle_response(Status::Ok, Value::Null))
        }
    }
}

fn encode(value: &Value) -> ApiResult<String> {
    serde_json::to_string(value).map_err(|e| ApiError::internal(format!("failed to encode value: {e}")))
}
