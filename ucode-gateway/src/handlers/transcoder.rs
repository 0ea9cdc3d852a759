//! Transcoder webhook and pipeline creation.

use axum::{extract::State, response::Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::RequestCtx;
use crate::response::{handle_response, ApiError, ApiResult, JsonBody};
use crate::services::object_builder::UpdateItemReq;
use crate::state::AppState;
use crate::status::Status;
use crate::validation::non_empty;

/// Callback sent by the transcoder when an upload finishes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscoderWebhook {
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub field_slug: String,
    #[serde(default)]
    pub output_key: String,
    #[serde(default)]
    pub table_slug: String,
    /// Resource-environment id of the owning project.
    #[serde(default)]
    pub project_id: String,
}

/// HLS playlist URL of a transcoded output.
pub fn stream_url(minio_endpoint: &str, output_key: &str) -> String {
    format!("https://{minio_endpoint}/movies/{output_key}/master.m3u8")
}

/// `POST /v1/transcoder/webhook`
///
/// Writes the stream URL into the item that owns the upload. An empty
/// `key_id` means there is nothing to update.
pub async fn webhook(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<TranscoderWebhook>,
) -> ApiResult<Response> {
    if body.key_id.trim().is_empty() {
        return Ok(handle_response(Status::Ok, Value::Null));
    }
    if non_empty(&body.field_slug).is_none() {
        return Err(ApiError::invalid_argument("field_slug is required"));
    }

    let resource = state.resolver.resource_environment(&body.project_id).await?;
    let bundle = state.nodes.select(&resource.project_id, resource.node_type)?;

    let mut data = Map::new();
    data.insert("guid".into(), Value::String(body.key_id.clone()));
    data.insert(
        body.field_slug.clone(),
        Value::String(stream_url(&state.config.minio.endpoint, &body.output_key)),
    );

    tracing::info!(
        table_slug = %body.table_slug,
        key_id = %body.key_id,
        namespace = %bundle.namespace,
        "Publishing transcoded stream"
    );

    let updated = bundle
        .go_object_builder
        .update_item(UpdateItemReq {
            table_slug: body.table_slug,
            project_id: body.project_id,
            data,
        })
        .await?;

    Ok(handle_response(Status::Ok, updated))
}

/// `POST /v1/transcoder/pipeline`
pub async fn create_pipeline(
    State(state): State<AppState>,
    ctx: RequestCtx,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Response> {
    let Value::Object(mut pipeline) = body else {
        return Err(ApiError::bad_request("request body must be a JSON object"));
    };
    let body_project = pipeline
        .get("project_id")
        .and_then(Value::as_str)
        .map(str::to_string);
    let scope = ctx.scope(body_project.as_deref())?;
    let bundle = state.nodes.by_namespace(&ctx.namespace)?;

    pipeline.insert("project_id".into(), Value::String(scope.project_id));
    pipeline.insert("environment_id".into(), Value::String(scope.environment_id));
    let created = bundle
        .transcoder
        .create_pipeline(Value::Object(pipeline))
        .await?;

    Ok(handle_response(Status::Created, created))
}
