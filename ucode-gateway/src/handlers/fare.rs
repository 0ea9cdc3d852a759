//! Billing fares, served by the company service.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde_json::Value;

use crate::context::RequestCtx;
use crate::response::{handle_response, ApiError, ApiResult, JsonBody};
use crate::services::company::{FarePrimaryKey, ListFaresReq};
use crate::state::AppState;
use crate::status::Status;
use crate::validation::{parse_pagination, require_uuid};

/// `POST /v1/fare`
pub async fn create_fare(
    State(state): State<AppState>,
    _ctx: RequestCtx,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Response> {
    if !body.is_object() {
        return Err(ApiError::bad_request("request body must be a JSON object"));
    }
    let fare = state.shared.company.create_fare(body).await?;
    Ok(handle_response(Status::Created, fare))
}

/// `GET /v1/fare`
pub async fn list_fares(
    State(state): State<AppState>,
    _ctx: RequestCtx,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let pagination = parse_pagination(&params, &state.config.http)?;
    let fares = state
        .shared
        .company
        .list_fares(ListFaresReq {
            limit: pagination.limit,
            offset: pagination.offset,
        })
        .await?;
    Ok(handle_response(Status::Ok, fares))
}

/// `GET /v1/fare/:fare_id`
pub async fn get_fare(
    State(state): State<AppState>,
    _ctx: RequestCtx,
    Path(fare_id): Path<String>,
) -> ApiResult<Response> {
    require_uuid("fare_id", &fare_id)?;
    let fare = state
        .shared
        .company
        .get_fare(FarePrimaryKey { id: fare_id })
        .await?;
    Ok(handle_response(Status::Ok, fare))
}

/// `PUT /v1/fare`
pub async fn update_fare(
    State(state): State<AppState>,
    _ctx: RequestCtx,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Response> {
    let id = body.get("id").and_then(Value::as_str).unwrap_or_default();
    require_uuid("id", id)?;
    let fare = state.shared.company.update_fare(body).await?;
    Ok(handle_response(Status::Ok, fare))
}

/// `DELETE /v1/fare/:fare_id`
pub async fn delete_fare(
    State(state): State<AppState>,
    _ctx: RequestCtx,
    Path(fare_id): Path<String>,
) -> ApiResult<Response> {
    require_uuid("fare_id", &fare_id)?;
    state
        .shared
        .company
        .delete_fare(FarePrimaryKey { id: fare_id })
        .await?;
    Ok(handle_response(Status::NoContent, Value::Null))
}
