//! `/v1/scenario` handlers.
//!
//! Scenarios are routed by the caller's namespace rather than through a
//! service-resource lookup.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::Response,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use super::{param, HistoryTail};
use crate::commit::{build_commit, CommitInfo, CommitOp, CommitType};
use crate::context::{RequestCtx, Scope};
use crate::history::ActionType;
use crate::response::{handle_response, ApiError, ApiResult, JsonBody};
use crate::services::scenario::{
    DeleteScenarioReq, GetScenarioReq, ListScenariosReq, RunScenarioReq, Scenario,
};
use crate::services::{NodeType, ServiceBundle};
use crate::state::AppState;
use crate::status::Status;
use crate::validation::{non_empty, optional_uuid, parse_pagination, require_uuid};

const ENTITY: &str = "scenario";

fn bundle(state: &AppState, ctx: &RequestCtx) -> ApiResult<Arc<ServiceBundle>> {
    state.nodes.by_namespace(&ctx.namespace)
}

fn history_tail(
    bundle: &Arc<ServiceBundle>,
    ctx: &RequestCtx,
    scope: &Scope,
    uri: &Uri,
    action_type: ActionType,
    request: &impl Serialize,
) -> HistoryTail {
    let project_id = ctx.resource_id.as_deref().unwrap_or(&scope.project_id);
    HistoryTail::new(
        Arc::clone(bundle),
        NodeType::Default,
        project_id,
        ctx,
        uri,
        action_type,
        request,
    )
}

fn commit(op: CommitOp, ctx: &RequestCtx, scope: &Scope) -> CommitInfo {
    build_commit(
        op,
        ENTITY,
        CommitType::Scenario,
        ctx.user_id(),
        &scope.project_id,
        Utc::now(),
    )
}

/// `POST /v1/scenario`
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    JsonBody(mut body): JsonBody<Scenario>,
) -> ApiResult<Response> {
    let scope = ctx.scope(non_empty(&body.project_id))?;
    let bundle = bundle(&state, &ctx)?;

    body.commit_info = commit(CommitOp::Create, &ctx, &scope);
    body.project_id = scope.project_id.clone();
    body.environment_id = scope.environment_id.clone();

    let tail = history_tail(&bundle, &ctx, &scope, &uri, ActionType::Create, &body);
    let created = tail
        .dispatch(&state.history, async move {
            bundle.scenario.create(body).await.map_err(ApiError::from)
        })
        .await?;

    Ok(handle_response(Status::Created, created))
}

/// `GET /v1/scenario/:scenario_id`
pub async fn get(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Path(scenario_id): Path<String>,
) -> ApiResult<Response> {
    require_uuid("scenario_id", &scenario_id)?;
    let scope = ctx.scope(None)?;
    let bundle = bundle(&state, &ctx)?;

    let scenario = bundle
        .scenario
        .get(GetScenarioReq {
            guid: scenario_id,
            project_id: scope.project_id,
            environment_id: scope.environment_id,
        })
        .await?;

    Ok(handle_response(Status::Ok, scenario))
}

/// `GET /v1/scenario`
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let pagination = parse_pagination(&params, &state.config.http)?;
    let category_id = optional_uuid("category_id", param(&params, &["category_id"]))?;
    let scope = ctx.scope(None)?;
    let bundle = bundle(&state, &ctx)?;

    let scenarios = bundle
        .scenario
        .get_list(ListScenariosReq {
            project_id: scope.project_id,
            environment_id: scope.environment_id,
            category_id: category_id.unwrap_or_default(),
            limit: pagination.limit,
            offset: pagination.offset,
        })
        .await?;

    Ok(handle_response(Status::Ok, scenarios))
}

/// `PUT /v1/scenario`
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    JsonBody(mut body): JsonBody<Scenario>,
) -> ApiResult<Response> {
    require_uuid("guid", &body.guid)?;
    let scope = ctx.scope(non_empty(&body.project_id))?;
    let bundle = bundle(&state, &ctx)?;

    body.commit_info = commit(CommitOp::Update, &ctx, &scope);
    body.project_id = scope.project_id.clone();
    body.environment_id = scope.environment_id.clone();

    let tail = history_tail(&bundle, &ctx, &scope, &uri, ActionType::Update, &body);
    let updated = tail
        .dispatch(&state.history, async move {
            bundle.scenario.update(body).await.map_err(ApiError::from)
        })
        .await?;

    Ok(handle_response(Status::Ok, updated))
}

/// `DELETE /v1/scenario/:scenario_id`
pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    Path(scenario_id): Path<String>,
) -> ApiResult<Response> {
    require_uuid("scenario_id", &scenario_id)?;
    let scope = ctx.scope(None)?;
    let bundle = bundle(&state, &ctx)?;

    let request = DeleteScenarioReq {
        guid: scenario_id,
        project_id: scope.project_id.clone(),
        environment_id: scope.environment_id.clone(),
        commit_info: commit(CommitOp::Delete, &ctx, &scope),
    };
    let tail = history_tail(&bundle, &ctx, &scope, &uri, ActionType::Delete, &request);
    tail.dispatch(&state.history, async move {
        bundle.scenario.delete(request).await.map_err(ApiError::from)
    })
    .await?;

    Ok(handle_response(Status::NoContent, Value::Null))
}

/// `POST /v1/scenario/:scenario_id/run`
///
/// The body is handed to the scenario as its input payload.
pub async fn run(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Path(scenario_id): Path<String>,
    JsonBody(payload): JsonBody<Value>,
) -> ApiResult<Response> {
    require_uuid("scenario_id", &scenario_id)?;
    let scope = ctx.scope(None)?;
    let bundle = bundle(&state, &ctx)?;

    let result = bundle
        .scenario
        .run(RunScenarioReq {
            guid: scenario_id,
            project_id: scope.project_id,
            environment_id: scope.environment_id,
            payload,
        })
        .await?;

    Ok(handle_response(Status::Ok, result))
}
