//! `/v1/query` handlers. Queries are versioned like API references and
//! additionally filed into folders.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::Response,
};

use super::versioned::{self, DeleteTarget, VersionedKind};
use super::{param, route, RevertBody, SelectVersionsBody};
use crate::context::{detached, RequestCtx, Scope};
use crate::enrich::enrich_detached;
use crate::response::{handle_response, ApiError, ApiResult, JsonBody};
use crate::services::query::{
    DeleteQueryReq, GetQueryReq, ListQueriesReq, Query as QueryEntity, QueryList,
};
use crate::services::{HistoryReq, RevertReq, SelectVersionsReq, ServiceBundle, ServiceType};
use crate::state::AppState;
use crate::status::Status;
use crate::validation::{non_empty, optional_uuid, parse_pagination, require_uuid};

pub(crate) struct Queries;

#[async_trait]
impl VersionedKind for Queries {
    type Entity = QueryEntity;
    type List = QueryList;

    const NAME: &'static str = "query";
    const SERVICE: ServiceType = ServiceType::QueryService;

    fn guid(entity: &QueryEntity) -> &str {
        &entity.guid
    }

    fn project_id(entity: &QueryEntity) -> &str {
        &entity.project_id
    }

    fn place(
        entity: &mut QueryEntity,
        scope: &Scope,
        resource_id: &str,
        version_id: Option<String>,
    ) {
        entity.project_id = scope.project_id.clone();
        entity.environment_id = scope.environment_id.clone();
        entity.resource_id = resource_id.to_string();
        if let Some(version_id) = version_id {
            entity.version_id = version_id;
        }
    }

    fn entries(list: &mut QueryList) -> &mut Vec<QueryEntity> {
        &mut list.queries
    }

    async fn create(
        bundle: &ServiceBundle,
        entity: QueryEntity,
    ) -> Result<QueryEntity, tonic::Status> {
        bundle.query.create(entity).await
    }

    async fn update(
        bundle: &ServiceBundle,
        entity: QueryEntity,
    ) -> Result<QueryEntity, tonic::Status> {
        bundle.query.update(entity).await
    }

    async fn delete(bundle: &ServiceBundle, target: DeleteTarget) -> Result<(), tonic::Status> {
        bundle
            .query
            .delete(DeleteQueryReq {
                guid: target.guid,
                project_id: target.project_id,
                environment_id: target.environment_id,
                resource_id: target.resource_id,
                version_id: target.version_id,
                commit_info: target.commit_info,
            })
            .await
    }

    async fn history(
        bundle: &ServiceBundle,
        request: HistoryReq,
    ) -> Result<QueryList, tonic::Status> {
        bundle.query.history(request).await
    }

    async fn revert(
        bundle: &ServiceBundle,
        request: RevertReq,
    ) -> Result<QueryEntity, tonic::Status> {
        bundle.query.revert(request).await
    }

    async fn select_versions(
        bundle: &ServiceBundle,
        request: SelectVersionsReq,
    ) -> Result<(), tonic::Status> {
        bundle.query.select_versions(request).await
    }
}

/// `POST /v1/query`
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    JsonBody(body): JsonBody<QueryEntity>,
) -> ApiResult<Response> {
    optional_uuid("folder_id", non_empty(&body.folder_id))?;
    versioned::create::<Queries>(&state, &ctx, &uri, body).await
}

/// `GET /v1/query/:query_id`
pub async fn get(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Path(query_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    require_uuid("query_id", &query_id)?;
    let version_id = optional_uuid("version_id", param(&params, &["version_id"]))?;
    let scope = ctx.scope(None)?;
    let routed = route(&state, &scope, Queries::SERVICE).await?;

    let query = routed
        .bundle
        .query
        .get(GetQueryReq {
            guid: query_id,
            project_id: scope.project_id,
            resource_id: routed.resource_environment_id().to_string(),
            version_id: version_id.unwrap_or_default(),
            commit_id: param(&params, &["commit_id"]).unwrap_or_default().to_string(),
        })
        .await?;

    let mut enriched = enrich_detached(
        Arc::clone(&routed.bundle.versioning),
        routed.resource_environment_id().to_string(),
        vec![query],
    )
    .await?;
    let query = enriched
        .pop()
        .ok_or_else(|| ApiError::internal("enrichment dropped the query"))?;

    Ok(handle_response(Status::Ok, query))
}

/// `GET /v1/query`
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let pagination = parse_pagination(&params, &state.config.http)?;
    let folder_id = optional_uuid("folder_id", param(&params, &["folder-id", "folder_id"]))?;
    let version_id = optional_uuid("version_id", param(&params, &["version_id"]))?;
    let scope = ctx.scope(None)?;
    let routed = route(&state, &scope, Queries::SERVICE).await?;

    let request = ListQueriesReq {
        project_id: scope.project_id,
        environment_id: scope.environment_id,
        resource_id: routed.resource_environment_id().to_string(),
        folder_id: folder_id.unwrap_or_default(),
        search: param(&params, &["search"]).unwrap_or_default().to_string(),
        version_id: version_id.unwrap_or_default(),
        limit: pagination.limit,
        offset: pagination.offset,
    };
    let service = Arc::clone(&routed.bundle.query);
    let mut page = detached(async move { service.get_list(request).await }).await??;

    page.queries = enrich_detached(
        Arc::clone(&routed.bundle.versioning),
        routed.resource_environment_id().to_string(),
        page.queries,
    )
    .await?;

    Ok(handle_response(Status::Ok, page))
}

/// `PUT /v1/query`
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    JsonBody(body): JsonBody<QueryEntity>,
) -> ApiResult<Response> {
    versioned::update::<Queries>(&state, &ctx, &uri, body).await
}

/// `DELETE /v1/query/:query_id`
pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    Path(query_id): Path<String>,
) -> ApiResult<Response> {
    versioned::delete::<Queries>(&state, &ctx, &uri, "query_id", query_id).await
}

/// `GET|POST /v1/query/history/:query_id`
pub async fn history(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Path(query_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    versioned::history::<Queries>(&state, &ctx, "query_id", query_id, &params).await
}

/// `POST /v1/query/revert`
pub async fn revert(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    JsonBody(body): JsonBody<RevertBody>,
) -> ApiResult<Response> {
    versioned::revert::<Queries>(&state, &ctx, &uri, body).await
}

/// `POST /v1/query/select-versions`
pub async fn select_versions(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    JsonBody(body): JsonBody<SelectVersionsBody>,
) -> ApiResult<Response> {
    versioned::select_versions::<Queries>(&state, &ctx, &uri, body).await
}
