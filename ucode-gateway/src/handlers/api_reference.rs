//! `/v1/api-reference` handlers.

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
use crate::services::api_reference::{
    ApiReference, ApiReferenceList, DeleteApiReferenceReq, GetApiReferenceReq,
    ListApiReferencesReq,
};
use crate::services::{HistoryReq, RevertReq, SelectVersionsReq, ServiceBundle, ServiceType};
use crate::state::AppState;
use crate::status::Status;
use crate::validation::{optional_uuid, parse_pagination, require_uuid};

pub(crate) struct ApiReferences;

#[async_trait]
impl VersionedKind for ApiReferences {
    type Entity = ApiReference;
    type List = ApiReferenceList;

    const NAME: &'static str = "api reference";
    const SERVICE: ServiceType = ServiceType::ApiRefService;

    fn guid(entity: &ApiReference) -> &str {
        &entity.guid
    }

    fn project_id(entity: &ApiReference) -> &str {
        &entity.project_id
    }

    fn place(
        entity: &mut ApiReference,
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

    fn entries(list: &mut ApiReferenceList) -> &mut Vec<ApiReference> {
        &mut list.api_references
    }

    async fn create(
        bundle: &ServiceBundle,
        entity: ApiReference,
    ) -> Result<ApiReference, tonic::Status> {
        bundle.api_reference.create(entity).await
    }

    async fn update(
        bundle: &ServiceBundle,
        entity: ApiReference,
    ) -> Result<ApiReference, tonic::Status> {
        bundle.api_reference.update(entity).await
    }

    async fn delete(bundle: &ServiceBundle, target: DeleteTarget) -> Result<(), tonic::Status> {
        bundle
            .api_reference
            .delete(DeleteApiReferenceReq {
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
    ) -> Result<ApiReferenceList, tonic::Status> {
        bundle.api_reference.history(request).await
    }

    async fn revert(
        bundle: &ServiceBundle,
        request: RevertReq,
    ) -> Result<ApiReference, tonic::Status> {
        bundle.api_reference.revert(request).await
    }

    async fn select_versions(
        bundle: &ServiceBundle,
        request: SelectVersionsReq,
    ) -> Result<(), tonic::Status> {
        bundle.api_reference.select_versions(request).await
    }
}

/// `POST /v1/api-reference`
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    JsonBody(body): JsonBody<ApiReference>,
) -> ApiResult<Response> {
    versioned::create::<ApiReferences>(&state, &ctx, &uri, body).await
}

/// `GET /v1/api-reference/:api_reference_id`
pub async fn get(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Path(api_reference_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    require_uuid("api_reference_id", &api_reference_id)?;
    let version_id = optional_uuid("version_id", param(&params, &["version_id"]))?;
    let scope = ctx.scope(None)?;
    let routed = route(&state, &scope, ApiReferences::SERVICE).await?;

    let api_reference = routed
        .bundle
        .api_reference
        .get(GetApiReferenceReq {
            guid: api_reference_id,
            project_id: scope.project_id,
            resource_id: routed.resource_environment_id().to_string(),
            version_id: version_id.unwrap_or_default(),
            commit_id: param(&params, &["commit_id"]).unwrap_or_default().to_string(),
        })
        .await?;

    let mut enriched = enrich_detached(
        Arc::clone(&routed.bundle.versioning),
        routed.resource_environment_id().to_string(),
        vec![api_reference],
    )
    .await?;
    let api_reference = enriched
        .pop()
        .ok_or_else(|| ApiError::internal("enrichment dropped the api reference"))?;

    Ok(handle_response(Status::Ok, api_reference))
}

/// `GET /v1/api-reference`
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let pagination = parse_pagination(&params, &state.config.http)?;
    let category_id = optional_uuid("category_id", param(&params, &["category_id"]))?;
    let version_id = optional_uuid("version_id", param(&params, &["version_id"]))?;
    let scope = ctx.scope(None)?;
    let routed = route(&state, &scope, ApiReferences::SERVICE).await?;

    let request = ListApiReferencesReq {
        project_id: scope.project_id,
        environment_id: scope.environment_id,
        resource_id: routed.resource_environment_id().to_string(),
        category_id: category_id.unwrap_or_default(),
        search: param(&params, &["search"]).unwrap_or_default().to_string(),
        version_id: version_id.unwrap_or_default(),
        limit: pagination.limit,
        offset: pagination.offset,
    };
    let service = Arc::clone(&routed.bundle.api_reference);
    let mut page = detached(async move { service.get_list(request).await }).await??;

    page.api_references = enrich_detached(
        Arc::clone(&routed.bundle.versioning),
        routed.resource_environment_id().to_string(),
        page.api_references,
    )
    .await?;

    Ok(handle_response(Status::Ok, page))
}

/// `PUT /v1/api-reference`
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    JsonBody(body): JsonBody<ApiReference>,
) -> ApiResult<Response> {
    versioned::update::<ApiReferences>(&state, &ctx, &uri, body).await
}

/// `DELETE /v1/api-reference/:api_reference_id`
pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    Path(api_reference_id): Path<String>,
) -> ApiResult<Response> {
    versioned::delete::<ApiReferences>(&state, &ctx, &uri, "api_reference_id", api_reference_id)
        .await
}

/// `GET|POST /v1/api-reference/history/:api_reference_id`
pub async fn history(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Path(api_reference_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    versioned::history::<ApiReferences>(
        &state,
        &ctx,
        "api_reference_id",
        api_reference_id,
        &params,
    )
    .await
}

/// `POST /v1/api-reference/revert`
pub async fn revert(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    JsonBody(body): JsonBody<RevertBody>,
) -> ApiResult<Response> {
    versioned::revert::<ApiReferences>(&state, &ctx, &uri, body).await
}

/// `POST /v1/api-reference/select-versions`
pub async fn select_versions(
    State(state): State<AppState>,
    ctx: RequestCtx,
    uri: Uri,
    JsonBody(body): JsonBody<SelectVersionsBody>,
) -> ApiResult<Response> {
    versioned::select_versions::<ApiReferences>(&state, &ctx, &uri, body).await
}
