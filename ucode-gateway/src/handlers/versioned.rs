//! Handler flow shared by the versioned entities.
//!
//! API references and queries differ only in their backend calls and a few
//! routing fields; [`VersionedKind`] captures those, and the functions here
//! run create, update, delete, history, revert and select-versions for any
//! kind. Mutations dispatch on a detached task through [`HistoryTail`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{http::Uri, response::Response};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use super::{history_request, param, route, HistoryTail, RevertBody, SelectVersionsBody};
use crate::commit::{
    active_version_id, build_commit, fresh_version_id, CommitInfo, CommitOp, CommitType,
};
use crate::context::{detached, RequestCtx, Scope};
use crate::enrich::{enrich_detached, Versioned};
use crate::history::ActionType;
use crate::response::{handle_response, ApiError, ApiResult};
use crate::services::{HistoryReq, RevertReq, SelectVersionsReq, ServiceBundle, ServiceType};
use crate::state::AppState;
use crate::status::Status;
use crate::validation::{non_empty, optional_uuid, parse_pagination, require_uuid};

/// Delete of one entity at the active version.
pub(crate) struct DeleteTarget {
    pub guid: String,
    pub project_id: String,
    pub environment_id: String,
    pub resource_id: String,
    pub version_id: String,
    pub commit_info: CommitInfo,
}

/// A versioned entity kind and the backend calls behind it.
#[async_trait]
pub(crate) trait VersionedKind: Send + Sync + 'static {
    type Entity: Versioned + Serialize + Send + Sync + 'static;
    type List: Serialize + Send + 'static;

    /// Name used in commit names.
    const NAME: &'static str;
    const SERVICE: ServiceType;

    fn guid(entity: &Self::Entity) -> &str;

    fn project_id(entity: &Self::Entity) -> &str;

    /// Overwrite the routing fields the gateway owns.
    fn place(
        entity: &mut Self::Entity,
        scope: &Scope,
        resource_id: &str,
        version_id: Option<String>,
    );

    fn entries(list: &mut Self::List) -> &mut Vec<Self::Entity>;

    async fn create(
        bundle: &ServiceBundle,
        entity: Self::Entity,
    ) -> Result<Self::Entity, tonic::Status>;

    async fn update(
        bundle: &ServiceBundle,
        entity: Self::Entity,
    ) -> Result<Self::Entity, tonic::Status>;

    async fn delete(bundle: &ServiceBundle, target: DeleteTarget) -> Result<(), tonic::Status>;

    async fn history(bundle: &ServiceBundle, request: HistoryReq)
        -> Result<Self::List, tonic::Status>;

    async fn revert(
        bundle: &ServiceBundle,
        request: RevertReq,
    ) -> Result<Self::Entity, tonic::Status>;

    async fn select_versions(
        bundle: &ServiceBundle,
        request: SelectVersionsReq,
    ) -> Result<(), tonic::Status>;
}

fn commit<K: VersionedKind>(op: CommitOp, user_id: &str, project_id: &str) -> CommitInfo {
    build_commit(op, K::NAME, CommitType::Field, user_id, project_id, Utc::now())
}

pub(crate) async fn create<K: VersionedKind>(
    state: &AppState,
    ctx: &RequestCtx,
    uri: &Uri,
    mut body: K::Entity,
) -> ApiResult<Response> {
    let scope = ctx.scope(non_empty(K::project_id(&body)))?;
    let routed = route(state, &scope, K::SERVICE).await?;

    *body.commit_info_mut() = commit::<K>(CommitOp::Create, ctx.user_id(), &scope.project_id);
    K::place(&mut body, &scope, routed.resource_environment_id(), None);

    let tail = HistoryTail::routed(&routed, ctx, uri, ActionType::Create, &body);
    let bundle = Arc::clone(&routed.bundle);
    let created = tail
        .dispatch(&state.history, async move {
            K::create(&bundle, body).await.map_err(ApiError::from)
        })
        .await?;

    Ok(handle_response(Status::Created, created))
}

/// Update at the environment's active version.
pub(crate) async fn update<K: VersionedKind>(
    state: &AppState,
    ctx: &RequestCtx,
    uri: &Uri,
    mut body: K::Entity,
) -> ApiResult<Response> {
    require_uuid("guid", K::guid(&body))?;
    let scope = ctx.scope(non_empty(K::project_id(&body)))?;
    let routed = route(state, &scope, K::SERVICE).await?;
    let tail = HistoryTail::routed(&routed, ctx, uri, ActionType::Update, &body);

    let bundle = Arc::clone(&routed.bundle);
    let resource_id = routed.resource_environment_id().to_string();
    let user_id = ctx.user_id().to_string();
    let updated = tail
        .dispatch(&state.history, async move {
            let version_id = active_version_id(
                bundle.versioning.as_ref(),
                &scope.project_id,
                &scope.environment_id,
            )
            .await?;

            *body.commit_info_mut() = commit::<K>(CommitOp::Update, &user_id, &scope.project_id)
                .with_version_id(version_id.clone());
            K::place(&mut body, &scope, &resource_id, Some(version_id));

            K::update(&bundle, body).await.map_err(ApiError::from)
        })
        .await?;

    Ok(handle_response(Status::Ok, updated))
}

/// Delete at the environment's active version. `label` names the path
/// parameter in validation errors.
pub(crate) async fn delete<K: VersionedKind>(
    state: &AppState,
    ctx: &RequestCtx,
    uri: &Uri,
    label: &str,
    guid: String,
) -> ApiResult<Response> {
    require_uuid(label, &guid)?;
    let scope = ctx.scope(None)?;
    let routed = route(state, &scope, K::SERVICE).await?;
    let tail = HistoryTail::routed(
        &routed,
        ctx,
        uri,
        ActionType::Delete,
        &serde_json::json!({ "guid": guid }),
    );

    let bundle = Arc::clone(&routed.bundle);
    let resource_id = routed.resource_environment_id().to_string();
    let user_id = ctx.user_id().to_string();
    tail.dispatch(&state.history, async move {
        let version_id = active_version_id(
            bundle.versioning.as_ref(),
            &scope.project_id,
            &scope.environment_id,
        )
        .await?;
        let commit_info = commit::<K>(CommitOp::Delete, &user_id, &scope.project_id)
            .with_version_id(version_id.clone());

        let target = DeleteTarget {
            guid,
            project_id: scope.project_id,
            environment_id: scope.environment_id,
            resource_id,
            version_id,
            commit_info,
        };
        K::delete(&bundle, target).await.map_err(ApiError::from)
    })
    .await?;

    Ok(handle_response(Status::NoContent, Value::Null))
}

/// Commits of one entity, newest first, with version infos filled in.
pub(crate) async fn history<K: VersionedKind>(
    state: &AppState,
    ctx: &RequestCtx,
    label: &str,
    guid: String,
    params: &HashMap<String, String>,
) -> ApiResult<Response> {
    require_uuid(label, &guid)?;
    let pagination = parse_pagination(params, &state.config.http)?;
    let version_id = optional_uuid("version_id", param(params, &["version_id"]))?;
    let scope = ctx.scope(None)?;
    let routed = route(state, &scope, K::SERVICE).await?;

    let request = history_request(
        guid,
        params,
        scope.project_id,
        scope.environment_id,
        routed.resource_environment_id().to_string(),
        version_id.unwrap_or_default(),
        pagination.limit,
        pagination.offset,
    );
    let bundle = Arc::clone(&routed.bundle);
    let mut changes = detached(async move { K::history(&bundle, request).await }).await??;

    let entries = std::mem::take(K::entries(&mut changes));
    *K::entries(&mut changes) = enrich_detached(
        Arc::clone(&routed.bundle.versioning),
        routed.resource_environment_id().to_string(),
        entries,
    )
    .await?;

    Ok(handle_response(Status::Ok, changes))
}

/// Restore an earlier commit under a fresh version id.
pub(crate) async fn revert<K: VersionedKind>(
    state: &AppState,
    ctx: &RequestCtx,
    uri: &Uri,
    body: RevertBody,
) -> ApiResult<Response> {
    require_uuid("guid", &body.guid)?;
    require_uuid("old_commit_id", &body.old_commit_id)?;
    let scope = ctx.scope(non_empty(&body.project_id))?;
    let routed = route(state, &scope, K::SERVICE).await?;

    let version_id = fresh_version_id();
    let new_commit_info = commit::<K>(CommitOp::Revert, ctx.user_id(), &scope.project_id)
        .with_version_id(version_id.clone());
    let request = RevertReq {
        guid: body.guid,
        old_commit_id: body.old_commit_id,
        version_id,
        project_id: scope.project_id,
        environment_id: scope.environment_id,
        resource_id: routed.resource_environment_id().to_string(),
        new_commit_info,
    };

    let tail = HistoryTail::routed(&routed, ctx, uri, ActionType::Update, &request);
    let bundle = Arc::clone(&routed.bundle);
    let reverted = tail
        .dispatch(&state.history, async move {
            K::revert(&bundle, request).await.map_err(ApiError::from)
        })
        .await?;

    Ok(handle_response(Status::Ok, reverted))
}

/// Pin several entities to one version.
pub(crate) async fn select_versions<K: VersionedKind>(
    state: &AppState,
    ctx: &RequestCtx,
    uri: &Uri,
    body: SelectVersionsBody,
) -> ApiResult<Response> {
    require_uuid("version_id", &body.version_id)?;
    for id in &body.ids {
        require_uuid("ids", id)?;
    }
    let scope = ctx.scope(non_empty(&body.project_id))?;
    let routed = route(state, &scope, K::SERVICE).await?;

    let commit_info = commit::<K>(CommitOp::SelectVersions, ctx.user_id(), &scope.project_id)
        .with_version_id(body.version_id.clone());
    let request = SelectVersionsReq {
        ids: body.ids,
        version_id: body.version_id,
        project_id: scope.project_id,
        environment_id: scope.environment_id,
        resource_id: routed.resource_environment_id().to_string(),
        commit_info,
    };

    let tail = HistoryTail::routed(&routed, ctx, uri, ActionType::Create, &request);
    let bundle = Arc::clone(&routed.bundle);
    tail.dispatch(&state.history, async move {
        K::select_versions(&bundle, request)
            .await
            .map_err(ApiError::from)
    })
    .await?;

    Ok(handle_response(Status::Ok, Value::Null))
}
