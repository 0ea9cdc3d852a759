//! Per-request context.
//!
//! Built once by the auth middleware and read by handlers through the
//! [`RequestCtx`] extractor. Every id in it has been shape-checked.

use std::collections::HashMap;
use std::future::Future;

use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, HeaderMap, Uri},
};
use serde_json::Value;

use crate::auth::{AuthAdmin, Principal};
use crate::response::{ApiError, ApiResult};
use crate::validation::{non_empty, optional_uuid, require_uuid};

pub const ENVIRONMENT_ID_HEADER: &str = "environment-id";
pub const RESOURCE_ID_HEADER: &str = "resource-id";
pub const PROJECT_ID_QUERY: &str = "project-id";
/// Underscored forms set by the upstream admin proxy.
const FORWARDED_HEADERS: [&str; 3] = ["project_id", "environment_id", "resource_id"];
const NAMESPACE_CLAIM: &str = "namespace";

/// Context values a request carries outside its credential.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSeed {
    pub project_id: Option<String>,
    pub environment_id: Option<String>,
    pub resource_id: Option<String>,
}

impl RequestSeed {
    pub fn from_parts(headers: &HeaderMap, uri: &Uri) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(non_empty)
                .map(str::to_string)
        };
        let [project_header, environment_header, resource_header] = FORWARDED_HEADERS;
        let project_id = Query::<HashMap<String, String>>::try_from_uri(uri)
            .ok()
            .and_then(|Query(params)| params.get(PROJECT_ID_QUERY).cloned())
            .filter(|v| !v.trim().is_empty())
            .or_else(|| header(project_header));

        Self {
            project_id,
            environment_id: header(ENVIRONMENT_ID_HEADER).or_else(|| header(environment_header)),
            resource_id: header(RESOURCE_ID_HEADER).or_else(|| header(resource_header)),
        }
    }
}

/// The project and environment a handler operates in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub project_id: String,
    pub environment_id: String,
}

#[derive(Debug, Clone)]
pub struct RequestCtx {
    pub principal: Principal,
    pub project_id: Option<String>,
    pub environment_id: Option<String>,
    pub resource_id: Option<String>,
    pub user_id: Option<String>,
    pub namespace: String,
    /// Access-check reply, present for bearer principals.
    pub auth_admin: Option<AuthAdmin>,
}

impl RequestCtx {
    /// Merge a principal with header and query values.
    ///
    /// Values carried by the principal win over headers and query.
    pub fn build(
        principal: Principal,
        seed: RequestSeed,
        auth_admin: Option<AuthAdmin>,
        default_namespace: &str,
    ) -> ApiResult<Self> {
        let claims = principal.claims();

        let project_id = optional_uuid(
            "project_id",
            claims.project_id.as_deref().or(seed.project_id.as_deref()),
        )?;
        let environment_id = optional_uuid(
            "environment_id",
            claims
                .environment_id
                .as_deref()
                .or(seed.environment_id.as_deref()),
        )?;
        let resource_id = optional_uuid("resource_id", seed.resource_id.as_deref())?;
        let user_id = optional_uuid("user_id", Some(claims.user_id.as_str()))?;
        let namespace = claims
            .raw
            .get(NAMESPACE_CLAIM)
            .and_then(Value::as_str)
            .and_then(non_empty)
            .unwrap_or(default_namespace)
            .to_string();

        Ok(Self {
            principal,
            project_id,
            environment_id,
            resource_id,
            user_id,
            namespace,
            auth_admin,
        })
    }

    /// Project id from the context, else from the request body.
    pub fn project_id_or(&self, fallback: Option<&str>) -> ApiResult<String> {
        match self
            .project_id
            .as_deref()
            .or_else(|| fallback.and_then(non_empty))
        {
            Some(id) => require_uuid("project_id", id).map(str::to_string),
            None => Err(ApiError::invalid_argument("project_id is required")),
        }
    }

    pub fn environment_id(&self) -> ApiResult<String> {
        self.environment_id
            .clone()
            .ok_or_else(|| ApiError::invalid_argument("environment_id is required"))
    }

    /// Project and environment, both required.
    pub fn scope(&self, body_project_id: Option<&str>) -> ApiResult<Scope> {
        Ok(Scope {
            project_id: self.project_id_or(body_project_id)?,
            environment_id: self.environment_id()?,
        })
    }

    /// Author id for commits and history; empty for key-based callers.
    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or_default()
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestCtx {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestCtx>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("request is not authenticated"))
    }
}

/// Run `future` on its own task so that a disconnecting client cannot
/// cancel it half way.
pub async fn detached<F>(future: F) -> ApiResult<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future)
        .await
        .map_err(|e| ApiError::internal(format!("background task failed: {e}")))
}
