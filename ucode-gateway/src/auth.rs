//! Request authentication.
//!
//! Runs once per protected request and yields exactly one [`Principal`].
//! Three credentials are accepted, checked in order:
//!
//! 1. Delegated: a truthy `redirect` header plus a JSON `auth` header, from a
//!    peer the delegation policy trusts.
//! 2. `Authorization: Bearer <token>`, checked with `HasAccessSuperAdmin`.
//! 3. `Authorization: API-KEY` with the key in `X-API-KEY`, checked with
//!    `GetEnvID`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use tonic::Code;
use ucode_common::DelegationConfig;

use crate::context::{RequestCtx, RequestSeed};
use crate::response::{ApiError, ApiResult};
use crate::services::auth::{GetEnvIdReq, HasAccessSuperAdminReq, HasAccessSuperAdminRes};
use crate::state::AppState;

pub const REDIRECT_HEADER: &str = "redirect";
pub const DELEGATED_AUTH_HEADER: &str = "auth";
pub const API_KEY_HEADER: &str = "x-api-key";

const TABLE_SLUG_SEGMENT: &str = ":table_slug";

// ============================================================================
// Principal
// ============================================================================

/// Identity attributes carried by every principal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    pub user_id: String,
    pub client_type_id: String,
    pub role_id: String,
    pub project_id: Option<String>,
    pub environment_id: Option<String>,
    /// Everything the credential carried, as received.
    pub raw: Map<String, Value>,
}

impl Claims {
    pub fn from_raw(raw: Map<String, Value>) -> Self {
        let text = |keys: &[&str]| {
            keys.iter().find_map(|k| {
                raw.get(*k)
                    .and_then(Value::as_str)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
        };

        let user_id = text(&["user_id"]).unwrap_or_default();
        let client_type_id = text(&["client_type_id"]).unwrap_or_default();
        let role_id = text(&["role_id"]).unwrap_or_default();
        let project_id = text(&["project_id"]);
        let environment_id = text(&["environment_id", "env_id"]);

        Self {
            user_id,
            client_type_id,
            role_id,
            project_id,
            environment_id,
            raw,
        }
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Bearer(Claims),
    ApiKey(Claims),
    Delegated(Claims),
}

impl Principal {
    pub fn claims(&self) -> &Claims {
        match self {
            Self::Bearer(c) | Self::ApiKey(c) | Self::Delegated(c) => c,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bearer(_) => "bearer",
            Self::ApiKey(_) => "api_key",
            Self::Delegated(_) => "delegated",
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Authenticate a protected request and attach its [`RequestCtx`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    match authenticate(&state, &parts).await {
        Ok(ctx) => {
            tracing::debug!(principal = ctx.principal.kind(), "Request authenticated");
            parts.extensions.insert(ctx);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(err) => err.into_response(),
    }
}

async fn authenticate(state: &AppState, request: &Parts) -> ApiResult<RequestCtx> {
    let headers = &request.headers;
    let seed = RequestSeed::from_parts(headers, &request.uri);
    let default_namespace = state.config.default_namespace.as_str();

    if delegation_requested(headers) {
        let peer = request
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        if !may_delegate(peer, &state.config.auth) {
            return Err(ApiError::forbidden(
                "delegated authentication is not accepted from this peer",
            ));
        }
        let principal = Principal::Delegated(delegated_claims(headers)?);
        return RequestCtx::build(principal, seed, None, default_namespace);
    }

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .ok_or_else(|| ApiError::forbidden("authorization header is required"))?;
    let (scheme, credential) = authorization
        .split_once(' ')
        .map(|(s, c)| (s, c.trim()))
        .unwrap_or((authorization, ""));

    if scheme.eq_ignore_ascii_case("Bearer") {
        if credential.is_empty() {
            return Err(ApiError::unauthorized("bearer token is empty"));
        }
        let template = request
            .extensions
            .get::<MatchedPath>()
            .map(MatchedPath::as_str);
        let path = normalize_access_path(template, request.uri.path());

        let session = state
            .shared
            .auth
            .has_access_super_admin(HasAccessSuperAdminReq {
                access_token: credential.to_string(),
                path,
                method: request.method.to_string(),
            })
            .await
            .map_err(map_bearer_error)?;

        let claims = Claims::from_raw(to_object(&session)?);
        return RequestCtx::build(
            Principal::Bearer(claims),
            seed,
            Some(Arc::new(session)),
            default_namespace,
        );
    }

    if scheme.eq_ignore_ascii_case("API-KEY") {
        let api_key = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request("X-API-KEY header is required"))?;

        let record = state
            .shared
            .auth
            .get_env_id(GetEnvIdReq {
                id: api_key.to_string(),
            })
            .await
            .map_err(|status| ApiError::bad_request(status.message()))?;

        let claims = Claims::from_raw(to_object(&record)?);
        return RequestCtx::build(Principal::ApiKey(claims), seed, None, default_namespace);
    }

    Err(ApiError::forbidden(format!(
        "unsupported authorization scheme '{scheme}'"
    )))
}

fn delegation_requested(headers: &HeaderMap) -> bool {
    headers
        .get(REDIRECT_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
}

/// Whether a peer may present delegated credentials.
///
/// An empty trusted list accepts any peer; otherwise the peer address must
/// be listed.
pub fn may_delegate(peer: Option<IpAddr>, policy: &DelegationConfig) -> bool {
    if !policy.enabled {
        return false;
    }
    if policy.trusted_peers.is_empty() {
        return true;
    }
    peer.is_some_and(|ip| {
        policy
            .trusted_peers
            .iter()
            .filter_map(|p| p.parse::<IpAddr>().ok())
            .any(|trusted| trusted == ip)
    })
}

fn delegated_claims(headers: &HeaderMap) -> ApiResult<Claims> {
    let raw = headers
        .get(DELEGATED_AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("auth header is required when redirect is set"))?;

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(Claims::from_raw(map)),
        Ok(_) => Err(ApiError::bad_request("auth header must be a JSON object")),
        Err(e) => Err(ApiError::bad_request(format!("auth header is not valid JSON: {e}"))),
    }
}

fn to_object<T: serde::Serialize>(value: &T) -> ApiResult<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(e) => Err(ApiError::internal(format!("failed to read credentials: {e}"))),
    }
}

/// Route template sent to the access check, with the `:table_slug`
/// segment replaced by the concrete table.
pub fn normalize_access_path(template: Option<&str>, path: &str) -> String {
    let Some(template) = template else {
        return path.to_string();
    };
    if !template.contains(TABLE_SLUG_SEGMENT) {
        return template.to_string();
    }

    let actual: Vec<&str> = path.split('/').collect();
    template
        .split('/')
        .enumerate()
        .map(|(i, segment)| {
            if segment == TABLE_SLUG_SEGMENT {
                actual.get(i).copied().unwrap_or(segment)
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Map an access-check failure to the client-facing status.
fn map_bearer_error(status: tonic::Status) -> ApiError {
    match status.code() {
        Code::PermissionDenied => ApiError::bad_request(status.message()),
        Code::InvalidArgument if is_user_expired(status.message()) => {
            ApiError::forbidden(status.message())
        }
        _ => ApiError::unauthorized(status.message()),
    }
}

fn is_user_expired(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("user") && message.contains("expired")
}

/// Cached access-check reply of a bearer principal.
pub type AuthAdmin = Arc<HasAccessSuperAdminRes>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use axum::http::HeaderValue;

    #[test]
    fn test_normalize_access_path() {
        assert_eq!(
            normalize_access_path(Some("/v1/object/:table_slug/:object_id"), "/v1/object/orders/42"),
            "/v1/object/orders/:object_id"
        );
        assert_eq!(
            normalize_access_path(Some("/v1/api-reference/:api_reference_id"), "/v1/api-reference/x"),
            "/v1/api-reference/:api_reference_id"
        );
        assert_eq!(normalize_access_path(None, "/v1/fare"), "/v1/fare");
    }

    #[test]
    fn test_bearer_error_mapping() {
        let err = map_bearer_error(tonic::Status::permission_denied("no access"));
        assert_eq!(err.status(), Status::BadRequest);

        let err = map_bearer_error(tonic::Status::invalid_argument("User has been expired"));
        assert_eq!(err.status(), Status::Forbidden);

        let err = map_bearer_error(tonic::Status::invalid_argument("token malformed"));
        assert_eq!(err.status(), Status::Unauthorized);

        let err = map_bearer_error(tonic::Status::unavailable("auth down"));
        assert_eq!(err.status(), Status::Unauthorized);
        assert_eq!(err.message(), "auth down");
    }

    #[test]
    fn test_may_delegate() {
        let open = DelegationConfig::default();
        assert!(may_delegate(None, &open));

        let closed = DelegationConfig {
            enabled: false,
            trusted_peers: Vec::new(),
        };
        assert!(!may_delegate(None, &closed));

        let listed = DelegationConfig {
            enabled: true,
            trusted_peers: vec!["10.0.0.7".into()],
        };
        assert!(may_delegate(Some("10.0.0.7".parse().unwrap()), &listed));
        assert!(!may_delegate(Some("10.0.0.8".parse().unwrap()), &listed));
        assert!(!may_delegate(None, &listed));
    }

    #[test]
    fn test_delegation_requested() {
        let mut headers = HeaderMap::new();
        assert!(!delegation_requested(&headers));
        headers.insert(REDIRECT_HEADER, HeaderValue::from_static("true"));
        assert!(delegation_requested(&headers));
        headers.insert(REDIRECT_HEADER, HeaderValue::from_static("no"));
        assert!(!delegation_requested(&headers));
    }

    #[test]
    fn test_delegated_claims() {
        let mut headers = HeaderMap::new();
        headers.insert(
            DELEGATED_AUTH_HEADER,
            HeaderValue::from_static(r#"{"user_id":"u1","role_id":"r1","project_id":"","tenant":"t"}"#),
        );
        let claims = delegated_claims(&headers).unwrap();
        assert_eq!(claims.user_id, "u1");
        assert_eq!(claims.role_id, "r1");
        assert_eq!(claims.project_id, None);
        assert_eq!(claims.raw["tenant"], "t");

        headers.insert(DELEGATED_AUTH_HEADER, HeaderValue::from_static("[1,2]"));
        assert_eq!(
            delegated_claims(&headers).unwrap_err().status(),
            Status::BadRequest
        );
    }

    #[test]
    fn test_claims_from_session() {
        let session = HasAccessSuperAdminRes {
            user_id: "u1".into(),
            env_id: "e1".into(),
            project_id: "p1".into(),
            ..Default::default()
        };
        let claims = Claims::from_raw(to_object(&session).unwrap());
        assert_eq!(claims.user_id, "u1");
        assert_eq!(claims.environment_id.as_deref(), Some("e1"));
        assert_eq!(claims.project_id.as_deref(), Some("p1"));
        assert_eq!(Principal::Bearer(claims).kind(), "bearer");
    }
}
