//! HTTP handlers.
//!
//! Every handler has the same shape: validate, resolve the backing resource,
//! pick the bundle, dispatch, and exit through the response sink. Mutations
//! on routed resources also queue one history entry.

pub mod api_reference;
pub mod cache;
pub mod chat;
pub mod fare;
pub mod misc;
pub mod query;
pub mod scenario;
pub mod sms;
pub mod transcoder;
mod versioned;

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;

use axum::http::Uri;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{detached, RequestCtx, Scope};
use crate::history::{ActionType, HistoryRecorder, VersionHistoryEntry};
use crate::response::ApiResult;
use crate::services::{HistoryReq, NodeType, ServiceBundle, ServiceResource, ServiceType};
use crate::state::AppState;
use crate::validation::non_empty;

/// `POST .../revert` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevertBody {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub old_commit_id: String,
    #[serde(default)]
    pub project_id: String,
}

/// `POST .../select-versions` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectVersionsBody {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub project_id: String,
}

/// First non-empty query parameter among `names`.
pub(crate) fn param<'a>(params: &'a HashMap<String, String>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| params.get(*name).map(String::as_str).and_then(non_empty))
}

/// Change-history request with the ordering and date-window filters.
#[allow(clippy::too_many_arguments)]
pub(crate) fn history_request(
    guid: String,
    params: &HashMap<String, String>,
    project_id: String,
    environment_id: String,
    resource_id: String,
    version_id: String,
    limit: u32,
    offset: u32,
) -> HistoryReq {
    let text = |name: &str| param(params, &[name]).unwrap_or_default().to_string();
    HistoryReq {
        guid,
        project_id,
        environment_id,
        resource_id,
        version_id,
        from_date: text("from_date"),
        to_date: text("to_date"),
        order_by: text("order_by"),
        order: text("order"),
        limit,
        offset,
    }
}

/// A resolved resource and the bundle serving it.
pub(crate) struct Routed {
    pub resource: ServiceResource,
    pub bundle: Arc<ServiceBundle>,
}

impl Routed {
    /// Id injected as `resource_id` into downstream requests.
    pub fn resource_environment_id(&self) -> &str {
        &self.resource.resource_environment_id
    }
}

/// Resolve the resource behind `service_type` and select its bundle.
pub(crate) async fn route(
    state: &AppState,
    scope: &Scope,
    service_type: ServiceType,
) -> ApiResult<Routed> {
    let resource = state
        .resolver
        .resolve(&scope.project_id, &scope.environment_id, service_type)
        .await?;
    let bundle = state.nodes.select(&scope.project_id, resource.node_type)?;
    Ok(Routed { resource, bundle })
}

/// History entry prepared before dispatch and queued once the outcome is
/// known, success or failure.
pub(crate) struct HistoryTail {
    bundle: Arc<ServiceBundle>,
    entry: VersionHistoryEntry,
}

impl HistoryTail {
    pub fn new(
        bundle: Arc<ServiceBundle>,
        node_type: NodeType,
        project_id: &str,
        ctx: &RequestCtx,
        uri: &Uri,
        action_type: ActionType,
        request: &impl Serialize,
    ) -> Self {
        let used_environments = ctx.environment_id.iter().cloned().collect::<BTreeSet<_>>();
        Self {
            bundle,
            entry: VersionHistoryEntry {
                node_type,
                project_id: project_id.to_string(),
                action_source: uri.to_string(),
                action_type,
                used_environments,
                user_info: ctx.user_id().to_string(),
                table_slug: None,
                request: serde_json::to_value(request).unwrap_or(Value::Null),
                response: Value::Null,
            },
        }
    }

    /// Tail for a handler routed through [`route`].
    pub fn routed(
        routed: &Routed,
        ctx: &RequestCtx,
        uri: &Uri,
        action_type: ActionType,
        request: &impl Serialize,
    ) -> Self {
        Self::new(
            Arc::clone(&routed.bundle),
            routed.resource.node_type,
            routed.resource_environment_id(),
            ctx,
            uri,
            action_type,
            request,
        )
    }

    /// Queue the entry with the handler's outcome.
    pub fn finish<T: Serialize>(mut self, recorder: &HistoryRecorder, outcome: &ApiResult<T>) {
        self.entry.response = match outcome {
            Ok(reply) => serde_json::to_value(reply).unwrap_or(Value::Null),
            Err(err) => Value::String(err.to_string()),
        };
        recorder.record(self.bundle, self.entry);
    }

    /// Run `call` on a detached task and queue the entry with its outcome.
    ///
    /// The entry is queued even if the client disconnects mid-call.
    pub async fn dispatch<T, F>(self, recorder: &HistoryRecorder, call: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let recorder = recorder.clone();
        detached(async move {
            let outcome = call.await;
            self.finish(&recorder, &outcome);
            outcome
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, Principal};
    use crate::context::RequestSeed;
    use crate::response::ApiError;
    use crate::services::object_builder::MockObjectBuilderService;
    use crate::services::ObjectBuilderService;
    use crate::test_support::bundle_with_builder;
    use std::time::Duration;

    const ENV: &str = "9a1b2c3d-4e5f-4061-8293-a4b5c6d7e8f9";
    const USER: &str = "8d5f5a47-8f3c-4d0e-b2a2-0b2e7f6c9e11";

    fn ctx() -> RequestCtx {
        let principal = Principal::Bearer(Claims {
            user_id: USER.into(),
            ..Default::default()
        });
        let seed = RequestSeed {
            environment_id: Some(ENV.into()),
            ..Default::default()
        };
        RequestCtx::build(principal, seed, None, "u-code").unwrap()
    }

    fn tail(builder: MockObjectBuilderService, action_type: ActionType) -> HistoryTail {
        let builder: Arc<dyn ObjectBuilderService> = Arc::new(builder);
        HistoryTail::new(
            Arc::new(bundle_with_builder(builder)),
            NodeType::Default,
            "re-1",
            &ctx(),
            &"/v1/query".parse().unwrap(),
            action_type,
            &serde_json::json!({"guid": "g1"}),
        )
    }

    #[test]
    fn test_param_aliases() {
        let params = HashMap::from([
            ("folder-id".to_string(), "f1".to_string()),
            ("search".to_string(), " ".to_string()),
        ]);
        assert_eq!(param(&params, &["folder_id", "folder-id"]), Some("f1"));
        assert_eq!(param(&params, &["search"]), None);
        assert_eq!(param(&params, &["order"]), None);
    }

    #[tokio::test]
    async fn test_tail_records_error_text() {
        let mut builder = MockObjectBuilderService::new();
        builder
            .expect_create_version_history()
            .times(1)
            .withf(|entry| {
                entry.action_type == ActionType::Update
                    && entry.response == Value::String("query backend down".into())
                    && entry.user_info == USER
                    && entry.used_environments.contains(ENV)
                    && entry.action_source == "/v1/query"
                    && entry.project_id == "re-1"
            })
            .returning(|_| Ok(()));

        let recorder = HistoryRecorder::spawn(4);
        let outcome: ApiResult<Value> = Err(ApiError::grpc("query backend down"));
        tail(builder, ActionType::Update).finish(&recorder, &outcome);
        recorder.flush().await;
    }

    #[tokio::test]
    async fn test_dispatch_outlives_dropped_caller() {
        let mut builder = MockObjectBuilderService::new();
        builder
            .expect_create_version_history()
            .times(1)
            .withf(|entry| {
                entry.action_type == ActionType::Create
                    && entry.response == serde_json::json!({"guid": "g1"})
            })
            .returning(|_| Ok(()));

        let recorder = HistoryRecorder::spawn(4);
        let call = tail(builder, ActionType::Create).dispatch(&recorder, async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, ApiError>(serde_json::json!({"guid": "g1"}))
        });
        let cut_short = tokio::time::timeout(Duration::from_millis(10), call).await;
        assert!(cut_short.is_err());

        tokio::time::sleep(Duration::from_millis(250)).await;
        recorder.flush().await;
    }

    #[tokio::test]
    async fn test_dispatch_returns_call_outcome() {
        let mut builder = MockObjectBuilderService::new();
        builder
            .expect_create_version_history()
            .times(1)
            .returning(|_| Ok(()));

        let recorder = HistoryRecorder::spawn(4);
        let err = tail(builder, ActionType::Delete)
            .dispatch(&recorder, async { Err::<(), _>(ApiError::grpc("gone")) })
            .await
            .unwrap_err();
        assert_eq!(err.message(), "gone");
        recorder.flush().await;
    }

    #[test]
    fn test_history_request_filters() {
        let params = HashMap::from([
            ("order_by".to_string(), "created_at".to_string()),
            ("order".to_string(), "desc".to_string()),
            ("from_date".to_string(), "2024-01-01".to_string()),
        ]);
        let request = history_request(
            "g1".into(),
            &params,
            "p".into(),
            "e".into(),
            "re".into(),
            String::new(),
            10,
            20,
        );
        assert_eq!(request.order_by, "created_at");
        assert_eq!(request.order, "desc");
        assert_eq!(request.from_date, "2024-01-01");
        assert!(request.to_date.is_empty());
        assert_eq!(request.resource_id, "re");
        assert_eq!((request.limit, request.offset), (10, 20));
    }
}
