//! Integration tests for the uCode Gateway.
//!
//! Drives the full router against in-process fakes of every backend and
//! checks which downstream calls each request makes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tonic::{Code, Status};
use tower::ServiceExt;
use ucode_common::Config;
use ucode_gateway::cache::InMemoryCacheStore;
use ucode_gateway::history::{ActionType, VersionHistoryEntry};
use ucode_gateway::services::api_reference::{
    ApiReference, ApiReferenceList, DeleteApiReferenceReq, GetApiReferenceReq,
    ListApiReferencesReq,
};
use ucode_gateway::services::auth::{
    ApiKeyRecord, GetEnvIdReq, HasAccessSuperAdminReq, HasAccessSuperAdminRes,
};
use ucode_gateway::services::chat::{GetChatReq, ListChatsReq};
use ucode_gateway::services::company::{
    FarePrimaryKey, GetResourceEnvironmentReq, GetSingleServiceResourceReq, ListFaresReq,
};
use ucode_gateway::services::object_builder::UpdateItemReq;
use ucode_gateway::services::query::{DeleteQueryReq, GetQueryReq, ListQueriesReq, Query, QueryList};
use ucode_gateway::services::scenario::{
    DeleteScenarioReq, GetScenarioReq, ListScenariosReq, RunScenarioReq, Scenario, ScenarioList,
};
use ucode_gateway::services::sms::{SendSmsReq, SendSmsRes, VerifyOtpReq};
use ucode_gateway::services::versioning::{
    GetCurrentActiveReq, GetMultipleVersionInfoReq, GetMultipleVersionInfoRes, Release,
    VersionInfo,
};
use ucode_gateway::services::{
    ApiReferenceService, AuthService, ChatService, CompanyService, HistoryReq, NodeType,
    ObjectBuilderService, QueryService, RevertReq, ScenarioService, SelectVersionsReq,
    ServiceBundle, ServiceResource, SmsService, TranscoderService, VersioningService,
};
use ucode_gateway::{build_router, AppState, StateParts};

const PROJECT: &str = "c3a5e2f0-6a7b-4c2d-9e1f-2b3c4d5e6f70";
const ENV: &str = "9a1b2c3d-4e5f-4061-8293-a4b5c6d7e8f9";
const USER: &str = "8d5f5a47-8f3c-4d0e-b2a2-0b2e7f6c9e11";
const RESOURCE_ENV: &str = "5b6c7d8e-9f01-4234-8567-89abcdef0123";
const ENTITY_ID: &str = "1f2e3d4c-5b6a-4798-8a7b-6c5d4e3f2a1b";
const MINIO_ENDPOINT: &str = "cdn.example.com";
const TOKEN: &str = "valid-token";

// ─────────────────────────────────────────────────────────────────────────────
// Backend fake
// ─────────────────────────────────────────────────────────────────────────────

/// One object standing in for every backend. Each call is logged by name.
#[derive(Default)]
struct Backend {
    calls: Mutex<Vec<String>>,
    history: Mutex<Vec<VersionHistoryEntry>>,
    item_updates: Mutex<Vec<UpdateItemReq>>,
    resolves: Mutex<Vec<GetSingleServiceResourceReq>>,
    auth_failure: Option<(Code, &'static str)>,
    fail_query_update: bool,
    slow_create: Option<Duration>,
}

impl Backend {
    fn log(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn history(&self) -> Vec<VersionHistoryEntry> {
        self.history.lock().unwrap().clone()
    }

    fn resource(&self) -> ServiceResource {
        ServiceResource {
            resource_id: "resource-1".into(),
            resource_environment_id: RESOURCE_ENV.into(),
            project_id: PROJECT.into(),
            environment_id: ENV.into(),
            node_type: NodeType::Default,
            ..Default::default()
        }
    }
}

#[async_trait]
impl AuthService for Backend {
    async fn has_access_super_admin(
        &self,
        _request: HasAccessSuperAdminReq,
    ) -> Result<HasAccessSuperAdminRes, Status> {
        self.log("auth.has_access_super_admin");
        if let Some((code, message)) = self.auth_failure {
            return Err(Status::new(code, message));
        }
        Ok(HasAccessSuperAdminRes {
            id: "session-1".into(),
            user_id: USER.into(),
            ..Default::default()
        })
    }

    async fn get_env_id(&self, _request: GetEnvIdReq) -> Result<ApiKeyRecord, Status> {
        self.log("auth.get_env_id");
        Ok(ApiKeyRecord {
            project_id: PROJECT.into(),
            environment_id: ENV.into(),
            ..Default::default()
        })
    }
}

#[async_trait]
impl CompanyService for Backend {
    async fn get_single_service_resource(
        &self,
        request: GetSingleServiceResourceReq,
    ) -> Result<ServiceResource, Status> {
        self.log("company.get_single_service_resource");
        self.resolves.lock().unwrap().push(request);
        Ok(self.resource())
    }

    async fn get_resource_environment(
        &self,
        _request: GetResourceEnvironmentReq,
    ) -> Result<ServiceResource, Status> {
        self.log("company.get_resource_environment");
        Ok(self.resource())
    }

    async fn create_fare(&self, fare: Value) -> Result<Value, Status> {
        self.log("company.create_fare");
        Ok(fare)
    }

    async fn get_fare(&self, request: FarePrimaryKey) -> Result<Value, Status> {
        self.log("company.get_fare");
        Ok(json!({ "id": request.id }))
    }

    async fn list_fares(&self, _request: ListFaresReq) -> Result<Value, Status> {
        self.log("company.list_fares");
        Ok(json!({ "fares": [], "count": 0 }))
    }

    async fn update_fare(&self, fare: Value) -> Result<Value, Status> {
        self.log("company.update_fare");
        Ok(fare)
    }

    async fn delete_fare(&self, _request: FarePrimaryKey) -> Result<(), Status> {
        self.log("company.delete_fare");
        Ok(())
    }
}

#[async_trait]
impl ObjectBuilderService for Backend {
    async fn update_item(&self, request: UpdateItemReq) -> Result<Value, Status> {
        self.log("object_builder.update_item");
        let data = Value::Object(request.data.clone());
        self.item_updates.lock().unwrap().push(request);
        Ok(data)
    }

    async fn create_version_history(&self, entry: VersionHistoryEntry) -> Result<(), Status> {
        self.log("object_builder.create_version_history");
        self.history.lock().unwrap().push(entry);
        Ok(())
    }
}

#[async_trait]
impl VersioningService for Backend {
    async fn get_multiple_version_info(
        &self,
        request: GetMultipleVersionInfoReq,
    ) -> Result<GetMultipleVersionInfoRes, Status> {
        self.log("versioning.get_multiple_version_info");
        // Knows about v1 only.
        let version_infos = request
            .version_ids
            .into_iter()
            .filter(|id| id == "v1")
            .map(|id| {
                let info = VersionInfo {
                    version_id: id.clone(),
                    version: "1".into(),
                    author_id: "u".into(),
                    ..Default::default()
                };
                (id, info)
            })
            .collect();
        Ok(GetMultipleVersionInfoRes { version_infos })
    }

    async fn get_current_active(&self, _request: GetCurrentActiveReq) -> Result<Release, Status> {
        self.log("versioning.get_current_active");
        Ok(Release::default())
    }
}

#[async_trait]
impl ApiReferenceService for Backend {
    async fn create(&self, api_reference: ApiReference) -> Result<ApiReference, Status> {
        self.log("api_reference.create");
        if let Some(delay) = self.slow_create {
            tokio::time::sleep(delay).await;
        }
        Ok(ApiReference {
            guid: ENTITY_ID.into(),
            ..api_reference
        })
    }

    async fn get(&self, request: GetApiReferenceReq) -> Result<ApiReference, Status> {
        self.log("api_reference.get");
        let mut api_reference = ApiReference {
            guid: request.guid,
            ..Default::default()
        };
        api_reference.commit_info.version_ids = vec!["v1".into(), "v2".into()];
        Ok(api_reference)
    }

    async fn get_list(&self, _request: ListApiReferencesReq) -> Result<ApiReferenceList, Status> {
        self.log("api_reference.get_list");
        Ok(ApiReferenceList::default())
    }

    async fn update(&self, api_reference: ApiReference) -> Result<ApiReference, Status> {
        self.log("api_reference.update");
        Ok(api_reference)
    }

    async fn delete(&self, _request: DeleteApiReferenceReq) -> Result<(), Status> {
        self.log("api_reference.delete");
        Ok(())
    }

    async fn history(&self, _request: HistoryReq) -> Result<ApiReferenceList, Status> {
        self.log("api_reference.history");
        Ok(ApiReferenceList::default())
    }

    async fn revert(&self, _request: RevertReq) -> Result<ApiReference, Status> {
        self.log("api_reference.revert");
        Ok(ApiReference::default())
    }

    async fn select_versions(&self, _request: SelectVersionsReq) -> Result<(), Status> {
        self.log("api_reference.select_versions");
        Ok(())
    }
}

#[async_trait]
impl QueryService for Backend {
    async fn create(&self, query: Query) -> Result<Query, Status> {
        self.log("query.create");
        Ok(query)
    }

    async fn get(&self, request: GetQueryReq) -> Result<Query, Status> {
        self.log("query.get");
        Ok(Query {
            guid: request.guid,
            ..Default::default()
        })
    }

    async fn get_list(&self, _request: ListQueriesReq) -> Result<QueryList, Status> {
        self.log("query.get_list");
        Ok(QueryList::default())
    }

    async fn update(&self, query: Query) -> Result<Query, Status> {
        self.log("query.update");
        if self.fail_query_update {
            return Err(Status::internal("query store is read-only"));
        }
        Ok(query)
    }

    async fn delete(&self, _request: DeleteQueryReq) -> Result<(), Status> {
        self.log("query.delete");
        Ok(())
    }

    async fn history(&self, _request: HistoryReq) -> Result<QueryList, Status> {
        self.log("query.history");
        Ok(QueryList::default())
    }

    async fn revert(&self, _request: RevertReq) -> Result<Query, Status> {
        self.log("query.revert");
        Ok(Query::default())
    }

    async fn select_versions(&self, _request: SelectVersionsReq) -> Result<(), Status> {
        self.log("query.select_versions");
        Ok(())
    }
}

#[async_trait]
impl ScenarioService for Backend {
    async fn create(&self, scenario: Scenario) -> Result<Scenario, Status> {
        self.log("scenario.create");
        Ok(scenario)
    }

    async fn get(&self, _request: GetScenarioReq) -> Result<Scenario, Status> {
        self.log("scenario.get");
        Ok(Scenario::default())
    }

    async fn get_list(&self, _request: ListScenariosReq) -> Result<ScenarioList, Status> {
        self.log("scenario.get_list");
        Ok(ScenarioList::default())
    }

    async fn update(&self, scenario: Scenario) -> Result<Scenario, Status> {
        self.log("scenario.update");
        Ok(scenario)
    }

    async fn delete(&self, _request: DeleteScenarioReq) -> Result<(), Status> {
        self.log("scenario.delete");
        Ok(())
    }

    async fn run(&self, _request: RunScenarioReq) -> Result<Value, Status> {
        self.log("scenario.run");
        Ok(Value::Null)
    }
}

#[async_trait]
impl ChatService for Backend {
    async fn create_chat(&self, chat: Value) -> Result<Value, Status> {
        self.log("chat.create_chat");
        Ok(chat)
    }

    async fn list_chats(&self, _request: ListChatsReq) -> Result<Value, Status> {
        self.log("chat.list_chats");
        Ok(json!([]))
    }

    async fn get_chat(&self, _request: GetChatReq) -> Result<Value, Status> {
        self.log("chat.get_chat");
        Ok(Value::Null)
    }

    async fn send_message(&self, message: Value) -> Result<Value, Status> {
        self.log("chat.send_message");
        Ok(message)
    }
}

#[async_trait]
impl TranscoderService for Backend {
    async fn create_pipeline(&self, pipeline: Value) -> Result<Value, Status> {
        self.log("transcoder.create_pipeline");
        Ok(pipeline)
    }
}

#[async_trait]
impl SmsService for Backend {
    async fn send(&self, _request: SendSmsReq) -> Result<SendSmsRes, Status> {
        self.log("sms.send");
        Ok(SendSmsRes {
            sms_id: ENTITY_ID.into(),
        })
    }

    async fn verify(&self, _request: VerifyOtpReq) -> Result<Value, Status> {
        self.log("sms.verify");
        Ok(json!({ "verified": true }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn test_config() -> Config {
    let mut config = Config::default();
    config.minio.endpoint = MINIO_ENDPOINT.into();
    config
}

/// State wired to one shared backend fake. Must run inside a runtime.
fn create_test_state(backend: &Arc<Backend>) -> AppState {
    create_test_state_with(backend, test_config())
}

fn create_test_state_with(backend: &Arc<Backend>, config: Config) -> AppState {
    let bundle = ServiceBundle {
        namespace: config.default_namespace.clone(),
        object_builder: backend.clone(),
        enterprise_object_builder: None,
        go_object_builder: backend.clone(),
        versioning: backend.clone(),
        api_reference: backend.clone(),
        query: backend.clone(),
        scenario: backend.clone(),
        chat: backend.clone(),
        transcoder: backend.clone(),
        sms: backend.clone(),
    };

    AppState::new(
        config,
        StateParts {
            auth: backend.clone(),
            company: backend.clone(),
            bundles: vec![bundle],
            cache_store: Arc::new(InMemoryCacheStore::new()),
            storage: None,
        },
    )
}

/// Send a request and return the status and the parsed body (`Null` when empty).
async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let request = if let Some(b) = body {
        request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap()
    } else {
        request.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn bearer() -> String {
    format!("Bearer {TOKEN}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Public routes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ping() {
    tokio_test::block_on(async {
        let backend = Arc::new(Backend::default());
        let app = build_router(create_test_state(&backend));

        let (status, body) = send(&app, Method::GET, "/ping", None, &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "pong");
        assert!(backend.calls().is_empty());
    });
}

#[tokio::test]
async fn test_health_lists_namespaces() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));

    let (status, body) = send(&app, Method::GET, "/health", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["data"]["namespaces"], json!(["u-code"]));
}

#[tokio::test]
async fn test_config_is_redacted_in_debug() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));

    let (status, body) = send(&app, Method::GET, "/config", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["http"]["mode"], "debug");
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_authorization_is_forbidden() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));

    let (status, _) = send(&app, Method::GET, "/v1/fare", None, &[]).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_expired_user_is_forbidden() {
    let backend = Arc::new(Backend {
        auth_failure: Some((Code::InvalidArgument, "User has been expired")),
        ..Default::default()
    });
    let state = create_test_state(&backend);
    let history = state.history.clone();
    let app = build_router(state);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/api-reference",
        Some(json!({ "project_id": PROJECT })),
        &[("authorization", &bearer()), ("environment-id", ENV)],
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["data"], "User has been expired");
    assert_eq!(backend.calls(), vec!["auth.has_access_super_admin"]);

    history.flush().await;
    assert!(backend.history().is_empty());
}

#[tokio::test]
async fn test_bad_token_is_unauthorized() {
    let backend = Arc::new(Backend {
        auth_failure: Some((Code::Unauthenticated, "token is invalid")),
        ..Default::default()
    });
    let app = build_router(create_test_state(&backend));

    let (status, _) = send(
        &app,
        Method::GET,
        "/v1/fare",
        None,
        &[("authorization", &bearer())],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_key_principal() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));

    let (status, _) = send(
        &app,
        Method::GET,
        "/v1/api-reference",
        None,
        &[("authorization", "API-KEY"), ("x-api-key", "key-123")],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.count("auth.get_env_id"), 1);
    assert_eq!(backend.count("auth.has_access_super_admin"), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// API reference
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_api_reference_create_bearer() {
    let backend = Arc::new(Backend::default());
    let state = create_test_state(&backend);
    let history = state.history.clone();
    let app = build_router(state);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/api-reference",
        Some(json!({ "project_id": PROJECT, "title": "Orders" })),
        &[("authorization", &bearer()), ("environment-id", ENV)],
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let data = &body["data"];
    assert_eq!(data["commit_info"]["author_id"], USER);
    assert!(data["commit_info"]["name"]
        .as_str()
        .unwrap()
        .starts_with("Auto Created Commit Create api reference - "));
    assert_eq!(data["commit_info"]["commit_type"], "FIELD");
    assert_eq!(data["resource_id"], RESOURCE_ENV);
    assert_eq!(data["title"], "Orders");

    let calls = backend.calls();
    assert_eq!(calls[0], "auth.has_access_super_admin");
    assert_eq!(backend.count("auth.has_access_super_admin"), 1);

    let resolves = backend.resolves.lock().unwrap().clone();
    assert_eq!(resolves.len(), 1);
    assert_eq!(resolves[0].project_id, PROJECT);
    assert_eq!(resolves[0].environment_id, ENV);
    assert_eq!(resolves[0].service_type.as_str(), "API_REF_SERVICE");

    history.flush().await;
    let entries = backend.history();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action_type, ActionType::Create);
    assert_eq!(entries[0].project_id, RESOURCE_ENV);
}

#[tokio::test]
async fn test_api_reference_get_enriches_known_versions_only() {
    let backend = Arc::new(Backend::default());
    let state = create_test_state(&backend);
    let history = state.history.clone();
    let app = build_router(state);

    let uri = format!("/v1/api-reference/{ENTITY_ID}?project-id={PROJECT}");
    let (status, body) = send(
        &app,
        Method::GET,
        &uri,
        None,
        &[("authorization", &bearer()), ("environment-id", ENV)],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let infos: HashMap<String, VersionInfo> =
        serde_json::from_value(body["data"]["commit_info"]["version_infos"].clone()).unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos["v1"].version, "1");
    assert_eq!(infos["v1"].author_id, "u");
    assert_eq!(backend.count("versioning.get_multiple_version_info"), 1);

    history.flush().await;
    assert!(backend.history().is_empty());
}

#[tokio::test]
async fn test_invalid_path_uuid_makes_no_downstream_call() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));

    let uri = format!("/v1/api-reference/not-a-uuid?project-id={PROJECT}");
    let (status, body) = send(
        &app,
        Method::GET,
        &uri,
        None,
        &[("authorization", &bearer()), ("environment-id", ENV)],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "INVALID_ARGUMENT");
    assert_eq!(backend.calls(), vec!["auth.has_access_super_admin"]);
}

#[tokio::test]
async fn test_api_reference_delete_records_history_once() {
    let backend = Arc::new(Backend::default());
    let state = create_test_state(&backend);
    let history = state.history.clone();
    let app = build_router(state);

    let uri = format!("/v1/api-reference/{ENTITY_ID}?project-id={PROJECT}");
    let (status, body) = send(
        &app,
        Method::DELETE,
        &uri,
        None,
        &[("authorization", &bearer()), ("environment-id", ENV)],
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    history.flush().await;
    let entries = backend.history();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action_type, ActionType::Delete);
}

#[tokio::test]
async fn test_dropped_client_still_records_history() {
    let backend = Arc::new(Backend {
        slow_create: Some(Duration::from_millis(200)),
        ..Default::default()
    });
    let state = create_test_state(&backend);
    let history = state.history.clone();
    let app = build_router(state);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/api-reference")
        .header("authorization", bearer())
        .header("environment-id", ENV)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "project_id": PROJECT }).to_string()))
        .unwrap();
    let cut_short = tokio::time::timeout(Duration::from_millis(50), app.oneshot(request)).await;
    assert!(cut_short.is_err());

    tokio::time::sleep(Duration::from_millis(300)).await;
    history.flush().await;
    let entries = backend.history();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action_type, ActionType::Create);
    assert_eq!(entries[0].response["guid"], ENTITY_ID);
    assert_eq!(backend.count("api_reference.create"), 1);
}

#[tokio::test]
async fn test_reads_never_record_history() {
    let backend = Arc::new(Backend::default());
    let state = create_test_state(&backend);
    let history = state.history.clone();
    let app = build_router(state);
    let headers = [("authorization", bearer()), ("environment-id", ENV.to_string())];
    let headers: Vec<(&str, &str)> = headers.iter().map(|(k, v)| (*k, v.as_str())).collect();

    for uri in [
        format!("/v1/query?project-id={PROJECT}"),
        format!("/v1/query/{ENTITY_ID}?project-id={PROJECT}"),
        format!("/v1/query/history/{ENTITY_ID}?project-id={PROJECT}"),
        format!("/v1/api-reference?project-id={PROJECT}"),
    ] {
        let (status, _) = send(&app, Method::GET, &uri, None, &headers).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }

    assert_eq!(backend.count("query.get_list"), 1);
    assert_eq!(backend.count("query.get"), 1);
    assert_eq!(backend.count("query.history"), 1);

    history.flush().await;
    assert!(backend.history().is_empty());
    assert_eq!(backend.count("object_builder.create_version_history"), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Delegated authentication
// ─────────────────────────────────────────────────────────────────────────────

fn delegated_auth() -> String {
    json!({ "user_id": USER, "project_id": PROJECT, "environment_id": ENV }).to_string()
}

#[tokio::test]
async fn test_delegated_create_skips_auth_service() {
    let backend = Arc::new(Backend::default());
    let mut config = test_config();
    config.auth.enabled = true;
    let state = create_test_state_with(&backend, config);
    let history = state.history.clone();
    let app = build_router(state);

    let auth = delegated_auth();
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/api-reference",
        Some(json!({ "title": "Orders" })),
        &[("redirect", "true"), ("auth", &auth)],
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["project_id"], PROJECT);
    assert_eq!(body["data"]["environment_id"], ENV);
    assert_eq!(body["data"]["commit_info"]["author_id"], USER);
    assert_eq!(backend.count("auth.has_access_super_admin"), 0);
    assert_eq!(backend.count("auth.get_env_id"), 0);

    history.flush().await;
    let entries = backend.history();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_info, USER);
}

#[tokio::test]
async fn test_delegated_without_auth_header_is_bad_request() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/api-reference",
        Some(json!({ "project_id": PROJECT })),
        &[("redirect", "true"), ("environment-id", ENV)],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "BAD_REQUEST");
    assert!(backend.calls().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_scenario_create_uses_scenario_commit() {
    let backend = Arc::new(Backend::default());
    let state = create_test_state(&backend);
    let history = state.history.clone();
    let app = build_router(state);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/scenario",
        Some(json!({ "project_id": PROJECT, "title": "nightly" })),
        &[("authorization", &bearer()), ("environment-id", ENV)],
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let commit = &body["data"]["commit_info"];
    assert_eq!(commit["commit_type"], "SCENARIO");
    assert_eq!(commit["author_id"], USER);
    assert!(commit["name"]
        .as_str()
        .unwrap()
        .starts_with("Auto Created Commit Create scenario - "));
    assert_eq!(body["data"]["title"], "nightly");
    assert_eq!(backend.count("company.get_single_service_resource"), 0);

    history.flush().await;
    let entries = backend.history();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action_type, ActionType::Create);
    assert_eq!(entries[0].project_id, PROJECT);
}

// ─────────────────────────────────────────────────────────────────────────────
// Query
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_query_update_failure_still_records_history() {
    let backend = Arc::new(Backend {
        fail_query_update: true,
        ..Default::default()
    });
    let state = create_test_state(&backend);
    let history = state.history.clone();
    let app = build_router(state);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/v1/query",
        Some(json!({ "guid": ENTITY_ID, "project_id": PROJECT })),
        &[("authorization", &bearer()), ("environment-id", ENV)],
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "GRPC_ERROR");
    assert_eq!(body["data"], "query store is read-only");

    history.flush().await;
    let entries = backend.history();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action_type, ActionType::Update);
    assert_eq!(entries[0].response, json!("query store is read-only"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cache_get_miss_fills_value() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));
    let request = json!({ "method": "GET", "key": "k", "project_id": PROJECT, "value": "hello" });

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/cache",
        Some(request),
        &[("authorization", &bearer())],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "hello");

    let lookup = json!({ "method": "GET", "key": "k", "project_id": PROJECT });
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/cache",
        Some(lookup),
        &[("authorization", &bearer())],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "hello");
}

#[tokio::test]
async fn test_cache_get_fill_with_plain_project_key() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));
    let fill = json!({ "method": "GET", "key": "k", "project_id": "P", "value": "hello" });

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/cache",
        Some(fill),
        &[("authorization", &bearer())],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "hello");

    let lookup = json!({ "method": "GET", "key": "k", "project_id": "P" });
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/cache",
        Some(lookup),
        &[("authorization", &bearer())],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "hello");
}

#[tokio::test]
async fn test_cache_requires_project() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));
    let request = json!({ "method": "SET", "key": "k", "project_id": " ", "value": 1 });

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/cache",
        Some(request),
        &[("authorization", &bearer())],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"], "project_id is required");
}

// ─────────────────────────────────────────────────────────────────────────────
// Transcoder
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_transcoder_webhook_updates_item() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));
    let hook = json!({
        "key_id": "K",
        "field_slug": "url",
        "output_key": "o",
        "project_id": RESOURCE_ENV,
        "table_slug": "movies",
    });

    let (status, _) = send(&app, Method::POST, "/v1/transcoder/webhook", Some(hook), &[]).await;
    assert_eq!(status, StatusCode::OK);

    let updates = backend.item_updates.lock().unwrap().clone();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].table_slug, "movies");
    assert_eq!(updates[0].data["guid"], "K");
    assert_eq!(
        updates[0].data["url"],
        format!("https://{MINIO_ENDPOINT}/movies/o/master.m3u8")
    );
}

#[tokio::test]
async fn test_transcoder_webhook_without_key_is_noop() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/transcoder/webhook",
        Some(json!({ "key_id": "" })),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);
    assert!(backend.calls().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Fares and SMS
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fare_create_returns_created() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/fare",
        Some(json!({ "name": "basic", "price": 10 })),
        &[("authorization", &bearer())],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "basic");
}

#[tokio::test]
async fn test_fare_get_validates_uuid() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));

    let (status, _) = send(
        &app,
        Method::GET,
        "/v1/fare/nope",
        None,
        &[("authorization", &bearer())],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(backend.count("company.get_fare"), 0);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/v1/fare/{ENTITY_ID}"),
        None,
        &[("authorization", &bearer())],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], ENTITY_ID);
}

#[tokio::test]
async fn test_sms_send_rejects_bad_recipient() {
    let backend = Arc::new(Backend::default());
    let app = build_router(create_test_state(&backend));

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/sms/send",
        Some(json!({ "recipient": "nobody", "type": "PHONE", "project_id": PROJECT })),
        &[("authorization", &bearer()), ("environment-id", ENV)],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(backend.count("sms.send"), 0);
}
