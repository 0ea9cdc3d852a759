//! Backend service clients and the per-namespace bundle registry.
//!
//! Each backend capability is a trait with a gRPC implementation. A
//! [`ServiceBundle`] groups one client per capability for a namespace; the
//! [`ServiceNodes`] registry picks the bundle a request is routed to.

pub mod api_reference;
pub mod auth;
pub mod chat;
pub mod company;
pub mod object_builder;
pub mod query;
pub mod scenario;
pub mod sms;
pub mod transcoder;
pub mod versioning;
mod wire;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ucode_common::{Config, Error, GrpcConfig, ServiceNodeConfig};

use crate::commit::CommitInfo;
use crate::grpc::GrpcClient;
use crate::response::{ApiError, ApiResult};

pub use api_reference::ApiReferenceService;
pub use auth::AuthService;
pub use chat::ChatService;
pub use company::{CompanyService, ServiceResource};
pub use object_builder::ObjectBuilderService;
pub use query::QueryService;
pub use scenario::ScenarioService;
pub use sms::SmsService;
pub use transcoder::TranscoderService;
pub use versioning::VersioningService;

// ============================================================================
// Resource descriptors
// ============================================================================

/// Whether a project runs on dedicated (enterprise) or shared backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Enterprise,
    #[default]
    #[serde(other)]
    Default,
}

impl NodeType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enterprise => "ENTERPRISE",
            Self::Default => "DEFAULT",
        }
    }
}

/// Backend capability a service resource is looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    BuilderService,
    ApiRefService,
    QueryService,
    ScenarioService,
    ChatService,
    TranscoderService,
    SmsService,
}

impl ServiceType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BuilderService => "BUILDER_SERVICE",
            Self::ApiRefService => "API_REF_SERVICE",
            Self::QueryService => "QUERY_SERVICE",
            Self::ScenarioService => "SCENARIO_SERVICE",
            Self::ChatService => "CHAT_SERVICE",
            Self::TranscoderService => "TRANSCODER_SERVICE",
            Self::SmsService => "SMS_SERVICE",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage engine behind a service resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    /// Object-builder item storage.
    Postgresql,
    Clickhouse,
    Mongodb,
    #[default]
    #[serde(other)]
    Unspecified,
}

// ============================================================================
// Requests shared by the versioned-entity services
// ============================================================================

/// Change history of one versioned entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryReq {
    pub guid: String,
    pub project_id: String,
    pub environment_id: String,
    pub resource_id: String,
    pub version_id: String,
    pub from_date: String,
    pub to_date: String,
    pub order_by: String,
    pub order: String,
    pub limit: u32,
    pub offset: u32,
}

/// Restore an entity to an earlier commit under a new version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevertReq {
    pub guid: String,
    pub old_commit_id: String,
    pub version_id: String,
    pub project_id: String,
    pub environment_id: String,
    pub resource_id: String,
    pub new_commit_info: CommitInfo,
}

/// Pin a set of entities to one version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectVersionsReq {
    pub ids: Vec<String>,
    pub version_id: String,
    pub project_id: String,
    pub environment_id: String,
    pub resource_id: String,
    pub commit_info: CommitInfo,
}

// ============================================================================
// Bundles
// ============================================================================

/// Services shared by every namespace.
#[derive(Clone)]
pub struct SharedServices {
    pub auth: Arc<dyn AuthService>,
    pub company: Arc<dyn CompanyService>,
}

impl SharedServices {
    pub fn connect(config: &Config) -> Result<Self, Error> {
        let auth = GrpcClient::connect_lazy(&config.auth_service, &config.grpc)?;
        let company = GrpcClient::connect_lazy(&config.company_service, &config.grpc)?;
        Ok(Self {
            auth: Arc::new(auth::GrpcAuthService::new(auth)),
            company: Arc::new(company::GrpcCompanyService::new(company)),
        })
    }
}

/// One client per backend capability, serving one namespace.
#[derive(Clone)]
pub struct ServiceBundle {
    pub namespace: String,
    pub object_builder: Arc<dyn ObjectBuilderService>,
    pub enterprise_object_builder: Option<Arc<dyn ObjectBuilderService>>,
    pub go_object_builder: Arc<dyn ObjectBuilderService>,
    pub versioning: Arc<dyn VersioningService>,
    pub api_reference: Arc<dyn ApiReferenceService>,
    pub query: Arc<dyn QueryService>,
    pub scenario: Arc<dyn ScenarioService>,
    pub chat: Arc<dyn ChatService>,
    pub transcoder: Arc<dyn TranscoderService>,
    pub sms: Arc<dyn SmsService>,
}

impl fmt::Debug for ServiceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBundle")
            .field("namespace", &self.namespace)
            .field(
                "enterprise_object_builder",
                &self.enterprise_object_builder.is_some(),
            )
            .finish_non_exhaustive()
    }
}

impl ServiceBundle {
    /// Open lazy channels to every endpoint of a namespace.
    pub fn connect(node: &ServiceNodeConfig, grpc: &GrpcConfig) -> Result<Self, Error> {
        let client = |addr: &str| GrpcClient::connect_lazy(addr, grpc);

        let enterprise_object_builder = match &node.enterprise_object_builder {
            Some(addr) => Some(Arc::new(object_builder::GrpcObjectBuilderService::new(
                client(addr)?,
            )) as Arc<dyn ObjectBuilderService>),
            None => None,
        };

        Ok(Self {
            namespace: node.namespace.clone(),
            object_builder: Arc::new(object_builder::GrpcObjectBuilderService::new(client(
                &node.object_builder,
            )?)),
            enterprise_object_builder,
            go_object_builder: Arc::new(object_builder::GrpcObjectBuilderService::new(client(
                &node.go_object_builder,
            )?)),
            versioning: Arc::new(versioning::GrpcVersioningService::new(client(
                &node.versioning,
            )?)),
            api_reference: Arc::new(api_reference::GrpcApiReferenceService::new(client(
                &node.api_reference,
            )?)),
            query: Arc::new(query::GrpcQueryService::new(client(&node.query)?)),
            scenario: Arc::new(scenario::GrpcScenarioService::new(client(&node.scenario)?)),
            chat: Arc::new(chat::GrpcChatService::new(client(&node.chat)?)),
            transcoder: Arc::new(transcoder::GrpcTranscoderService::new(client(
                &node.transcoder,
            )?)),
            sms: Arc::new(sms::GrpcSmsService::new(client(&node.sms)?)),
        })
    }

    /// Object builder serving a node type.
    pub fn builder_by_type(&self, node_type: NodeType) -> Arc<dyn ObjectBuilderService> {
        match (node_type, &self.enterprise_object_builder) {
            (NodeType::Enterprise, Some(enterprise)) => Arc::clone(enterprise),
            _ => Arc::clone(&self.object_builder),
        }
    }
}

/// Bundles keyed by namespace.
///
/// Enterprise projects are keyed by their project id; everything else uses
/// the shared default namespace.
#[derive(Debug, Clone)]
pub struct ServiceNodes {
    bundles: HashMap<String, Arc<ServiceBundle>>,
    default_namespace: String,
}

impl ServiceNodes {
    pub fn new(
        default_namespace: impl Into<String>,
        bundles: impl IntoIterator<Item = ServiceBundle>,
    ) -> Self {
        Self {
            bundles: bundles
                .into_iter()
                .map(|b| (b.namespace.clone(), Arc::new(b)))
                .collect(),
            default_namespace: default_namespace.into(),
        }
    }

    /// Bundle serving a resolved resource.
    pub fn select(&self, project_id: &str, node_type: NodeType) -> ApiResult<Arc<ServiceBundle>> {
        let namespace = match node_type {
            NodeType::Enterprise => project_id,
            NodeType::Default => self.default_namespace.as_str(),
        };
        self.by_namespace(namespace)
    }

    /// Bundle registered under an explicit namespace.
    pub fn by_namespace(&self, namespace: &str) -> ApiResult<Arc<ServiceBundle>> {
        self.bundles
            .get(namespace)
            .cloned()
            .ok_or_else(|| ApiError::grpc(format!("services not found for namespace '{namespace}'")))
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::object_builder::MockObjectBuilderService;
    use crate::status::Status;
    use crate::test_support::mock_bundle;

    fn bundle(namespace: &str, enterprise: bool) -> ServiceBundle {
        ServiceBundle {
            enterprise_object_builder: enterprise
                .then(|| Arc::new(MockObjectBuilderService::new()) as Arc<dyn ObjectBuilderService>),
            ..mock_bundle(namespace)
        }
    }

    const ENTERPRISE: &str = "2b8d7c1e-0f4a-4a63-8d0f-5c1b2a3d4e5f";

    fn nodes() -> ServiceNodes {
        ServiceNodes::new("u-code", [bundle("u-code", false), bundle(ENTERPRISE, true)])
    }

    #[test]
    fn test_default_node_uses_shared_namespace() {
        let selected = nodes().select(ENTERPRISE, NodeType::Default).unwrap();
        assert_eq!(selected.namespace, "u-code");
    }

    #[test]
    fn test_enterprise_node_uses_project_namespace() {
        let selected = nodes().select(ENTERPRISE, NodeType::Enterprise).unwrap();
        assert_eq!(selected.namespace, ENTERPRISE);
    }

    #[test]
    fn test_missing_bundle_is_grpc_error() {
        let err = nodes()
            .select("0f7e1f7a-6a1d-4c39-b9a0-8ad2f4c1e2d3", NodeType::Enterprise)
            .unwrap_err();
        assert_eq!(err.status(), Status::GrpcError);
        assert!(err.message().contains("0f7e1f7a"));
    }

    #[test]
    fn test_builder_by_type() {
        let plain = bundle("u-code", false);
        assert!(Arc::ptr_eq(
            &plain.builder_by_type(NodeType::Enterprise),
            &plain.object_builder
        ));

        let dedicated = bundle(ENTERPRISE, true);
        let enterprise = dedicated.enterprise_object_builder.clone().unwrap();
        assert!(Arc::ptr_eq(
            &dedicated.builder_by_type(NodeType::Enterprise),
            &enterprise
        ));
        assert!(Arc::ptr_eq(
            &dedicated.builder_by_type(NodeType::Default),
            &dedicated.object_builder
        ));
    }

    #[test]
    fn test_node_type_wire_format() {
        let t: NodeType = serde_json::from_str("\"ENTERPRISE\"").unwrap();
        assert_eq!(t, NodeType::Enterprise);
        let t: NodeType = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(t, NodeType::Default);
        assert_eq!(
            serde_json::to_string(&ServiceType::ApiRefService).unwrap(),
            "\"API_REF_SERVICE\""
        );
        assert_eq!(ServiceType::BuilderService.to_string(), "BUILDER_SERVICE");
    }
}
