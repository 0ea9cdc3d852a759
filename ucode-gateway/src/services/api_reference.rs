//! API reference service client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tonic::Status;

use super::wire::commit_from_wire;
use super::{HistoryReq, RevertReq, SelectVersionsReq};
use crate::commit::CommitInfo;
use crate::enrich::Versioned;
use crate::grpc::pb::{api_reference_service as pb, common};
use crate::grpc::structs::{map_to_struct, struct_to_map};
use crate::grpc::GrpcClient;

const CREATE: &str = "/api_reference_service.ApiReferenceService/Create";
const GET: &str = "/api_reference_service.ApiReferenceService/Get";
const GET_LIST: &str = "/api_reference_service.ApiReferenceService/GetList";
const UPDATE: &str = "/api_reference_service.ApiReferenceService/Update";
const DELETE: &str = "/api_reference_service.ApiReferenceService/Delete";
const GET_CHANGES: &str = "/api_reference_service.ApiReferenceService/GetApiReferenceChanges";
const REVERT: &str = "/api_reference_service.ApiReferenceService/RevertApiReference";
const INSERT_MANY_VERSIONS: &str = "/api_reference_service.ApiReferenceService/InsertManyVersionForApiReference";

/// A versioned API reference. Fields the gateway does not route on pass
/// through in `attributes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiReference {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub environment_id: String,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub commit_id: String,
    #[serde(default)]
    pub commit_info: CommitInfo,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Versioned for ApiReference {
    fn commit_info(&self) -> &CommitInfo {
        &self.commit_info
    }

    fn commit_info_mut(&mut self) -> &mut CommitInfo {
        &mut self.commit_info
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetApiReferenceReq {
    pub guid: String,
    pub project_id: String,
    pub resource_id: String,
    pub version_id: String,
    pub commit_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListApiReferencesReq {
    pub project_id: String,
    pub environment_id: String,
    pub resource_id: String,
    pub category_id: String,
    pub search: String,
    pub version_id: String,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiReferenceList {
    #[serde(default)]
    pub api_references: Vec<ApiReference>,
    #[serde(default)]
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteApiReferenceReq {
    pub guid: String,
    pub project_id: String,
    pub environment_id: String,
    pub resource_id: String,
    pub version_id: String,
    pub commit_info: CommitInfo,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiReferenceService: Send + Sync {
    async fn create(&self, api_reference: ApiReference) -> Result<ApiReference, Status>;

    async fn get(&self, request: GetApiReferenceReq) -> Result<ApiReference, Status>;

    async fn get_list(&self, request: ListApiReferencesReq) -> Result<ApiReferenceList, Status>;

    async fn update(&self, api_reference: ApiReference) -> Result<ApiReference, Status>;

    async fn delete(&self, request: DeleteApiReferenceReq) -> Result<(), Status>;

    /// Commits of one API reference, newest first.
    async fn history(&self, request: HistoryReq) -> Result<ApiReferenceList, Status>;

    async fn revert(&self, request: RevertReq) -> Result<ApiReference, Status>;

    /// Pin several API references to a version.
    async fn select_versions(&self, request: SelectVersionsReq) -> Result<(), Status>;
}

pub struct GrpcApiReferenceService {
    client: GrpcClient,
}

impl GrpcApiReferenceService {
    pub fn new(client: GrpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiReferenceService for GrpcApiReferenceService {
    async fn create(&self, api_reference: ApiReference) -> Result<ApiReference, Status> {
        let reply: pb::ApiReference = self
            .client
            .unary(CREATE, pb::ApiReference::from(api_reference))
            .await?;
        Ok(reply.into())
    }

    async fn get(&self, request: GetApiReferenceReq) -> Result<ApiReference, Status> {
        let request = common::GetVersionedReq {
            guid: request.guid,
            project_id: request.project_id,
            resource_id: request.resource_id,
            version_id: request.version_id,
            commit_id: request.commit_id,
        };
        let reply: pb::ApiReference = self.client.unary(GET, request).await?;
        Ok(reply.into())
    }

    async fn get_list(&self, request: ListApiReferencesReq) -> Result<ApiReferenceList, Status> {
        let request = pb::GetListReq {
            project_id: request.project_id,
            environment_id: request.environment_id,
            resource_id: request.resource_id,
            category_id: request.category_id,
            search: request.search,
            version_id: request.version_id,
            limit: request.limit,
            offset: request.offset,
        };
        let reply: pb::ApiReferenceList = self.client.unary(GET_LIST, request).await?;
        Ok(reply.into())
    }

    async fn update(&self, api_reference: ApiReference) -> Result<ApiReference, Status> {
        let reply: pb::ApiReference = self
            .client
            .unary(UPDATE, pb::ApiReference::from(api_reference))
            .await?;
        Ok(reply.into())
    }

    async fn delete(&self, request: DeleteApiReferenceReq) -> Result<(), Status> {
        let request = common::DeleteVersionedReq {
            guid: request.guid,
            project_id: request.project_id,
            environment_id: request.environment_id,
            resource_id: request.resource_id,
            version_id: request.version_id,
            commit_info: Some(request.commit_info.into()),
        };
        self.client.unary(DELETE, request).await
    }

    async fn history(&self, request: HistoryReq) -> Result<ApiReferenceList, Status> {
        let reply: pb::ApiReferenceList = self
            .client
            .unary(GET_CHANGES, common::HistoryReq::from(request))
            .await?;
        Ok(reply.into())
    }

    async fn revert(&self, request: RevertReq) -> Result<ApiReference, Status> {
        let reply: pb::ApiReference = self
            .client
            .unary(REVERT, common::RevertReq::from(request))
            .await?;
        Ok(reply.into())
    }

    async fn select_versions(&self, request: SelectVersionsReq) -> Result<(), Status> {
        self.client
            .unary(INSERT_MANY_VERSIONS, common::SelectVersionsReq::from(request))
            .await
    }
}

impl From<ApiReference> for pb::ApiReference {
    fn from(api_reference: ApiReference) -> Self {
        Self {
            guid: api_reference.guid,
            project_id: api_reference.project_id,
            environment_id: api_reference.environment_id,
            resource_id: api_reference.resource_id,
            version_id: api_reference.version_id,
            commit_id: api_reference.commit_id,
            commit_info: Some(api_reference.commit_info.into()),
            attributes: Some(map_to_struct(api_reference.attributes)),
        }
    }
}

impl From<pb::ApiReference> for ApiReference {
    fn from(api_reference: pb::ApiReference) -> Self {
        Self {
            guid: api_reference.guid,
            project_id: api_reference.project_id,
            environment_id: api_reference.environment_id,
            resource_id: api_reference.resource_id,
            version_id: api_reference.version_id,
            commit_id: api_reference.commit_id,
            commit_info: commit_from_wire(api_reference.commit_info),
            attributes: api_reference
                .attributes
                .map(struct_to_map)
                .unwrap_or_default(),
        }
    }
}

impl From<pb::ApiReferenceList> for ApiReferenceList {
    fn from(list: pb::ApiReferenceList) -> Self {
        Self {
            api_references: list.api_references.into_iter().map(Into::into).collect(),
            count: list.count,
        }
    }
}
