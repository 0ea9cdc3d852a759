//! Versioning service client.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tonic::Status;

use crate::grpc::pb::versioning_service as pb;
use crate::grpc::GrpcClient;

const GET_MULTIPLE_VERSION_INFO: &str = "/versioning_service.ReleaseService/GetMultipleVersionInfo";
const GET_CURRENT_ACTIVE: &str = "/versioning_service.ReleaseService/GetCurrentActive";

/// Metadata of one version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub as_code: bool,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetMultipleVersionInfoReq {
    pub version_ids: Vec<String>,
    pub project_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetMultipleVersionInfoRes {
    #[serde(default)]
    pub version_infos: HashMap<String, VersionInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetCurrentActiveReq {
    pub project_id: String,
    pub environment_id: String,
}

/// The active release of an environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub environment_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub is_current: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersioningService: Send + Sync {
    async fn get_multiple_version_info(
        &self,
        request: GetMultipleVersionInfoReq,
    ) -> Result<GetMultipleVersionInfoRes, Status>;

    async fn get_current_active(&self, request: GetCurrentActiveReq) -> Result<Release, Status>;
}

pub struct GrpcVersioningService {
    client: GrpcClient,
}

impl GrpcVersioningService {
    pub fn new(client: GrpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VersioningService for GrpcVersioningService {
    async fn get_multiple_version_info(
        &self,
        request: GetMultipleVersionInfoReq,
    ) -> Result<GetMultipleVersionInfoRes, Status> {
        let request = pb::GetMultipleVersionInfoReq {
            version_ids: request.version_ids,
            project_id: request.project_id,
        };
        let reply: pb::GetMultipleVersionInfoRes =
            self.client.unary(GET_MULTIPLE_VERSION_INFO, request).await?;
        Ok(GetMultipleVersionInfoRes {
            version_infos: reply
                .version_infos
                .into_iter()
                .map(|(id, info)| (id, info.into()))
                .collect(),
        })
    }

    async fn get_current_active(&self, request: GetCurrentActiveReq) -> Result<Release, Status> {
        let request = pb::GetCurrentActiveReq {
            project_id: request.project_id,
            environment_id: request.environment_id,
        };
        let reply: pb::Release = self.client.unary(GET_CURRENT_ACTIVE, request).await?;
        Ok(Release {
            id: reply.id,
            project_id: reply.project_id,
            environment_id: reply.environment_id,
            version: reply.version,
            is_current: reply.is_current,
        })
    }
}
