//! Query service client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tonic::Status;

use super::wire::commit_from_wire;
use super::{HistoryReq, RevertReq, SelectVersionsReq};
use crate::commit::CommitInfo;
use crate::enrich::Versioned;
use crate::grpc::pb::{common, query_service as pb};
use crate::grpc::structs::{map_to_struct, struct_to_map};
use crate::grpc::GrpcClient;

const CREATE: &str = "/query_service.QueryService/CreateQuery";
const GET: &str = "/query_service.QueryService/GetSingleQuery";
const GET_LIST: &str = "/query_service.QueryService/GetQueries";
const UPDATE: &str = "/query_service.QueryService/UpdateQuery";
const DELETE: &str = "/query_service.QueryService/DeleteQuery";
const GET_CHANGES: &str = "/query_service.QueryService/GetQueryHistory";
const REVERT: &str = "/query_service.QueryService/RevertQuery";
const INSERT_MANY_VERSIONS: &str = "/query_service.QueryService/InsertManyVersionForQuery";

/// A versioned saved query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub environment_id: String,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub folder_id: String,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub commit_id: String,
    #[serde(default)]
    pub commit_info: CommitInfo,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Versioned for Query {
    fn commit_info(&self) -> &CommitInfo {
        &self.commit_info
    }

    fn commit_info_mut(&mut self) -> &mut CommitInfo {
        &mut self.commit_info
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetQueryReq {
    pub guid: String,
    pub project_id: String,
    pub resource_id: String,
    pub version_id: String,
    pub commit_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQueriesReq {
    pub project_id: String,
    pub environment_id: String,
    pub resource_id: String,
    pub folder_id: String,
    pub search: String,
    pub version_id: String,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryList {
    #[serde(default)]
    pub queries: Vec<Query>,
    #[serde(default)]
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteQueryReq {
    pub guid: String,
    pub project_id: String,
    pub environment_id: String,
    pub resource_id: String,
    pub version_id: String,
    pub commit_info: CommitInfo,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn create(&self, query: Query) -> Result<Query, Status>;

    async fn get(&self, request: GetQueryReq) -> Result<Query, Status>;

    async fn get_list(&self, request: ListQueriesReq) -> Result<QueryList, Status>;

    async fn update(&self, query: Query) -> Result<Query, Status>;

    async fn delete(&self, request: DeleteQueryReq) -> Result<(), Status>;

    async fn history(&self, request: HistoryReq) -> Result<QueryList, Status>;

    async fn revert(&self, request: RevertReq) -> Result<Query, Status>;

    async fn select_versions(&self, request: SelectVersionsReq) -> Result<(), Status>;
}

pub struct GrpcQueryService {
    client: GrpcClient,
}

impl GrpcQueryService {
    pub fn new(client: GrpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryService for GrpcQueryService {
    async fn create(&self, query: Query) -> Result<Query, Status> {
        let reply: pb::Query = self.client.unary(CREATE, pb::Query::from(query)).await?;
        Ok(reply.into())
    }

    async fn get(&self, request: GetQueryReq) -> Result<Query, Status> {
        let request = common::GetVersionedReq {
            guid: request.guid,
            project_id: request.project_id,
            resource_id: request.resource_id,
            version_id: request.version_id,
            commit_id: request.commit_id,
        };
        let reply: pb::Query = self.client.unary(GET, request).await?;
        Ok(reply.into())
    }

    async fn get_list(&self, request: ListQueriesReq) -> Result<QueryList, Status> {
        let request = pb::GetQueriesReq {
            project_id: request.project_id,
            environment_id: request.environment_id,
            resource_id: request.resource_id,
            folder_id: request.folder_id,
            search: request.search,
            version_id: request.version_id,
            limit: request.limit,
            offset: request.offset,
        };
        let reply: pb::QueryList = self.client.unary(GET_LIST, request).await?;
        Ok(reply.into())
    }

    async fn update(&self, query: Query) -> Result<Query, Status> {
        let reply: pb::Query = self.client.unary(UPDATE, pb::Query::from(query)).await?;
        Ok(reply.into())
    }

    async fn delete(&self, request: DeleteQueryReq) -> Result<(), Status> {
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

    async fn history(&self, request: HistoryReq) -> Result<QueryList, Status> {
        let reply: pb::QueryList = self
            .client
            .unary(GET_CHANGES, common::HistoryReq::from(request))
            .await?;
        Ok(reply.into())
    }

    async fn revert(&self, request: RevertReq) -> Result<Query, Status> {
        let reply: pb::Query = self
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

impl From<Query> for pb::Query {
    fn from(query: Query) -> Self {
        Self {
            guid: query.guid,
            project_id: query.project_id,
            environment_id: query.environment_id,
            resource_id: query.resource_id,
            folder_id: query.folder_id,
            version_id: query.version_id,
            commit_id: query.commit_id,
            commit_info: Some(query.commit_info.into()),
            attributes: Some(map_to_struct(query.attributes)),
        }
    }
}

impl From<pb::Query> for Query {
    fn from(query: pb::Query) -> Self {
        Self {
            guid: query.guid,
            project_id: query.project_id,
            environment_id: query.environment_id,
            resource_id: query.resource_id,
            folder_id: query.folder_id,
            version_id: query.version_id,
            commit_id: query.commit_id,
            commit_info: commit_from_wire(query.commit_info),
            attributes: query.attributes.map(struct_to_map).unwrap_or_default(),
        }
    }
}

impl From<pb::QueryList> for QueryList {
    fn from(list: pb::QueryList) -> Self {
        Self {
            queries: list.queries.into_iter().map(Into::into).collect(),
            count: list.count,
        }
    }
}
