//! Scenario service client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tonic::Status;

use super::wire::commit_from_wire;
use crate::commit::CommitInfo;
use crate::grpc::pb::scenario_service as pb;
use crate::grpc::structs::{json_to_value, map_to_struct, struct_to_map, value_to_json};
use crate::grpc::GrpcClient;

const CREATE: &str = "/scenario_service.DAGService/Create";
const GET: &str = "/scenario_service.DAGService/GetSingle";
const GET_LIST: &str = "/scenario_service.DAGService/GetAll";
const UPDATE: &str = "/scenario_service.DAGService/Update";
const DELETE: &str = "/scenario_service.DAGService/Delete";
const RUN: &str = "/scenario_service.DAGService/RunScenario";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub environment_id: String,
    #[serde(default)]
    pub commit_info: CommitInfo,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetScenarioReq {
    pub guid: String,
    pub project_id: String,
    pub environment_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListScenariosReq {
    pub project_id: String,
    pub environment_id: String,
    pub category_id: String,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioList {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteScenarioReq {
    pub guid: String,
    pub project_id: String,
    pub environment_id: String,
    pub commit_info: CommitInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunScenarioReq {
    pub guid: String,
    pub project_id: String,
    pub environment_id: String,
    #[serde(default)]
    pub payload: Value,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScenarioService: Send + Sync {
    async fn create(&self, scenario: Scenario) -> Result<Scenario, Status>;

    async fn get(&self, request: GetScenarioReq) -> Result<Scenario, Status>;

    async fn get_list(&self, request: ListScenariosReq) -> Result<ScenarioList, Status>;

    async fn update(&self, scenario: Scenario) -> Result<Scenario, Status>;

    async fn delete(&self, request: DeleteScenarioReq) -> Result<(), Status>;

    async fn run(&self, request: RunScenarioReq) -> Result<Value, Status>;
}

pub struct GrpcScenarioService {
    client: GrpcClient,
}

impl GrpcScenarioService {
    pub fn new(client: GrpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScenarioService for GrpcScenarioService {
    async fn create(&self, scenario: Scenario) -> Result<Scenario, Status> {
        let reply: pb::Dag = self.client.unary(CREATE, pb::Dag::from(scenario)).await?;
        Ok(reply.into())
    }

    async fn get(&self, request: GetScenarioReq) -> Result<Scenario, Status> {
        let request = pb::GetDagReq {
            guid: request.guid,
            project_id: request.project_id,
            environment_id: request.environment_id,
        };
        let reply: pb::Dag = self.client.unary(GET, request).await?;
        Ok(reply.into())
    }

    async fn get_list(&self, request: ListScenariosReq) -> Result<ScenarioList, Status> {
        let request = pb::GetAllDagReq {
            project_id: request.project_id,
            environment_id: request.environment_id,
            category_id: request.category_id,
            limit: request.limit,
            offset: request.offset,
        };
        let reply: pb::DagList = self.client.unary(GET_LIST, request).await?;
        Ok(ScenarioList {
            scenarios: reply.dags.into_iter().map(Into::into).collect(),
            count: reply.count,
        })
    }

    async fn update(&self, scenario: Scenario) -> Result<Scenario, Status> {
        let reply: pb::Dag = self.client.unary(UPDATE, pb::Dag::from(scenario)).await?;
        Ok(reply.into())
    }

    async fn delete(&self, request: DeleteScenarioReq) -> Result<(), Status> {
        let request = pb::DeleteDagReq {
            guid: request.guid,
            project_id: request.project_id,
            environment_id: request.environment_id,
            commit_info: Some(request.commit_info.into()),
        };
        self.client.unary(DELETE, request).await
    }

    async fn run(&self, request: RunScenarioReq) -> Result<Value, Status> {
        let request = pb::RunScenarioReq {
            guid: request.guid,
            project_id: request.project_id,
            environment_id: request.environment_id,
            payload: Some(json_to_value(request.payload)),
        };
        let reply: pb::RunScenarioRes = self.client.unary(RUN, request).await?;
        Ok(reply.data.map(value_to_json).unwrap_or(Value::Null))
    }
}

impl From<Scenario> for pb::Dag {
    fn from(scenario: Scenario) -> Self {
        Self {
            guid: scenario.guid,
            project_id: scenario.project_id,
            environment_id: scenario.environment_id,
            commit_info: Some(scenario.commit_info.into()),
            attributes: Some(map_to_struct(scenario.attributes)),
        }
    }
}

impl From<pb::Dag> for Scenario {
    fn from(dag: pb::Dag) -> Self {
        Self {
            guid: dag.guid,
            project_id: dag.project_id,
            environment_id: dag.environment_id,
            commit_info: commit_from_wire(dag.commit_info),
            attributes: dag.attributes.map(struct_to_map).unwrap_or_default(),
        }
    }
}
