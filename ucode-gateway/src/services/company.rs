//! Company service client: service resources, resource environments, fares.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tonic::Status;

use super::{NodeType, ResourceType, ServiceType};
use crate::grpc::pb::company_service as pb;
use crate::grpc::structs::{object_to_struct, struct_to_object};
use crate::grpc::GrpcClient;

const GET_SINGLE_SERVICE_RESOURCE: &str =
    "/company_service.ServiceResourceService/GetSingle";
const GET_RESOURCE_ENVIRONMENT: &str = "/company_service.ResourceService/GetResourceEnvironment";
const CREATE_FARE: &str = "/company_service.BillingService/CreateFare";
const GET_FARE: &str = "/company_service.BillingService/GetFare";
const LIST_FARES: &str = "/company_service.BillingService/GetAllFares";
const UPDATE_FARE: &str = "/company_service.BillingService/UpdateFare";
const DELETE_FARE: &str = "/company_service.BillingService/DeleteFare";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetSingleServiceResourceReq {
    pub project_id: String,
    pub environment_id: String,
    pub service_type: ServiceType,
}

/// The backend resource serving a (project, environment, service type).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResource {
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub resource_environment_id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub environment_id: String,
    #[serde(default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub resource_type: ResourceType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetResourceEnvironmentReq {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FarePrimaryKey {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListFaresReq {
    pub limit: u32,
    pub offset: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyService: Send + Sync {
    async fn get_single_service_resource(
        &self,
        request: GetSingleServiceResourceReq,
    ) -> Result<ServiceResource, Status>;

    /// Resolve a resource-environment id back to its resource.
    async fn get_resource_environment(
        &self,
        request: GetResourceEnvironmentReq,
    ) -> Result<ServiceResource, Status>;

    async fn create_fare(&self, fare: Value) -> Result<Value, Status>;

    async fn get_fare(&self, request: FarePrimaryKey) -> Result<Value, Status>;

    async fn list_fares(&self, request: ListFaresReq) -> Result<Value, Status>;

    async fn update_fare(&self, fare: Value) -> Result<Value, Status>;

    async fn delete_fare(&self, request: FarePrimaryKey) -> Result<(), Status>;
}

pub struct GrpcCompanyService {
    client: GrpcClient,
}

impl GrpcCompanyService {
    pub fn new(client: GrpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompanyService for GrpcCompanyService {
    async fn get_single_service_resource(
        &self,
        request: GetSingleServiceResourceReq,
    ) -> Result<ServiceResource, Status> {
        let request = pb::GetSingleServiceResourceReq {
            project_id: request.project_id,
            environment_id: request.environment_id,
            service_type: pb::ServiceType::from(request.service_type).into(),
        };
        let reply: pb::ServiceResource = self
            .client
            .unary(GET_SINGLE_SERVICE_RESOURCE, request)
            .await?;
        Ok(reply.into())
    }

    async fn get_resource_environment(
        &self,
        request: GetResourceEnvironmentReq,
    ) -> Result<ServiceResource, Status> {
        let reply: pb::ServiceResource = self
            .client
            .unary(GET_RESOURCE_ENVIRONMENT, pb::PrimaryKey { id: request.id })
            .await?;
        Ok(reply.into())
    }

    async fn create_fare(&self, fare: Value) -> Result<Value, Status> {
        let reply: prost_types::Struct =
            self.client.unary(CREATE_FARE, object_to_struct(fare)?).await?;
        Ok(struct_to_object(Some(reply)))
    }

    async fn get_fare(&self, request: FarePrimaryKey) -> Result<Value, Status> {
        let reply: prost_types::Struct = self
            .client
            .unary(GET_FARE, pb::PrimaryKey { id: request.id })
            .await?;
        Ok(struct_to_object(Some(reply)))
    }

    async fn list_fares(&self, request: ListFaresReq) -> Result<Value, Status> {
        let request = pb::ListFaresReq {
            limit: request.limit,
            offset: request.offset,
        };
        let reply: prost_types::Struct = self.client.unary(LIST_FARES, request).await?;
        Ok(struct_to_object(Some(reply)))
    }

    async fn update_fare(&self, fare: Value) -> Result<Value, Status> {
        let reply: prost_types::Struct =
            self.client.unary(UPDATE_FARE, object_to_struct(fare)?).await?;
        Ok(struct_to_object(Some(reply)))
    }

    async fn delete_fare(&self, request: FarePrimaryKey) -> Result<(), Status> {
        self.client
            .unary(DELETE_FARE, pb::PrimaryKey { id: request.id })
            .await
    }
}

impl From<pb::ServiceResource> for ServiceResource {
    fn from(resource: pb::ServiceResource) -> Self {
        Self {
            resource_id: resource.resource_id,
            resource_environment_id: resource.resource_environment_id,
            project_id: resource.project_id,
            environment_id: resource.environment_id,
            node_type: NodeType::from(resource.node_type),
            resource_type: ResourceType::from(resource.resource_type),
        }
    }
}
