//! Auth service client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tonic::Status;

use crate::grpc::pb::auth_service as pb;
use crate::grpc::structs::struct_to_map;
use crate::grpc::GrpcClient;

const HAS_ACCESS_SUPER_ADMIN: &str = "/auth_service.SessionService/HasAccessSuperAdmin";
const GET_ENV_ID: &str = "/auth_service.ApiKeysService/GetEnvID";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HasAccessSuperAdminReq {
    pub access_token: String,
    pub path: String,
    pub method: String,
}

/// Session attached to a bearer token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HasAccessSuperAdminRes {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub client_type_id: String,
    #[serde(default)]
    pub role_id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub env_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetEnvIdReq {
    pub id: String,
}

/// Record bound to an API key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub environment_id: String,
    #[serde(default)]
    pub client_type_id: String,
    #[serde(default)]
    pub role_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Validate a bearer token against the normalized route.
    async fn has_access_super_admin(
        &self,
        request: HasAccessSuperAdminReq,
    ) -> Result<HasAccessSuperAdminRes, Status>;

    /// Look up the record an API key is bound to.
    async fn get_env_id(&self, request: GetEnvIdReq) -> Result<ApiKeyRecord, Status>;
}

pub struct GrpcAuthService {
    client: GrpcClient,
}

impl GrpcAuthService {
    pub fn new(client: GrpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthService for GrpcAuthService {
    async fn has_access_super_admin(
        &self,
        request: HasAccessSuperAdminReq,
    ) -> Result<HasAccessSuperAdminRes, Status> {
        let request = pb::HasAccessSuperAdminReq {
            access_token: request.access_token,
            path: request.path,
            method: request.method,
        };
        let reply: pb::HasAccessSuperAdminRes =
            self.client.unary(HAS_ACCESS_SUPER_ADMIN, request).await?;
        Ok(reply.into())
    }

    async fn get_env_id(&self, request: GetEnvIdReq) -> Result<ApiKeyRecord, Status> {
        let reply: pb::GetEnvIdRes = self
            .client
            .unary(GET_ENV_ID, pb::GetEnvIdReq { id: request.id })
            .await?;
        Ok(reply.into())
    }
}

impl From<pb::HasAccessSuperAdminRes> for HasAccessSuperAdminRes {
    fn from(res: pb::HasAccessSuperAdminRes) -> Self {
        Self {
            id: res.id,
            user_id: res.user_id,
            client_type_id: res.client_type_id,
            role_id: res.role_id,
            project_id: res.project_id,
            env_id: res.env_id,
            extra: res.data.map(struct_to_map).unwrap_or_default(),
        }
    }
}

impl From<pb::GetEnvIdRes> for ApiKeyRecord {
    fn from(res: pb::GetEnvIdRes) -> Self {
        Self {
            id: res.id,
            app_id: res.app_id,
            project_id: res.project_id,
            environment_id: res.environment_id,
            client_type_id: res.client_type_id,
            role_id: res.role_id,
            extra: res.data.map(struct_to_map).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grpc::structs::map_to_struct;
    use serde_json::json;

    #[test]
    fn test_session_extra_claims_come_from_data() {
        let Value::Object(data) = json!({"namespace": "tenant-a"}) else {
            unreachable!()
        };
        let session = HasAccessSuperAdminRes::from(pb::HasAccessSuperAdminRes {
            user_id: "u1".into(),
            project_id: "p1".into(),
            data: Some(map_to_struct(data)),
            ..Default::default()
        });
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.extra["namespace"], "tenant-a");
    }

    #[test]
    fn test_api_key_record_without_data() {
        let record = ApiKeyRecord::from(pb::GetEnvIdRes {
            app_id: "app".into(),
            environment_id: "env".into(),
            ..Default::default()
        });
        assert_eq!(record.app_id, "app");
        assert!(record.extra.is_empty());
    }
}
