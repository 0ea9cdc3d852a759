//! Object-builder service client: item writes and version-history sink.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tonic::Status;

use crate::grpc::pb::object_builder_service as pb;
use crate::grpc::structs::{json_to_value, map_to_struct, struct_to_object};
use crate::grpc::GrpcClient;
use crate::history::VersionHistoryEntry;

const UPDATE_ITEM: &str = "/object_builder_service.ItemsService/Update";
const CREATE_VERSION_HISTORY: &str = "/object_builder_service.VersionHistoryService/Create";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateItemReq {
    pub table_slug: String,
    pub project_id: String,
    pub data: Map<String, Value>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectBuilderService: Send + Sync {
    async fn update_item(&self, request: UpdateItemReq) -> Result<Value, Status>;

    async fn create_version_history(&self, entry: VersionHistoryEntry) -> Result<(), Status>;
}

pub struct GrpcObjectBuilderService {
    client: GrpcClient,
}

impl GrpcObjectBuilderService {
    pub fn new(client: GrpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectBuilderService for GrpcObjectBuilderService {
    async fn update_item(&self, request: UpdateItemReq) -> Result<Value, Status> {
        let request = pb::CommonMessage {
            table_slug: request.table_slug,
            project_id: request.project_id,
            data: Some(map_to_struct(request.data)),
        };
        let reply: pb::CommonMessage = self.client.unary(UPDATE_ITEM, request).await?;
        Ok(struct_to_object(reply.data))
    }

    async fn create_version_history(&self, entry: VersionHistoryEntry) -> Result<(), Status> {
        self.client
            .unary(CREATE_VERSION_HISTORY, pb::VersionHistory::from(entry))
            .await
    }
}

impl From<VersionHistoryEntry> for pb::VersionHistory {
    fn from(entry: VersionHistoryEntry) -> Self {
        Self {
            node_type: entry.node_type.as_str().to_string(),
            project_id: entry.project_id,
            action_source: entry.action_source,
            action_type: entry.action_type.as_str().to_string(),
            used_environments: entry.used_environments.into_iter().collect(),
            user_info: entry.user_info,
            table_slug: entry.table_slug,
            request: Some(json_to_value(entry.request)),
            response: Some(json_to_value(entry.response)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ActionType;
    use crate::services::NodeType;
    use serde_json::json;
    use std::collections::BTreeSet;

    #[test]
    fn test_history_entry_on_the_wire() {
        let entry = VersionHistoryEntry {
            node_type: NodeType::Enterprise,
            project_id: "re-1".into(),
            action_source: "/v1/query".into(),
            action_type: ActionType::Delete,
            used_environments: BTreeSet::from(["e2".to_string(), "e1".to_string()]),
            user_info: "u1".into(),
            table_slug: None,
            request: json!({"guid": "g1"}),
            response: Value::String("backend down".into()),
        };
        let wire = pb::VersionHistory::from(entry);
        assert_eq!(wire.node_type, "ENTERPRISE");
        assert_eq!(wire.action_type, "DELETE");
        assert_eq!(wire.used_environments, vec!["e1", "e2"]);
        assert!(wire.table_slug.is_none());
        assert!(wire.response.is_some());
    }
}
