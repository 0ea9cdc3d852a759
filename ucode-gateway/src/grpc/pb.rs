//! Protobuf messages of the backend services, one module per proto package.
//!
//! Free-form entity fields travel in a `google.protobuf.Struct` next to the
//! fields the gateway routes on. Methods without a reply return
//! `google.protobuf.Empty`, encoded as `()`.

pub mod common {
    use std::collections::HashMap;

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CommitInfo {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub commit_type: String,
        #[prost(string, tag = "3")]
        pub name: String,
        #[prost(string, tag = "4")]
        pub author_id: String,
        #[prost(string, tag = "5")]
        pub project_id: String,
        #[prost(string, tag = "6")]
        pub version_id: String,
        #[prost(string, repeated, tag = "7")]
        pub version_ids: Vec<String>,
        #[prost(map = "string, message", tag = "8")]
        pub version_infos: HashMap<String, super::versioning_service::VersionInfo>,
        #[prost(string, tag = "9")]
        pub created_at: String,
        #[prost(string, tag = "10")]
        pub updated_at: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HistoryReq {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub environment_id: String,
        #[prost(string, tag = "4")]
        pub resource_id: String,
        #[prost(string, tag = "5")]
        pub version_id: String,
        #[prost(string, tag = "6")]
        pub from_date: String,
        #[prost(string, tag = "7")]
        pub to_date: String,
        #[prost(string, tag = "8")]
        pub order_by: String,
        #[prost(string, tag = "9")]
        pub order: String,
        #[prost(uint32, tag = "10")]
        pub limit: u32,
        #[prost(uint32, tag = "11")]
        pub offset: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RevertReq {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub old_commit_id: String,
        #[prost(string, tag = "3")]
        pub version_id: String,
        #[prost(string, tag = "4")]
        pub project_id: String,
        #[prost(string, tag = "5")]
        pub environment_id: String,
        #[prost(string, tag = "6")]
        pub resource_id: String,
        #[prost(message, optional, tag = "7")]
        pub new_commit_info: Option<CommitInfo>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SelectVersionsReq {
        #[prost(string, repeated, tag = "1")]
        pub ids: Vec<String>,
        #[prost(string, tag = "2")]
        pub version_id: String,
        #[prost(string, tag = "3")]
        pub project_id: String,
        #[prost(string, tag = "4")]
        pub environment_id: String,
        #[prost(string, tag = "5")]
        pub resource_id: String,
        #[prost(message, optional, tag = "6")]
        pub commit_info: Option<CommitInfo>,
    }

    /// Lookup of one versioned entity, optionally at a version or commit.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetVersionedReq {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub resource_id: String,
        #[prost(string, tag = "4")]
        pub version_id: String,
        #[prost(string, tag = "5")]
        pub commit_id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeleteVersionedReq {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub environment_id: String,
        #[prost(string, tag = "4")]
        pub resource_id: String,
        #[prost(string, tag = "5")]
        pub version_id: String,
        #[prost(message, optional, tag = "6")]
        pub commit_info: Option<CommitInfo>,
    }
}

pub mod auth_service {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HasAccessSuperAdminReq {
        #[prost(string, tag = "1")]
        pub access_token: String,
        #[prost(string, tag = "2")]
        pub path: String,
        #[prost(string, tag = "3")]
        pub method: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HasAccessSuperAdminRes {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub user_id: String,
        #[prost(string, tag = "3")]
        pub client_type_id: String,
        #[prost(string, tag = "4")]
        pub role_id: String,
        #[prost(string, tag = "5")]
        pub project_id: String,
        #[prost(string, tag = "6")]
        pub env_id: String,
        #[prost(message, optional, tag = "7")]
        pub data: Option<::prost_types::Struct>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetEnvIdReq {
        #[prost(string, tag = "1")]
        pub id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetEnvIdRes {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub app_id: String,
        #[prost(string, tag = "3")]
        pub project_id: String,
        #[prost(string, tag = "4")]
        pub environment_id: String,
        #[prost(string, tag = "5")]
        pub client_type_id: String,
        #[prost(string, tag = "6")]
        pub role_id: String,
        #[prost(message, optional, tag = "7")]
        pub data: Option<::prost_types::Struct>,
    }
}

pub mod company_service {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ServiceType {
        BuilderService = 0,
        ApiRefService = 1,
        QueryService = 2,
        ScenarioService = 3,
        ChatService = 4,
        TranscoderService = 5,
        SmsService = 6,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum NodeType {
        Default = 0,
        Enterprise = 1,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ResourceType {
        Unspecified = 0,
        Postgresql = 1,
        Clickhouse = 2,
        Mongodb = 3,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetSingleServiceResourceReq {
        #[prost(string, tag = "1")]
        pub project_id: String,
        #[prost(string, tag = "2")]
        pub environment_id: String,
        #[prost(enumeration = "ServiceType", tag = "3")]
        pub service_type: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ServiceResource {
        #[prost(string, tag = "1")]
        pub resource_id: String,
        #[prost(string, tag = "2")]
        pub resource_environment_id: String,
        #[prost(string, tag = "3")]
        pub project_id: String,
        #[prost(string, tag = "4")]
        pub environment_id: String,
        #[prost(enumeration = "NodeType", tag = "5")]
        pub node_type: i32,
        #[prost(enumeration = "ResourceType", tag = "6")]
        pub resource_type: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PrimaryKey {
        #[prost(string, tag = "1")]
        pub id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ListFaresReq {
        #[prost(uint32, tag = "1")]
        pub limit: u32,
        #[prost(uint32, tag = "2")]
        pub offset: u32,
    }
}

pub mod versioning_service {
    use std::collections::HashMap;

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct VersionInfo {
        #[prost(string, tag = "1")]
        pub version_id: String,
        #[prost(bool, tag = "2")]
        pub as_code: bool,
        #[prost(string, tag = "3")]
        pub author_id: String,
        #[prost(string, tag = "4")]
        pub version: String,
        #[prost(string, tag = "5")]
        pub desc: String,
        #[prost(bool, tag = "6")]
        pub is_current: bool,
        #[prost(string, tag = "7")]
        pub created_at: String,
        #[prost(string, tag = "8")]
        pub updated_at: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetMultipleVersionInfoReq {
        #[prost(string, repeated, tag = "1")]
        pub version_ids: Vec<String>,
        #[prost(string, tag = "2")]
        pub project_id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetMultipleVersionInfoRes {
        #[prost(map = "string, message", tag = "1")]
        pub version_infos: HashMap<String, VersionInfo>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetCurrentActiveReq {
        #[prost(string, tag = "1")]
        pub project_id: String,
        #[prost(string, tag = "2")]
        pub environment_id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Release {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub environment_id: String,
        #[prost(string, tag = "4")]
        pub version: String,
        #[prost(bool, tag = "5")]
        pub is_current: bool,
    }
}

pub mod api_reference_service {
    use super::common::CommitInfo;

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ApiReference {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub environment_id: String,
        #[prost(string, tag = "4")]
        pub resource_id: String,
        #[prost(string, tag = "5")]
        pub version_id: String,
        #[prost(string, tag = "6")]
        pub commit_id: String,
        #[prost(message, optional, tag = "7")]
        pub commit_info: Option<CommitInfo>,
        #[prost(message, optional, tag = "8")]
        pub attributes: Option<::prost_types::Struct>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetListReq {
        #[prost(string, tag = "1")]
        pub project_id: String,
        #[prost(string, tag = "2")]
        pub environment_id: String,
        #[prost(string, tag = "3")]
        pub resource_id: String,
        #[prost(string, tag = "4")]
        pub category_id: String,
        #[prost(string, tag = "5")]
        pub search: String,
        #[prost(string, tag = "6")]
        pub version_id: String,
        #[prost(uint32, tag = "7")]
        pub limit: u32,
        #[prost(uint32, tag = "8")]
        pub offset: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ApiReferenceList {
        #[prost(message, repeated, tag = "1")]
        pub api_references: Vec<ApiReference>,
        #[prost(int64, tag = "2")]
        pub count: i64,
    }
}

pub mod query_service {
    use super::common::CommitInfo;

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Query {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub environment_id: String,
        #[prost(string, tag = "4")]
        pub resource_id: String,
        #[prost(string, tag = "5")]
        pub folder_id: String,
        #[prost(string, tag = "6")]
        pub version_id: String,
        #[prost(string, tag = "7")]
        pub commit_id: String,
        #[prost(message, optional, tag = "8")]
        pub commit_info: Option<CommitInfo>,
        #[prost(message, optional, tag = "9")]
        pub attributes: Option<::prost_types::Struct>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetQueriesReq {
        #[prost(string, tag = "1")]
        pub project_id: String,
        #[prost(string, tag = "2")]
        pub environment_id: String,
        #[prost(string, tag = "3")]
        pub resource_id: String,
        #[prost(string, tag = "4")]
        pub folder_id: String,
        #[prost(string, tag = "5")]
        pub search: String,
        #[prost(string, tag = "6")]
        pub version_id: String,
        #[prost(uint32, tag = "7")]
        pub limit: u32,
        #[prost(uint32, tag = "8")]
        pub offset: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct QueryList {
        #[prost(message, repeated, tag = "1")]
        pub queries: Vec<Query>,
        #[prost(int64, tag = "2")]
        pub count: i64,
    }
}

pub mod scenario_service {
    use super::common::CommitInfo;

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Dag {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub environment_id: String,
        #[prost(message, optional, tag = "4")]
        pub commit_info: Option<CommitInfo>,
        #[prost(message, optional, tag = "5")]
        pub attributes: Option<::prost_types::Struct>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetDagReq {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub environment_id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetAllDagReq {
        #[prost(string, tag = "1")]
        pub project_id: String,
        #[prost(string, tag = "2")]
        pub environment_id: String,
        #[prost(string, tag = "3")]
        pub category_id: String,
        #[prost(uint32, tag = "4")]
        pub limit: u32,
        #[prost(uint32, tag = "5")]
        pub offset: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DagList {
        #[prost(message, repeated, tag = "1")]
        pub dags: Vec<Dag>,
        #[prost(int64, tag = "2")]
        pub count: i64,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeleteDagReq {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub environment_id: String,
        #[prost(message, optional, tag = "4")]
        pub commit_info: Option<CommitInfo>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RunScenarioReq {
        #[prost(string, tag = "1")]
        pub guid: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub environment_id: String,
        #[prost(message, optional, tag = "4")]
        pub payload: Option<::prost_types::Value>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RunScenarioRes {
        #[prost(message, optional, tag = "1")]
        pub data: Option<::prost_types::Value>,
    }
}

pub mod chat_service {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetChatListReq {
        #[prost(string, tag = "1")]
        pub project_id: String,
        #[prost(string, tag = "2")]
        pub environment_id: String,
        #[prost(string, tag = "3")]
        pub user_id: String,
        #[prost(string, tag = "4")]
        pub search: String,
        #[prost(uint32, tag = "5")]
        pub limit: u32,
        #[prost(uint32, tag = "6")]
        pub offset: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetChatByChatIdReq {
        #[prost(string, tag = "1")]
        pub chat_id: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub environment_id: String,
    }
}

pub mod sms_service {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SendSmsReq {
        #[prost(string, tag = "1")]
        pub recipient: String,
        #[prost(string, tag = "2")]
        pub kind: String,
        #[prost(string, tag = "3")]
        pub text: String,
        #[prost(uint32, tag = "4")]
        pub otp_length: u32,
        #[prost(string, tag = "5")]
        pub project_id: String,
        #[prost(string, tag = "6")]
        pub environment_id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SendSmsRes {
        #[prost(string, tag = "1")]
        pub sms_id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ConfirmOtpReq {
        #[prost(string, tag = "1")]
        pub sms_id: String,
        #[prost(string, tag = "2")]
        pub otp: String,
    }
}

pub mod object_builder_service {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CommonMessage {
        #[prost(string, tag = "1")]
        pub table_slug: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(message, optional, tag = "3")]
        pub data: Option<::prost_types::Struct>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct VersionHistory {
        #[prost(string, tag = "1")]
        pub node_type: String,
        #[prost(string, tag = "2")]
        pub project_id: String,
        #[prost(string, tag = "3")]
        pub action_source: String,
        #[prost(string, tag = "4")]
        pub action_type: String,
        #[prost(string, repeated, tag = "5")]
        pub used_environments: Vec<String>,
        #[prost(string, tag = "6")]
        pub user_info: String,
        #[prost(string, optional, tag = "7")]
        pub table_slug: Option<String>,
        #[prost(message, optional, tag = "8")]
        pub request: Option<::prost_types::Value>,
        #[prost(message, optional, tag = "9")]
        pub response: Option<::prost_types::Value>,
    }
}
