//! Conversions between domain types and the protobuf messages in
//! [`crate::grpc::pb`] shared by more than one service.

use crate::commit::{CommitInfo, CommitType};
use crate::grpc::pb::{common, company_service, versioning_service};

use super::versioning::VersionInfo;
use super::{HistoryReq, NodeType, ResourceType, RevertReq, SelectVersionsReq, ServiceType};

impl From<CommitInfo> for common::CommitInfo {
    fn from(info: CommitInfo) -> Self {
        Self {
            guid: info.guid,
            commit_type: info.commit_type.as_str().to_string(),
            name: info.name,
            author_id: info.author_id,
            project_id: info.project_id,
            version_id: info.version_id,
            version_ids: info.version_ids,
            version_infos: info
                .version_infos
                .into_iter()
                .map(|(id, info)| (id, info.into()))
                .collect(),
            created_at: info.created_at,
            updated_at: info.updated_at,
        }
    }
}

impl From<common::CommitInfo> for CommitInfo {
    fn from(info: common::CommitInfo) -> Self {
        let commit_type = match info.commit_type.as_str() {
            "SCENARIO" => CommitType::Scenario,
            _ => CommitType::Field,
        };
        Self {
            guid: info.guid,
            commit_type,
            name: info.name,
            author_id: info.author_id,
            project_id: info.project_id,
            version_id: info.version_id,
            version_ids: info.version_ids,
            version_infos: info
                .version_infos
                .into_iter()
                .map(|(id, info)| (id, info.into()))
                .collect(),
            created_at: info.created_at,
            updated_at: info.updated_at,
        }
    }
}

impl From<VersionInfo> for versioning_service::VersionInfo {
    fn from(info: VersionInfo) -> Self {
        Self {
            version_id: info.version_id,
            as_code: info.as_code,
            author_id: info.author_id,
            version: info.version,
            desc: info.desc,
            is_current: info.is_current,
            created_at: info.created_at,
            updated_at: info.updated_at,
        }
    }
}

impl From<versioning_service::VersionInfo> for VersionInfo {
    fn from(info: versioning_service::VersionInfo) -> Self {
        Self {
            version_id: info.version_id,
            as_code: info.as_code,
            author_id: info.author_id,
            version: info.version,
            desc: info.desc,
            is_current: info.is_current,
            created_at: info.created_at,
            updated_at: info.updated_at,
        }
    }
}

/// Commit envelope of a reply; absent means empty.
pub(crate) fn commit_from_wire(info: Option<common::CommitInfo>) -> CommitInfo {
    info.map(Into::into).unwrap_or_default()
}

impl From<HistoryReq> for common::HistoryReq {
    fn from(req: HistoryReq) -> Self {
        Self {
            guid: req.guid,
            project_id: req.project_id,
            environment_id: req.environment_id,
            resource_id: req.resource_id,
            version_id: req.version_id,
            from_date: req.from_date,
            to_date: req.to_date,
            order_by: req.order_by,
            order: req.order,
            limit: req.limit,
            offset: req.offset,
        }
    }
}

impl From<RevertReq> for common::RevertReq {
    fn from(req: RevertReq) -> Self {
        Self {
            guid: req.guid,
            old_commit_id: req.old_commit_id,
            version_id: req.version_id,
            project_id: req.project_id,
            environment_id: req.environment_id,
            resource_id: req.resource_id,
            new_commit_info: Some(req.new_commit_info.into()),
        }
    }
}

impl From<SelectVersionsReq> for common::SelectVersionsReq {
    fn from(req: SelectVersionsReq) -> Self {
        Self {
            ids: req.ids,
            version_id: req.version_id,
            project_id: req.project_id,
            environment_id: req.environment_id,
            resource_id: req.resource_id,
            commit_info: Some(req.commit_info.into()),
        }
    }
}

impl From<ServiceType> for company_service::ServiceType {
    fn from(service_type: ServiceType) -> Self {
        match service_type {
            ServiceType::BuilderService => Self::BuilderService,
            ServiceType::ApiRefService => Self::ApiRefService,
            ServiceType::QueryService => Self::QueryService,
            ServiceType::ScenarioService => Self::ScenarioService,
            ServiceType::ChatService => Self::ChatService,
            ServiceType::TranscoderService => Self::TranscoderService,
            ServiceType::SmsService => Self::SmsService,
        }
    }
}

impl From<i32> for NodeType {
    fn from(value: i32) -> Self {
        match company_service::NodeType::try_from(value) {
            Ok(company_service::NodeType::Enterprise) => Self::Enterprise,
            _ => Self::Default,
        }
    }
}

impl From<i32> for ResourceType {
    fn from(value: i32) -> Self {
        match company_service::ResourceType::try_from(value) {
            Ok(company_service::ResourceType::Postgresql) => Self::Postgresql,
            Ok(company_service::ResourceType::Clickhouse) => Self::Clickhouse,
            Ok(company_service::ResourceType::Mongodb) => Self::Mongodb,
            _ => Self::Unspecified,
        }
    }
}
