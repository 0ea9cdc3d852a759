//! Version-info enrichment for versioned-entity reads.
//!
//! One batched `GetMultipleVersionInfo` call per response, no matter how many
//! entities it carries.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::commit::CommitInfo;
use crate::context::detached;
use crate::response::ApiResult;
use crate::services::versioning::{GetMultipleVersionInfoReq, VersionInfo, VersioningService};

/// An entity carrying a commit envelope.
pub trait Versioned {
    fn commit_info(&self) -> &CommitInfo;
    fn commit_info_mut(&mut self) -> &mut CommitInfo;
}

/// Fill each entity's `version_infos` from one batched lookup.
///
/// Ids the backend does not return are left out; nothing is synthesized.
pub async fn enrich_version_infos<T: Versioned>(
    versioning: &dyn VersioningService,
    project_id: &str,
    entities: &mut [T],
) -> ApiResult<()> {
    let ids: BTreeSet<&str> = entities
        .iter()
        .flat_map(|e| e.commit_info().version_ids.iter().map(String::as_str))
        .collect();

    let found = if ids.is_empty() {
        HashMap::new()
    } else {
        versioning
            .get_multiple_version_info(GetMultipleVersionInfoReq {
                version_ids: ids.into_iter().map(str::to_string).collect(),
                project_id: project_id.to_string(),
            })
            .await?
            .version_infos
    };

    for entity in entities.iter_mut() {
        splice(entity.commit_info_mut(), &found);
    }
    Ok(())
}

/// [`enrich_version_infos`] on a task that outlives client cancellation.
pub async fn enrich_detached<T>(
    versioning: Arc<dyn VersioningService>,
    project_id: String,
    mut entities: Vec<T>,
) -> ApiResult<Vec<T>>
where
    T: Versioned + Send + 'static,
{
    detached(async move {
        enrich_version_infos(versioning.as_ref(), &project_id, &mut entities).await?;
        Ok(entities)
    })
    .await?
}

fn splice(commit: &mut CommitInfo, found: &HashMap<String, VersionInfo>) {
    commit.version_infos = commit
        .version_ids
        .iter()
        .filter_map(|id| found.get(id).map(|info| (id.clone(), info.clone())))
        .collect();
}
