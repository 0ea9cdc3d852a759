//! Version-history recorder.
//!
//! Mutating handlers hand one entry per completed request to a single
//! background writer through a bounded queue. A full queue drops the entry
//! with a warning; the request never waits on history.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::services::{NodeType, ServiceBundle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Create,
    Update,
    Delete,
}

impl ActionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// One audit record of a mutating request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionHistoryEntry {
    pub node_type: NodeType,
    /// Resource-environment id of the resolved resource.
    pub project_id: String,
    /// URL of the request that produced the entry.
    pub action_source: String,
    pub action_type: ActionType,
    pub used_environments: BTreeSet<String>,
    pub user_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_slug: Option<String>,
    pub request: Value,
    /// Reply payload, or the error text when the request failed.
    pub response: Value,
}

enum Command {
    Record(Box<HistoryJob>),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

struct HistoryJob {
    bundle: Arc<ServiceBundle>,
    entry: VersionHistoryEntry,
}

/// Handle to the history writer. Cheap to clone.
#[derive(Clone)]
pub struct HistoryRecorder {
    tx: mpsc::Sender<Command>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl HistoryRecorder {
    /// Start the writer task.
    pub fn spawn(queue_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let worker = tokio::spawn(run_worker(rx));
        Self {
            tx,
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    /// Queue an entry written through the bundle's object builder.
    pub fn record(&self, bundle: Arc<ServiceBundle>, entry: VersionHistoryEntry) {
        let job = Box::new(HistoryJob { bundle, entry });
        match self.tx.try_send(Command::Record(job)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Version history queue is full, dropping entry");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Version history writer has stopped, dropping entry");
            }
        }
    }

    /// Wait until every entry queued before this call has been written.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }

    /// Write out the queue and stop the writer.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Version history writer panicked");
            }
        }
    }
}

async fn run_worker(mut rx: mpsc::Receiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Record(job) => write(*job).await,
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
            Command::Shutdown => {
                rx.close();
                while let Some(rest) = rx.recv().await {
                    match rest {
                        Command::Record(job) => write(*job).await,
                        Command::Flush(ack) => {
                            let _ = ack.send(());
                        }
                        Command::Shutdown => {}
                    }
                }
                break;
            }
        }
    }
    tracing::debug!("Version history writer stopped");
}

async fn write(job: HistoryJob) {
    let HistoryJob { bundle, entry } = job;
    let builder = bundle.builder_by_type(entry.node_type);
    let action = entry.action_type;
    if let Err(status) = builder.create_version_history(entry).await {
        tracing::warn!(
            namespace = %bundle.namespace,
            action = ?action,
            error = %status.message(),
            "Failed to write version history"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::object_builder::MockObjectBuilderService;
    use crate::test_support::bundle_with_builder;

    fn bundle_with(builder: MockObjectBuilderService) -> Arc<ServiceBundle> {
        Arc::new(bundle_with_builder(Arc::new(builder)))
    }

    fn entry(action_type: ActionType) -> VersionHistoryEntry {
        VersionHistoryEntry {
            node_type: NodeType::Default,
            project_id: "re-1".into(),
            action_source: "/v1/api-reference".into(),
            action_type,
            used_environments: BTreeSet::from(["env-1".to_string()]),
            user_info: "user-1".into(),
            table_slug: None,
            request: serde_json::json!({"guid": "g1"}),
            response: serde_json::json!({"guid": "g1"}),
        }
    }

    #[tokio::test]
    async fn test_entries_are_written_in_order() {
        let mut builder = MockObjectBuilderService::new();
        let mut seq = mockall::Sequence::new();
        builder
            .expect_create_version_history()
            .withf(|e| e.action_type == ActionType::Create)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        builder
            .expect_create_version_history()
            .withf(|e| e.action_type == ActionType::Delete)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let recorder = HistoryRecorder::spawn(8);
        let bundle = bundle_with(builder);
        recorder.record(Arc::clone(&bundle), entry(ActionType::Create));
        recorder.record(bundle, entry(ActionType::Delete));
        recorder.flush().await;
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let mut builder = MockObjectBuilderService::new();
        builder
            .expect_create_version_history()
            .times(2)
            .returning(|_| Err(tonic::Status::unavailable("builder down")));

        let recorder = HistoryRecorder::spawn(8);
        let bundle = bundle_with(builder);
        recorder.record(Arc::clone(&bundle), entry(ActionType::Update));
        recorder.record(bundle, entry(ActionType::Update));
        recorder.flush().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let mut builder = MockObjectBuilderService::new();
        builder
            .expect_create_version_history()
            .times(3)
            .returning(|_| Ok(()));

        let recorder = HistoryRecorder::spawn(8);
        let bundle = bundle_with(builder);
        for _ in 0..3 {
            recorder.record(Arc::clone(&bundle), entry(ActionType::Create));
        }
        recorder.shutdown().await;

        // after shutdown further entries are dropped, not written
        recorder.record(bundle, entry(ActionType::Create));
        recorder.flush().await;
    }

    #[test]
    fn test_entry_wire_format() {
        let json = serde_json::to_value(entry(ActionType::Update)).unwrap();
        assert_eq!(json["action_type"], "UPDATE");
        assert_eq!(json["node_type"], "DEFAULT");
        assert_eq!(json["used_environments"], serde_json::json!(["env-1"]));
        assert!(json.get("table_slug").is_none());
    }
}
