// Node lifecycle commands.
//
// Every command is fire-and-forget past the HTTP acknowledgment: no
// optimistic node objects are fabricated, only a pending marker per
// node id. The authoritative outcome arrives with the next
// reconciliation, which these commands merely schedule sooner.

use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{ApiClient, ApiError, NodeResources, StartNodeRequest};
use crate::dashboard::{PendingKind, Reconciler};

/// How long after a start/restart to poll again. The backend takes a
/// moment before a fresh node shows up in the roster.
const STARTUP_REPOLL: Duration = Duration::from_secs(3);

pub struct NodeLifecycleController {
    client: ApiClient,
    token: String,
    reconciler: Reconciler,
}

impl NodeLifecycleController {
    pub fn new(client: ApiClient, token: String, reconciler: Reconciler) -> Self {
        Self {
            client,
            token,
            reconciler,
        }
    }

    /// Start a brand-new node. The id is client-generated; collision
    /// probability is accepted, not checked. Returns the id so the
    /// caller can watch for it in upcoming snapshots.
    pub async fn start(&self, resources: Option<NodeResources>) -> Result<String, ApiError> {
        let snapshot = self.reconciler.current();
        let resources = resources.unwrap_or_else(|| NodeResources {
            // Ports are allocated upward from the backend's first gRPC
            // port, one per roster entry.
            port: 50051 + snapshot.nodes.len() as u16,
            ..NodeResources::default()
        });
        let node_id = format!("node-{}", &Uuid::new_v4().simple().to_string()[..8]);

        let req = StartNodeRequest {
            node_id: node_id.clone(),
            resources,
        };
        match self.client.start_node(&self.token, &req).await {
            Ok(ack) => {
                info!(node_id, port = resources.port, "start accepted");
                self.reconciler.pending().mark(&node_id, PendingKind::Start);
                self.reconciler.activity().success(
                    ack.message
                        .unwrap_or_else(|| format!("Node {node_id} started successfully!")),
                );
                self.reconciler.schedule_refresh(STARTUP_REPOLL);
                Ok(node_id)
            }
            Err(e) => {
                warn!(node_id, error = %e, "start rejected");
                self.reconciler
                    .activity()
                    .error(format!("Failed to start node {node_id}: {e}"));
                Err(e)
            }
        }
    }

    pub async fn stop(&self, node_id: &str) -> Result<(), ApiError> {
        self.require_known(node_id)?;
        match self.client.stop_node(&self.token, node_id).await {
            Ok(_) => {
                self.reconciler.pending().mark(node_id, PendingKind::Stop);
                self.reconciler
                    .activity()
                    .success(format!("Node {node_id} stopped"));
                self.reconciler.schedule_refresh(Duration::ZERO);
                Ok(())
            }
            Err(e) => {
                self.reconciler
                    .activity()
                    .error(format!("Failed to stop node {node_id}: {e}"));
                Err(e)
            }
        }
    }

    /// Restart, forwarding the node's declared resources from the
    /// cached roster so the backend preserves its identity across the
    /// cycle. A backend that drops the identity anyway has broken its
    /// contract; the client reports that, it does not repair it.
    pub async fn restart(&self, node_id: &str) -> Result<(), ApiError> {
        let node = self.require_known(node_id)?;
        let defaults = NodeResources::default();
        let resources = NodeResources {
            port: node.port.unwrap_or(defaults.port),
            storage_gb: node.storage_gb.unwrap_or(defaults.storage_gb),
            ram_gb: node.ram_gb.unwrap_or(defaults.ram_gb),
        };

        match self
            .client
            .restart_node(&self.token, node_id, &resources)
            .await
        {
            Ok(_) => {
                self.reconciler.pending().mark(node_id, PendingKind::Restart);
                self.reconciler
                    .activity()
                    .success(format!("Node {node_id} restarted"));
                self.reconciler.schedule_refresh(STARTUP_REPOLL);
                Ok(())
            }
            Err(e) => {
                self.reconciler
                    .activity()
                    .error(format!("Failed to restart node {node_id}: {e}"));
                Err(e)
            }
        }
    }

    pub async fn delete(&self, node_id: &str) -> Result<(), ApiError> {
        self.require_known(node_id)?;
        match self.client.delete_node(&self.token, node_id).await {
            Ok(()) => {
                self.reconciler.pending().mark(node_id, PendingKind::Delete);
                self.reconciler
                    .activity()
                    .success(format!("Node {node_id} deleted"));
                self.reconciler.schedule_refresh(Duration::ZERO);
                Ok(())
            }
            Err(e) => {
                self.reconciler
                    .activity()
                    .error(format!("Failed to delete node {node_id}: {e}"));
                Err(e)
            }
        }
    }

    /// Delete every node the cached roster knows about.
    pub async fn delete_all(&self) -> Result<(), ApiError> {
        let snapshot = self.reconciler.current();
        if snapshot.nodes.is_empty() {
            return Err(ApiError::NotFound("no nodes in roster".to_string()));
        }
        match self.client.delete_all_nodes(&self.token).await {
            Ok(()) => {
                for node in &snapshot.nodes {
                    self.reconciler
                        .pending()
                        .mark(&node.node_id, PendingKind::Delete);
                }
                self.reconciler.activity().success("All nodes stopped");
                self.reconciler.schedule_refresh(Duration::ZERO);
                Ok(())
            }
            Err(e) => {
                self.reconciler
                    .activity()
                    .error(format!("Failed to stop all nodes: {e}"));
                Err(e)
            }
        }
    }

    /// Client-side guard: commands against ids the cached roster does
    /// not know fail fast, before any network round trip.
    fn require_known(&self, node_id: &str) -> Result<crate::api::Node, ApiError> {
        self.reconciler
            .current()
            .node(node_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(node_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{ActivityLog, PendingCommands};

    fn controller() -> NodeLifecycleController {
        // Unreachable backend: only the client-side guards are under
        // test here, and they must fail before any network call.
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let reconciler = Reconciler::new(
            client.clone(),
            "tok".to_string(),
            Duration::from_secs(5),
            PendingCommands::new(),
            ActivityLog::new(),
        );
        NodeLifecycleController::new(client, "tok".to_string(), reconciler)
    }

    #[tokio::test]
    async fn test_stop_unknown_node_fails_fast() {
        let c = controller();
        let err = c.stop("n1").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(id) if id == "n1"));
    }

    #[tokio::test]
    async fn test_restart_and_delete_unknown_node_fail_fast() {
        let c = controller();
        assert!(matches!(
            c.restart("ghost").await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            c.delete("ghost").await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_delete_all_with_empty_roster_fails_fast() {
        let c = controller();
        assert!(matches!(
            c.delete_all().await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }
}
