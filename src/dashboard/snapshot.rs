// The merged view model.
//
// One immutable snapshot per reconciliation cycle, replaced wholesale.
// Consumers hold an Arc to "the current snapshot"; they never see a
// half-merged one. Merging identical fetch results twice produces an
// identical snapshot.

use std::collections::HashSet;

use crate::api::{ApiError, FileEntry, NetworkStatus, Node, UserDashboard};
use crate::dashboard::activity::ActivityLog;
use crate::dashboard::pending::{PendingCommands, PendingKind};

/// Everything the dashboard renders, merged from the five backend
/// views fetched within one cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub dashboard: Option<UserDashboard>,
    pub files: Vec<FileEntry>,
    pub network: Option<NetworkStatus>,
    pub nodes: Vec<Node>,
    /// Raw running set from the same cycle as `nodes`. Ids here that
    /// are missing from the roster are kept for diagnostics but never
    /// rendered as nodes.
    pub running: HashSet<String>,
}

impl Snapshot {
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    /// Derived strictly from this snapshot's own running set — never
    /// from a previous cycle's.
    pub fn is_running(&self, node_id: &str) -> bool {
        self.running.contains(node_id)
    }

    /// Roster joined with the running set and pending markers, in
    /// roster order. Running-set ids without a roster entry are
    /// dropped (not yet visible, transient).
    pub fn node_views(&self, pending: &PendingCommands) -> Vec<NodeView<'_>> {
        self.nodes
            .iter()
            .map(|node| NodeView {
                is_running: self.is_running(&node.node_id),
                pending: pending.get(&node.node_id).map(|c| c.kind),
                node,
            })
            .collect()
    }
}

/// One rendered node card.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView<'a> {
    pub node: &'a Node,
    pub is_running: bool,
    pub pending: Option<PendingKind>,
}

/// The settled results of one cycle's five concurrent fetches. Each
/// failed independently or succeeded independently.
pub struct FetchResults {
    pub dashboard: Result<UserDashboard, ApiError>,
    pub files: Result<Vec<FileEntry>, ApiError>,
    pub network: Result<NetworkStatus, ApiError>,
    pub nodes: Result<Vec<Node>, ApiError>,
    pub running: Result<HashSet<String>, ApiError>,
}

/// Merge one cycle's results over the previous snapshot. A failed
/// fetch keeps the previous cached value for that resource (staleness,
/// not corruption) and records an ERROR log entry.
pub fn merge(prev: &Snapshot, results: FetchResults, log: &ActivityLog) -> Snapshot {
    Snapshot {
        dashboard: keep_on_failure(
            results.dashboard.map(Some),
            &prev.dashboard,
            "user dashboard",
            log,
        ),
        files: keep_on_failure(results.files, &prev.files, "file list", log),
        network: keep_on_failure(
            results.network.map(Some),
            &prev.network,
            "network status",
            log,
        ),
        nodes: keep_on_failure(results.nodes, &prev.nodes, "node roster", log),
        running: keep_on_failure(results.running, &prev.running, "running set", log),
    }
}

fn keep_on_failure<T: Clone>(
    result: Result<T, ApiError>,
    previous: &T,
    resource: &str,
    log: &ActivityLog,
) -> T {
    match result {
        Ok(fresh) => fresh,
        Err(e) => {
            log.error(format!("{resource} fetch failed: {e}"));
            previous.clone()
        }
    }
}
