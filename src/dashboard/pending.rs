// Pending-command markers.
//
// A lifecycle command never fabricates the state it hopes for; it just
// marks the node id as "applying" until a later snapshot confirms or
// contradicts the command. Markers that survive too many cycles are
// dropped so a silently ignored command cannot pin the indicator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::dashboard::snapshot::Snapshot;

/// How many completed cycles a marker may go unconfirmed.
const MAX_UNCONFIRMED_CYCLES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Start,
    Stop,
    Restart,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommand {
    pub kind: PendingKind,
    pub cycles_unconfirmed: u32,
}

/// Shared map of node id → pending command.
#[derive(Debug, Clone, Default)]
pub struct PendingCommands {
    inner: Arc<Mutex<HashMap<String, PendingCommand>>>,
}

impl PendingCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly issued command. A newer command on the same
    /// node replaces the older marker.
    pub fn mark(&self, node_id: &str, kind: PendingKind) {
        self.inner.lock().unwrap().insert(
            node_id.to_string(),
            PendingCommand {
                kind,
                cycles_unconfirmed: 0,
            },
        );
    }

    pub fn get(&self, node_id: &str) -> Option<PendingCommand> {
        self.inner.lock().unwrap().get(node_id).copied()
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }

    /// Called once per completed reconciliation cycle with the freshly
    /// merged snapshot. Drops markers the snapshot confirms (or
    /// contradicts — either way the authoritative state has spoken),
    /// ages the rest.
    pub fn resolve(&self, snapshot: &Snapshot) {
        let mut inner = self.inner.lock().unwrap();
        inner.retain(|node_id, cmd| {
            let in_roster = snapshot.node(node_id).is_some();
            let running = snapshot.is_running(node_id);
            let resolved = match cmd.kind {
                PendingKind::Start => in_roster && running,
                PendingKind::Restart => running,
                PendingKind::Stop => !running,
                PendingKind::Delete => !in_roster,
            };
            if resolved {
                return false;
            }
            cmd.cycles_unconfirmed += 1;
            cmd.cycles_unconfirmed < MAX_UNCONFIRMED_CYCLES
        });
    }
}
