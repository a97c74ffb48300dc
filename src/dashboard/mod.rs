// Dashboard state synchronization
// Public interface for the reconciler, snapshot model, pending-command
// markers, and the activity log

mod activity;
mod pending;
mod reconciler;
mod snapshot;

pub use activity::{ActivityLog, LogEntry, LogLevel};
pub use pending::{PendingCommand, PendingCommands, PendingKind};
pub use reconciler::{CycleOutcome, Reconciler};
pub use snapshot::{merge, FetchResults, NodeView, Snapshot};
