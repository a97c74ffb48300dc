// View-model reconciler.
//
// On a fixed cadence (or on demand), fetch the five backend views
// concurrently, settle them all, merge over the previous snapshot, and
// publish the replacement through a watch channel. One cycle at a
// time: a tick that fires while a cycle is in flight is skipped, not
// queued, so a slow backend cannot stack requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::dashboard::activity::ActivityLog;
use crate::dashboard::pending::PendingCommands;
use crate::dashboard::snapshot::{merge, FetchResults, Snapshot};

/// What happened to one requested cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetched, merged, published.
    Completed,
    /// Another cycle was already in flight; this one was dropped.
    Skipped,
    /// The reconciler was stopped while the fetches were in flight;
    /// their results were discarded unpublished.
    Discarded,
}

struct Inner {
    client: ApiClient,
    token: String,
    interval: Duration,
    stopped: AtomicBool,
    in_flight: AtomicBool,
    tx: watch::Sender<Arc<Snapshot>>,
    pending: PendingCommands,
    log: ActivityLog,
}

/// Cheap to clone; all clones drive the same snapshot.
#[derive(Clone)]
pub struct Reconciler {
    inner: Arc<Inner>,
}

impl Reconciler {
    pub fn new(
        client: ApiClient,
        token: String,
        interval: Duration,
        pending: PendingCommands,
        log: ActivityLog,
    ) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            inner: Arc::new(Inner {
                client,
                token,
                interval,
                stopped: AtomicBool::new(false),
                in_flight: AtomicBool::new(false),
                tx,
                pending,
                log,
            }),
        }
    }

    /// The current snapshot. Always complete and self-consistent;
    /// starts empty until the first cycle lands.
    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.tx.borrow().clone()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.tx.subscribe()
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.inner.log
    }

    pub fn pending(&self) -> &PendingCommands {
        &self.inner.pending
    }

    /// Run one cycle now, unless one is already in flight. Manual
    /// refreshes and the periodic timer both funnel through here, so
    /// they can never overlap.
    pub async fn reconcile_now(&self) -> CycleOutcome {
        if self
            .inner
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("reconciliation already in flight; skipping");
            return CycleOutcome::Skipped;
        }
        let outcome = self.run_cycle().await;
        self.inner.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run_cycle(&self) -> CycleOutcome {
        let client = &self.inner.client;
        let token = self.inner.token.as_str();

        // All five views of the same cycle, concurrently, all-settled.
        let (dashboard, files, network, nodes, running) = tokio::join!(
            client.fetch_dashboard(token),
            client.fetch_user_files(token),
            client.fetch_network_status(token),
            client.fetch_nodes(token),
            client.fetch_running_nodes(token),
        );

        // Torn down while fetching: nobody is consuming the snapshot
        // any more, so the results must not be written anywhere.
        if self.inner.stopped.load(Ordering::SeqCst) {
            debug!("reconciler stopped mid-cycle; discarding results");
            return CycleOutcome::Discarded;
        }

        let results = FetchResults {
            dashboard,
            files,
            network,
            nodes,
            running: running.map(|r| r.running_nodes),
        };

        let prev = self.current();
        let next = Arc::new(merge(&prev, results, &self.inner.log));
        self.inner.pending.resolve(&next);
        debug!(
            nodes = next.nodes.len(),
            running = next.running.len(),
            files = next.files.len(),
            "snapshot published"
        );
        self.inner.tx.send_replace(next);
        CycleOutcome::Completed
    }

    /// Periodic loop. The first tick fires immediately, so starting
    /// the loop is also the first reconciliation pass. Returns once
    /// `stop()` has been called.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.inner.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = self.inner.interval.as_secs(), "reconciler started");

        while !self.inner.stopped.load(Ordering::SeqCst) {
            ticker.tick().await;
            if self.inner.stopped.load(Ordering::SeqCst) {
                break;
            }
            self.reconcile_now().await;
        }
        info!("reconciler stopped");
    }

    /// Schedule a one-off refresh after `delay` — used to shorten the
    /// perceived latency of lifecycle commands without changing their
    /// correctness (the next periodic cycle would absorb them anyway).
    pub fn schedule_refresh(&self, delay: Duration) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !this.inner.stopped.load(Ordering::SeqCst) {
                this.reconcile_now().await;
            }
        });
    }

    /// Tear down: the run loop exits, and any cycle still in flight
    /// discards its results on arrival.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconciler() -> Reconciler {
        Reconciler::new(
            ApiClient::new("http://127.0.0.1:1").unwrap(),
            "tok".to_string(),
            Duration::from_secs(5),
            PendingCommands::new(),
            ActivityLog::new(),
        )
    }

    #[tokio::test]
    async fn test_in_flight_cycle_causes_skip() {
        let r = reconciler();
        // Simulate a cycle already holding the guard.
        r.inner.in_flight.store(true, Ordering::SeqCst);
        assert_eq!(r.reconcile_now().await, CycleOutcome::Skipped);

        // Guard released: the next request is processed (and fails
        // over to stale-retention against the unreachable backend).
        r.inner.in_flight.store(false, Ordering::SeqCst);
        assert_eq!(r.reconcile_now().await, CycleOutcome::Completed);
    }

    #[tokio::test]
    async fn test_stopped_reconciler_discards_results() {
        let r = reconciler();
        r.stop();
        assert_eq!(r.reconcile_now().await, CycleOutcome::Discarded);
        // Nothing was published.
        assert_eq!(*r.current(), Snapshot::default());
    }

    #[tokio::test]
    async fn test_all_fetches_failing_still_completes_with_empty_snapshot() {
        // Backend unreachable: every fetch fails, the cycle still
        // settles, and the snapshot keeps its previous (empty) values.
        let r = reconciler();
        assert_eq!(r.reconcile_now().await, CycleOutcome::Completed);
        assert_eq!(*r.current(), Snapshot::default());
        assert_eq!(r.activity().len(), 5); // one ERROR per resource
    }
}
