use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::*;
use crate::clock::Clock;
use crate::error::{SyncError, SyncResult};
use crate::model::ClientConfig;
use crate::remote::LocalService;

const MIN_TICK: Duration = Duration::from_millis(1);

/// Background loop that keeps a [`StatusBoard`] current.
pub struct StatusPoller {
    service: Arc<dyn LocalService>,
    board: Arc<StatusBoard>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    tick: Duration,
    username_max: usize,
    running: Arc<AtomicBool>,
    refresh: Arc<AtomicBool>,
}

impl StatusPoller {
    pub fn new(
        service: Arc<dyn LocalService>,
        board: Arc<StatusBoard>,
        clock: Arc<dyn Clock>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            service,
            board,
            clock,
            interval: config.poll_interval(),
            tick: config.poll_tick().max(MIN_TICK),
            username_max: config.username_display_max,
            running: Arc::new(AtomicBool::new(false)),
            refresh: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs one probe cycle and publishes its result. A panic inside the
    /// probes counts as "unreachable" for this cycle.
    pub fn poll_once(&self) -> StatusSnapshot {
        let snapshot = catch_unwind(AssertUnwindSafe(|| self.probe())).unwrap_or_else(|_| {
            warn!("status probe panicked; treating service as unreachable");
            StatusSnapshot::unreachable()
        });

        let previous = self.board.snapshot();
        if previous.service_reachable != snapshot.service_reachable {
            info!(reachable = snapshot.service_reachable, "service reachability changed");
        }
        self.board.publish(snapshot.clone());
        snapshot
    }

    fn probe(&self) -> StatusSnapshot {
        if let Err(err) = self.service.health() {
            debug!(%err, "health check failed");
            return StatusSnapshot::unreachable();
        }
        match self.service.auth_status() {
            Ok(auth) => StatusSnapshot::reachable(Some(&auth), self.username_max),
            Err(err) => {
                debug!(%err, "auth status failed");
                StatusSnapshot::reachable(None, self.username_max)
            }
        }
    }

    fn run_loop(&self) {
        while self.running.load(Ordering::SeqCst) {
            self.poll_once();
            self.sleep_interval();
        }
        debug!("status poller stopped");
    }

    /// Sleeps one interval in `tick` steps, returning early on shutdown or a
    /// refresh request.
    fn sleep_interval(&self) {
        let mut slept = Duration::ZERO;
        while slept < self.interval {
            if !self.running.load(Ordering::SeqCst) {
                return;
            }
            if self.refresh.swap(false, Ordering::SeqCst) {
                return;
            }
            let step = self.tick.min(self.interval - slept);
            self.clock.sleep(step);
            slept += step;
        }
    }

    pub fn spawn(self) -> SyncResult<PollerHandle> {
        let board = Arc::clone(&self.board);
        let running = Arc::clone(&self.running);
        let refresh = Arc::clone(&self.refresh);
        running.store(true, Ordering::SeqCst);
        let thread = std::thread::Builder::new()
            .name("draftlink-status".to_string())
            .spawn(move || self.run_loop())
            .map_err(|e| SyncError::Invariant(format!("spawn status poller: {e}")))?;
        Ok(PollerHandle {
            board,
            running,
            refresh,
            thread: Some(thread),
        })
    }
}

/// Owner-side view of a spawned poller. Dropping it stops the loop.
pub struct PollerHandle {
    board: Arc<StatusBoard>,
    running: Arc<AtomicBool>,
    refresh: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.board.snapshot()
    }

    /// Wakes the poller so the next cycle starts within one tick.
    pub fn refresh_now(&self) {
        self.refresh.store(true, Ordering::SeqCst);
    }

    /// Clears the run flag and returns at once; the thread exits on its own
    /// within one tick (or one in-flight request timeout).
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // detach rather than join
        self.thread.take();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "../tests/status/poller_tests.rs"]
mod tests;
