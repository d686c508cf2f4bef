//! Service reachability and login state, refreshed off the interactive thread.

use std::sync::{Arc, RwLock};

use crate::model::StatusSnapshot;

mod poller;
pub use self::poller::{PollerHandle, StatusPoller};

/// Last published [`StatusSnapshot`]. Writers swap the whole value; readers
/// never see a half-updated snapshot and never touch the network.
#[derive(Debug, Default)]
pub struct StatusBoard {
    current: RwLock<Arc<StatusSnapshot>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub(crate) fn publish(&self, snapshot: StatusSnapshot) {
        let next = Arc::new(snapshot);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
