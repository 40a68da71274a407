//! In-memory backend used for the seeded demo variant and tests.
//!
//! # Invariants
//! - Cloning the backend yields another handle onto the same tables, the way
//!   a second session talks to the same hosted service.
//! - Commits never fail.
//! - Every committed change is broadcast to every live subscriber, the
//!   committing session included.

use super::{Backend, BackendResult, Change, Snapshot};
use log::debug;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Shared {
    tables: Snapshot,
    subscribers: Vec<Sender<Change>>,
}

/// Shared in-memory tables with a broadcast push channel.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose tables start as `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                tables: snapshot,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Number of live push-channel subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load_snapshot(&self) -> BackendResult<Snapshot> {
        Ok(self.lock().tables.clone())
    }

    fn commit(&mut self, changes: &[Change]) -> BackendResult<()> {
        let mut shared = self.lock();
        for change in changes {
            shared.tables.apply(change);
        }
        shared.subscribers.retain(|subscriber| {
            changes
                .iter()
                .all(|change| subscriber.send(change.clone()).is_ok())
        });
        debug!(
            "event=backend_commit module=backend status=ok backend=memory changes={} subscribers={}",
            changes.len(),
            shared.subscribers.len()
        );
        Ok(())
    }

    fn subscribe(&mut self) -> Option<Receiver<Change>> {
        let (sender, receiver) = mpsc::channel();
        self.lock().subscribers.push(sender);
        Some(receiver)
    }
}
