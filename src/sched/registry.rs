//! Worker registry.
//!
//! Maps an entity id to the cancellation handle of its active worker.
//! This is the only structure touched from two execution contexts (the
//! event-dispatch path inserts and removes; workers are spawned from it),
//! hence the concurrent map.

use crate::config::Config;
use crate::link::ClientId;
use crate::sched::{spawn_probe, Probe};
use dashmap::DashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Live workers keyed by entity id. One registry per monitor variant, so
/// the invariant is at most one live worker per (entity, variant) pair.
#[derive(Default)]
pub struct WorkerRegistry {
    workers: DashMap<ClientId, CancellationToken>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a worker for the entity and track its handle. The probe's
    /// first cycle is scheduled before the handle becomes visible, so a
    /// registered worker is always a scheduled one. A displaced
    /// predecessor (duplicate appear) is cancelled.
    pub fn watch<P: Probe>(&self, config: &Arc<Config>, id: ClientId, probe: P) {
        let token = CancellationToken::new();
        spawn_probe(Arc::clone(config), token.clone(), probe);
        if let Some(previous) = self.workers.insert(id, token) {
            previous.cancel();
        }
    }

    /// Cancel and forget the entity's worker. No-op if the entity was
    /// never tracked (exempt at appear time, or already released).
    pub fn release(&self, id: ClientId) {
        if let Some((_, token)) = self.workers.remove(&id) {
            token.cancel();
        }
    }

    pub fn is_watched(&self, id: ClientId) -> bool {
        self.workers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
