//! In-flight query deduplication — at most one concurrent evaluation per
//! subject-key (spec.md §4.5, §5 "In-flight deduplication")

use crate::result::TrustResult;
use crate::subject::SubjectKey;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Coalesces concurrent `evaluate(sameKey)` calls onto a single shared
/// computation. The dedup table is keyed by subject-key and cleared when
/// the in-flight future settles, success or failure, via the RAII guard
/// below so a panic mid-evaluation can never poison the key
/// (spec.md §4.5 step 12 "finally-equivalent block").
pub struct InFlightTable {
    inflight: DashMap<SubjectKey, broadcast::Sender<TrustResult>>,
}

/// What a caller should do after probing the table.
pub enum ProbeOutcome {
    /// No evaluation is in flight for this key; the caller registered
    /// itself and owns the computation. Must call `complete` (via the
    /// returned guard) exactly once.
    Lead(InFlightGuard),
    /// Another task is already computing this key; await its result.
    Follow(broadcast::Receiver<TrustResult>),
}

impl InFlightTable {
    pub fn new() -> Self {
        Self {
            inflight: DashMap::new(),
        }
    }

    /// Atomic check-then-insert: either this call becomes the leader for
    /// `key`, or it is told to follow an existing leader
    /// (spec.md §5 "atomic check-then-insert semantics are required").
    pub fn probe(self: &Arc<Self>, key: SubjectKey) -> ProbeOutcome {
        match self.inflight.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                ProbeOutcome::Follow(entry.get().subscribe())
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let (tx, _rx) = broadcast::channel(1);
                entry.insert(tx);
                ProbeOutcome::Lead(InFlightGuard {
                    table: Arc::clone(self),
                    key,
                })
            }
        }
    }

    fn complete(&self, key: &SubjectKey, result: TrustResult) {
        if let Some((_, tx)) = self.inflight.remove(key) {
            // No receivers is fine: every follower that cared already
            // subscribed before this leader could finish.
            let _ = tx.send(result);
        }
    }

    fn abandon(&self, key: &SubjectKey) {
        self.inflight.remove(key);
    }
}

impl Default for InFlightTable {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII handle for the leader of an in-flight computation. Dropping it
/// without calling `complete` (e.g. on panic/early return) removes the
/// entry so the key never gets stuck.
pub struct InFlightGuard {
    table: Arc<InFlightTable>,
    key: SubjectKey,
    // becomes true once `complete` runs, so `Drop` knows not to double-remove
}

impl InFlightGuard {
    /// Publish the result to any followers and clear the in-flight entry.
    pub fn complete(self, result: TrustResult) {
        self.table.complete(&self.key, result);
        std::mem::forget(self); // complete() already cleared the entry
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.table.abandon(&self.key);
    }
}
