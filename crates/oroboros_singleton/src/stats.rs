//! # Slot Statistics
//!
//! Relaxed atomic counters kept per singleton slot. Diagnostics go to the log;
//! these counters let tooling and tests observe the same events.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a slot's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotStats {
    /// Objects created by the accessor because none existed.
    pub created: u64,
    /// Existing objects bound by a lookup scan.
    pub discovered: u64,
    /// Objects bound through the claim hook.
    pub claimed: u64,
    /// Lookups that found more than one live object.
    pub duplicates_reported: u64,
    /// Duplicates destroyed by the claim hook.
    pub duplicates_destroyed: u64,
    /// Accesses refused because shutdown had begun.
    pub post_shutdown_accesses: u64,
}

/// Live counters behind [`SlotStats`].
#[derive(Debug, Default)]
pub(crate) struct SlotCounters {
    pub(crate) created: AtomicU64,
    pub(crate) discovered: AtomicU64,
    pub(crate) claimed: AtomicU64,
    pub(crate) duplicates_reported: AtomicU64,
    pub(crate) duplicates_destroyed: AtomicU64,
    pub(crate) post_shutdown_accesses: AtomicU64,
}

impl SlotCounters {
    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SlotStats {
        SlotStats {
            created: self.created.load(Ordering::Relaxed),
            discovered: self.discovered.load(Ordering::Relaxed),
            claimed: self.claimed.load(Ordering::Relaxed),
            duplicates_reported: self.duplicates_reported.load(Ordering::Relaxed),
            duplicates_destroyed: self.duplicates_destroyed.load(Ordering::Relaxed),
            post_shutdown_accesses: self.post_shutdown_accesses.load(Ordering::Relaxed),
        }
    }
}
