//! Run trace digest
//!
//! Hashes every processed event of a run into a SHA-256 digest. Two runs with
//! the same stream and configuration must produce the same digest; this is the
//! replay-identity check used by the determinism tests.
//!
//! Message UUIDs are random and deliberately left out of the digest.

use crate::models::Event;
use sha2::{Digest, Sha256};
use std::fmt;

/// Incremental digest of one run's processed events
#[derive(Clone, Default)]
pub struct RunTrace {
    hasher: Sha256,
    events: u64,
}

impl fmt::Debug for RunTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunTrace")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl RunTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a processed event into the digest
    pub fn record(&mut self, event: &Event) {
        let kind = event.kind();
        self.hasher.update(event.time().to_bits().to_le_bytes());
        self.hasher.update(kind.label().as_bytes());
        self.hasher.update([kind.node().map_or(0, |n| n.id())]);

        if let Some(message) = kind.message() {
            self.hasher.update([message.source().id()]);
            self.hasher.update(message.arrival_time().to_bits().to_le_bytes());
            self.hasher.update(message.wait_time().to_bits().to_le_bytes());
        }

        self.events += 1;
    }

    /// Number of events recorded
    pub fn events(&self) -> u64 {
        self.events
    }

    /// Hex digest of everything recorded
    pub fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}
