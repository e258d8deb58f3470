use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectCounts {
    /// Effect actions that entered the handler chain.
    pub effects: u64,
    /// Plain actions passed through to the next middleware.
    pub forwarded: u64,
    /// Payloads that reached the unhandled fallback.
    pub unhandled: u64,
    /// Actions rejected synchronously as malformed.
    pub malformed: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    effects: AtomicU64,
    forwarded: AtomicU64,
    unhandled: AtomicU64,
    malformed: AtomicU64,
}

impl Counters {
    pub(crate) fn effect(&self) {
        self.effects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn unhandled(&self) {
        self.unhandled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> EffectCounts {
        EffectCounts {
            effects: self.effects.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            unhandled: self.unhandled.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_increments() {
        let counters = Counters::default();
        counters.effect();
        counters.effect();
        counters.unhandled();
        counters.forwarded();

        let counts = counters.snapshot();
        assert_eq!(
            counts,
            EffectCounts {
                effects: 2,
                forwarded: 1,
                unhandled: 1,
                malformed: 0,
            }
        );
    }
}
