//! Per-tick diagnostics.

use serde::{Deserialize, Serialize};

/// What one tick did, for logging and tuning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number (1-based; 0 for a refresh before any tick).
    pub tick: u64,

    /// Detections dropped by the card-size window.
    pub filtered: u32,

    /// Detections matched to an existing zone.
    pub matched: u32,

    /// Unmatched detections dropped as duplicates of another box this frame.
    pub duplicate_detections: u32,

    /// Zones created from unmatched detections.
    pub created: u32,

    /// Unmatched detections the classifier could not read.
    pub discarded: u32,

    /// Re-classification attempts on re-detected zones.
    pub reclassified: u32,

    /// Missing zones found again at their predicted position.
    pub recovered: u32,

    /// Missing zones kept without a hit.
    pub retained: u32,

    /// Missing zones dropped after the eviction window.
    pub evicted: u32,

    /// Zones removed by a deletion request.
    pub deleted: u32,

    /// Queued control commands applied at the start of the tick.
    pub commands: u32,

    /// Sets among the resolved cards.
    pub sets: u32,

    /// Groups published.
    pub groups: u32,

    /// Wall time spent in the tick (microseconds).
    pub time_us: u64,
}

impl TickReport {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Zones alive after the tick, counted from outcomes.
    #[must_use]
    pub fn zones_carried(&self) -> u32 {
        self.matched + self.created + self.recovered + self.retained
    }
}
