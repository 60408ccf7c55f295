//! Reconciliation engine configuration parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::solver::SolveMode;
use crate::tracking::{FrameSize, SizeWindow};

/// Reconciliation engine configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// An unmatched zone is evicted once it has been neither detected nor
    /// classified for this long (default: 30 s).
    #[serde(with = "duration_ms")]
    pub eviction_window: Duration,

    /// A re-detected zone is re-classified only while its last successful
    /// classification is within this window (default: 1.5 s).
    #[serde(with = "duration_ms")]
    pub reclassify_window: Duration,

    /// Maximum re-classifications per tick.
    /// Bounds classifier cost on busy tables.
    pub reclassify_cap: usize,

    /// Shape score a motion-predicted region must beat to count as a
    /// recovery (default: 0.8).
    pub recovery_threshold: f32,

    /// Smallest plausible card is `frame dimension / min_size_divisor`.
    pub min_size_divisor: f32,

    /// Largest plausible card is `frame dimension / max_size_divisor`.
    pub max_size_divisor: f32,

    /// Card-size window in pixels used before any frame size is known.
    pub fallback_min_size: f32,
    pub fallback_max_size: f32,

    /// Solve mode the engine starts in.
    pub mode: SolveMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eviction_window: Duration::from_secs(30),
            reclassify_window: Duration::from_millis(1500),
            reclassify_cap: 5,
            recovery_threshold: 0.8,
            min_size_divisor: 12.0,
            max_size_divisor: 3.0,
            fallback_min_size: 20.0,
            fallback_max_size: 100.0,
            mode: SolveMode::AllSets,
        }
    }
}

impl EngineConfig {
    /// Create a new config with custom eviction window.
    pub fn with_eviction_window(mut self, window: Duration) -> Self {
        self.eviction_window = window;
        self
    }

    /// Create a new config with custom re-classification window.
    pub fn with_reclassify_window(mut self, window: Duration) -> Self {
        self.reclassify_window = window;
        self
    }

    /// Create a new config with custom re-classification cap.
    pub fn with_reclassify_cap(mut self, cap: usize) -> Self {
        self.reclassify_cap = cap;
        self
    }

    /// Create a new config with custom recovery threshold.
    pub fn with_recovery_threshold(mut self, threshold: f32) -> Self {
        self.recovery_threshold = threshold;
        self
    }

    /// Create a new config with custom size divisors.
    pub fn with_size_divisors(mut self, min: f32, max: f32) -> Self {
        self.min_size_divisor = min;
        self.max_size_divisor = max;
        self
    }

    /// Create a new config with custom fallback size window.
    pub fn with_fallback_size(mut self, min: f32, max: f32) -> Self {
        self.fallback_min_size = min;
        self.fallback_max_size = max;
        self
    }

    /// Create a new config with custom initial solve mode.
    pub fn with_mode(mut self, mode: SolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check the parameters are usable together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.eviction_window.is_zero() {
            return Err(ConfigError::ZeroEvictionWindow);
        }
        if !(self.recovery_threshold.is_finite() && (0.0..=1.0).contains(&self.recovery_threshold))
        {
            return Err(ConfigError::RecoveryThreshold(self.recovery_threshold));
        }
        let divisors_ok = self.min_size_divisor.is_finite()
            && self.max_size_divisor.is_finite()
            && self.max_size_divisor > 0.0
            && self.min_size_divisor >= self.max_size_divisor;
        if !divisors_ok {
            return Err(ConfigError::SizeDivisors {
                min: self.min_size_divisor,
                max: self.max_size_divisor,
            });
        }
        if !(self.fallback_min_size >= 0.0 && self.fallback_min_size <= self.fallback_max_size) {
            return Err(ConfigError::FallbackSize {
                min: self.fallback_min_size,
                max: self.fallback_max_size,
            });
        }
        Ok(())
    }

    /// Card-size window for a frame, or the fallback window.
    #[must_use]
    pub fn size_window(&self, frame: Option<FrameSize>) -> SizeWindow {
        match frame {
            Some(frame) => SizeWindow::for_frame(frame, self.min_size_divisor, self.max_size_divisor),
            None => SizeWindow {
                min_width: self.fallback_min_size,
                min_height: self.fallback_min_size,
                max_width: self.fallback_max_size,
                max_height: self.fallback_max_size,
            },
        }
    }
}

/// Rejected configuration.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("eviction window must be non-zero")]
    ZeroEvictionWindow,

    #[error("recovery threshold {0} is outside [0, 1]")]
    RecoveryThreshold(f32),

    #[error("size divisors min={min} max={max}: need min >= max > 0")]
    SizeDivisors { min: f32, max: f32 },

    #[error("fallback size window {min}..{max} is empty")]
    FallbackSize { min: f32, max: f32 },
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
