//! Frame-to-frame tracking primitives.
//!
//! ## Key Types
//!
//! - `BoundingBox`, `BoxTransform`, `SizeWindow`, `Region`: Image-space geometry
//! - `Detection`: One detector box for one frame
//! - `ScoreSlots`: Best-so-far per-attribute classification
//! - `TrackedZone`: A card region remembered across frames
//! - `AttributeClassifier`: Contract for the per-attribute model
//! - `Clock`: Injectable monotonic time

pub mod classifier;
pub mod clock;
pub mod detection;
pub mod geometry;
pub mod score;
pub mod zone;

pub use classifier::AttributeClassifier;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use detection::Detection;
pub use geometry::{BoundingBox, BoxTransform, FrameSize, Region, RegionError, SizeWindow};
pub use score::{AttributeScore, ScoreSlots};
pub use zone::{TrackedZone, ZoneId};
