//! # set-tracker
//!
//! Set card-game solving and frame-to-frame card tracking for a live
//! camera feed.
//!
//! ## Design Principles
//!
//! 1. **Pure Core**: Card values and the solver are plain value types and
//!    functions. No I/O, no time, no shared state.
//!
//! 2. **Single Writer**: One `ReconciliationEngine` owns every tracked zone.
//!    User edits are queued and applied at tick boundaries.
//!
//! 3. **Injected Collaborators**: The per-attribute classifier and the
//!    clock are traits, so the engine runs deterministically in tests.
//!
//! ## Architecture
//!
//! - **Accumulated Classification**: Each zone keeps the best score seen
//!   per attribute, so one blurry frame never undoes a good read.
//!
//! - **Stable Groups**: A solution keeps its group id for as long as it is
//!   found again; a renderer can colour by id without flicker.
//!
//! - **Persistent Snapshots**: Zones live in an `im::Vector`, so handing a
//!   renderer a snapshot is an O(1) clone.
//!
//! ## Modules
//!
//! - `card`: Attributes, levels and the `CardValue` codec
//! - `solver`: Set enumeration, disjoint packing, solutions
//! - `tracking`: Geometry, detections, scores, zones, classifier and clock traits
//! - `engine`: The reconciliation engine, configuration, groups, reports

pub mod card;
pub mod engine;
pub mod solver;
pub mod tracking;

// Re-export commonly used types
pub use crate::card::{Attribute, AttributeLevel, CardValue, Color, Number, Shading, Shape};

pub use crate::solver::{
    find_all_sets, find_disjoint_packings, is_set, solve, SetCombination, Solution, SolveMode,
};

pub use crate::tracking::{
    AttributeClassifier, AttributeScore, BoundingBox, Clock, Detection, FrameSize, ManualClock,
    MonotonicClock, Region, ScoreSlots, TrackedZone, ZoneId,
};

pub use crate::engine::{
    EngineConfig, EngineError, Group, GroupId, LogicalCard, ReconciliationEngine, TickReport,
};
