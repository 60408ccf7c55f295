//! Reconciliation engine: per-frame detections to stable zones and groups.
//!
//! ## Key Types
//!
//! - `ReconciliationEngine`: Owns zones, cards and groups; runs the tick
//! - `EngineConfig`: Time windows, size limits and solve mode
//! - `LogicalCard`: Distinct resolved value and the zones showing it
//! - `GroupId` / `GroupTable`: Solution ids that persist across ticks
//! - `TickReport`: What one tick did
//!
//! ## Usage
//!
//! ```
//! use set_tracker::card::CardValue;
//! use set_tracker::engine::{EngineConfig, ReconciliationEngine};
//! use set_tracker::tracking::{
//!     AttributeClassifier, BoundingBox, Detection, FrameSize, Region, ScoreSlots,
//! };
//!
//! /// Pretends every region shows the same card.
//! struct Fixed(CardValue);
//!
//! impl AttributeClassifier for Fixed {
//!     type Frame = ();
//!
//!     fn classify(&mut self, _: &(), _: &Region) -> Option<ScoreSlots> {
//!         Some(ScoreSlots::from_value(&self.0, 0.9))
//!     }
//! }
//!
//! let value = CardValue::decode("2-red-solid-ovals").unwrap();
//! let mut engine = ReconciliationEngine::new(Fixed(value), EngineConfig::default()).unwrap();
//!
//! let detection = Detection::new(BoundingBox::new(100.0, 100.0, 250.0, 300.0));
//! let report = engine.tick(&(), FrameSize::new(1200, 1200), &[detection]);
//!
//! assert_eq!(report.created, 1);
//! assert_eq!(engine.zones()[0].value(), Some(value));
//! ```

pub mod cards;
pub mod config;
pub mod error;
pub mod groups;
pub mod reconcile;
pub mod report;

pub use cards::LogicalCard;
pub use config::{ConfigError, EngineConfig};
pub use error::EngineError;
pub use groups::{Group, GroupId, GroupIdAllocator, GroupTable};
pub use reconcile::ReconciliationEngine;
pub use report::TickReport;
