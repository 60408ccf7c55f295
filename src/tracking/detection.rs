//! Raw detector output.

use serde::{Deserialize, Serialize};

use super::geometry::BoundingBox;

/// One box reported by the upstream detector for a single frame.
///
/// The detector may attach a coarse label (for instance a whole-card guess)
/// with its score. It is kept for display only and never feeds the
/// per-attribute scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub label: Option<String>,
    pub score: Option<f32>,
}

impl Detection {
    #[must_use]
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            label: None,
            score: None,
        }
    }

    /// Attach a coarse detector label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>, score: f32) -> Self {
        self.label = Some(label.into());
        self.score = Some(score);
        self
    }
}

impl From<BoundingBox> for Detection {
    fn from(bbox: BoundingBox) -> Self {
        Self::new(bbox)
    }
}
