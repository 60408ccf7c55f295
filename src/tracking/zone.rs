//! Tracked zones: the engine's memory of one physical card across frames.
//!
//! ## Key Types
//!
//! - `ZoneId`: Stable identifier, unique for the engine's lifetime
//! - `TrackedZone`: Box, accumulated scores, user state and solver output
//!
//! Zones are created, moved and retired by the reconciliation engine only.
//! Outside code sees them through read-only snapshots.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::card::CardValue;
use crate::engine::GroupId;

use super::detection::Detection;
use super::geometry::{BoundingBox, BoxTransform};
use super::score::{AttributeScore, ScoreSlots};

/// Stable identifier for a tracked zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(pub u32);

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Zone({})", self.0)
    }
}

/// One tracked card region.
#[derive(Clone, Debug)]
pub struct TrackedZone {
    id: ZoneId,
    bbox: BoundingBox,
    previous_bbox: Option<BoundingBox>,
    scores: ScoreSlots,
    coarse: Option<AttributeScore>,
    override_value: Option<CardValue>,
    editing: bool,
    deletion_pending: bool,
    last_detected: Instant,
    last_classified: Instant,
    last_attempted: Instant,

    // Derived at the end of every tick.
    value: Option<CardValue>,
    confidence: f32,
    group_ids: SmallVec<[GroupId; 4]>,
    duplicate: bool,
}

impl TrackedZone {
    pub(crate) fn new(id: ZoneId, bbox: BoundingBox, now: Instant) -> Self {
        Self {
            id,
            bbox,
            previous_bbox: None,
            scores: ScoreSlots::new(),
            coarse: None,
            override_value: None,
            editing: false,
            deletion_pending: false,
            last_detected: now,
            last_classified: now,
            last_attempted: now,
            value: None,
            confidence: 0.0,
            group_ids: SmallVec::new(),
            duplicate: false,
        }
    }

    /// Fresh zone at a detection's box, keeping its coarse label.
    pub(crate) fn from_detection(id: ZoneId, detection: &Detection, now: Instant) -> Self {
        let mut zone = Self::new(id, detection.bbox, now);
        zone.keep_coarse_label(detection);
        zone
    }

    #[must_use]
    pub fn id(&self) -> ZoneId {
        self.id
    }

    #[must_use]
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Box before the most recent move, if the zone has moved.
    #[must_use]
    pub fn previous_bbox(&self) -> Option<&BoundingBox> {
        self.previous_bbox.as_ref()
    }

    #[must_use]
    pub fn scores(&self) -> &ScoreSlots {
        &self.scores
    }

    /// Resolved card value: the override if set, else the decoded scores.
    #[must_use]
    pub fn value(&self) -> Option<CardValue> {
        self.value
    }

    /// Product of the four best scores; 1 for an overridden zone.
    #[must_use]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Ids of the groups this zone's card belongs to this tick.
    #[must_use]
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    /// Whether another zone resolves to the same value.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.duplicate
    }

    #[must_use]
    pub fn override_value(&self) -> Option<CardValue> {
        self.override_value
    }

    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.override_value.is_some()
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Overridden or being edited: scores are frozen and eviction is off.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.editing || self.override_value.is_some()
    }

    #[must_use]
    pub fn is_deletion_pending(&self) -> bool {
        self.deletion_pending
    }

    #[must_use]
    pub fn last_detected(&self) -> Instant {
        self.last_detected
    }

    #[must_use]
    pub fn last_classified(&self) -> Instant {
        self.last_classified
    }

    /// Last time a classification was tried, successful or not.
    #[must_use]
    pub fn last_attempted(&self) -> Instant {
        self.last_attempted
    }

    /// Coarse detector label from the latest matching detection.
    #[must_use]
    pub fn coarse_label(&self) -> Option<&AttributeScore> {
        self.coarse.as_ref()
    }

    /// Text a renderer would put on the zone: the resolved value, else the
    /// coarse detector label.
    #[must_use]
    pub fn display_label(&self) -> Option<String> {
        self.value
            .map(|v| v.to_string())
            .or_else(|| self.coarse.as_ref().map(|c| c.label.clone()))
    }

    /// Whether a detection box is the same physical card as this zone.
    #[must_use]
    pub fn matches(&self, bbox: &BoundingBox) -> bool {
        self.bbox.soft_contains(bbox)
    }

    /// Motion between the previous and current box.
    #[must_use]
    pub fn last_transform(&self) -> Option<BoxTransform> {
        self.previous_bbox
            .as_ref()
            .and_then(|prev| BoxTransform::between(prev, &self.bbox))
    }

    /// Due for another classification attempt: unlocked and successfully
    /// classified within `window`.
    #[must_use]
    pub fn is_reclassify_candidate(&self, now: Instant, window: Duration) -> bool {
        !self.is_locked() && now.saturating_duration_since(self.last_classified) < window
    }

    /// Neither detected nor classified for at least `window`.
    ///
    /// Locked zones never expire.
    #[must_use]
    pub fn is_expired(&self, now: Instant, window: Duration) -> bool {
        let last_seen = self.last_detected.max(self.last_classified);
        !self.is_locked() && now.saturating_duration_since(last_seen) >= window
    }

    pub(crate) fn observe(&mut self, detection: &Detection, now: Instant) {
        self.move_to(detection.bbox);
        self.last_detected = now;
        self.keep_coarse_label(detection);
    }

    fn keep_coarse_label(&mut self, detection: &Detection) {
        if let Some(label) = &detection.label {
            self.coarse = Some(AttributeScore::new(
                label.clone(),
                detection.score.unwrap_or(0.0),
            ));
        }
    }

    pub(crate) fn move_to(&mut self, bbox: BoundingBox) {
        self.previous_bbox = Some(self.bbox);
        self.bbox = bbox;
    }

    pub(crate) fn touch_detected(&mut self, now: Instant) {
        self.last_detected = now;
    }

    pub(crate) fn mark_attempted(&mut self, now: Instant) {
        self.last_attempted = now;
    }

    /// Fold in a classification result. No-op while locked.
    pub(crate) fn merge_scores(&mut self, incoming: &ScoreSlots, now: Instant) -> bool {
        if self.is_locked() {
            return false;
        }
        self.last_classified = now;
        self.scores.merge_best(incoming)
    }

    /// Recompute value and confidence from override or scores.
    pub(crate) fn resolve(&mut self) -> Option<CardValue> {
        match self.override_value {
            Some(value) => {
                self.value = Some(value);
                self.confidence = 1.0;
            }
            None => {
                self.value = self.scores.resolve();
                self.confidence = match self.value {
                    Some(_) => self.scores.confidence().unwrap_or(0.0),
                    None => 0.0,
                };
            }
        }
        self.value
    }

    /// Pin the value, or unpin with `None`. Ends any edit in progress.
    pub(crate) fn set_override(&mut self, value: Option<CardValue>) {
        self.override_value = value;
        self.editing = false;
    }

    pub(crate) fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    pub(crate) fn mark_for_deletion(&mut self) {
        self.deletion_pending = true;
    }

    pub(crate) fn set_solver_state(&mut self, group_ids: SmallVec<[GroupId; 4]>, duplicate: bool) {
        self.group_ids = group_ids;
        self.duplicate = duplicate;
    }
}
