//! The reconciliation engine.
//!
//! Each tick takes one frame's detections and turns them into a stable set
//! of tracked zones, logical cards and numbered groups:
//!
//! 1. Apply queued control commands; drop zones marked for deletion
//! 2. Drop detections outside the plausible card-size window
//! 3. Match each detection to the first previous zone that soft-contains it
//! 4. Re-classify a bounded number of recently classified zones, longest
//!    unattempted first
//! 5. Classify unmatched, non-duplicate detections into new zones
//! 6. Look for missing zones at their motion-predicted position; evict the
//!    ones gone too long
//! 7. Resolve values, collapse to logical cards, solve, assign group ids
//!
//! Matching is greedy in detection order, not a global assignment. That is
//! good enough for cards lying apart on a table, and keeps a tick linear in
//! zones times detections.
//!
//! The engine is single-writer: the tick loop owns it. Control commands
//! (override, edit lock, deletion, manual zones) are queued and applied at
//! the next tick or [`ReconciliationEngine::refresh`]. Renderers read
//! [`ReconciliationEngine::snapshot`], an `im::Vector` that is cheap to
//! clone and unaffected by later ticks.

use std::time::Instant;

use im::Vector;
use smallvec::SmallVec;
use tracing::{debug, debug_span, trace};

use crate::card::{Attribute, CardValue};
use crate::solver::{find_all_sets, select_solutions, SolveMode};
use crate::tracking::{
    AttributeClassifier, BoundingBox, BoxTransform, Clock, Detection, FrameSize, MonotonicClock,
    ScoreSlots, TrackedZone, ZoneId,
};

use super::cards::{assign_groups, collapse, CardMap, LogicalCard};
use super::config::EngineConfig;
use super::error::EngineError;
use super::groups::{Group, GroupTable};
use super::report::TickReport;

/// A queued request against a zone, applied at the next tick boundary.
#[derive(Clone, Debug)]
enum ZoneCommand {
    Override(ZoneId, Option<CardValue>),
    Edit(ZoneId, bool),
    Delete(ZoneId),
    Create(Box<TrackedZone>),
}

/// Frame-to-frame card tracker and solver driver.
///
/// Generic over the classifier and the time source. Owns every zone, card
/// and group; nothing outside mutates them.
pub struct ReconciliationEngine<C: AttributeClassifier, K: Clock = MonotonicClock> {
    config: EngineConfig,
    classifier: C,
    clock: K,

    /// Current zones, in stable order: surviving zones, then new ones.
    zones: Vector<TrackedZone>,

    /// Logical cards from the last solve, reused across ticks.
    cards: CardMap,

    groups: GroupTable,
    pending: Vec<ZoneCommand>,
    mode: SolveMode,

    /// Size of the last frame seen; drives the card-size window.
    frame_size: Option<FrameSize>,

    next_zone_id: u32,
    tick: u64,
    last_report: TickReport,
}

impl<C: AttributeClassifier> ReconciliationEngine<C, MonotonicClock> {
    /// Create an engine on wall-clock time.
    pub fn new(classifier: C, config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_clock(classifier, MonotonicClock, config)
    }
}

impl<C: AttributeClassifier, K: Clock> ReconciliationEngine<C, K> {
    /// Create an engine on a custom time source.
    pub fn with_clock(classifier: C, clock: K, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            mode: config.mode,
            config,
            classifier,
            clock,
            zones: Vector::new(),
            cards: CardMap::default(),
            groups: GroupTable::new(),
            pending: Vec::new(),
            frame_size: None,
            next_zone_id: 0,
            tick: 0,
            last_report: TickReport::default(),
        })
    }

    // === Tick ===

    /// Process one frame's detections.
    ///
    /// `frame` is handed to the classifier untouched; `frame_size` bounds
    /// every region the classifier is asked about.
    pub fn tick(
        &mut self,
        frame: &C::Frame,
        frame_size: FrameSize,
        detections: &[Detection],
    ) -> TickReport {
        let started = Instant::now();
        self.tick += 1;
        let span = debug_span!("tick", tick = self.tick);
        let _guard = span.enter();

        let mut report = TickReport::new(self.tick);
        self.frame_size = Some(frame_size);
        let previous = self.begin_pass(&mut report);

        let window = self.config.size_window(Some(frame_size));
        let admitted: Vec<&Detection> = detections
            .iter()
            .filter(|d| window.admits(&d.bbox))
            .collect();
        report.filtered = (detections.len() - admitted.len()) as u32;

        let (mut seen, missing, unmatched) = self.match_detections(previous, &admitted, &mut report);
        self.reclassify(frame, frame_size, &mut seen, &mut report);
        let created = self.create_zones(frame, frame_size, &seen, &unmatched, &mut report);
        self.recover(frame, frame_size, missing, &mut seen, &mut report);
        seen.extend(created);
        self.publish(seen, &mut report);

        report.time_us = started.elapsed().as_micros() as u64;
        debug!(
            zones = self.zones.len(),
            sets = report.sets,
            groups = report.groups,
            time_us = report.time_us,
            "tick complete"
        );
        self.last_report = report.clone();
        report
    }

    /// Apply queued commands and recompute cards and groups without a
    /// detection pass.
    ///
    /// For a static picture, where no new frames arrive but the user keeps
    /// editing.
    pub fn refresh(&mut self) -> TickReport {
        let started = Instant::now();
        let span = debug_span!("refresh", tick = self.tick);
        let _guard = span.enter();

        let mut report = TickReport::new(self.tick);
        let zones = self.begin_pass(&mut report);
        self.publish(zones, &mut report);

        report.time_us = started.elapsed().as_micros() as u64;
        self.last_report = report.clone();
        report
    }

    /// Apply queued commands, then take the zones that survive deletion.
    fn begin_pass(&mut self, report: &mut TickReport) -> Vec<TrackedZone> {
        report.commands = self.apply_commands();

        let mut zones = Vec::with_capacity(self.zones.len());
        for zone in std::mem::take(&mut self.zones) {
            if zone.is_deletion_pending() {
                report.deleted += 1;
                debug!(zone = %zone.id(), "zone deleted");
            } else {
                zones.push(zone);
            }
        }
        zones
    }

    fn apply_commands(&mut self) -> u32 {
        let mut applied = 0;
        for command in std::mem::take(&mut self.pending) {
            let done = match command {
                ZoneCommand::Create(zone) => {
                    debug!(zone = %zone.id(), "manual zone added");
                    self.zones.push_back(*zone);
                    true
                }
                ZoneCommand::Override(id, value) => self.update_zone(id, |z| z.set_override(value)),
                ZoneCommand::Edit(id, editing) => self.update_zone(id, |z| z.set_editing(editing)),
                ZoneCommand::Delete(id) => self.update_zone(id, TrackedZone::mark_for_deletion),
            };
            if done {
                applied += 1;
            }
        }
        applied
    }

    fn update_zone(&mut self, id: ZoneId, f: impl FnOnce(&mut TrackedZone)) -> bool {
        let Some(index) = self.zones.iter().position(|z| z.id() == id) else {
            debug!(zone = %id, "command for a zone that no longer exists dropped");
            return false;
        };
        self.zones.get_mut(index).map(f).is_some()
    }

    /// Greedy first-fit matching of detections to previous zones.
    ///
    /// Returns the re-detected zones, the zones nobody matched, and the
    /// detections that matched no zone.
    fn match_detections<'d>(
        &self,
        previous: Vec<TrackedZone>,
        admitted: &[&'d Detection],
        report: &mut TickReport,
    ) -> (Vec<TrackedZone>, Vec<TrackedZone>, Vec<&'d Detection>) {
        let mut pool: Vec<Option<TrackedZone>> = previous.into_iter().map(Some).collect();
        let mut seen = Vec::with_capacity(pool.len());
        let mut unmatched = Vec::new();

        for &detection in admitted {
            let hit = pool
                .iter_mut()
                .find(|slot| matches!(slot, Some(z) if z.matches(&detection.bbox)))
                .and_then(Option::take);
            match hit {
                Some(mut zone) => {
                    zone.observe(detection, self.clock.now());
                    trace!(zone = %zone.id(), "re-detected");
                    report.matched += 1;
                    seen.push(zone);
                }
                None => unmatched.push(detection),
            }
        }

        let missing = pool.into_iter().flatten().collect();
        (seen, missing, unmatched)
    }

    fn reclassify(
        &mut self,
        frame: &C::Frame,
        frame_size: FrameSize,
        zones: &mut [TrackedZone],
        report: &mut TickReport,
    ) {
        let now = self.clock.now();
        let window = self.config.reclassify_window;
        let mut due: Vec<usize> = zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.is_reclassify_candidate(now, window))
            .map(|(i, _)| i)
            .collect();
        // Longest-unattempted first, so misses cannot hold every slot.
        due.sort_by_key(|&i| zones[i].last_attempted());

        for i in due.into_iter().take(self.config.reclassify_cap) {
            report.reclassified += 1;
            zones[i].mark_attempted(now);
            let bbox = *zones[i].bbox();
            if let Some(scores) = self.classify(frame, frame_size, &bbox) {
                let zone = &mut zones[i];
                if zone.merge_scores(&scores, self.clock.now()) {
                    trace!(zone = %zone.id(), "scores improved");
                }
            }
        }
    }

    fn create_zones(
        &mut self,
        frame: &C::Frame,
        frame_size: FrameSize,
        seen: &[TrackedZone],
        unmatched: &[&Detection],
        report: &mut TickReport,
    ) -> Vec<TrackedZone> {
        let mut created: Vec<TrackedZone> = Vec::new();
        for &detection in unmatched {
            let bbox = &detection.bbox;
            if seen.iter().chain(created.iter()).any(|z| z.matches(bbox)) {
                report.duplicate_detections += 1;
                continue;
            }

            let Some(scores) = self.classify(frame, frame_size, bbox) else {
                report.discarded += 1;
                trace!(?bbox, "unreadable detection discarded");
                continue;
            };

            let now = self.clock.now();
            let mut zone = TrackedZone::from_detection(self.allocate_zone_id(), detection, now);
            zone.merge_scores(&scores, now);
            debug!(zone = %zone.id(), ?bbox, "zone created");
            report.created += 1;
            created.push(zone);
        }
        created
    }

    /// Second chance for zones no detection matched this tick.
    ///
    /// Every missing zone is shifted by the latest motion seen on a
    /// re-detected zone (translation only) and classified there. A confident
    /// shape read counts as a hit. Without one, the zone is kept until its
    /// eviction window runs out.
    fn recover(
        &mut self,
        frame: &C::Frame,
        frame_size: FrameSize,
        missing: Vec<TrackedZone>,
        seen: &mut Vec<TrackedZone>,
        report: &mut TickReport,
    ) {
        if missing.is_empty() {
            return;
        }
        let motion = seen
            .iter()
            .rev()
            .find_map(TrackedZone::last_transform)
            .map(BoxTransform::translation_only);

        for mut zone in missing {
            if let Some(motion) = motion {
                let predicted = motion.apply(zone.bbox());
                zone.move_to(predicted);
            }

            let threshold = self.config.recovery_threshold;
            let bbox = *zone.bbox();
            let hit = self
                .classify(frame, frame_size, &bbox)
                .filter(|s| s.get(Attribute::Shape).is_some_and(|shape| shape.score > threshold));

            let now = self.clock.now();
            if let Some(scores) = hit {
                zone.merge_scores(&scores, now);
                zone.touch_detected(now);
                trace!(zone = %zone.id(), "zone recovered");
                report.recovered += 1;
                seen.push(zone);
            } else if zone.is_expired(now, self.config.eviction_window) {
                debug!(zone = %zone.id(), "zone evicted");
                report.evicted += 1;
            } else {
                report.retained += 1;
                seen.push(zone);
            }
        }
    }

    /// Resolve, collapse, solve and assign groups; install the new zones.
    fn publish(&mut self, mut zones: Vec<TrackedZone>, report: &mut TickReport) {
        for zone in &mut zones {
            zone.resolve();
        }

        let mut cards = collapse(&mut self.cards, &zones);
        let sets = find_all_sets(cards.keys().copied());
        let groups = self.groups.update(select_solutions(&sets, self.mode));
        assign_groups(&mut cards, groups);
        report.sets = sets.len() as u32;
        report.groups = groups.len() as u32;

        for zone in &mut zones {
            match zone.value().and_then(|v| cards.get(&v)) {
                Some(card) => {
                    zone.set_solver_state(SmallVec::from_slice(card.group_ids()), card.is_duplicate())
                }
                None => zone.set_solver_state(SmallVec::new(), false),
            }
        }

        self.cards = cards;
        self.zones = zones.into_iter().collect();
    }

    fn classify(
        &mut self,
        frame: &C::Frame,
        frame_size: FrameSize,
        bbox: &BoundingBox,
    ) -> Option<ScoreSlots> {
        let region = match bbox.clamp_to(frame_size) {
            Ok(region) => region,
            Err(err) => {
                trace!(%err, "region skipped");
                return None;
            }
        };
        self.classifier
            .classify(frame, &region)
            .filter(|scores| !scores.is_empty())
    }

    fn allocate_zone_id(&mut self) -> ZoneId {
        let id = ZoneId(self.next_zone_id);
        self.next_zone_id += 1;
        id
    }

    // === Control commands ===

    /// Pin a zone to a value (or unpin with `None`) from the next tick on.
    ///
    /// An overridden zone is never evicted and its scores stop updating.
    /// Setting an override also ends an edit in progress.
    pub fn set_override(&mut self, id: ZoneId, value: Option<CardValue>) -> Result<(), EngineError> {
        self.require(id)?;
        self.pending.push(ZoneCommand::Override(id, value));
        Ok(())
    }

    pub fn clear_override(&mut self, id: ZoneId) -> Result<(), EngineError> {
        self.set_override(id, None)
    }

    /// Freeze a zone while the user edits it.
    pub fn begin_edit(&mut self, id: ZoneId) -> Result<(), EngineError> {
        self.require(id)?;
        self.pending.push(ZoneCommand::Edit(id, true));
        Ok(())
    }

    pub fn end_edit(&mut self, id: ZoneId) -> Result<(), EngineError> {
        self.require(id)?;
        self.pending.push(ZoneCommand::Edit(id, false));
        Ok(())
    }

    /// Remove a zone at the start of the next tick.
    pub fn mark_for_deletion(&mut self, id: ZoneId) -> Result<(), EngineError> {
        self.require(id)?;
        self.pending.push(ZoneCommand::Delete(id));
        Ok(())
    }

    /// Add an overridden zone at `bbox`, for cards the detector misses.
    ///
    /// The zone appears at the next tick or refresh; its id is reserved now
    /// so further commands can target it straight away.
    pub fn add_manual_zone(&mut self, bbox: BoundingBox, value: CardValue) -> ZoneId {
        let id = self.allocate_zone_id();
        let mut zone = TrackedZone::new(id, bbox, self.clock.now());
        zone.set_override(Some(value));
        self.pending.push(ZoneCommand::Create(Box::new(zone)));
        id
    }

    /// Propose a box centred on a point for a manual zone.
    ///
    /// Uses the average size of the current zones when that size is
    /// plausible, else twice the smallest plausible card.
    #[must_use]
    pub fn suggest_manual_box(&self, x: f32, y: f32) -> BoundingBox {
        let window = self.config.size_window(self.frame_size);
        if !self.zones.is_empty() {
            let n = self.zones.len() as f32;
            let width = self.zones.iter().map(|z| z.bbox().width()).sum::<f32>() / n;
            let height = self.zones.iter().map(|z| z.bbox().height()).sum::<f32>() / n;
            let average = BoundingBox::from_center(x, y, width, height);
            if window.admits(&average) {
                return average;
            }
        }
        BoundingBox::from_center(x, y, window.min_width * 2.0, window.min_height * 2.0)
    }

    /// Switch solve mode; takes effect at the next tick or refresh.
    pub fn set_mode(&mut self, mode: SolveMode) {
        if self.mode != mode {
            debug!(?mode, "solve mode changed");
        }
        self.mode = mode;
    }

    /// Drop every zone, card, group and queued command.
    ///
    /// Zone ids keep counting up, so an id is never reused.
    pub fn clear(&mut self) {
        self.zones.clear();
        self.cards.clear();
        self.groups.clear();
        self.pending.clear();
        debug!("engine cleared");
    }

    fn require(&self, id: ZoneId) -> Result<(), EngineError> {
        let known = self.zones.iter().any(|z| z.id() == id)
            || self
                .pending
                .iter()
                .any(|c| matches!(c, ZoneCommand::Create(z) if z.id() == id));
        if known {
            Ok(())
        } else {
            Err(EngineError::ZoneNotFound(id))
        }
    }

    // === Queries ===

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> SolveMode {
        self.mode
    }

    /// Current zones.
    #[must_use]
    pub fn zones(&self) -> &Vector<TrackedZone> {
        &self.zones
    }

    /// A copy of the current zones for a renderer.
    #[must_use]
    pub fn snapshot(&self) -> Vector<TrackedZone> {
        self.zones.clone()
    }

    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&TrackedZone> {
        self.zones.iter().find(|z| z.id() == id)
    }

    /// The first zone whose box contains a point.
    #[must_use]
    pub fn zone_at(&self, x: f32, y: f32) -> Option<&TrackedZone> {
        self.zones.iter().find(|z| z.bbox().contains_point(x, y))
    }

    /// Logical cards from the last tick, in no particular order.
    pub fn cards(&self) -> impl Iterator<Item = &LogicalCard> {
        self.cards.values()
    }

    #[must_use]
    pub fn card(&self, value: &CardValue) -> Option<&LogicalCard> {
        self.cards.get(value)
    }

    /// Groups from the last tick, ordered by id.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        self.groups.groups()
    }

    #[must_use]
    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    /// Ticks processed so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn frame_size(&self) -> Option<FrameSize> {
        self.frame_size
    }

    /// Commands waiting for the next tick boundary.
    #[must_use]
    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut C {
        &mut self.classifier
    }

    #[must_use]
    pub fn clock(&self) -> &K {
        &self.clock
    }
}
