//! Reconciliation engine integration tests using a scripted table.

mod common;

use std::time::Duration;

use common::{engine, engine_with, first_twelve, tick_all, value, PlacedCard, Table, FRAME};
use set_tracker::card::Attribute;
use set_tracker::engine::{EngineConfig, EngineError, GroupId};
use set_tracker::solver::SolveMode;
use set_tracker::tracking::{BoundingBox, Clock, Detection, ScoreSlots, ZoneId};

fn greens() -> Vec<PlacedCard> {
    vec![
        PlacedCard::new("1-green-empty-diamond", 150.0, 200.0),
        PlacedCard::new("1-green-empty-oval", 400.0, 200.0),
        PlacedCard::new("1-green-empty-squiggle", 650.0, 200.0),
    ]
}

fn purples() -> Vec<PlacedCard> {
    vec![
        PlacedCard::new("1-purple-empty-diamond", 150.0, 500.0),
        PlacedCard::new("1-purple-empty-oval", 400.0, 500.0),
        PlacedCard::new("1-purple-empty-squiggle", 650.0, 500.0),
    ]
}

fn reds() -> Vec<PlacedCard> {
    vec![
        PlacedCard::new("1-red-empty-diamond", 150.0, 800.0),
        PlacedCard::new("1-red-empty-oval", 400.0, 800.0),
        PlacedCard::new("1-red-empty-squiggle", 650.0, 800.0),
    ]
}

fn zone_ids(engine: &common::Engine) -> Vec<ZoneId> {
    engine.zones().iter().map(|z| z.id()).collect()
}

// =============================================================================
// Zone Lifecycle Tests
// =============================================================================

#[test]
fn test_zones_stable_across_frames() {
    let (mut engine, clock) = engine();
    let table = Table::new(greens());

    let first = tick_all(&mut engine, &table);
    assert_eq!(first.created, 3);
    let ids = zone_ids(&engine);

    for _ in 0..5 {
        clock.advance(Duration::from_millis(33));
        let report = tick_all(&mut engine, &table);
        assert_eq!(report.created, 0);
        assert_eq!(report.matched, 3);
        assert_eq!(zone_ids(&engine), ids);
    }
}

#[test]
fn test_jittered_boxes_keep_their_zone() {
    let (mut engine, clock) = engine();
    let table = Table::new(greens());
    tick_all(&mut engine, &table);
    let ids = zone_ids(&engine);

    clock.advance(Duration::from_millis(33));
    let report = tick_all(&mut engine, &table.shifted(20.0, -15.0));

    assert_eq!(report.created, 0);
    assert_eq!(zone_ids(&engine), ids);
    let moved = engine.zone(ids[0]).unwrap();
    assert_eq!(moved.bbox().center_x(), 170.0);
    assert!(moved.previous_bbox().is_some());
}

#[test]
fn test_size_window_filters_detections() {
    let (mut engine, _) = engine();
    let table = Table::new(greens());
    let mut detections = table.detections();
    detections.push(Detection::new(BoundingBox::from_center(900.0, 900.0, 40.0, 40.0)));
    detections.push(Detection::new(BoundingBox::from_center(600.0, 600.0, 700.0, 700.0)));

    let report = engine.tick(&table, FRAME, &detections);
    assert_eq!(report.filtered, 2);
    assert_eq!(engine.zones().len(), 3);
}

#[test]
fn test_duplicate_detections_in_one_frame() {
    let (mut engine, _) = engine();
    let table = Table::new(vec![PlacedCard::new("2-red-solid-ovals", 300.0, 300.0)]);
    let detections = vec![
        table.cards[0].detection(),
        Detection::new(table.cards[0].clone().shifted(5.0, 5.0).bbox),
    ];

    let report = engine.tick(&table, FRAME, &detections);
    assert_eq!(report.created, 1);
    assert_eq!(report.duplicate_detections, 1);

    let report = engine.tick(&table, FRAME, &detections);
    assert_eq!(report.matched, 1);
    assert_eq!(report.duplicate_detections, 1);
    assert_eq!(engine.zones().len(), 1);
}

#[test]
fn test_unreadable_detection_discarded() {
    let (mut engine, _) = engine();
    let table = Table::new(vec![PlacedCard::new("1-green-empty-oval", 300.0, 300.0).unreadable()]);

    let report = tick_all(&mut engine, &table);
    assert_eq!(report.discarded, 1);
    assert!(engine.zones().is_empty());
}

#[test]
fn test_partial_reading_keeps_zone_unresolved() {
    let (mut engine, _) = engine();
    let card = PlacedCard::new("1-green-empty-oval", 300.0, 300.0)
        .with_reading(ScoreSlots::new().with(Attribute::Shape, "oval", 0.9))
        .with_coarse_label("card", 0.75);
    let table = Table::new(vec![card]);

    let report = tick_all(&mut engine, &table);
    assert_eq!(report.created, 1);

    let zone = &engine.zones()[0];
    assert_eq!(zone.value(), None);
    assert_eq!(zone.confidence(), 0.0);
    assert_eq!(zone.display_label().as_deref(), Some("card"));
    assert_eq!(engine.cards().count(), 0);
}

#[test]
fn test_unknown_label_does_not_resolve() {
    let (mut engine, _) = engine();
    let reading = ScoreSlots::new()
        .with(Attribute::Number, "1", 0.9)
        .with(Attribute::Color, "blue", 0.9)
        .with(Attribute::Shading, "empty", 0.9)
        .with(Attribute::Shape, "oval", 0.9);
    let table = Table::new(vec![
        PlacedCard::new("1-green-empty-oval", 300.0, 300.0).with_reading(reading),
    ]);

    tick_all(&mut engine, &table);
    assert_eq!(engine.zones().len(), 1);
    assert_eq!(engine.zones()[0].value(), None);
    assert!(engine.groups().is_empty());
}

// =============================================================================
// Classification Tests
// =============================================================================

#[test]
fn test_scores_never_regress() {
    let (mut engine, clock) = engine();
    let card = PlacedCard::new("1-green-empty-oval", 300.0, 300.0).with_score(0.6);
    tick_all(&mut engine, &Table::new(vec![card.clone()]));
    let id = engine.zones()[0].id();

    // A weaker, wrong reading changes nothing.
    clock.advance(Duration::from_millis(33));
    let blurry = card.clone().reads_as("1-red-empty-oval", 0.4);
    let report = tick_all(&mut engine, &Table::new(vec![blurry]));
    assert_eq!(report.reclassified, 1);
    assert_eq!(engine.zone(id).unwrap().value(), Some(value("1-green-empty-oval")));

    // A stronger one wins.
    clock.advance(Duration::from_millis(33));
    let sharp = card.reads_as("1-red-empty-oval", 0.7);
    tick_all(&mut engine, &Table::new(vec![sharp]));
    let zone = engine.zone(id).unwrap();
    assert_eq!(zone.value(), Some(value("1-red-empty-oval")));
    assert!((zone.confidence() - 0.7f32.powi(4)).abs() < 1e-5);
}

#[test]
fn test_reclassification_cap_rotates() {
    let (mut engine, clock) = engine();
    let table = Table::grid(&[
        "1-green-empty-diamond",
        "1-green-empty-oval",
        "1-green-empty-squiggle",
        "1-green-solid-diamond",
        "1-green-solid-oval",
        "1-green-solid-squiggle",
        "1-green-striped-diamond",
        "1-green-striped-oval",
    ]);

    tick_all(&mut engine, &table);
    assert_eq!(engine.classifier().calls, 8);

    clock.advance(Duration::from_millis(33));
    let report = tick_all(&mut engine, &table);
    assert_eq!(report.reclassified, 5);
    assert_eq!(engine.classifier().calls, 13);

    // The three skipped zones go first next time.
    clock.advance(Duration::from_millis(33));
    tick_all(&mut engine, &table);
    let now = engine.clock().now();
    for zone in engine.zones().iter().skip(5) {
        assert_eq!(zone.last_classified(), now);
    }
}

#[test]
fn test_zone_without_recent_read_not_reclassified() {
    let (mut engine, clock) = engine();
    let card = PlacedCard::new("1-green-empty-oval", 300.0, 300.0);
    tick_all(&mut engine, &Table::new(vec![card.clone()]));

    // Still detected every frame, but never read again.
    let blank = Table::new(vec![card.unreadable()]);
    let mut attempts = Vec::new();
    for _ in 0..10 {
        clock.advance(Duration::from_millis(500));
        attempts.push(tick_all(&mut engine, &blank).reclassified);
    }

    assert_eq!(attempts, vec![1, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(engine.classifier().calls, 3);
    assert_eq!(engine.zones().len(), 1);
}

#[test]
fn test_unreadable_zones_do_not_starve_the_cap() {
    let (mut engine, clock) = engine();
    let labels = [
        "1-green-empty-diamond",
        "1-green-empty-oval",
        "1-green-empty-squiggle",
        "1-green-solid-diamond",
        "1-green-solid-oval",
        "1-green-solid-squiggle",
    ];
    let mut table = Table::grid(&labels);
    for card in &mut table.cards {
        *card = card.clone().with_score(0.5);
    }
    tick_all(&mut engine, &table);
    let last = engine.zones()[5].id();

    for card in &mut table.cards[..5] {
        *card = card.clone().unreadable();
    }
    table.cards[5] = table.cards[5]
        .clone()
        .reads_as("3-red-striped-squiggles", 0.95);

    let mut report = tick_all(&mut engine, &table);
    for _ in 0..60 {
        clock.advance(Duration::from_millis(33));
        report = tick_all(&mut engine, &table);
    }

    assert_eq!(
        engine.zone(last).unwrap().value(),
        Some(value("3-red-striped-squiggles"))
    );
    // The misses have aged out; only the readable zone is still tried.
    assert_eq!(report.reclassified, 1);
}

// =============================================================================
// Recovery And Eviction Tests
// =============================================================================

#[test]
fn test_missing_zone_recovered_by_classifier() {
    let (mut engine, clock) = engine();
    let table = Table::new(greens());
    tick_all(&mut engine, &table);
    let missing = engine.zones()[1].id();

    clock.advance(Duration::from_millis(33));
    let mut detections = table.detections();
    detections.remove(1);
    let report = engine.tick(&table, FRAME, &detections);

    assert_eq!(report.recovered, 1);
    let zone = engine.zone(missing).unwrap();
    assert_eq!(zone.last_detected(), engine.clock().now());
}

#[test]
fn test_weak_recovery_is_only_retained() {
    let (mut engine, clock) = engine();
    let table = Table::new(greens());
    tick_all(&mut engine, &table);

    clock.advance(Duration::from_millis(33));
    let mut weak = table.clone();
    weak.cards[1] = weak.cards[1].clone().with_score(0.5);
    let mut detections = table.detections();
    detections.remove(1);
    let report = engine.tick(&weak, FRAME, &detections);

    assert_eq!(report.recovered, 0);
    assert_eq!(report.retained, 1);
    assert_eq!(engine.zones().len(), 3);
}

#[test]
fn test_recovery_follows_table_motion() {
    let (mut engine, clock) = engine();
    let table = Table::new(greens());
    tick_all(&mut engine, &table);
    let missing = engine.zones()[2].id();

    // Camera pans: every card moves right, the last one is not detected.
    clock.advance(Duration::from_millis(33));
    let panned = table.shifted(60.0, 0.0);
    let mut detections = panned.detections();
    detections.pop();
    let report = engine.tick(&panned, FRAME, &detections);

    assert_eq!(report.recovered, 1);
    assert_eq!(engine.zone(missing).unwrap().bbox().center_x(), 710.0);
}

#[test]
fn test_eviction_after_window() {
    let (mut engine, clock) = engine();
    let table = Table::new(greens());
    tick_all(&mut engine, &table);
    let gone = engine.zones()[0].id();

    let remaining = Table::new(table.cards[1..].to_vec());

    clock.advance(Duration::from_millis(29_999));
    let report = tick_all(&mut engine, &remaining);
    assert_eq!(report.retained, 1);
    assert!(engine.zone(gone).is_some());

    clock.advance(Duration::from_millis(1));
    let report = tick_all(&mut engine, &remaining);
    assert_eq!(report.evicted, 1);
    assert!(engine.zone(gone).is_none());
    assert!(engine.groups().is_empty());
}

// =============================================================================
// User Control Tests
// =============================================================================

#[test]
fn test_override_pins_value_and_blocks_eviction() {
    let (mut engine, clock) = engine();
    let table = Table::new(greens());
    tick_all(&mut engine, &table);
    let id = engine.zones()[0].id();
    let pinned = value("3-red-striped-squiggles");

    engine.set_override(id, Some(pinned)).unwrap();
    assert_eq!(engine.zone(id).unwrap().override_value(), None);

    tick_all(&mut engine, &table);
    let zone = engine.zone(id).unwrap();
    assert!(zone.is_overridden());
    assert_eq!(zone.value(), Some(pinned));
    assert_eq!(zone.confidence(), 1.0);

    // Off the table for a minute: still there.
    let remaining = Table::new(table.cards[1..].to_vec());
    clock.advance(Duration::from_secs(60));
    tick_all(&mut engine, &remaining);
    assert!(engine.zone(id).is_some());

    engine.clear_override(id).unwrap();
    tick_all(&mut engine, &remaining);
    assert!(engine.zone(id).is_none());
}

#[test]
fn test_edit_lock_freezes_scores() {
    let (mut engine, clock) = engine();
    let card = PlacedCard::new("1-green-empty-oval", 300.0, 300.0);
    tick_all(&mut engine, &Table::new(vec![card.clone()]));
    let id = engine.zones()[0].id();

    engine.begin_edit(id).unwrap();
    clock.advance(Duration::from_millis(33));
    let misread = Table::new(vec![card.reads_as("2-purple-solid-diamonds", 1.0)]);
    tick_all(&mut engine, &misread);
    assert!(engine.zone(id).unwrap().is_editing());
    assert_eq!(engine.zone(id).unwrap().value(), Some(value("1-green-empty-oval")));

    engine.end_edit(id).unwrap();
    clock.advance(Duration::from_millis(33));
    tick_all(&mut engine, &misread);
    assert_eq!(engine.zone(id).unwrap().value(), Some(value("2-purple-solid-diamonds")));
}

#[test]
fn test_mark_for_deletion() {
    let (mut engine, _) = engine();
    let table = Table::new(greens());
    tick_all(&mut engine, &table);
    let id = engine.zones()[1].id();

    engine.mark_for_deletion(id).unwrap();
    let report = engine.refresh();
    assert_eq!(report.deleted, 1);
    assert!(engine.zone(id).is_none());

    assert_eq!(
        engine.set_override(id, None),
        Err(EngineError::ZoneNotFound(id))
    );
}

#[test]
fn test_manual_zone_joins_solutions() {
    let (mut engine, _) = engine();
    let table = Table::new(greens()[..2].to_vec());
    tick_all(&mut engine, &table);
    assert!(engine.groups().is_empty());

    let bbox = engine.suggest_manual_box(650.0, 200.0);
    assert_eq!((bbox.width(), bbox.height()), (150.0, 200.0));
    let id = engine.add_manual_zone(bbox, value("1-green-empty-squiggle"));
    assert!(engine.zone(id).is_none());

    engine.refresh();
    let zone = engine.zone(id).unwrap();
    assert!(zone.is_overridden());
    assert_eq!(engine.groups().len(), 1);
    assert!(engine.zones().iter().all(|z| z.group_ids() == [GroupId(0)]));

    // The detector never sees it, but an overridden zone stays.
    tick_all(&mut engine, &table);
    assert_eq!(engine.groups().len(), 1);
    assert_eq!(engine.zone_at(650.0, 200.0).map(|z| z.id()), Some(id));
}

#[test]
fn test_snapshot_unaffected_by_later_ticks() {
    let (mut engine, _) = engine();
    let table = Table::new(greens());
    tick_all(&mut engine, &table);
    let snapshot = engine.snapshot();

    engine.mark_for_deletion(snapshot[0].id()).unwrap();
    engine.refresh();

    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot[0].group_ids().len(), 1);
    assert_eq!(engine.zones().len(), 2);
}

#[test]
fn test_clear_keeps_ids_unique() {
    let (mut engine, _) = engine();
    let table = Table::new(greens());
    tick_all(&mut engine, &table);
    let before = zone_ids(&engine);

    engine.clear();
    assert!(engine.zones().is_empty());
    tick_all(&mut engine, &table);
    assert!(zone_ids(&engine).iter().all(|id| !before.contains(id)));
}

// =============================================================================
// Cards And Groups Tests
// =============================================================================

#[test]
fn test_duplicate_values_share_one_card() {
    let (mut engine, _) = engine();
    let mut cards = greens();
    cards.push(PlacedCard::new("1-green-empty-oval", 900.0, 900.0));
    let table = Table::new(cards);
    tick_all(&mut engine, &table);

    assert_eq!(engine.zones().len(), 4);
    assert_eq!(engine.cards().count(), 3);
    let oval = engine.card(&value("1-green-empty-oval")).unwrap();
    assert!(oval.is_duplicate());

    let duplicates: Vec<_> = engine.zones().iter().filter(|z| z.is_duplicate()).collect();
    assert_eq!(duplicates.len(), 2);
    assert_eq!(duplicates[0].group_ids(), duplicates[1].group_ids());
}

#[test]
fn test_first_twelve_all_sets() {
    let (mut engine, _) = engine();
    let labels = first_twelve();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    let table = Table::grid(&labels);

    let report = tick_all(&mut engine, &table);
    assert_eq!(report.created, 12);
    assert_eq!(report.sets, 13);
    assert_eq!(report.groups, 13);

    let ids: Vec<_> = engine.groups().iter().map(|g| g.id).collect();
    assert_eq!(ids, (0..13).map(GroupId).collect::<Vec<_>>());
}

#[test]
fn test_group_ids_stable_across_ticks() {
    let (mut engine, clock) = engine();
    let labels = first_twelve();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    let table = Table::grid(&labels);
    tick_all(&mut engine, &table);

    let assignment = |engine: &common::Engine| -> Vec<(ZoneId, Vec<GroupId>)> {
        engine
            .zones()
            .iter()
            .map(|z| (z.id(), z.group_ids().to_vec()))
            .collect()
    };
    let first = assignment(&engine);

    for _ in 0..4 {
        clock.advance(Duration::from_millis(33));
        tick_all(&mut engine, &table.shifted(3.0, 3.0));
        assert_eq!(assignment(&engine), first);
    }
}

#[test]
fn test_freed_group_ids_reused() {
    let (mut engine, _) = engine();
    let mut cards = greens();
    cards.extend(purples());
    let table = Table::new(cards);
    tick_all(&mut engine, &table);

    let purple_key = engine.groups()[1].solution.key().to_owned();
    assert!(purple_key.contains("purple"));

    for id in zone_ids(&engine).into_iter().take(3) {
        engine.mark_for_deletion(id).unwrap();
    }
    engine.refresh();
    assert_eq!(engine.groups().len(), 1);
    assert_eq!(engine.groups()[0].id, GroupId(1));

    let mut cards = purples();
    cards.extend(reds());
    tick_all(&mut engine, &Table::new(cards));

    let groups = engine.groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].id, GroupId(0));
    assert!(groups[0].solution.key().contains("red"));
    assert_eq!(groups[1].id, GroupId(1));
    assert_eq!(groups[1].solution.key(), purple_key);
}

#[test]
fn test_non_overlapping_mode() {
    let (mut engine, _) = engine();
    let labels = first_twelve();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    let table = Table::grid(&labels);
    tick_all(&mut engine, &table);
    assert_eq!(engine.groups().len(), 13);

    engine.set_mode(SolveMode::NonOverlapping);
    let report = engine.refresh();
    assert_eq!(report.sets, 13);
    assert_eq!(report.groups, 1);

    let bundle = &engine.groups()[0];
    assert_eq!(bundle.id, GroupId(0));
    assert_eq!(bundle.solution.sets().len(), 4);
    assert!(engine.zones().iter().all(|z| z.group_ids() == [GroupId(0)]));

    engine.set_mode(engine.mode().toggled());
    engine.refresh();
    assert_eq!(engine.groups().len(), 13);
}

#[test]
fn test_initial_mode_from_config() {
    let config = EngineConfig::default().with_mode(SolveMode::NonOverlapping);
    let (mut engine, _) = engine_with(config);
    let table = Table::new(greens());
    tick_all(&mut engine, &table);
    assert_eq!(engine.mode(), SolveMode::NonOverlapping);
    assert_eq!(engine.groups().len(), 1);
}
