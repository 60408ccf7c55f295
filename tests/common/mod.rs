//! Shared fixtures: an in-memory table of cards and a classifier that reads it.

#![allow(dead_code)]

use set_tracker::card::CardValue;
use set_tracker::engine::{EngineConfig, ReconciliationEngine};
use set_tracker::tracking::{
    AttributeClassifier, BoundingBox, Detection, FrameSize, ManualClock, Region, ScoreSlots,
};

pub const FRAME: FrameSize = FrameSize::new(1200, 1200);
pub const CARD_WIDTH: f32 = 150.0;
pub const CARD_HEIGHT: f32 = 200.0;

/// One physical card and what the classifier reports for it.
#[derive(Clone, Debug)]
pub struct PlacedCard {
    pub bbox: BoundingBox,
    pub value: CardValue,
    pub reading: Option<ScoreSlots>,
    pub coarse: Option<(String, f32)>,
}

impl PlacedCard {
    pub fn new(label: &str, x: f32, y: f32) -> Self {
        let value = CardValue::decode(label).unwrap();
        Self {
            bbox: BoundingBox::from_center(x, y, CARD_WIDTH, CARD_HEIGHT),
            value,
            reading: Some(ScoreSlots::from_value(&value, 0.9)),
            coarse: None,
        }
    }

    /// Read as `label` at `score` instead of its true value.
    pub fn reads_as(mut self, label: &str, score: f32) -> Self {
        let shown = CardValue::decode(label).unwrap();
        self.reading = Some(ScoreSlots::from_value(&shown, score));
        self
    }

    pub fn with_score(self, score: f32) -> Self {
        let label = self.value.to_string();
        self.reads_as(&label, score)
    }

    pub fn with_reading(mut self, reading: ScoreSlots) -> Self {
        self.reading = Some(reading);
        self
    }

    pub fn unreadable(mut self) -> Self {
        self.reading = None;
        self
    }

    pub fn with_coarse_label(mut self, label: &str, score: f32) -> Self {
        self.coarse = Some((label.to_owned(), score));
        self
    }

    pub fn shifted(mut self, dx: f32, dy: f32) -> Self {
        self.bbox = BoundingBox::new(
            self.bbox.left + dx,
            self.bbox.top + dy,
            self.bbox.right + dx,
            self.bbox.bottom + dy,
        );
        self
    }

    pub fn detection(&self) -> Detection {
        let detection = Detection::new(self.bbox);
        match &self.coarse {
            Some((label, score)) => detection.with_label(label.clone(), *score),
            None => detection,
        }
    }
}

/// What the camera sees.
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub cards: Vec<PlacedCard>,
}

impl Table {
    pub fn new(cards: Vec<PlacedCard>) -> Self {
        Self { cards }
    }

    /// Lay cards out on a four-column grid, well apart.
    pub fn grid(labels: &[&str]) -> Self {
        let cards = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let (col, row) = ((i % 4) as f32, (i / 4) as f32);
                PlacedCard::new(label, 150.0 + 250.0 * col, 200.0 + 300.0 * row)
            })
            .collect();
        Self { cards }
    }

    /// A detection for every card.
    pub fn detections(&self) -> Vec<Detection> {
        self.cards.iter().map(PlacedCard::detection).collect()
    }

    pub fn shifted(&self, dx: f32, dy: f32) -> Self {
        Self {
            cards: self.cards.iter().cloned().map(|c| c.shifted(dx, dy)).collect(),
        }
    }
}

/// Reports the reading of whichever card's centre lies inside the region.
#[derive(Debug, Default)]
pub struct TableClassifier {
    pub calls: usize,
}

impl AttributeClassifier for TableClassifier {
    type Frame = Table;

    fn classify(&mut self, frame: &Table, region: &Region) -> Option<ScoreSlots> {
        self.calls += 1;
        frame
            .cards
            .iter()
            .find(|card| {
                let (cx, cy) = (card.bbox.center_x(), card.bbox.center_y());
                cx >= region.x as f32
                    && cx < (region.x + region.width) as f32
                    && cy >= region.y as f32
                    && cy < (region.y + region.height) as f32
            })
            .and_then(|card| card.reading.clone())
    }
}

pub type Engine = ReconciliationEngine<TableClassifier, ManualClock>;

pub fn engine_with(config: EngineConfig) -> (Engine, ManualClock) {
    let clock = ManualClock::new();
    let engine =
        ReconciliationEngine::with_clock(TableClassifier::default(), clock.clone(), config)
            .unwrap();
    (engine, clock)
}

pub fn engine() -> (Engine, ManualClock) {
    engine_with(EngineConfig::default())
}

/// Tick with every card on the table detected.
pub fn tick_all(engine: &mut Engine, table: &Table) -> set_tracker::engine::TickReport {
    engine.tick(table, FRAME, &table.detections())
}

pub fn value(label: &str) -> CardValue {
    CardValue::decode(label).unwrap()
}

/// The first twelve cards of the deck in vocabulary order.
pub fn first_twelve() -> Vec<String> {
    CardValue::vocabulary().into_iter().take(12).collect()
}
