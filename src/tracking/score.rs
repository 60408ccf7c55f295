//! Per-attribute best-so-far classification scores.
//!
//! A zone keeps one slot per attribute. Each classifier pass may fill some
//! or all slots; a slot is only ever replaced by a result at least as
//! confident, so a zone's best guess never regresses while it is tracked.

use serde::{Deserialize, Serialize};

use crate::card::{Attribute, CardValue};

/// A classifier's label for one attribute, with its score in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeScore {
    pub label: String,
    pub score: f32,
}

impl AttributeScore {
    #[must_use]
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Four optional attribute scores indexed by [`Attribute`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSlots([Option<AttributeScore>; Attribute::COUNT]);

impl ScoreSlots {
    /// All slots empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All four slots filled with the labels of `value`, each at `score`.
    #[must_use]
    pub fn from_value(value: &CardValue, score: f32) -> Self {
        let mut slots = Self::new();
        for attribute in Attribute::ALL {
            slots.set(
                attribute,
                AttributeScore::new(value.attribute_label(attribute), score),
            );
        }
        slots
    }

    /// Builder form of [`ScoreSlots::set`].
    #[must_use]
    pub fn with(mut self, attribute: Attribute, label: impl Into<String>, score: f32) -> Self {
        self.set(attribute, AttributeScore::new(label, score));
        self
    }

    /// Overwrite one slot unconditionally.
    pub fn set(&mut self, attribute: Attribute, score: AttributeScore) {
        self.0[attribute.index()] = Some(score);
    }

    #[must_use]
    pub fn get(&self, attribute: Attribute) -> Option<&AttributeScore> {
        self.0[attribute.index()].as_ref()
    }

    /// Filled slots with their attribute.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &AttributeScore)> {
        Attribute::ALL
            .into_iter()
            .filter_map(move |a| self.get(a).map(|s| (a, s)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// Fold another result in, slot by slot, keeping the better score.
    ///
    /// An incoming slot replaces the held one when the held one is empty or
    /// the incoming score is greater or equal. Returns whether any slot
    /// changed.
    pub fn merge_best(&mut self, incoming: &ScoreSlots) -> bool {
        let mut changed = false;
        for (held, new) in self.0.iter_mut().zip(incoming.0.iter()) {
            let Some(new) = new else { continue };
            let replace = match held {
                None => true,
                Some(old) => old.score <= new.score,
            };
            if replace && held.as_ref() != Some(new) {
                *held = Some(new.clone());
                changed = true;
            }
        }
        changed
    }

    /// Product of the four scores, `None` unless complete.
    #[must_use]
    pub fn confidence(&self) -> Option<f32> {
        self.0
            .iter()
            .try_fold(1.0f32, |acc, slot| slot.as_ref().map(|s| acc * s.score))
    }

    /// The four labels joined with `-` in attribute order, `None` unless complete.
    #[must_use]
    pub fn joined_label(&self) -> Option<String> {
        let labels: Option<Vec<&str>> = self
            .0
            .iter()
            .map(|slot| slot.as_ref().map(|s| s.label.as_str()))
            .collect();
        labels.map(|l| l.join("-"))
    }

    /// Decode the joined label into a card value.
    ///
    /// `None` when a slot is empty or a label is not in the vocabulary.
    #[must_use]
    pub fn resolve(&self) -> Option<CardValue> {
        self.joined_label().and_then(|l| CardValue::decode(&l))
    }
}
