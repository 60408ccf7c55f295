//! Logical cards: resolved zones collapsed by value.
//!
//! Several zones may resolve to the same value (a misread, or a second deck
//! on the table). The solver sees each value once; every zone sharing it is
//! flagged as a duplicate and shows the same group ids.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::card::CardValue;
use crate::tracking::{TrackedZone, ZoneId};

use super::groups::{Group, GroupId};

/// One distinct resolved value and the zones showing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogicalCard {
    value: CardValue,
    zones: SmallVec<[ZoneId; 2]>,
    group_ids: SmallVec<[GroupId; 4]>,
}

impl LogicalCard {
    fn new(value: CardValue) -> Self {
        Self {
            value,
            zones: SmallVec::new(),
            group_ids: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn value(&self) -> CardValue {
        self.value
    }

    /// Zones resolving to this value, in zone order.
    #[must_use]
    pub fn zones(&self) -> &[ZoneId] {
        &self.zones
    }

    #[must_use]
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.zones.len() > 1
    }
}

pub type CardMap = FxHashMap<CardValue, LogicalCard>;

/// Collapse resolved zones into one card per value.
///
/// Cards already present in `previous` are reused (and cleared) rather
/// than rebuilt; cards whose value vanished are dropped.
pub fn collapse(previous: &mut CardMap, zones: &[TrackedZone]) -> CardMap {
    let mut cards = CardMap::default();
    for zone in zones {
        let Some(value) = zone.value() else { continue };
        cards
            .entry(value)
            .or_insert_with(|| match previous.remove(&value) {
                Some(mut card) => {
                    card.zones.clear();
                    card.group_ids.clear();
                    card
                }
                None => LogicalCard::new(value),
            })
            .zones
            .push(zone.id());
    }
    previous.clear();
    cards
}

/// Record each group's id on every card it uses.
pub fn assign_groups(cards: &mut CardMap, groups: &[Group]) {
    for group in groups {
        for value in group.solution.cards() {
            match cards.get_mut(value) {
                Some(card) => {
                    if !card.group_ids.contains(&group.id) {
                        card.group_ids.push(group.id);
                    }
                }
                None => debug_assert!(false, "{} uses {value}, which no zone shows", group.id),
            }
        }
    }
}
