//! Accepted solutions and solve modes.
//!
//! A `Solution` is what one group id gets attached to: a single Set in
//! all-sets mode, or the chosen maximal disjoint bundle in non-overlapping
//! mode. Its key is stable across ticks as long as the same Sets are found.

use serde::{Deserialize, Serialize};

use crate::card::CardValue;

use super::combination::SetCombination;
use super::finder::find_all_sets;
use super::packer::find_disjoint_packings;

/// How solutions are derived from the Sets on the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveMode {
    /// Every Set is its own solution; Sets may share cards.
    #[default]
    AllSets,
    /// One maximum collection of pairwise-disjoint Sets.
    NonOverlapping,
}

impl SolveMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SolveMode::AllSets => SolveMode::NonOverlapping,
            SolveMode::NonOverlapping => SolveMode::AllSets,
        }
    }
}

/// One accepted solution: a non-empty bundle of Sets with a canonical key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Solution {
    sets: Vec<SetCombination>,
    key: String,
}

impl Solution {
    /// Build a solution from a bundle of Sets.
    ///
    /// Members are ordered by their own canonical keys; the solution key is
    /// `[` + member keys joined by `, ` + `]`.
    #[must_use]
    pub fn new(sets: Vec<SetCombination>) -> Self {
        let mut keyed: Vec<(String, SetCombination)> =
            sets.into_iter().map(|s| (s.key(), s)).collect();
        keyed.sort();
        keyed.dedup();

        let key = format!(
            "[{}]",
            keyed
                .iter()
                .map(|(k, _)| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let sets = keyed.into_iter().map(|(_, s)| s).collect();
        Self { sets, key }
    }

    /// A solution holding exactly one Set.
    #[must_use]
    pub fn single(set: SetCombination) -> Self {
        Self::new(vec![set])
    }

    /// Canonical key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Member Sets, ordered by key.
    #[must_use]
    pub fn sets(&self) -> &[SetCombination] {
        &self.sets
    }

    /// Every card used by the solution.
    pub fn cards(&self) -> impl Iterator<Item = &CardValue> {
        self.sets.iter().flat_map(|s| s.cards().iter())
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key)
    }
}

/// Compute the accepted solutions for a collection of card values.
///
/// In `NonOverlapping` mode a tie between equally large packings is broken
/// by picking the packing with the smallest key, so the same table always
/// yields the same bundle. A table with no Sets yields no solutions.
#[must_use]
pub fn solve<I>(values: I, mode: SolveMode) -> Vec<Solution>
where
    I: IntoIterator<Item = CardValue>,
{
    select_solutions(&find_all_sets(values), mode)
}

/// Turn an already enumerated list of Sets into accepted solutions.
#[must_use]
pub fn select_solutions(sets: &[SetCombination], mode: SolveMode) -> Vec<Solution> {
    match mode {
        SolveMode::AllSets => sets.iter().copied().map(Solution::single).collect(),
        SolveMode::NonOverlapping => find_disjoint_packings(sets)
            .into_iter()
            .filter(|packing| !packing.is_empty())
            .map(Solution::new)
            .min_by(|a, b| a.key.cmp(&b.key))
            .into_iter()
            .collect(),
    }
}
