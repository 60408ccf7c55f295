//! Maximum collections of pairwise-disjoint Sets.
//!
//! ## Algorithm
//!
//! Scan pairs of combinations for the first conflict (a shared card). A
//! disjoint collection can hold at most one of the two, so solve the
//! problem twice, once without each, and keep the side with more Sets.
//! When both sides reach the same size, both sides' alternatives are kept.
//! With no conflict left, the input is its own unique maximal packing.
//!
//! The result is exact. Cost is exponential in the number of conflicting
//! pairs, which a real table (a dozen or so cards, a few dozen Sets at
//! most) keeps small.

use super::combination::SetCombination;

/// A collection of pairwise-disjoint Sets, sorted.
pub type Packing = Vec<SetCombination>;

/// Find the maximum-cardinality packings of `sets`.
///
/// Always returns at least one packing; all returned packings have the same
/// size, contain no overlapping pair, and are distinct. Any one of them is
/// an acceptable answer.
///
/// ```
/// use set_tracker::card::CardValue;
/// use set_tracker::solver::{find_all_sets, find_disjoint_packings};
///
/// let sets = find_all_sets(CardValue::all().take(12));
/// let packings = find_disjoint_packings(&sets);
/// assert!(packings.iter().all(|p| p.len() == packings[0].len()));
/// ```
#[must_use]
pub fn find_disjoint_packings(sets: &[SetCombination]) -> Vec<Packing> {
    let mut input = sets.to_vec();
    input.sort_unstable();
    input.dedup();
    pack(&input)
}

fn pack(sets: &[SetCombination]) -> Vec<Packing> {
    for i in 0..sets.len() {
        for j in (i + 1)..sets.len() {
            if !sets[i].overlaps(&sets[j]) {
                continue;
            }

            let keep_first = pack(&without(sets, j));
            let keep_second = pack(&without(sets, i));
            debug_assert!(!keep_first.is_empty() && !keep_second.is_empty());

            let first_len = keep_first.first().map_or(0, Vec::len);
            let second_len = keep_second.first().map_or(0, Vec::len);
            return match first_len.cmp(&second_len) {
                std::cmp::Ordering::Greater => keep_first,
                std::cmp::Ordering::Less => keep_second,
                std::cmp::Ordering::Equal => merge(keep_first, keep_second),
            };
        }
    }
    vec![sets.to_vec()]
}

fn without(sets: &[SetCombination], index: usize) -> Vec<SetCombination> {
    sets.iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .map(|(_, s)| *s)
        .collect()
}

fn merge(mut a: Vec<Packing>, b: Vec<Packing>) -> Vec<Packing> {
    a.extend(b);
    a.sort_unstable();
    a.dedup();
    a
}
