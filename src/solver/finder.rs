//! Exhaustive Set enumeration.

use crate::card::CardValue;

use super::combination::{is_set, SetCombination};

/// Find every Set among a collection of card values.
///
/// Duplicate values collapse to one: several physical cards showing the
/// same value are a tracking concern, not a solver one. Enumeration runs
/// over index triples `i < j < k` of the sorted distinct values, so no
/// triple is produced twice and the output is sorted.
///
/// ```
/// use set_tracker::card::CardValue;
/// use set_tracker::solver::find_all_sets;
///
/// let cards = ["1-green-empty-diamond", "1-green-empty-oval", "1-green-empty-squiggle"]
///     .iter()
///     .filter_map(|s| CardValue::decode(s));
/// assert_eq!(find_all_sets(cards).len(), 1);
/// ```
pub fn find_all_sets<I>(values: I) -> Vec<SetCombination>
where
    I: IntoIterator<Item = CardValue>,
{
    let mut distinct: Vec<CardValue> = values.into_iter().collect();
    distinct.sort_unstable();
    distinct.dedup();

    let n = distinct.len();
    let mut sets = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let (a, b, c) = (distinct[i], distinct[j], distinct[k]);
                if is_set(&a, &b, &c) {
                    if let Some(set) = SetCombination::new(a, b, c) {
                        sets.push(set);
                    }
                }
            }
        }
    }
    sets
}
