//! Three-card Set combinations.

use serde::{Deserialize, Serialize};

use crate::card::{Attribute, CardValue};

/// Check the Set rule for three cards.
///
/// For every attribute the three codes must sum to a multiple of 3. With
/// codes in `1..=3` that holds exactly when the three are all equal or all
/// different; "exactly two equal" never sums to a multiple of 3.
///
/// ```
/// use set_tracker::card::CardValue;
/// use set_tracker::solver::is_set;
///
/// let a = CardValue::decode("1-green-empty-diamond").unwrap();
/// let b = CardValue::decode("2-green-solid-ovals").unwrap();
/// let c = CardValue::decode("3-green-striped-squiggles").unwrap();
/// assert!(is_set(&a, &b, &c));
/// ```
#[must_use]
pub fn is_set(a: &CardValue, b: &CardValue, c: &CardValue) -> bool {
    Attribute::ALL
        .iter()
        .all(|&attr| (a.code(attr) + b.code(attr) + c.code(attr)) % 3 == 0)
}

/// The unique card completing a Set with `a` and `b`.
///
/// Returns `a` itself when `a == b`.
#[must_use]
pub fn third_card(a: &CardValue, b: &CardValue) -> CardValue {
    let codes = Attribute::ALL.map(|attr| 3 - (a.code(attr) + b.code(attr)) % 3);
    // Every code is in 1..=3 by construction.
    CardValue::from_codes(codes).unwrap_or(*a)
}

/// An unordered triple of distinct cards forming a Set.
///
/// Members are stored sorted, so equality and hashing are by member set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[CardValue; 3]", into = "[CardValue; 3]")]
pub struct SetCombination {
    cards: [CardValue; 3],
}

impl SetCombination {
    /// Build a combination if the three cards are distinct and form a Set.
    #[must_use]
    pub fn new(a: CardValue, b: CardValue, c: CardValue) -> Option<Self> {
        if a == b || !is_set(&a, &b, &c) {
            return None;
        }
        let mut cards = [a, b, c];
        cards.sort_unstable();
        Some(Self { cards })
    }

    /// Members in vocabulary order.
    #[must_use]
    pub fn cards(&self) -> &[CardValue; 3] {
        &self.cards
    }

    /// Whether `card` is a member.
    #[must_use]
    pub fn contains(&self, card: &CardValue) -> bool {
        self.cards.contains(card)
    }

    /// Whether the two combinations share at least one card.
    #[must_use]
    pub fn overlaps(&self, other: &SetCombination) -> bool {
        self.cards.iter().any(|c| other.contains(c))
    }

    /// Canonical key, e.g. `(1-green-empty-diamond, 1-green-empty-oval, 1-green-empty-squiggle)`.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

/// Three cards that are not a Set of distinct members.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("not a Set of three distinct cards: {0:?}")]
pub struct InvalidSetError(pub [CardValue; 3]);

impl TryFrom<[CardValue; 3]> for SetCombination {
    type Error = InvalidSetError;

    fn try_from(cards: [CardValue; 3]) -> Result<Self, Self::Error> {
        let [a, b, c] = cards;
        Self::new(a, b, c).ok_or(InvalidSetError(cards))
    }
}

impl From<SetCombination> for [CardValue; 3] {
    fn from(set: SetCombination) -> Self {
        set.cards
    }
}

impl std::fmt::Display for SetCombination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c] = &self.cards;
        write!(f, "({}, {}, {})", a, b, c)
    }
}
