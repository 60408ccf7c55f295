//! Card values and their canonical string encoding.
//!
//! A `CardValue` is the immutable 4-tuple `(number, color, shading, shape)`.
//! There are exactly 81 of them.
//!
//! ## Canonical strings
//!
//! `number-color-shading-shape`, lowercase, with the shape pluralized when
//! the number is not one:
//!
//! ```
//! use set_tracker::card::CardValue;
//!
//! let v: CardValue = "2-red-solid-ovals".parse().unwrap();
//! assert_eq!(v.to_string(), "2-red-solid-ovals");
//!
//! // Singular and plural shapes both decode.
//! assert_eq!(CardValue::decode("2-red-solid-oval"), Some(v));
//! assert_eq!(CardValue::decode("2-red-solid"), None);
//! ```
//!
//! The same strings are the classifier's label vocabulary. Vocabulary order
//! is code order, so `CardValue::index()` is the label's position in it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::attribute::{Attribute, AttributeLevel, Color, Number, Shading, Shape};

/// Number of distinct card values.
pub const DECK_SIZE: usize = 81;

/// Why a canonical card string failed to decode.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseCardValueError {
    /// The string did not split into four `-`-separated tokens.
    #[error("expected 4 '-'-separated tokens, found {0}")]
    TokenCount(usize),

    /// A token did not name a level of its attribute.
    #[error("unknown {attribute} token {token:?}")]
    UnknownToken { attribute: Attribute, token: String },
}

/// One of the 81 distinct cards.
///
/// Ordering follows the label vocabulary (number, then color, shading,
/// shape, each by code).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardValue {
    pub number: Number,
    pub color: Color,
    pub shading: Shading,
    pub shape: Shape,
}

impl CardValue {
    /// Create a card value.
    #[must_use]
    pub const fn new(number: Number, color: Color, shading: Shading, shape: Shape) -> Self {
        Self {
            number,
            color,
            shading,
            shape,
        }
    }

    /// Build a value from four attribute codes, each in `1..=3`.
    #[must_use]
    pub fn from_codes(codes: [u8; 4]) -> Option<Self> {
        Some(Self {
            number: Number::from_code(codes[0])?,
            color: Color::from_code(codes[1])?,
            shading: Shading::from_code(codes[2])?,
            shape: Shape::from_code(codes[3])?,
        })
    }

    /// Code of one attribute.
    #[must_use]
    pub fn code(&self, attribute: Attribute) -> u8 {
        match attribute {
            Attribute::Number => self.number.code(),
            Attribute::Color => self.color.code(),
            Attribute::Shading => self.shading.code(),
            Attribute::Shape => self.shape.code(),
        }
    }

    /// All four codes in slot order.
    #[must_use]
    pub fn codes(&self) -> [u8; 4] {
        Attribute::ALL.map(|a| self.code(a))
    }

    /// Singular label of one attribute, as an attribute classifier emits it.
    #[must_use]
    pub fn attribute_label(&self, attribute: Attribute) -> &'static str {
        match attribute {
            Attribute::Number => self.number.label(),
            Attribute::Color => self.color.label(),
            Attribute::Shading => self.shading.label(),
            Attribute::Shape => self.shape.label(),
        }
    }

    /// Position in the label vocabulary (`0..81`).
    #[must_use]
    pub fn index(&self) -> usize {
        self.codes()
            .iter()
            .fold(0, |acc, &code| acc * 3 + usize::from(code - 1))
    }

    /// Inverse of [`CardValue::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= DECK_SIZE {
            return None;
        }
        let digit = |place: usize| (index / place % 3) as u8 + 1;
        Self::from_codes([digit(27), digit(9), digit(3), digit(1)])
    }

    /// Every card value in vocabulary order.
    pub fn all() -> impl Iterator<Item = CardValue> {
        (0..DECK_SIZE).filter_map(CardValue::from_index)
    }

    /// The full label vocabulary in order.
    #[must_use]
    pub fn vocabulary() -> Vec<String> {
        Self::all().map(|v| v.encode()).collect()
    }

    /// Canonical string form.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parse a canonical string, returning `None` on malformed input.
    #[must_use]
    pub fn decode(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Copy with one attribute stepped to its cyclic successor.
    #[must_use]
    pub fn with_next(self, attribute: Attribute) -> Self {
        let mut v = self;
        match attribute {
            Attribute::Number => v.number = v.number.next(),
            Attribute::Color => v.color = v.color.next(),
            Attribute::Shading => v.shading = v.shading.next(),
            Attribute::Shape => v.shape = v.shape.next(),
        }
        v
    }

    /// Copy with one attribute stepped to its cyclic predecessor.
    #[must_use]
    pub fn with_previous(self, attribute: Attribute) -> Self {
        let mut v = self;
        match attribute {
            Attribute::Number => v.number = v.number.previous(),
            Attribute::Color => v.color = v.color.previous(),
            Attribute::Shading => v.shading = v.shading.previous(),
            Attribute::Shape => v.shape = v.shape.previous(),
        }
        v
    }
}

impl std::fmt::Display for CardValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.number, self.color, self.shading, self.shape
        )?;
        if self.number != Number::One {
            f.write_str("s")?;
        }
        Ok(())
    }
}

fn parse_token<T: AttributeLevel>(token: &str) -> Result<T, ParseCardValueError> {
    T::from_label(token).ok_or_else(|| ParseCardValueError::UnknownToken {
        attribute: T::ATTRIBUTE,
        token: token.to_string(),
    })
}

impl FromStr for CardValue {
    type Err = ParseCardValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.splitn(4, '-').collect();
        let &[number, color, shading, shape] = tokens.as_slice() else {
            return Err(ParseCardValueError::TokenCount(tokens.len()));
        };

        let shape = match parse_token::<Shape>(shape) {
            Ok(shape) => shape,
            Err(err) => {
                let singular = shape
                    .strip_suffix('s')
                    .or_else(|| shape.strip_suffix('S'))
                    .ok_or(err.clone())?;
                Shape::from_label(singular).ok_or(err)?
            }
        };

        Ok(Self {
            number: parse_token(number)?,
            color: parse_token(color)?,
            shading: parse_token(shading)?,
            shape,
        })
    }
}

impl TryFrom<String> for CardValue {
    type Error = ParseCardValueError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CardValue> for String {
    fn from(v: CardValue) -> Self {
        v.encode()
    }
}
