//! Card model: attributes, levels and card values.
//!
//! ## Key Types
//!
//! - `Attribute`: One of Number, Color, Shading, Shape
//! - `AttributeLevel`: Code/label/cycle behaviour shared by the level enums
//! - `Number`, `Color`, `Shading`, `Shape`: The three levels of each attribute
//! - `CardValue`: Immutable 4-tuple with a canonical string form
//!
//! Everything here is a pure value type.

pub mod attribute;
pub mod value;

pub use attribute::{Attribute, AttributeLevel, Color, Number, Shading, Shape};
pub use value::{CardValue, ParseCardValueError, DECK_SIZE};
