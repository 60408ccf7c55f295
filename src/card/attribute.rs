//! The four card attributes and their three levels each.
//!
//! Every attribute level carries a numeric code in `1..=3`. The solver only
//! ever looks at codes; labels exist for the classifier vocabulary and the
//! canonical string form.
//!
//! ## Codes
//!
//! | Attribute | 1 | 2 | 3 |
//! |---|---|---|---|
//! | Number | `1` | `2` | `3` |
//! | Color | `green` | `purple` | `red` |
//! | Shading | `empty` | `solid` | `striped` |
//! | Shape | `diamond` | `oval` | `squiggle` |
//!
//! Codes follow alphabetical label order, so sorting values by code sorts
//! them the same way the classifier vocabulary is sorted.

use serde::{Deserialize, Serialize};

/// One of the four independent card axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    Number,
    Color,
    Shading,
    Shape,
}

impl Attribute {
    /// All attributes in slot order.
    pub const ALL: [Attribute; 4] = [
        Attribute::Number,
        Attribute::Color,
        Attribute::Shading,
        Attribute::Shape,
    ];

    /// Number of attributes (and score slots per zone).
    pub const COUNT: usize = 4;

    /// Slot index of this attribute (`0..4`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase attribute name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Attribute::Number => "number",
            Attribute::Color => "color",
            Attribute::Shading => "shading",
            Attribute::Shape => "shape",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared behaviour of the per-attribute level enums.
///
/// `VARIANTS` must be listed in code order (`VARIANTS[i].code() == i + 1`);
/// the cyclic helpers index into it directly.
pub trait AttributeLevel: Copy + Eq + Sized + 'static {
    /// The attribute this level belongs to.
    const ATTRIBUTE: Attribute;

    /// All levels, ordered by code.
    const VARIANTS: [Self; 3];

    /// Numeric code in `1..=3`.
    fn code(self) -> u8;

    /// Canonical lowercase label (singular form for shapes).
    fn label(self) -> &'static str;

    /// Look up a level by its code.
    #[must_use]
    fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=3 => Some(Self::VARIANTS[usize::from(code - 1)]),
            _ => None,
        }
    }

    /// Look up a level by its label, ignoring ASCII case.
    #[must_use]
    fn from_label(label: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.label().eq_ignore_ascii_case(label))
    }

    /// Cyclic successor: `(code - 1 + 1) % 3 + 1`.
    #[must_use]
    fn next(self) -> Self {
        Self::VARIANTS[usize::from(self.code() % 3)]
    }

    /// Cyclic predecessor: `(code - 1 + 2) % 3 + 1`.
    #[must_use]
    fn previous(self) -> Self {
        Self::VARIANTS[usize::from((self.code() + 1) % 3)]
    }
}

macro_rules! attribute_level {
    (
        $(#[$meta:meta])*
        $name:ident => $attr:ident {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum $name {
            $($variant = $code),+
        }

        impl AttributeLevel for $name {
            const ATTRIBUTE: Attribute = Attribute::$attr;
            const VARIANTS: [Self; 3] = [$($name::$variant),+];

            fn code(self) -> u8 {
                self as u8
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

attribute_level! {
    /// How many symbols are printed on the card.
    Number => Number {
        One = 1 => "1",
        Two = 2 => "2",
        Three = 3 => "3",
    }
}

attribute_level! {
    /// Symbol color.
    Color => Color {
        Green = 1 => "green",
        Purple = 2 => "purple",
        Red = 3 => "red",
    }
}

attribute_level! {
    /// Symbol fill.
    Shading => Shading {
        Empty = 1 => "empty",
        Solid = 2 => "solid",
        Striped = 3 => "striped",
    }
}

attribute_level! {
    /// Symbol outline.
    Shape => Shape {
        Diamond = 1 => "diamond",
        Oval = 2 => "oval",
        Squiggle = 3 => "squiggle",
    }
}
