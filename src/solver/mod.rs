//! Set solver: enumeration, disjoint packing and solution selection.
//!
//! ## Key Types
//!
//! - `SetCombination`: Three distinct cards satisfying the Set rule
//! - `Packing`: A collection of pairwise-disjoint Sets
//! - `Solution`: A Set or bundle of Sets with a canonical key
//! - `SolveMode`: All Sets, or one maximum non-overlapping bundle
//!
//! ## Usage
//!
//! ```
//! use set_tracker::card::CardValue;
//! use set_tracker::solver::{solve, SolveMode};
//!
//! let table: Vec<CardValue> = CardValue::all().take(12).collect();
//!
//! let all = solve(table.iter().copied(), SolveMode::AllSets);
//! assert_eq!(all.len(), 13);
//!
//! let bundle = solve(table.iter().copied(), SolveMode::NonOverlapping);
//! assert_eq!(bundle[0].sets().len(), 4);
//! ```

pub mod combination;
pub mod finder;
pub mod packer;
pub mod solution;

pub use combination::{is_set, third_card, InvalidSetError, SetCombination};
pub use finder::find_all_sets;
pub use packer::{find_disjoint_packings, Packing};
pub use solution::{select_solutions, solve, Solution, SolveMode};
