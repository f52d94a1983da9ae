//! The column layout of flattened output.
//!
//! A [`Blueprint`] names every field that can be output, how many times each field repeats by
//! default and which subcolumns it is split into. [`resolve`] applies the user's counts and
//! exclusions to a blueprint to produce the [`ResolvedSchema`] that every record is flattened
//! against.
mod blueprint;
mod resolver;

pub use blueprint::{Blueprint, FieldSpec, Repeat};
pub use resolver::{
    parse_counts, parse_exclusions, resolve, Column, ColumnCounts, ColumnExclusions,
    ResolvedSchema, MAX_COUNT,
};
