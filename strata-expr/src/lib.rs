//! Column predicate model for the Strata client.
//!
//! Predicates arrive at the partition pruner already simplified: at most one
//! predicate per column, with overlapping constraints merged upstream. This
//! crate only models the simplified forms; it performs no evaluation.

#![forbid(unsafe_code)]

pub mod predicate;

pub use predicate::{ColumnPredicate, PredicateKind, PredicateMap};
