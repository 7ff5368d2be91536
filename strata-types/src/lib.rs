//! Common data types for the Strata client.
//!
//! This crate hosts the core scalar types used throughout the client,
//! decoupled from the predicate AST (`strata-expr`) and the partition
//! pruning machinery (`strata-client`).

#![forbid(unsafe_code)]

pub mod datum;
pub mod ids;

pub use datum::{DataType, Datum};
pub use ids::{ColumnId, ColumnIdx};
