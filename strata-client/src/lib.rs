//! Client-side partition pruning for the Strata table store.
//!
//! A Strata table is horizontally partitioned by a combination of
//! hash-bucket components and one range component over subsets of its
//! primary key columns. Given a scan's column predicates and explicit
//! bounds, the [`PartitionPruner`] computes the minimal ordered set of
//! partition key ranges the scan must visit, and drives iteration over them
//! as tablets are consumed.
//!
//! Modules:
//! - schema: table schema and column metadata.
//! - row: partially-set rows used to stage key components.
//! - key: lexicographically-ordered key encoding.
//! - hash: bucket computation for hash-partitioned components.
//! - partition: partition schema and physical partition descriptors.
//! - scan: scan configuration (predicates + explicit bounds).
//! - pruner: predicate push-down and the partition key range iterator.

#![forbid(unsafe_code)]

pub mod hash;
pub mod key;
pub mod partition;
pub mod pruner;
pub mod row;
pub mod scan;
pub mod schema;

pub use partition::{HashSchema, Partition, PartitionSchema, RangeSchema};
pub use pruner::PartitionPruner;
pub use row::PartialRow;
pub use scan::ScanSpec;
pub use schema::{ColumnSchema, Schema};
