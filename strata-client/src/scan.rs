//! Scan configuration consumed by the partition pruner.

use strata_expr::{ColumnPredicate, PredicateMap};

/// The pruner-relevant parts of a scan: simplified per-column predicates
/// plus the explicit primary key and partition key bounds.
///
/// All bounds are encoded keys; lower bounds are inclusive, upper bounds
/// exclusive, and an empty bound means unbounded on that side.
#[derive(Debug, Clone, Default)]
pub struct ScanSpec {
    predicates: PredicateMap,
    lower_bound_primary_key: Vec<u8>,
    upper_bound_primary_key: Vec<u8>,
    lower_bound_partition_key: Vec<u8>,
    upper_bound_partition_key: Vec<u8>,
}

impl ScanSpec {
    pub fn new() -> ScanSpec {
        ScanSpec::default()
    }

    /// Record the simplified predicate for a column. At most one predicate
    /// per column; setting a second one replaces the first. Merging
    /// overlapping predicates is the caller's job.
    pub fn set_predicate(&mut self, column: impl Into<String>, predicate: ColumnPredicate) {
        self.predicates.insert(column.into(), predicate);
    }

    pub fn set_lower_bound_primary_key(&mut self, key: Vec<u8>) {
        self.lower_bound_primary_key = key;
    }

    pub fn set_upper_bound_primary_key(&mut self, key: Vec<u8>) {
        self.upper_bound_primary_key = key;
    }

    pub fn set_lower_bound_partition_key(&mut self, key: Vec<u8>) {
        self.lower_bound_partition_key = key;
    }

    pub fn set_upper_bound_partition_key(&mut self, key: Vec<u8>) {
        self.upper_bound_partition_key = key;
    }

    #[inline]
    pub fn predicates(&self) -> &PredicateMap {
        &self.predicates
    }

    #[inline]
    pub fn lower_bound_primary_key(&self) -> &[u8] {
        &self.lower_bound_primary_key
    }

    #[inline]
    pub fn upper_bound_primary_key(&self) -> &[u8] {
        &self.upper_bound_primary_key
    }

    #[inline]
    pub fn lower_bound_partition_key(&self) -> &[u8] {
        &self.lower_bound_partition_key
    }

    #[inline]
    pub fn upper_bound_partition_key(&self) -> &[u8] {
        &self.upper_bound_partition_key
    }
}
