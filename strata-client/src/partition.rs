//! Partition schema and physical partition descriptors.
//!
//! A table's partitioning is an ordered list of hash components followed by
//! one (possibly empty) range component. A partition key concatenates, for
//! each hash component in order, the 4-byte big-endian bucket index, then
//! the encoded range key. Keys may be truncated after any component.

use strata_result::{Error, Result};
use strata_types::ColumnId;

use crate::hash::{Hash64Fn, hash64};
use crate::schema::Schema;

/// One hash component: a set of primary key columns hashed into
/// `num_buckets` buckets with a per-component seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashSchema {
    column_ids: Vec<ColumnId>,
    num_buckets: u32,
    seed: u32,
}

impl HashSchema {
    /// Build a hash component. At least one column and two buckets are
    /// required.
    pub fn new(column_ids: Vec<ColumnId>, num_buckets: u32, seed: u32) -> Result<HashSchema> {
        if column_ids.is_empty() {
            return Err(Error::invalid_argument(
                "hash component requires at least one column",
            ));
        }
        if num_buckets < 2 {
            return Err(Error::invalid_argument(format!(
                "hash component requires at least two buckets, got {num_buckets}"
            )));
        }
        Ok(HashSchema {
            column_ids,
            num_buckets,
            seed,
        })
    }

    #[inline]
    pub fn column_ids(&self) -> &[ColumnId] {
        &self.column_ids
    }

    #[inline]
    pub fn num_buckets(&self) -> u32 {
        self.num_buckets
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

/// The range component: an ordered list of primary key column ids, possibly
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeSchema {
    column_ids: Vec<ColumnId>,
}

impl RangeSchema {
    pub fn new(column_ids: Vec<ColumnId>) -> RangeSchema {
        RangeSchema { column_ids }
    }

    #[inline]
    pub fn column_ids(&self) -> &[ColumnId] {
        &self.column_ids
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.column_ids.is_empty()
    }
}

/// A table's complete partitioning: hash components in order, then the range
/// component, plus the bucket hash function in force for the deployment.
#[derive(Debug, Clone)]
pub struct PartitionSchema {
    hash_schemas: Vec<HashSchema>,
    range_schema: RangeSchema,
    hash_fn: Hash64Fn,
}

impl PartitionSchema {
    pub fn new(hash_schemas: Vec<HashSchema>, range_schema: RangeSchema) -> PartitionSchema {
        PartitionSchema {
            hash_schemas,
            range_schema,
            hash_fn: hash64,
        }
    }

    /// Replace the bucket hash function. The function must match the one the
    /// servers use, or scans will visit the wrong tablets.
    pub fn with_hash_fn(mut self, hash_fn: Hash64Fn) -> PartitionSchema {
        self.hash_fn = hash_fn;
        self
    }

    #[inline]
    pub fn hash_schemas(&self) -> &[HashSchema] {
        &self.hash_schemas
    }

    #[inline]
    pub fn range_schema(&self) -> &RangeSchema {
        &self.range_schema
    }

    #[inline]
    pub fn hash_fn(&self) -> Hash64Fn {
        self.hash_fn
    }

    /// Check this partitioning against a table schema.
    ///
    /// Every referenced column id must resolve to a primary key column, and
    /// the column sets of the hash components and the range component must
    /// be pairwise disjoint.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        let mut used = vec![false; schema.num_columns()];
        let component_columns = self
            .hash_schemas
            .iter()
            .map(|hs| hs.column_ids())
            .chain(std::iter::once(self.range_schema.column_ids()));

        for column_ids in component_columns {
            for &id in column_ids {
                let Some(idx) = schema.index_of_id(id) else {
                    return Err(Error::schema_mismatch(format!(
                        "partition schema references unknown column id {id}"
                    )));
                };
                if idx >= schema.num_key_columns() {
                    return Err(Error::schema_mismatch(format!(
                        "partition column '{}' is not part of the primary key",
                        schema.column_by_index(idx).name()
                    )));
                }
                if used[idx] {
                    return Err(Error::schema_mismatch(format!(
                        "column '{}' appears in multiple partition components",
                        schema.column_by_index(idx).name()
                    )));
                }
                used[idx] = true;
            }
        }
        Ok(())
    }

    /// Whether this is simple range partitioning: no hash components, and
    /// the range columns are exactly the primary key columns in order.
    ///
    /// Under simple range partitioning the range key encoding coincides with
    /// the primary key encoding, so explicit primary key scan bounds can
    /// tighten the range component directly.
    pub fn is_simple_range_partitioning(&self, schema: &Schema) -> bool {
        if !self.hash_schemas.is_empty() {
            return false;
        }
        if self.range_schema.column_ids().len() != schema.num_key_columns() {
            return false;
        }
        self.range_schema
            .column_ids()
            .iter()
            .enumerate()
            .all(|(i, &id)| schema.column_by_index(i).id() == id)
    }
}

/// A physical partition: the contiguous slice of the partition key space
/// served by one tablet. An empty end key means the partition extends to the
/// end of the key space.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    partition_key_start: Vec<u8>,
    partition_key_end: Vec<u8>,
}

impl Partition {
    pub fn new(partition_key_start: Vec<u8>, partition_key_end: Vec<u8>) -> Partition {
        Partition {
            partition_key_start,
            partition_key_end,
        }
    }

    #[inline]
    pub fn partition_key_start(&self) -> &[u8] {
        &self.partition_key_start
    }

    #[inline]
    pub fn partition_key_end(&self) -> &[u8] {
        &self.partition_key_end
    }
}
