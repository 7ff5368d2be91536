//! Predicate push-down into partition keys, and the resulting scan-range
//! iterator.
//!
//! Viewing a partition key as a sequence of hash bucket components followed
//! by a range component, the pruning rules are:
//!
//! 1. Partition keys are truncated after the final constrained component. A
//!    hash component is constrained when equality predicates pin it to a
//!    single bucket; the range component is constrained when the pushed-down
//!    predicates (or explicit bounds) give it a lower or upper key.
//! 2. When the final constrained component is a hash bucket, the bucket in
//!    the upper bound is incremented by one to turn the inclusive bucket
//!    into an exclusive key.
//! 3. Each unconstrained hash component left of the final constrained one
//!    multiplies the result: the scan has to visit every one of its
//!    buckets. The number of produced ranges is the product of those bucket
//!    counts (one, when there are none).

use std::collections::VecDeque;

use strata_expr::{ColumnPredicate, PredicateKind, PredicateMap};
use strata_result::{Error, Result};
use strata_types::{ColumnId, ColumnIdx};

use crate::hash::{self, Hash64Fn};
use crate::key;
use crate::partition::{HashSchema, Partition, PartitionSchema};
use crate::scan::ScanSpec;
use crate::schema::Schema;

/// Computes and iterates the partition key ranges a scan must visit.
///
/// Built once per scan from the table metadata and the scan configuration.
/// Construction performs all predicate push-down and raises all failures;
/// afterwards the pruner is a plain queue of ranges in ascending order of
/// lower bound, consumed from the front as tablets are scanned.
///
/// The pruner is single-owner and performs no I/O; concurrent use requires
/// external synchronization.
#[derive(Debug)]
pub struct PartitionPruner {
    /// Remaining ranges, ascending by lower bound. An empty upper bound
    /// means unbounded above.
    range_partitions: VecDeque<(Vec<u8>, Vec<u8>)>,
}

impl PartitionPruner {
    /// A pruner that prunes every partition.
    fn empty() -> PartitionPruner {
        PartitionPruner {
            range_partitions: VecDeque::new(),
        }
    }

    /// Build the pruner for one scan.
    ///
    /// Returns an empty pruner when the scan is provably unsatisfiable. The
    /// only errors are configuration problems: a partition schema that does
    /// not match the table schema, or predicate values whose type does not
    /// match their column.
    pub fn create(
        schema: &Schema,
        partition_schema: &PartitionSchema,
        scan: &ScanSpec,
    ) -> Result<PartitionPruner> {
        partition_schema.validate(schema)?;

        // Short circuit scans that cannot match anything. This also lets the
        // rest of the construction assume there are no unsatisfiable
        // predicates and that lower PK bound < upper PK bound.
        if !scan.upper_bound_primary_key().is_empty()
            && scan.lower_bound_primary_key() >= scan.upper_bound_primary_key()
        {
            return Ok(PartitionPruner::empty());
        }
        if scan
            .predicates()
            .values()
            .any(|p| p.kind() == PredicateKind::None)
        {
            return Ok(PartitionPruner::empty());
        }

        let range_idxs = ids_to_indexes(schema, partition_schema.range_schema().column_ids())?;

        // Range component: push predicates into lower and upper range keys.
        // Under simple range partitioning the range key doubles as the
        // primary key, so the explicit PK bounds can tighten it further.
        let mut range_lower = push_lower_bound_range_key(schema, &range_idxs, scan.predicates())?;
        let mut range_upper = push_upper_bound_range_key(schema, &range_idxs, scan.predicates())?;
        if partition_schema.is_simple_range_partitioning(schema) {
            if range_lower.as_slice() < scan.lower_bound_primary_key() {
                range_lower = scan.lower_bound_primary_key().to_vec();
            }
            if !scan.upper_bound_primary_key().is_empty()
                && (range_upper.is_empty()
                    || range_upper.as_slice() > scan.upper_bound_primary_key())
            {
                range_upper = scan.upper_bound_primary_key().to_vec();
            }
        }

        // Hash components: the bucket each component is pinned to, or None.
        let mut hash_buckets: Vec<Option<u32>> =
            Vec::with_capacity(partition_schema.hash_schemas().len());
        for hash_schema in partition_schema.hash_schemas() {
            hash_buckets.push(push_hash_bucket(
                schema,
                hash_schema,
                partition_schema.hash_fn(),
                scan.predicates(),
            )?);
        }

        // Index one past the final constrained component; components at or
        // beyond it must not contribute bytes or the key would be
        // over-constrained.
        let constrained_index = if !range_lower.is_empty() || !range_upper.is_empty() {
            hash_buckets.len()
        } else {
            hash_buckets
                .iter()
                .rposition(|bucket| bucket.is_some())
                .map_or(0, |i| i + 1)
        };

        // Walk the hash components left of the constrained index, appending
        // bucket bytes to every pending (lower, upper) pair. A pinned
        // component appends to the pairs in place; an unconstrained one
        // forks every pair once per bucket, in ascending bucket order so the
        // final queue comes out sorted.
        let mut ranges: Vec<(Vec<u8>, Vec<u8>)> = vec![(Vec::new(), Vec::new())];
        for (hash_idx, bucket) in hash_buckets.iter().take(constrained_index).enumerate() {
            // This component supplies the final bytes of the partition key
            // when it is the last constrained one and no range suffix
            // follows; only then does the upper bucket switch from inclusive
            // to exclusive.
            let is_last = hash_idx + 1 == constrained_index && range_upper.is_empty();

            match bucket {
                Some(bucket) => {
                    let bucket_upper = if is_last { bucket + 1 } else { *bucket };
                    for (lower, upper) in &mut ranges {
                        key::encode_hash_bucket(lower, *bucket);
                        key::encode_hash_bucket(upper, bucket_upper);
                    }
                }
                None => {
                    let hash_schema = &partition_schema.hash_schemas()[hash_idx];
                    let mut forked =
                        Vec::with_capacity(ranges.len() * hash_schema.num_buckets() as usize);
                    for (lower, _) in &ranges {
                        for bucket in 0..hash_schema.num_buckets() {
                            let bucket_upper = if is_last { bucket + 1 } else { bucket };
                            let mut new_lower = lower.clone();
                            let mut new_upper = lower.clone();
                            key::encode_hash_bucket(&mut new_lower, bucket);
                            key::encode_hash_bucket(&mut new_upper, bucket_upper);
                            forked.push((new_lower, new_upper));
                        }
                    }
                    ranges = forked;
                }
            }
        }

        // Append the (possibly empty) range component to every pair.
        for (lower, upper) in &mut ranges {
            lower.extend_from_slice(&range_lower);
            upper.extend_from_slice(&range_upper);
        }

        // Intersect with the explicit partition key bounds and drop pairs
        // the intersection empties out.
        let mut queue = VecDeque::with_capacity(ranges.len());
        for (mut lower, mut upper) in ranges {
            if !scan.lower_bound_partition_key().is_empty()
                && lower.as_slice() < scan.lower_bound_partition_key()
            {
                lower = scan.lower_bound_partition_key().to_vec();
            }
            if !scan.upper_bound_partition_key().is_empty()
                && (upper.is_empty() || upper.as_slice() > scan.upper_bound_partition_key())
            {
                upper = scan.upper_bound_partition_key().to_vec();
            }
            if upper.is_empty() || lower < upper {
                queue.push_back((lower, upper));
            }
        }

        tracing::debug!(
            ranges = queue.len(),
            hash_components = hash_buckets.len(),
            constrained_index,
            "built partition key ranges"
        );
        Ok(PartitionPruner {
            range_partitions: queue,
        })
    }

    /// Whether any partition key range remains to scan.
    #[inline]
    pub fn has_more_partition_key_ranges(&self) -> bool {
        !self.range_partitions.is_empty()
    }

    /// The inclusive lower bound partition key of the next range, or `None`
    /// when the pruner is exhausted.
    pub fn next_partition_key(&self) -> Option<&[u8]> {
        self.range_partitions.front().map(|(lower, _)| lower.as_slice())
    }

    /// The next partition key range, or `None` when exhausted.
    pub fn next_partition_key_range(&self) -> Option<(&[u8], &[u8])> {
        self.range_partitions
            .front()
            .map(|(lower, upper)| (lower.as_slice(), upper.as_slice()))
    }

    /// Remove all ranges covered by the consumed tablet's exclusive upper
    /// bound.
    ///
    /// Afterwards the queue equals the original queue intersected with
    /// `[upper_bound, +inf)`. An empty `upper_bound` denotes the end of the
    /// key space and clears the queue.
    pub fn remove_partition_key_range(&mut self, upper_bound: &[u8]) {
        if upper_bound.is_empty() {
            self.range_partitions.clear();
            return;
        }

        while let Some((lower, _)) = self.range_partitions.front() {
            if upper_bound <= lower.as_slice() {
                break;
            }
            let Some((_, upper)) = self.range_partitions.pop_front() else {
                break;
            };
            if upper.is_empty() || upper_bound < upper.as_slice() {
                // The consumed bound falls inside this range; put the
                // remainder back at the front.
                self.range_partitions.push_front((upper_bound.to_vec(), upper));
                break;
            }
        }
    }

    /// Whether a physical partition can be skipped: true iff no remaining
    /// range overlaps it.
    pub fn should_prune(&self, partition: &Partition) -> bool {
        // Linear scan; the queue is sorted but rarely longer than a few
        // hundred entries.
        for (lower, upper) in &self.range_partitions {
            // Skip ranges that end at or before the partition starts.
            if !upper.is_empty() && upper.as_slice() <= partition.partition_key_start() {
                continue;
            }
            // First range not entirely below the partition: they overlap
            // unless the partition ends at or before the range starts.
            return !partition.partition_key_end().is_empty()
                && partition.partition_key_end() <= lower.as_slice();
        }
        // The partition sits above every remaining range.
        true
    }

    /// The remaining ranges in order, for inspection and tests.
    pub fn partition_key_ranges(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.range_partitions
            .iter()
            .map(|(lower, upper)| (lower.as_slice(), upper.as_slice()))
    }
}

fn ids_to_indexes(schema: &Schema, ids: &[ColumnId]) -> Result<Vec<ColumnIdx>> {
    ids.iter()
        .map(|&id| {
            schema.index_of_id(id).ok_or_else(|| {
                Error::schema_mismatch(format!(
                    "partition schema references unknown column id {id}"
                ))
            })
        })
        .collect()
}

/// Translate predicates into an inclusive lower bound range key.
///
/// Only the leading run of columns carrying an equality or a lower-bounded
/// range predicate is pushed; the remaining columns are filled with their
/// type minimum. No pushed column yields the empty (unbounded) key.
fn push_lower_bound_range_key(
    schema: &Schema,
    range_idxs: &[ColumnIdx],
    predicates: &PredicateMap,
) -> Result<Vec<u8>> {
    let mut row = schema.new_partial_row();
    let mut pushed = 0;

    for &idx in range_idxs {
        let column = schema.column_by_index(idx);
        let Some(predicate) = predicates.get(column.name()) else {
            break;
        };
        if !matches!(
            predicate.kind(),
            PredicateKind::Equality | PredicateKind::Range
        ) {
            break;
        }
        // A range predicate with no lower value contributes nothing to the
        // lower bound; stop pushing there.
        let Some(value) = predicate.lower() else {
            break;
        };
        row.set(idx, value.clone())?;
        pushed += 1;
    }

    if pushed == 0 {
        return Ok(Vec::new());
    }
    for &idx in &range_idxs[pushed..] {
        row.set_min(idx)?;
    }
    key::encode_range_key(&row, range_idxs)
}

/// Translate predicates into an exclusive upper bound range key.
///
/// Equality predicates extend the pushed prefix; the first range predicate
/// with an upper value terminates it (further columns cannot tighten an
/// exclusive bound under lexicographic comparison). An all-equality prefix
/// is converted to an exclusive bound by incrementing the prefix key; if the
/// increment wraps past the maximum representable prefix the bound
/// degenerates to unbounded and the empty key is returned.
fn push_upper_bound_range_key(
    schema: &Schema,
    range_idxs: &[ColumnIdx],
    predicates: &PredicateMap,
) -> Result<Vec<u8>> {
    let mut row = schema.new_partial_row();
    let mut pushed = 0;
    let mut final_is_equality = false;

    for &idx in range_idxs {
        let column = schema.column_by_index(idx);
        let Some(predicate) = predicates.get(column.name()) else {
            break;
        };
        match predicate {
            ColumnPredicate::Equality(value) => {
                row.set(idx, value.clone())?;
                pushed += 1;
                final_is_equality = true;
            }
            ColumnPredicate::Range { upper, .. } => {
                if let Some(value) = upper {
                    row.set(idx, value.clone())?;
                    pushed += 1;
                    final_is_equality = false;
                }
                break;
            }
            _ => break,
        }
    }

    if pushed == 0 {
        return Ok(Vec::new());
    }

    if final_is_equality && !key::increment_key(&mut row, &range_idxs[..pushed])? {
        return Ok(Vec::new());
    }

    for &idx in &range_idxs[pushed..] {
        row.set_min(idx)?;
    }
    key::encode_range_key(&row, range_idxs)
}

/// Determine whether the predicates pin one hash component to a single
/// bucket, and if so which.
///
/// Every column of the component must carry an equality predicate;
/// otherwise the component is unconstrained.
fn push_hash_bucket(
    schema: &Schema,
    hash_schema: &HashSchema,
    hash_fn: Hash64Fn,
    predicates: &PredicateMap,
) -> Result<Option<u32>> {
    let column_idxs = ids_to_indexes(schema, hash_schema.column_ids())?;
    let mut row = schema.new_partial_row();
    for &idx in &column_idxs {
        let column = schema.column_by_index(idx);
        match predicates.get(column.name()) {
            Some(ColumnPredicate::Equality(value)) => row.set(idx, value.clone())?,
            _ => return Ok(None),
        }
    }
    hash::hash_bucket(&row, hash_schema, schema, hash_fn).map(Some)
}
