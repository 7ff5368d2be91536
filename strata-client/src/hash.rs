//! Hash bucket computation for hash-partitioned components.

use std::hash::Hasher;

use siphasher::sip::SipHasher24;
use strata_result::{Error, Result};

use crate::key;
use crate::partition::HashSchema;
use crate::row::PartialRow;
use crate::schema::Schema;

/// A seeded 64-bit hash over encoded column bytes.
///
/// The concrete function is a contract between the client and the servers:
/// both sides must map the same row to the same bucket, so deployments
/// substitute the store's canonical function here. [`hash64`] is the
/// default.
pub type Hash64Fn = fn(&[u8], u32) -> u64;

/// Default [`Hash64Fn`]: SipHash-2-4 keyed from the component seed.
pub fn hash64(data: &[u8], seed: u32) -> u64 {
    let mut hasher = SipHasher24::new_with_keys(u64::from(seed), u64::from(seed));
    hasher.write(data);
    hasher.finish()
}

/// Compute the bucket a row falls into for one hash component.
///
/// The component's columns are encoded exactly like a range key over those
/// columns (all-but-last var-len escaping), hashed with the component seed,
/// and reduced by unsigned modulo to `[0, num_buckets)`.
pub fn hash_bucket(
    row: &PartialRow<'_>,
    hash_schema: &HashSchema,
    schema: &Schema,
    hash_fn: Hash64Fn,
) -> Result<u32> {
    let mut column_idxs = Vec::with_capacity(hash_schema.column_ids().len());
    for &id in hash_schema.column_ids() {
        let idx = schema
            .index_of_id(id)
            .ok_or_else(|| Error::schema_mismatch(format!("unknown column id {id}")))?;
        column_idxs.push(idx);
    }
    let buf = key::encode_range_key(row, &column_idxs)?;
    let hash = hash_fn(&buf, hash_schema.seed());
    Ok((hash % u64::from(hash_schema.num_buckets())) as u32)
}
