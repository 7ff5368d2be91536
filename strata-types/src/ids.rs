//! Identifiers shared across the Strata client crates.
//!
//! These types live in `strata-types` so they can be reused without
//! depending on the schema-specific crates.

/// Stable numeric identifier of a column.
///
/// Column ids are assigned by the server when a table is created and never
/// change, even when columns are renamed or reordered. Partition schemas
/// reference columns by id rather than by name or position so that they stay
/// valid across schema changes.
pub type ColumnId = u32;

/// Positional index of a column within a table schema.
///
/// Unlike [`ColumnId`], an index is only meaningful relative to one specific
/// schema snapshot. The first `num_key_columns` indexes form the primary key.
pub type ColumnIdx = usize;
