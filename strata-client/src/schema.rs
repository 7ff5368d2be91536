//! Table schema and column metadata.

use rustc_hash::FxHashMap;
use strata_result::{Error, Result};
use strata_types::{ColumnId, ColumnIdx, DataType};

use crate::row::PartialRow;

/// Metadata for a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    name: String,
    id: ColumnId,
    data_type: DataType,
    nullable: bool,
}

impl ColumnSchema {
    pub fn new(
        name: impl Into<String>,
        id: ColumnId,
        data_type: DataType,
        nullable: bool,
    ) -> ColumnSchema {
        ColumnSchema {
            name: name.into(),
            id,
            data_type,
            nullable,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn id(&self) -> ColumnId {
        self.id
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// An ordered list of columns, the first `num_key_columns` of which form the
/// primary key.
///
/// Lookup by id and by name is O(1); partition schemas reference columns by
/// id, predicates by name.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
    num_key_columns: usize,
    idx_by_id: FxHashMap<ColumnId, ColumnIdx>,
}

impl Schema {
    /// Build a schema, validating column metadata.
    ///
    /// Duplicate column names or ids, a key column count outside
    /// `1..=columns.len()`, and nullable key columns are rejected.
    pub fn new(columns: Vec<ColumnSchema>, num_key_columns: usize) -> Result<Schema> {
        if num_key_columns == 0 || num_key_columns > columns.len() {
            return Err(Error::invalid_argument(format!(
                "key column count {} out of range for {} columns",
                num_key_columns,
                columns.len()
            )));
        }

        let mut idx_by_id = FxHashMap::default();
        let mut names = FxHashMap::default();
        for (idx, column) in columns.iter().enumerate() {
            if idx_by_id.insert(column.id(), idx).is_some() {
                return Err(Error::invalid_argument(format!(
                    "duplicate column id {}",
                    column.id()
                )));
            }
            if names.insert(column.name().to_string(), idx).is_some() {
                return Err(Error::invalid_argument(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
            if idx < num_key_columns && column.is_nullable() {
                return Err(Error::invalid_argument(format!(
                    "key column '{}' must not be nullable",
                    column.name()
                )));
            }
        }

        Ok(Schema {
            columns,
            num_key_columns,
            idx_by_id,
        })
    }

    #[inline]
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn num_key_columns(&self) -> usize {
        self.num_key_columns
    }

    /// The column at position `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds; indexes should come from
    /// [`Schema::index_of_id`] or iteration over [`Schema::columns`].
    #[inline]
    pub fn column_by_index(&self, idx: ColumnIdx) -> &ColumnSchema {
        &self.columns[idx]
    }

    /// Look up a column by its stable id.
    #[inline]
    pub fn column_by_id(&self, id: ColumnId) -> Option<&ColumnSchema> {
        self.index_of_id(id).map(|idx| &self.columns[idx])
    }

    /// The positional index of the column with the given id.
    #[inline]
    pub fn index_of_id(&self, id: ColumnId) -> Option<ColumnIdx> {
        self.idx_by_id.get(&id).copied()
    }

    /// A new row over this schema with no cells set.
    pub fn new_partial_row(&self) -> PartialRow<'_> {
        PartialRow::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, id: ColumnId) -> ColumnSchema {
        ColumnSchema::new(name, id, DataType::Int32, false)
    }

    #[test]
    fn lookup_by_id_and_index() {
        let schema = Schema::new(vec![col("a", 10), col("b", 11), col("c", 12)], 2).unwrap();
        assert_eq!(schema.num_key_columns(), 2);
        assert_eq!(schema.index_of_id(11), Some(1));
        assert_eq!(schema.index_of_id(99), None);
        assert_eq!(schema.column_by_id(12).unwrap().name(), "c");
        assert_eq!(schema.column_by_index(0).name(), "a");
    }

    #[test]
    fn rejects_bad_schemas() {
        assert!(Schema::new(vec![col("a", 1)], 0).is_err());
        assert!(Schema::new(vec![col("a", 1)], 2).is_err());
        assert!(Schema::new(vec![col("a", 1), col("a", 2)], 1).is_err());
        assert!(Schema::new(vec![col("a", 1), col("b", 1)], 1).is_err());
        let nullable_key = ColumnSchema::new("a", 1, DataType::Int32, true);
        assert!(Schema::new(vec![nullable_key], 1).is_err());
    }
}
