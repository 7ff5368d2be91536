//! Partially-set rows.
//!
//! A [`PartialRow`] stages values for a subset of a schema's columns. The
//! pruner uses partial rows to assemble the column values that get encoded
//! into range keys and hash buckets; only the cells named by the relevant
//! partition component are ever set.

use strata_result::{Error, Result};
use strata_types::{ColumnIdx, Datum};

use crate::schema::Schema;

/// A row over a schema in which any subset of cells may be set.
#[derive(Debug, Clone)]
pub struct PartialRow<'a> {
    schema: &'a Schema,
    cells: Vec<Option<Datum>>,
}

impl<'a> PartialRow<'a> {
    pub(crate) fn new(schema: &'a Schema) -> PartialRow<'a> {
        PartialRow {
            schema,
            cells: vec![None; schema.num_columns()],
        }
    }

    #[inline]
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    fn check_idx(&self, idx: ColumnIdx) -> Result<()> {
        if idx >= self.cells.len() {
            return Err(Error::invalid_argument(format!(
                "column index {} out of range for {} columns",
                idx,
                self.cells.len()
            )));
        }
        Ok(())
    }

    /// Set the cell at `idx`, checking the value type against the column.
    pub fn set(&mut self, idx: ColumnIdx, value: Datum) -> Result<()> {
        self.check_idx(idx)?;
        let column = self.schema.column_by_index(idx);
        if value.data_type() != column.data_type() {
            return Err(Error::invalid_argument(format!(
                "value type {} does not match {} column '{}'",
                value.data_type().name(),
                column.data_type().name(),
                column.name()
            )));
        }
        self.cells[idx] = Some(value);
        Ok(())
    }

    /// Set the cell at `idx` to the column type's minimum value.
    pub fn set_min(&mut self, idx: ColumnIdx) -> Result<()> {
        self.check_idx(idx)?;
        let data_type = self.schema.column_by_index(idx).data_type();
        self.cells[idx] = Some(data_type.min_datum());
        Ok(())
    }

    /// Set the cell at `idx` from raw (row wire format) value bytes.
    pub fn set_raw(&mut self, idx: ColumnIdx, bytes: &[u8]) -> Result<()> {
        self.check_idx(idx)?;
        let data_type = self.schema.column_by_index(idx).data_type();
        self.cells[idx] = Some(Datum::from_raw(data_type, bytes)?);
        Ok(())
    }

    /// Step the cell at `idx` to its successor in key order.
    ///
    /// Returns `true` iff the value did not overflow. On overflow the cell
    /// wraps to the column type's minimum so the caller can carry into the
    /// preceding key column. The cell must be set.
    pub fn increment_column(&mut self, idx: ColumnIdx) -> Result<bool> {
        self.check_idx(idx)?;
        match &mut self.cells[idx] {
            Some(value) => Ok(value.increment()),
            None => Err(Error::invalid_argument(format!(
                "column index {idx} is not set"
            ))),
        }
    }

    /// The value at `idx`, or `None` when unset.
    #[inline]
    pub fn get(&self, idx: ColumnIdx) -> Option<&Datum> {
        self.cells.get(idx).and_then(|cell| cell.as_ref())
    }

    /// Whether the cell at `idx` is set.
    #[inline]
    pub fn is_set(&self, idx: ColumnIdx) -> bool {
        self.get(idx).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSchema;
    use strata_types::DataType;

    fn schema() -> Schema {
        Schema::new(
            vec![
                ColumnSchema::new("a", 0, DataType::Int32, false),
                ColumnSchema::new("b", 1, DataType::String, false),
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn set_and_get() {
        let schema = schema();
        let mut row = schema.new_partial_row();
        assert!(!row.is_set(0));
        row.set(0, Datum::Int32(7)).unwrap();
        assert_eq!(row.get(0), Some(&Datum::Int32(7)));
        assert!(row.set(0, Datum::Int64(7)).is_err());
        assert!(row.set(5, Datum::Int32(7)).is_err());
    }

    #[test]
    fn set_raw_decodes_row_format() {
        let schema = schema();
        let mut row = schema.new_partial_row();
        row.set_raw(0, &42i32.to_le_bytes()).unwrap();
        assert_eq!(row.get(0), Some(&Datum::Int32(42)));
        row.set_raw(1, b"xyz").unwrap();
        assert_eq!(row.get(1), Some(&Datum::String("xyz".to_string())));
        assert!(row.set_raw(0, &[1, 2]).is_err());
    }

    #[test]
    fn increment_requires_set_cell() {
        let schema = schema();
        let mut row = schema.new_partial_row();
        assert!(row.increment_column(0).is_err());
        row.set(0, Datum::Int32(i32::MAX)).unwrap();
        assert!(!row.increment_column(0).unwrap());
        assert_eq!(row.get(0), Some(&Datum::Int32(i32::MIN)));
    }

    #[test]
    fn set_min_uses_column_type() {
        let schema = schema();
        let mut row = schema.new_partial_row();
        row.set_min(0).unwrap();
        row.set_min(1).unwrap();
        assert_eq!(row.get(0), Some(&Datum::Int32(i32::MIN)));
        assert_eq!(row.get(1), Some(&Datum::String(String::new())));
    }
}
