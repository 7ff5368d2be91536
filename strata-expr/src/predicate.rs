//! Simplified, per-column predicates.

use rustc_hash::FxHashMap;
use strata_types::Datum;

/// Fieldless discriminant of a [`ColumnPredicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    Equality,
    Range,
    InList,
    IsNotNull,
    None,
}

/// A single simplified predicate against one column.
///
/// The partition pruner pushes `Equality` and `Range` predicates into
/// partition keys; `None` makes the whole scan unsatisfiable; the remaining
/// kinds leave the column unconstrained for pruning purposes.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnPredicate {
    /// The column equals the value.
    Equality(Datum),
    /// The column lies in `[lower, upper)`. Either bound may be absent.
    Range {
        lower: Option<Datum>,
        upper: Option<Datum>,
    },
    /// The column equals one of the listed values. Values are sorted and
    /// deduplicated; see [`ColumnPredicate::in_list`].
    InList(Vec<Datum>),
    /// The column is non-null.
    IsNotNull,
    /// No value can satisfy the predicate.
    None,
}

impl ColumnPredicate {
    /// Build an in-list predicate, normalizing degenerate lists.
    ///
    /// Values are sorted in key order and deduplicated. An empty list can
    /// match nothing and collapses to [`ColumnPredicate::None`]; a
    /// single-element list collapses to [`ColumnPredicate::Equality`].
    pub fn in_list(mut values: Vec<Datum>) -> ColumnPredicate {
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        match values.len() {
            0 => ColumnPredicate::None,
            1 => ColumnPredicate::Equality(values.remove(0)),
            _ => ColumnPredicate::InList(values),
        }
    }

    /// The discriminant of this predicate.
    pub fn kind(&self) -> PredicateKind {
        match self {
            ColumnPredicate::Equality(_) => PredicateKind::Equality,
            ColumnPredicate::Range { .. } => PredicateKind::Range,
            ColumnPredicate::InList(_) => PredicateKind::InList,
            ColumnPredicate::IsNotNull => PredicateKind::IsNotNull,
            ColumnPredicate::None => PredicateKind::None,
        }
    }

    /// The inclusive lower bound: the equality value, or the range lower
    /// bound if present.
    pub fn lower(&self) -> Option<&Datum> {
        match self {
            ColumnPredicate::Equality(value) => Some(value),
            ColumnPredicate::Range { lower, .. } => lower.as_ref(),
            _ => None,
        }
    }

    /// The exclusive upper bound of a range predicate, if present.
    pub fn upper(&self) -> Option<&Datum> {
        match self {
            ColumnPredicate::Range { upper, .. } => upper.as_ref(),
            _ => None,
        }
    }
}

/// Simplified predicates indexed by column name, as handed to the pruner.
pub type PredicateMap = FxHashMap<String, ColumnPredicate>;
