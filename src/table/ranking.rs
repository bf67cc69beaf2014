//! Ranking and filtering of scored tables

use crate::io::configuration::{
    AUXILIARY_COLUMNS, DEFAULT_BEST_AMOUNT, EDGE_SCORE_COLUMN, MSE_COLUMN, TEMPLATE_COLUMN,
};
use crate::io::error::Result;
use crate::table::frame::Table;
use std::cmp::Ordering;

/// Direction of a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest value first
    Ascending,
    /// Largest value first
    Descending,
}

impl SortOrder {
    /// Ascending if `ascending`, descending otherwise
    pub const fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

/// Options for selecting the top rows by a score column
#[derive(Debug, Clone)]
pub struct RankOptions {
    /// Column to sort by
    pub sort_by: String,
    /// Sort direction
    pub order: SortOrder,
    /// Rows to keep
    pub amount: usize,
    /// Remove the analysis columns from the result
    pub drop_auxiliary: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            sort_by: EDGE_SCORE_COLUMN.to_string(),
            order: SortOrder::Descending,
            amount: DEFAULT_BEST_AMOUNT,
            drop_auxiliary: false,
        }
    }
}

impl Table {
    /// Stable sort on a numeric column
    ///
    /// Nulls and NaN go last in both directions.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if the column is absent, or an error if it is
    /// not numeric
    pub fn sort_by(&self, column: &str, order: SortOrder) -> Result<Self> {
        let keys = self.numbers(column)?;
        let mut positions: Vec<usize> = (0..keys.len()).collect();
        positions.sort_by(|&a, &b| {
            compare_keys(
                keys.get(a).copied().flatten(),
                keys.get(b).copied().flatten(),
                order,
            )
        });
        self.take_rows(&positions)
    }

    /// The `amount` first rows after sorting by `column`
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Table::sort_by`]
    pub fn top_k(&self, column: &str, order: SortOrder, amount: usize) -> Result<Self> {
        Ok(self.sort_by(column, order)?.head(amount))
    }
}

fn compare_keys(a: Option<f64>, b: Option<f64>, order: SortOrder) -> Ordering {
    match (a.filter(|v| !v.is_nan()), b.filter(|v| !v.is_nan())) {
        (Some(x), Some(y)) => match order {
            SortOrder::Ascending => x.total_cmp(&y),
            SortOrder::Descending => y.total_cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Top rows by a score column, optionally without the analysis columns
///
/// # Errors
///
/// Returns `MissingColumn` if the sort column is absent
pub fn best_scoring(table: &Table, options: &RankOptions) -> Result<Table> {
    let ranked = table.top_k(&options.sort_by, options.order, options.amount)?;
    if options.drop_auxiliary {
        ranked.drop_columns(&AUXILIARY_COLUMNS)
    } else {
        Ok(ranked)
    }
}

/// Subset of rows with the lowest reconstruction error, for the multi-step
/// follow-up attack
///
/// Rows come out in ascending `mse_real_gen` order and keep their original
/// row identity. Dropping only applies to fully analyzed tables, recognized by
/// their template column.
///
/// # Errors
///
/// Returns `MissingColumn` if `mse_real_gen` is absent
pub fn prepare_for_multiple(table: &Table, amount: usize, drop: bool) -> Result<Table> {
    let top = table.top_k(MSE_COLUMN, SortOrder::Ascending, amount)?;
    if drop && top.has_column(TEMPLATE_COLUMN) {
        top.drop_columns(&AUXILIARY_COLUMNS)
    } else {
        Ok(top)
    }
}
