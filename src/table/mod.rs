//! Tabular record handling for captions and scores

/// Parquet-backed table with row identity
pub mod frame;
/// Sorting, top-k selection and column dropping
pub mod ranking;

pub use frame::Table;
pub use ranking::{RankOptions, SortOrder, best_scoring, prepare_for_multiple};
