//! Edge-overlap scoring of independently seeded generations

/// Sobel edge maps and per-image normalization
pub mod edges;
/// Image groups and the pairwise overlap score
pub mod overlap;

pub use edges::EdgeMap;
pub use overlap::{ImageGroup, edge_overlap_score};
