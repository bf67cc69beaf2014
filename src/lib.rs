//! Black-box extraction attack scoring for image diffusion models
//!
//! Captions are synthesized with a single denoising step under several seeds.
//! Generations of memorized training images keep sharp, seed-independent
//! edges, so the edge-overlap score of such a group ranks captions by how
//! likely the model reproduces a training image verbatim.

#![deny(unsafe_code)]

/// Caption loop and storage naming
pub mod attack;
/// Image generation and download capabilities backed by external services
pub mod external;
/// Input/output operations, configuration and error handling
pub mod io;
/// Edge maps and the edge-overlap score
pub mod scoring;
/// Parquet tables, ranking and filtering
pub mod table;

pub use io::error::{AttackError, Result};
