//! Capabilities provided by services outside this crate

/// Source image download with placeholder fallback
pub mod download;
/// Few-step image synthesis
pub mod generation;
