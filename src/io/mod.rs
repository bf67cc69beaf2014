//! Input/output operations and error handling

/// Command-line parsing and command dispatch
pub mod cli;
/// Constants and defaults
pub mod configuration;
/// Error types
pub mod error;
/// Raster conversion, resizing and persistence
pub mod image;
/// Subscriber setup for structured logs
pub mod logging;
/// Progress bars for attack runs
pub mod progress;
/// Original-versus-generation comparison strips
pub mod visualization;
