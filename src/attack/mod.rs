//! Black-box attack orchestration

/// Caption loop that generates, saves and scores image groups
pub mod driver;
/// Caption and seed storage keys
pub mod naming;
