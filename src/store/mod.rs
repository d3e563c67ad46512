//! Points storage module.
//!
//! Provides the thread-safe scoreboard and the value types it hands out.

pub mod counter_store;
pub mod types;

pub use counter_store::*;
pub use types::*;

/// Houses tracked when no list is configured.
pub const DEFAULT_HOUSES: [&str; 5] = [
    "gryffindor",
    "slytherin",
    "hufflepuff",
    "ravenclaw",
    "hogwarts",
];
