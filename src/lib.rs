//! House Points - live scoreboard shared over WebSockets.
//!
//! Viewers connect to `/ws`, receive the full scoreboard, and then every
//! change made by any connected admin panel.

pub mod config;
pub mod error;
pub mod network;
pub mod server;
pub mod store;
