//! Error types for startup and serving.
//!
//! Nothing on the per-message path returns these: malformed input and
//! failed sends are absorbed where they happen. Only configuration and the
//! listener itself can fail.

use std::net::SocketAddr;

/// Invalid configuration detected before the server starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("at least one house must be configured")]
    NoHouses,

    #[error("house {0:?} is listed more than once")]
    DuplicateHouse(String),
}

/// Failure to bring up or run the HTTP/WebSocket listener.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server terminated: {0}")]
    Serve(#[from] std::io::Error),
}
