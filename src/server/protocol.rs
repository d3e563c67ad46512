//! Wire messages exchanged over the WebSocket.
//!
//! Every frame is a JSON object with a `type` discriminator. Inbound frames
//! that do not match a known shape decode to [`ClientMessage::Unrecognized`]
//! instead of an error, so a bad frame never tears down the connection.

use serde::{Deserialize, Serialize};

use crate::store::{CounterSet, UpdateEvent};

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Apply `points` (possibly negative) to `house`.
    UpdatePoints { house: String, points: i64 },
    /// Zero every house.
    Reset,
    /// Anything that failed to decode, with the reason for logging.
    Unrecognized(String),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum WireClientMessage {
    UpdatePoints { house: String, points: i64 },
    Reset,
}

impl ClientMessage {
    /// Decodes one text frame.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<WireClientMessage>(text) {
            Ok(WireClientMessage::UpdatePoints { house, points }) => {
                Self::UpdatePoints { house, points }
            }
            Ok(WireClientMessage::Reset) => Self::Reset,
            Err(e) => Self::Unrecognized(e.to_string()),
        }
    }

    /// Decodes a binary frame, treating it as UTF-8 text.
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::parse(text),
            Err(e) => Self::Unrecognized(format!("binary frame is not UTF-8: {e}")),
        }
    }
}

/// Messages the server pushes to every subscriber.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full scoreboard; sent on connect and after a reset.
    Init { points: CounterSet },
    /// One house changed.
    PointsUpdated {
        house: String,
        points: i64,
        change: i64,
    },
}

impl From<UpdateEvent> for ServerMessage {
    fn from(event: UpdateEvent) -> Self {
        Self::PointsUpdated {
            house: event.house,
            points: event.points,
            change: event.change,
        }
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
