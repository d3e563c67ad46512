//! WebSocket handler: one connection is one subscriber.
//!
//! A connection is registered as soon as the upgrade completes. From then
//! on a writer task drains the subscriber's queue onto the socket while the
//! reader dispatches each inbound frame on its own. Whichever side stops
//! first ends the connection and unregisters it.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::server::hub::Hub;
use crate::server::protocol::{ClientMessage, ServerMessage};
use crate::server::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let (id, mut outbox) = state.hub.register();
    tracing::info!(subscriber = %id, "Client connected");

    // Forward queued broadcasts (init first) to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = outbox.recv().await {
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let recv_state = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!(subscriber = %id, ?e, "WebSocket read failed");
                    break;
                }
            };

            let parsed = match msg {
                Message::Text(text) => ClientMessage::parse(&text),
                Message::Binary(bytes) => ClientMessage::parse_bytes(&bytes),
                Message::Close(_) => break,
                // Pong is handled automatically by axum
                Message::Ping(_) | Message::Pong(_) => continue,
            };
            dispatch(&recv_state.hub, parsed);
        }
    });

    // Wait for either side to finish, then stop the other
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.unregister(id);
    tracing::info!(subscriber = %id, "Client disconnected");
}

/// Applies one inbound message and broadcasts the result.
///
/// Returns whether a broadcast was sent. Unrecognized messages and unknown
/// houses are dropped without reply.
pub fn dispatch(hub: &Hub, message: ClientMessage) -> bool {
    match message {
        ClientMessage::UpdatePoints { house, points } => {
            if !hub.store().contains(&house) {
                tracing::debug!(%house, points, "Ignoring update for unknown house");
                return false;
            }
            hub.apply(|store| store.increment(&house, points).map(ServerMessage::from))
        }
        ClientMessage::Reset => hub.apply(|store| {
            Some(ServerMessage::Init {
                points: store.reset(),
            })
        }),
        ClientMessage::Unrecognized(reason) => {
            tracing::warn!(%reason, "Ignoring unrecognized message");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CounterStore, DEFAULT_HOUSES};
    use serde_json::Value;

    fn hub() -> Hub {
        Hub::new(Arc::new(CounterStore::new(DEFAULT_HOUSES).unwrap()))
    }

    fn frame(rx: &mut crate::server::hub::Outbox) -> Value {
        serde_json::from_str(&rx.try_recv().unwrap()).unwrap()
    }

    #[test]
    fn test_update_points_broadcasts_new_value() {
        let hub = hub();
        let (_, mut rx) = hub.register();
        frame(&mut rx);

        let msg =
            ClientMessage::parse(r#"{"type":"updatePoints","house":"gryffindor","points":10}"#);
        assert!(dispatch(&hub, msg));

        let update = frame(&mut rx);
        assert_eq!(update["type"], "pointsUpdated");
        assert_eq!(update["house"], "gryffindor");
        assert_eq!(update["points"], 10);
        assert_eq!(update["change"], 10);
    }

    #[test]
    fn test_negative_update_reports_clamped_value() {
        let hub = hub();
        hub.store().increment("slytherin", 5);
        let (_, mut rx) = hub.register();
        frame(&mut rx);

        dispatch(
            &hub,
            ClientMessage::UpdatePoints {
                house: "slytherin".into(),
                points: -20,
            },
        );

        let update = frame(&mut rx);
        assert_eq!(update["points"], 0);
        assert_eq!(update["change"], -20);
    }

    #[test]
    fn test_ignored_messages_change_nothing() {
        let hub = hub();
        hub.store().increment("ravenclaw", 8);
        let (_, mut rx) = hub.register();
        frame(&mut rx);

        for text in [
            "not json",
            r#"{"type":"updatePoints","house":"durmstrang","points":10}"#,
            r#"{"type":"updatePoints","house":"ravenclaw"}"#,
            r#"{"type":"celebrate"}"#,
        ] {
            assert!(!dispatch(&hub, ClientMessage::parse(text)));
        }

        assert!(rx.try_recv().is_err());
        assert_eq!(hub.store().snapshot().get("ravenclaw"), Some(8));
    }

    #[test]
    fn test_reset_sends_zeroed_init() {
        let hub = hub();
        hub.store().increment("hogwarts", 12);
        let (_, mut rx) = hub.register();
        frame(&mut rx);

        assert!(dispatch(&hub, ClientMessage::Reset));

        let init = frame(&mut rx);
        assert_eq!(init["type"], "init");
        assert_eq!(init["points"]["hogwarts"], 0);
        assert_eq!(hub.store().snapshot().total(), 0);
    }
}
