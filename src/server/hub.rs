//! Broadcast hub fanning scoreboard changes out to every viewer.
//!
//! Each subscriber gets its own unbounded queue, drained by that
//! connection's writer task. Publishing only enqueues, so one stalled
//! socket never holds up delivery to the rest.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::server::protocol::ServerMessage;
use crate::store::CounterStore;

/// Registry key for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Serialized frames queued for one subscriber, oldest first.
pub type Outbox = mpsc::UnboundedReceiver<String>;

type Registry = HashMap<SubscriberId, mpsc::UnboundedSender<String>>;

/// Subscriber registry plus fan-out.
///
/// The registry lock is also the ordering point for broadcasts: a mutation
/// and its publish run under it together (see [`Hub::apply`]), so every
/// subscriber sees updates in the order they were applied.
pub struct Hub {
    store: Arc<CounterStore>,
    subscribers: Mutex<Registry>,
    next_id: AtomicU64,
}

impl Hub {
    pub fn new(store: Arc<CounterStore>) -> Self {
        Self {
            store,
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// The scoreboard this hub broadcasts.
    pub fn store(&self) -> &Arc<CounterStore> {
        &self.store
    }

    /// Adds a subscriber whose first queued frame is a full `init` snapshot.
    ///
    /// The snapshot is taken under the registry lock, so no broadcast can
    /// land between the snapshot and the registration.
    pub fn register(&self) -> (SubscriberId, Outbox) {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();

        let mut subscribers = self.lock();
        let init = ServerMessage::Init {
            points: self.store.snapshot(),
        };
        match init.to_json() {
            Ok(json) => {
                // The receiver is still in hand, this cannot fail.
                let _ = tx.send(json);
            }
            Err(e) => tracing::error!(?e, "Failed to serialize init snapshot"),
        }
        subscribers.insert(id, tx);
        let count = subscribers.len();
        drop(subscribers);

        tracing::debug!(subscriber = %id, subscribers = count, "Subscriber registered");
        (id, rx)
    }

    /// Removes a subscriber. Returns `false` if it was already gone.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.lock();
        let removed = subscribers.remove(&id).is_some();
        let count = subscribers.len();
        drop(subscribers);

        if removed {
            tracing::debug!(subscriber = %id, subscribers = count, "Subscriber unregistered");
        }
        removed
    }

    /// Sends `message` to every registered subscriber, the sender included.
    pub fn publish(&self, message: &ServerMessage) {
        let mut subscribers = self.lock();
        Self::fan_out(&mut subscribers, message);
    }

    /// Runs `mutation` and publishes what it returns, atomically with
    /// respect to other broadcasts and registrations.
    ///
    /// Returns whether anything was published.
    pub fn apply<F>(&self, mutation: F) -> bool
    where
        F: FnOnce(&CounterStore) -> Option<ServerMessage>,
    {
        let mut subscribers = self.lock();
        match mutation(&self.store) {
            Some(message) => {
                Self::fan_out(&mut subscribers, &message);
                true
            }
            None => false,
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn fan_out(subscribers: &mut Registry, message: &ServerMessage) {
        let json = match message.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(?e, "Failed to serialize broadcast");
                return;
            }
        };

        // A closed queue means the connection is gone; treat it as a disconnect.
        subscribers.retain(|id, tx| {
            let delivered = tx.send(json.clone()).is_ok();
            if !delivered {
                tracing::debug!(subscriber = %id, "Dropping subscriber after failed send");
            }
            delivered
        });
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_HOUSES;
    use serde_json::{json, Value};

    fn hub() -> Hub {
        Hub::new(Arc::new(CounterStore::new(DEFAULT_HOUSES).unwrap()))
    }

    fn next(rx: &mut Outbox) -> Value {
        let frame = rx.try_recv().expect("expected a queued frame");
        serde_json::from_str(&frame).unwrap()
    }

    fn increment(
        house: &'static str,
        delta: i64,
    ) -> impl FnOnce(&CounterStore) -> Option<ServerMessage> {
        move |store: &CounterStore| store.increment(house, delta).map(ServerMessage::from)
    }

    #[test]
    fn test_register_queues_init_first() {
        let hub = hub();
        hub.store().increment("gryffindor", 15);

        let (_, mut rx) = hub.register();
        assert_eq!(
            next(&mut rx),
            json!({"type": "init", "points": {
                "gryffindor": 15, "slytherin": 0, "hufflepuff": 0, "ravenclaw": 0, "hogwarts": 0
            }})
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let hub = hub();
        let (_, mut a) = hub.register();
        let (_, mut b) = hub.register();
        next(&mut a);
        next(&mut b);

        assert!(hub.apply(increment("gryffindor", 10)));

        let expected = json!({
            "type": "pointsUpdated", "house": "gryffindor", "points": 10, "change": 10
        });
        assert_eq!(next(&mut a), expected);
        assert_eq!(next(&mut b), expected);
    }

    #[test]
    fn test_publish_sends_prebuilt_message() {
        let hub = hub();
        let (_, mut rx) = hub.register();
        next(&mut rx);

        hub.publish(&ServerMessage::PointsUpdated {
            house: "hogwarts".into(),
            points: 2,
            change: 2,
        });
        assert_eq!(next(&mut rx)["house"], "hogwarts");
    }

    #[test]
    fn test_unknown_house_publishes_nothing() {
        let hub = hub();
        let (_, mut rx) = hub.register();
        next(&mut rx);

        assert!(!hub.apply(increment("durmstrang", 10)));
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.store().snapshot().total(), 0);
    }

    #[test]
    fn test_unregister_is_idempotent_and_stops_delivery() {
        let hub = hub();
        let (id, mut rx) = hub.register();
        next(&mut rx);

        assert!(hub.unregister(id));
        assert!(!hub.unregister(id));
        assert_eq!(hub.subscriber_count(), 0);

        hub.apply(increment("ravenclaw", 1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_pruned_without_affecting_others() {
        let hub = hub();
        let (_, gone) = hub.register();
        let (_, mut alive) = hub.register();
        next(&mut alive);
        drop(gone);

        hub.apply(increment("hufflepuff", 3));

        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(next(&mut alive)["points"], 3);
    }

    #[test]
    fn test_reset_broadcasts_init_only() {
        let hub = hub();
        hub.store().increment("slytherin", 40);
        let (_, mut a) = hub.register();
        let (_, mut b) = hub.register();
        next(&mut a);
        next(&mut b);

        hub.apply(|store| Some(ServerMessage::Init { points: store.reset() }));

        for rx in [&mut a, &mut b] {
            let frame = next(rx);
            assert_eq!(frame["type"], "init");
            assert!(frame["points"]
                .as_object()
                .unwrap()
                .values()
                .all(|v| v == 0));
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn test_per_subscriber_order_follows_publish_order() {
        let hub = hub();
        let (_, mut rx) = hub.register();
        next(&mut rx);

        for delta in 1..=5 {
            hub.apply(increment("hogwarts", delta));
        }

        let points: Vec<i64> = (0..5)
            .map(|_| next(&mut rx)["points"].as_i64().unwrap())
            .collect();
        assert_eq!(points, vec![1, 3, 6, 10, 15]);
    }

    #[test]
    fn test_register_during_updates_sees_consistent_stream() {
        const UPDATES: i64 = 20_000;

        let hub = Arc::new(hub());
        let writer = {
            let hub = Arc::clone(&hub);
            std::thread::spawn(move || {
                for _ in 0..UPDATES {
                    hub.apply(increment("gryffindor", 1));
                }
            })
        };

        let outboxes: Vec<Outbox> = (0..200).map(|_| hub.register().1).collect();
        writer.join().unwrap();

        for mut rx in outboxes {
            let init = next(&mut rx);
            assert_eq!(init["type"], "init");
            let mut last = init["points"]["gryffindor"].as_i64().unwrap();

            while let Ok(frame) = rx.try_recv() {
                let update: Value = serde_json::from_str(&frame).unwrap();
                assert_eq!(update["type"], "pointsUpdated");
                let points = update["points"].as_i64().unwrap();
                assert_eq!(points, last + 1, "gap or repeat after {last}");
                last = points;
            }
            assert_eq!(last, UPDATES);
        }
    }

    #[test]
    fn test_subscriber_ids_are_unique() {
        let hub = hub();
        let (a, _ra) = hub.register();
        let (b, _rb) = hub.register();
        assert_ne!(a, b);
        assert_eq!(hub.subscriber_count(), 2);
    }
}
