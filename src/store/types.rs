//! Data types for the points store.
//!
//! Defines the counter snapshot handed to subscribers and the event
//! produced by a single applied update.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Points per house, in configured house order.
///
/// The key set is fixed when the store is built. Serializes as a JSON
/// object (`{"gryffindor": 10, ...}`) preserving that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSet {
    entries: Vec<(String, i64)>,
}

impl CounterSet {
    /// Creates a set with every house at zero.
    pub fn zeroed<I, S>(houses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: houses.into_iter().map(|h| (h.into(), 0)).collect(),
        }
    }

    /// Returns the points for `house`, or `None` if it is not tracked.
    pub fn get(&self, house: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(name, _)| name == house)
            .map(|(_, points)| *points)
    }

    pub(crate) fn get_mut(&mut self, house: &str) -> Option<&mut i64> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == house)
            .map(|(_, points)| points)
    }

    /// Sets every house back to zero.
    pub(crate) fn clear(&mut self) {
        for (_, points) in &mut self.entries {
            *points = 0;
        }
    }

    /// Iterates `(house, points)` in configured order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(name, points)| (name.as_str(), *points))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum over all houses.
    pub fn total(&self) -> i64 {
        self.entries
            .iter()
            .fold(0i64, |acc, (_, points)| acc.saturating_add(*points))
    }
}

impl Serialize for CounterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, points) in &self.entries {
            map.serialize_entry(name, points)?;
        }
        map.end()
    }
}

/// One applied points update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEvent {
    pub house: String,
    /// Value after clamping.
    pub points: i64,
    /// Delta as requested, not the effective change.
    pub change: i64,
}
