//! Points store holding the live scoreboard.
//!
//! The store owns the only copy of the counters. Every read-modify-write
//! happens under one mutex, so concurrent updates from different
//! connections never interleave partially.

use super::types::{CounterSet, UpdateEvent};
use crate::error::ConfigError;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The scoreboard for a fixed set of houses.
///
/// Share it as `Arc<CounterStore>`; all methods take `&self`.
#[derive(Debug)]
pub struct CounterStore {
    /// House identifiers, fixed for the lifetime of the store.
    houses: Vec<String>,

    counters: Mutex<CounterSet>,
}

impl CounterStore {
    /// Creates a store with every house at zero.
    ///
    /// Fails if `houses` is empty or names a house twice.
    pub fn new<I, S>(houses: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let houses: Vec<String> = houses.into_iter().map(Into::into).collect();
        if houses.is_empty() {
            return Err(ConfigError::NoHouses);
        }

        let mut seen = HashSet::with_capacity(houses.len());
        for house in &houses {
            if !seen.insert(house.as_str()) {
                return Err(ConfigError::DuplicateHouse(house.clone()));
            }
        }

        let counters = Mutex::new(CounterSet::zeroed(houses.iter().cloned()));
        Ok(Self { houses, counters })
    }

    /// House identifiers in configured order.
    pub fn houses(&self) -> &[String] {
        &self.houses
    }

    /// Whether `house` is one of the tracked identifiers.
    pub fn contains(&self, house: &str) -> bool {
        self.houses.iter().any(|h| h == house)
    }

    /// Applies `delta` to `house`, clamping the result at zero.
    ///
    /// Unknown houses are ignored and return `None`.
    pub fn increment(&self, house: &str, delta: i64) -> Option<UpdateEvent> {
        let mut counters = self.lock();
        let points = counters.get_mut(house)?;

        let old = *points;
        *points = old.saturating_add(delta).max(0);
        let new = *points;
        drop(counters);

        tracing::info!(house, old, new, change = delta, "Points updated");

        Some(UpdateEvent {
            house: house.to_string(),
            points: new,
            change: delta,
        })
    }

    /// Sets every house to zero and returns the resulting snapshot.
    pub fn reset(&self) -> CounterSet {
        let mut counters = self.lock();
        counters.clear();
        let snapshot = counters.clone();
        drop(counters);

        tracing::info!("All points reset to 0");
        snapshot
    }

    /// Returns a copy of the current scoreboard.
    pub fn snapshot(&self) -> CounterSet {
        self.lock().clone()
    }

    // Every mutation leaves the set valid before it can panic, so a
    // poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, CounterSet> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
