// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory broker implementation.
//!
//! `MemoryBroker` backs the test suite and host bring-up: it stores values
//! and object names, records every read, write, and the live subscription
//! set, and broadcasts external updates so a host loop can feed them back
//! into a widget. It has no transport and never fails.

use std::collections::{HashMap, HashSet};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::BrokerError;

use super::client::{BrokerClient, ObjectInfo, ObjectName, OidState};

/// Capacity of the push broadcast channel.
const PUSH_CHANNEL_CAPACITY: usize = 64;

/// An in-memory state broker.
///
/// # Examples
///
/// ```
/// use flexicon_lib::broker::{BrokerClient, MemoryBroker};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let broker = MemoryBroker::new().with_state("light.level", json!(40));
///
/// let state = broker.get_state("light.level").await.unwrap().unwrap();
/// assert_eq!(state.val, json!(40));
///
/// broker.set_value("light.level", json!(75)).await.unwrap();
/// assert_eq!(broker.writes(), vec![("light.level".to_string(), json!(75))]);
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryBroker {
    states: RwLock<HashMap<String, Value>>,
    names: RwLock<HashMap<String, ObjectName>>,
    subscriptions: Mutex<HashSet<String>>,
    read_log: Mutex<Vec<String>>,
    write_log: Mutex<Vec<(String, Value)>>,
    push_tx: broadcast::Sender<(String, Value)>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBroker {
    /// Creates an empty broker.
    #[must_use]
    pub fn new() -> Self {
        let (push_tx, _) = broadcast::channel(PUSH_CHANNEL_CAPACITY);
        Self {
            states: RwLock::new(HashMap::new()),
            names: RwLock::new(HashMap::new()),
            subscriptions: Mutex::new(HashSet::new()),
            read_log: Mutex::new(Vec::new()),
            write_log: Mutex::new(Vec::new()),
            push_tx,
        }
    }

    /// Seeds a data point value, builder style.
    #[must_use]
    pub fn with_state(self, oid: &str, value: Value) -> Self {
        self.states.write().insert(oid.to_string(), value);
        self
    }

    /// Seeds an object display name, builder style.
    #[must_use]
    pub fn with_object_name(self, oid: &str, name: ObjectName) -> Self {
        self.names.write().insert(oid.to_string(), name);
        self
    }

    /// Applies an external update: stores the value and broadcasts a push.
    ///
    /// This models the broker side of a device changing state on its own.
    /// Subscribers obtained via [`Self::pushes`] receive the pair; whether
    /// a widget cares is decided by its own subscription list.
    pub fn push(&self, oid: &str, value: Value) {
        self.states
            .write()
            .insert(oid.to_string(), value.clone());
        // Receivers may not exist; that is fine.
        let _ = self.push_tx.send((oid.to_string(), value));
    }

    /// Returns a receiver of pushed `(oid, value)` pairs.
    #[must_use]
    pub fn pushes(&self) -> broadcast::Receiver<(String, Value)> {
        self.push_tx.subscribe()
    }

    /// All writes issued so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<(String, Value)> {
        self.write_log.lock().clone()
    }

    /// All state reads issued so far, in order.
    #[must_use]
    pub fn reads(&self) -> Vec<String> {
        self.read_log.lock().clone()
    }

    /// The currently subscribed OIDs, sorted.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        let mut oids: Vec<String> = self.subscriptions.lock().iter().cloned().collect();
        oids.sort();
        oids
    }

    /// Clears the read and write logs.
    pub fn clear_logs(&self) {
        self.read_log.lock().clear();
        self.write_log.lock().clear();
    }
}

impl BrokerClient for MemoryBroker {
    async fn get_state(&self, oid: &str) -> Result<Option<OidState>, BrokerError> {
        self.read_log.lock().push(oid.to_string());
        Ok(self.states.read().get(oid).cloned().map(OidState::new))
    }

    async fn get_object(&self, oid: &str) -> Result<Option<ObjectInfo>, BrokerError> {
        Ok(self
            .names
            .read()
            .get(oid)
            .cloned()
            .map(|name| ObjectInfo { name: Some(name) }))
    }

    async fn set_value(&self, oid: &str, value: Value) -> Result<(), BrokerError> {
        tracing::debug!(oid = %oid, value = %value, "Writing value");
        self.states
            .write()
            .insert(oid.to_string(), value.clone());
        self.write_log.lock().push((oid.to_string(), value));
        Ok(())
    }

    async fn subscribe(&self, oids: &[String]) -> Result<(), BrokerError> {
        let mut subscriptions = self.subscriptions.lock();
        for oid in oids {
            subscriptions.insert(oid.clone());
        }
        Ok(())
    }

    async fn unsubscribe(&self, oids: &[String]) -> Result<(), BrokerError> {
        let mut subscriptions = self.subscriptions.lock();
        for oid in oids {
            subscriptions.remove(oid);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_state_returns_seeded_value_and_logs_read() {
        let broker = MemoryBroker::new().with_state("a", json!(1));

        let state = broker.get_state("a").await.unwrap().unwrap();
        assert_eq!(state.val, json!(1));
        assert!(broker.get_state("missing").await.unwrap().is_none());
        assert_eq!(broker.reads(), vec!["a".to_string(), "missing".to_string()]);
    }

    #[tokio::test]
    async fn set_value_is_recorded_and_visible() {
        let broker = MemoryBroker::new();
        broker.set_value("b", json!("on")).await.unwrap();

        assert_eq!(broker.writes(), vec![("b".to_string(), json!("on"))]);
        assert_eq!(
            broker.get_state("b").await.unwrap().unwrap().val,
            json!("on")
        );
    }

    #[tokio::test]
    async fn subscriptions_track_subscribe_and_unsubscribe() {
        let broker = MemoryBroker::new();
        broker
            .subscribe(&["x".to_string(), "y".to_string()])
            .await
            .unwrap();
        assert_eq!(broker.subscriptions(), vec!["x".to_string(), "y".to_string()]);

        broker.unsubscribe(&["x".to_string()]).await.unwrap();
        assert_eq!(broker.subscriptions(), vec!["y".to_string()]);
    }

    #[tokio::test]
    async fn push_updates_state_and_broadcasts() {
        let broker = MemoryBroker::new();
        let mut rx = broker.pushes();

        broker.push("sensor", json!(2));

        assert_eq!(
            broker.get_state("sensor").await.unwrap().unwrap().val,
            json!(2)
        );
        let (oid, value) = rx.recv().await.unwrap();
        assert_eq!(oid, "sensor");
        assert_eq!(value, json!(2));
    }

    #[tokio::test]
    async fn object_name_lookup() {
        let broker = MemoryBroker::new()
            .with_object_name("lamp", ObjectName::Text("Ceiling lamp".to_string()));

        let info = broker.get_object("lamp").await.unwrap().unwrap();
        assert_eq!(
            info.name.unwrap().display_name("en"),
            Some("Ceiling lamp")
        );
        assert!(broker.get_object("other").await.unwrap().is_none());
    }
}
