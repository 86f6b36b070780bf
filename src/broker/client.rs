// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The state-broker client contract.
//!
//! The widget core never owns a transport. It talks to a device/state
//! broker through the [`BrokerClient`] trait: point reads of current
//! values, object metadata for display names, writes of user actions, and
//! a subscription registry. Push delivery itself is host-driven: the host
//! receives `(oid, value)` pairs from its broker connection and feeds them
//! into the widget's state-change handler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BrokerError;

/// A data point's current state as reported by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OidState {
    /// The raw value. Brokers deliver loosely typed data; coercion is the
    /// consumer's job.
    pub val: Value,
}

impl OidState {
    /// Creates a state wrapping the given value.
    #[must_use]
    pub fn new(val: Value) -> Self {
        Self { val }
    }
}

/// Display name of a broker object: a plain string or a per-language map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectName {
    /// A single name used for every language.
    Text(String),
    /// Per-language names, keyed by language code.
    PerLanguage(BTreeMap<String, String>),
}

impl ObjectName {
    /// Resolves the name for a language.
    ///
    /// Fallback order: requested language → `"en"` → first available
    /// entry. Returns `None` only for an empty per-language map.
    ///
    /// # Examples
    ///
    /// ```
    /// use flexicon_lib::broker::ObjectName;
    /// use std::collections::BTreeMap;
    ///
    /// let name = ObjectName::PerLanguage(BTreeMap::from([
    ///     ("de".to_string(), "Wohnzimmer".to_string()),
    ///     ("en".to_string(), "Living room".to_string()),
    /// ]));
    /// assert_eq!(name.display_name("de"), Some("Wohnzimmer"));
    /// assert_eq!(name.display_name("fr"), Some("Living room"));
    /// ```
    #[must_use]
    pub fn display_name(&self, lang: &str) -> Option<&str> {
        match self {
            Self::Text(name) => Some(name),
            Self::PerLanguage(names) => names
                .get(lang)
                .or_else(|| names.get("en"))
                .or_else(|| names.values().next())
                .map(String::as_str),
        }
    }
}

/// Object metadata exposed by the broker.
///
/// Mirrors the `common` section of broker objects, reduced to what the
/// widget consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Display name, if the object carries one.
    pub name: Option<ObjectName>,
}

/// Client contract to the device/state broker.
///
/// Implementations serialize their own transport; the widget assumes
/// single-threaded, event-loop style access and never locks around the
/// client. All methods are best-effort: a transport error is logged by the
/// caller and degrades to "value not available", never to a widget
/// failure.
pub trait BrokerClient: Send + Sync + 'static {
    /// Fetches the current state of a data point.
    ///
    /// `Ok(None)` means the broker has no value, which is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport failures.
    fn get_state(
        &self,
        oid: &str,
    ) -> impl Future<Output = Result<Option<OidState>, BrokerError>> + Send;

    /// Fetches object metadata (display name) for a data point.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport failures.
    fn get_object(
        &self,
        oid: &str,
    ) -> impl Future<Output = Result<Option<ObjectInfo>, BrokerError>> + Send;

    /// Writes a value to a data point.
    ///
    /// # Errors
    ///
    /// Returns an error when the write could not be delivered.
    fn set_value(
        &self,
        oid: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), BrokerError>> + Send;

    /// Registers interest in push notifications for the given OIDs.
    ///
    /// # Errors
    ///
    /// Returns an error when the subscription could not be registered.
    fn subscribe(&self, oids: &[String])
    -> impl Future<Output = Result<(), BrokerError>> + Send;

    /// Removes interest in push notifications for the given OIDs.
    ///
    /// # Errors
    ///
    /// Returns an error when the subscription could not be removed.
    fn unsubscribe(
        &self,
        oids: &[String],
    ) -> impl Future<Output = Result<(), BrokerError>> + Send;
}
