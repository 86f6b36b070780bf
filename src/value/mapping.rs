// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value-to-label mapping tables.
//!
//! Display modes can carry a JSON-configured table that replaces raw values
//! with labels (`{"0": "Closed", "1": "Open"}`). Lookup is by exact string
//! key; a matched label bypasses numeric and text formatting entirely.
//! Malformed tables never fail the widget; they are logged and treated as
//! absent.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::ConfigError;

/// A parsed value→label table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMapping {
    entries: HashMap<String, String>,
}

impl ValueMapping {
    /// Parses a mapping table from its configured JSON string.
    ///
    /// Returns `None` for empty input, non-object JSON, or a table whose
    /// entries are all unusable. Parse failures are logged, never
    /// propagated.
    #[must_use]
    pub fn parse(json: Option<&str>) -> Option<Self> {
        let json = json?.trim();
        if json.is_empty() {
            return None;
        }
        match Self::try_parse(json) {
            Ok(mapping) if mapping.is_empty() => None,
            Ok(mapping) => Some(mapping),
            Err(error) => {
                tracing::warn!(error = %error, "Failed to parse value mapping, ignoring");
                None
            }
        }
    }

    /// Strict variant of [`Self::parse`]. Non-string labels are skipped
    /// with a warning; structural problems are errors.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid JSON or a non-object top level.
    pub fn try_parse(json: &str) -> Result<Self, ConfigError> {
        let parsed: Value = serde_json::from_str(json)?;
        let Value::Object(object) = parsed else {
            return Err(ConfigError::UnexpectedShape(
                "value mapping must be a JSON object".to_string(),
            ));
        };

        let mut entries = HashMap::new();
        for (key, value) in object {
            match value {
                Value::String(label) => {
                    entries.insert(key, label);
                }
                other => {
                    tracing::warn!(key = %key, value = %other, "Value mapping label must be a string, skipping");
                }
            }
        }
        Ok(Self { entries })
    }

    /// Looks up the label for a value, stringified for the lookup.
    ///
    /// Returns `None` when no entry matches.
    #[must_use]
    pub fn lookup(&self, value: &str) -> Option<&str> {
        self.entries.get(value).map(String::as_str)
    }

    /// Number of usable entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps a value through an optional table, falling back to the given
/// string when the table is absent or has no matching entry.
///
/// # Examples
///
/// ```
/// use flexicon_lib::value::{map_value, ValueMapping};
///
/// let mapping = ValueMapping::parse(Some(r#"{"1": "Open"}"#));
/// assert_eq!(map_value("1", mapping.as_ref(), "1"), "Open");
/// assert_eq!(map_value("2", mapping.as_ref(), "2"), "2");
/// assert_eq!(map_value("1", None, "fallback"), "fallback");
/// ```
#[must_use]
pub fn map_value(value: &str, mapping: Option<&ValueMapping>, fallback: &str) -> String {
    mapping
        .and_then(|m| m.lookup(value))
        .unwrap_or(fallback)
        .to_string()
}
