// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loose parsing and type-coercing comparison of broker values.
//!
//! State brokers deliver values without a fixed type: the same switch may
//! report `true`, `1`, or `"1"` depending on the adapter behind it.
//! Configured on/off values arrive as strings. This module provides the
//! coercion rules the mode units share:
//!
//! - [`LooseValue::parse`] turns a configured string into a boolean,
//!   number, or string (in that order of preference).
//! - [`loose_eq`] compares a broker value against a parsed value with type
//!   coercion, so `1`, `"1"`, and `true` are all equal.
//! - [`to_bool`] / [`to_number`] coerce raw broker values for sensor
//!   evaluation and numeric display.

use serde_json::Value;

/// A configured value parsed into its most specific type.
///
/// # Examples
///
/// ```
/// use flexicon_lib::value::LooseValue;
///
/// assert_eq!(LooseValue::parse("true"), LooseValue::Bool(true));
/// assert_eq!(LooseValue::parse("21.5"), LooseValue::Number(21.5));
/// assert_eq!(LooseValue::parse("comfort"), LooseValue::Text("comfort".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum LooseValue {
    /// Parsed as a boolean (`"true"` / `"false"` literals only).
    Bool(bool),
    /// Parsed as a finite number.
    Number(f64),
    /// Kept as a plain string.
    Text(String),
}

impl LooseValue {
    /// Parses a configured string: boolean literal first, then number,
    /// otherwise the string itself.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(num) = value.trim().parse::<f64>()
            && num.is_finite()
        {
            return Self::Number(num);
        }
        Self::Text(value.to_string())
    }

    /// Converts into the JSON value written to the broker.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// Canonical form used for loose comparison: booleans become 1/0,
    /// numeric strings become numbers.
    fn canonical(&self) -> LooseValue {
        match self {
            Self::Bool(b) => Self::Number(if *b { 1.0 } else { 0.0 }),
            Self::Number(n) => Self::Number(*n),
            Self::Text(s) => match Self::parse(s) {
                Self::Text(t) => Self::Text(t),
                other => other.canonical(),
            },
        }
    }
}

/// Converts a raw broker value into the loose representation.
fn from_broker(value: &Value) -> LooseValue {
    match value {
        Value::Bool(b) => LooseValue::Bool(*b),
        Value::Number(n) => LooseValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => LooseValue::Text(s.clone()),
        other => LooseValue::Text(other.to_string()),
    }
}

/// Compares a broker value against a parsed configured value with type
/// coercion.
///
/// Booleans coerce to 1/0 and numeric strings to numbers before comparing,
/// so `1 == "1" == true` and `"true" == true` all hold.
///
/// # Examples
///
/// ```
/// use flexicon_lib::value::{loose_eq, LooseValue};
/// use serde_json::json;
///
/// assert!(loose_eq(&json!(1), &LooseValue::parse("1")));
/// assert!(loose_eq(&json!("true"), &LooseValue::parse("true")));
/// assert!(!loose_eq(&json!(0), &LooseValue::parse("true")));
/// ```
#[must_use]
pub fn loose_eq(broker_value: &Value, configured: &LooseValue) -> bool {
    match (from_broker(broker_value).canonical(), configured.canonical()) {
        (LooseValue::Number(a), LooseValue::Number(b)) => (a - b).abs() < f64::EPSILON,
        (LooseValue::Text(a), LooseValue::Text(b)) => a == b,
        // Bool never survives canonicalization.
        _ => false,
    }
}

/// Coerces a broker value to a boolean.
///
/// Numbers are true when positive; strings only for the literals `"true"`
/// and `"1"`. Everything else (including null and objects) is false.
#[must_use]
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n > 0.0),
        Value::String(s) => s == "true" || s == "1",
        _ => false,
    }
}

/// Coerces a broker value to a finite number, if it has one.
///
/// Accepts numbers and numeric strings. Booleans, nulls, and structured
/// values yield `None`.
#[must_use]
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Coerces a broker value to a display string.
///
/// Null yields `None`; structured values are JSON-encoded so they never
/// render as an opaque debug form.
#[must_use]
pub fn to_display_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_boolean_literals() {
        assert_eq!(LooseValue::parse("true"), LooseValue::Bool(true));
        assert_eq!(LooseValue::parse("false"), LooseValue::Bool(false));
    }

    #[test]
    fn parse_numbers() {
        assert_eq!(LooseValue::parse("42"), LooseValue::Number(42.0));
        assert_eq!(LooseValue::parse("-3.5"), LooseValue::Number(-3.5));
    }

    #[test]
    fn parse_keeps_plain_strings() {
        assert_eq!(
            LooseValue::parse("comfort"),
            LooseValue::Text("comfort".to_string())
        );
        assert_eq!(LooseValue::parse(""), LooseValue::Text(String::new()));
    }

    #[test]
    fn loose_eq_coerces_across_types() {
        let one = LooseValue::parse("1");
        assert!(loose_eq(&json!(1), &one));
        assert!(loose_eq(&json!("1"), &one));
        assert!(loose_eq(&json!(true), &one));

        let on = LooseValue::parse("true");
        assert!(loose_eq(&json!(true), &on));
        assert!(loose_eq(&json!("true"), &on));
        assert!(loose_eq(&json!(1), &on));
        assert!(!loose_eq(&json!(0), &on));
        assert!(!loose_eq(&json!("off"), &on));
    }

    #[test]
    fn loose_eq_plain_strings() {
        let val = LooseValue::parse("comfort");
        assert!(loose_eq(&json!("comfort"), &val));
        assert!(!loose_eq(&json!("eco"), &val));
    }

    #[test]
    fn to_bool_rules() {
        assert!(to_bool(&json!(true)));
        assert!(to_bool(&json!(1)));
        assert!(to_bool(&json!(0.5)));
        assert!(to_bool(&json!("true")));
        assert!(to_bool(&json!("1")));
        assert!(!to_bool(&json!(0)));
        assert!(!to_bool(&json!(-1)));
        assert!(!to_bool(&json!("yes")));
        assert!(!to_bool(&Value::Null));
    }

    #[test]
    fn to_number_rules() {
        assert_eq!(to_number(&json!(21.5)), Some(21.5));
        assert_eq!(to_number(&json!("21.5")), Some(21.5));
        assert_eq!(to_number(&json!("abc")), None);
        assert_eq!(to_number(&json!(true)), None);
        assert_eq!(to_number(&Value::Null), None);
    }

    #[test]
    fn to_display_string_encodes_objects_as_json() {
        assert_eq!(to_display_string(&Value::Null), None);
        assert_eq!(to_display_string(&json!("on")), Some("on".to_string()));
        assert_eq!(to_display_string(&json!(3)), Some("3".to_string()));
        assert_eq!(
            to_display_string(&json!({"a": 1})),
            Some("{\"a\":1}".to_string())
        );
    }

    #[test]
    fn to_json_round_trip() {
        assert_eq!(LooseValue::Bool(true).to_json(), json!(true));
        assert_eq!(LooseValue::Number(2.0).to_json(), json!(2.0));
        assert_eq!(
            LooseValue::Text("eco".to_string()).to_json(),
            json!("eco")
        );
    }
}
