// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Widget configuration.
//!
//! The host supplies a flat key/value object at construction and again on
//! every edit. Validation is deliberately loose: a missing or wrong-typed
//! field decodes as absent and falls back to its documented default at the
//! point of use, per field, so one malformed entry cannot take the rest
//! of the configuration down with it. Fields belonging to inactive modes
//! are carried but ignored. Nothing here ever fails hard; the widget must
//! keep rendering while the user is mid-edit.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::modes::Mode;
use crate::value::{DecimalMode, DecimalSeparator, ThousandSeparator, to_number};

use super::pane::PaneSpec;

/// Where the icon sits relative to the value in the display modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconPosition {
    /// Icon above the value (vertical layout).
    #[default]
    Top,
    /// Icon below the value (vertical layout).
    Bottom,
    /// Icon left of the value (horizontal layout).
    Left,
    /// Icon right of the value (horizontal layout).
    Right,
}

/// Click behavior of the read-only display modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickAction {
    /// Clicks do nothing.
    #[default]
    None,
    /// Clicks request navigation to the configured target view.
    Navigate,
}

/// Text transformation applied by the string display mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    /// No transformation.
    #[default]
    None,
    /// Entire value uppercased.
    Uppercase,
    /// Entire value lowercased.
    Lowercase,
    /// First character uppercased, rest lowercased.
    Capitalize,
}

/// How the heating dialog lets the user pick an operating mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatingControlStyle {
    /// A single button cycling through the mode list.
    #[default]
    Button,
    /// A dropdown selecting a mode directly.
    Dropdown,
    /// One button per mode.
    Buttons,
}

/// Flat widget configuration, one field set per mode plus common fields.
///
/// All fields decode leniently; accessors and the per-mode config
/// extractors apply the documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    // ===== Common =====
    /// Active operating mode.
    #[serde(deserialize_with = "lenient_or_default")]
    pub mode: Mode,
    /// Primary control OID (dimmer and switch modes).
    #[serde(deserialize_with = "lenient")]
    pub control_oid: Option<String>,
    /// Icon shown by the widget.
    #[serde(deserialize_with = "lenient")]
    pub icon: Option<String>,
    /// Distinct icon for the inactive state.
    #[serde(deserialize_with = "lenient")]
    pub icon_inactive: Option<String>,
    /// Whether the inactive state uses [`Self::icon_inactive`].
    #[serde(deserialize_with = "lenient_bool")]
    pub use_different_inactive_icon: Option<bool>,
    /// Icon color while active.
    #[serde(deserialize_with = "lenient")]
    pub active_color: Option<String>,
    /// Icon color while inactive.
    #[serde(deserialize_with = "lenient")]
    pub inactive_color: Option<String>,
    /// Language used to resolve broker object names.
    #[serde(deserialize_with = "lenient")]
    pub language: Option<String>,

    // ===== Dialog =====
    /// Explicit dialog title; falls back to the OID display name.
    #[serde(deserialize_with = "lenient")]
    pub dialog_title: Option<String>,

    // ===== Status overlay =====
    /// Dimmer: show the rounded percentage under the icon.
    #[serde(deserialize_with = "lenient_bool")]
    pub show_percentage: Option<bool>,
    /// Switch: show the on/off status text under the icon.
    #[serde(deserialize_with = "lenient_bool")]
    pub show_status_text: Option<bool>,
    /// Switch: status text while on.
    #[serde(deserialize_with = "lenient")]
    pub status_on_text: Option<String>,
    /// Switch: status text while off.
    #[serde(deserialize_with = "lenient")]
    pub status_off_text: Option<String>,

    // ===== Dimmer =====
    /// Lower bound of the dimmer range.
    #[serde(deserialize_with = "lenient_number")]
    pub dimmer_min_value: Option<f64>,
    /// Upper bound of the dimmer range.
    #[serde(deserialize_with = "lenient_number")]
    pub dimmer_max_value: Option<f64>,
    /// Slider step.
    #[serde(deserialize_with = "lenient_number")]
    pub dimmer_step: Option<f64>,
    /// Whether the dimmer dialog offers the quick-set buttons.
    #[serde(deserialize_with = "lenient_bool")]
    pub dimmer_show_quick_buttons: Option<bool>,

    // ===== Switch =====
    /// Configured "on" value (loosely parsed).
    #[serde(deserialize_with = "lenient")]
    pub switch_on_value: Option<String>,
    /// Configured "off" value (loosely parsed).
    #[serde(deserialize_with = "lenient")]
    pub switch_off_value: Option<String>,

    // ===== Heating =====
    /// OID receiving setpoint shift pulses.
    #[serde(deserialize_with = "lenient")]
    pub heating_setpoint_shift_oid: Option<String>,
    /// Value written for a setpoint increase pulse.
    #[serde(deserialize_with = "lenient")]
    pub heating_setpoint_increase_value: Option<String>,
    /// Value written for a setpoint decrease pulse.
    #[serde(deserialize_with = "lenient")]
    pub heating_setpoint_decrease_value: Option<String>,
    /// OID reporting the valve position.
    #[serde(deserialize_with = "lenient")]
    pub heating_valve_position_oid: Option<String>,
    /// OID reporting the current setpoint.
    #[serde(deserialize_with = "lenient")]
    pub heating_setpoint_oid: Option<String>,
    /// OID reporting the current operating mode.
    #[serde(deserialize_with = "lenient")]
    pub heating_mode_status_oid: Option<String>,
    /// OID receiving operating-mode writes.
    #[serde(deserialize_with = "lenient")]
    pub heating_mode_control_oid: Option<String>,
    /// JSON-encoded operating-mode list.
    #[serde(deserialize_with = "lenient")]
    pub heating_modes_config: Option<String>,
    /// Whether formatted values carry their units.
    #[serde(deserialize_with = "lenient_bool")]
    pub heating_show_units: Option<bool>,
    /// Mode selection style in the dialog.
    #[serde(deserialize_with = "lenient")]
    pub heating_mode_control_type: Option<HeatingControlStyle>,

    // ===== Window / shutter =====
    /// OID holding the shutter position.
    #[serde(deserialize_with = "lenient")]
    pub shutter_position_oid: Option<String>,
    /// Dedicated OID for "move up".
    #[serde(deserialize_with = "lenient")]
    pub shutter_up_oid: Option<String>,
    /// Dedicated OID for "move down".
    #[serde(deserialize_with = "lenient")]
    pub shutter_down_oid: Option<String>,
    /// Dedicated OID for "stop movement".
    #[serde(deserialize_with = "lenient")]
    pub shutter_stop_oid: Option<String>,
    /// Whether the hardware reports the position inverted.
    #[serde(deserialize_with = "lenient_bool")]
    pub shutter_invert: Option<bool>,
    /// Raw value corresponding to position 0.
    #[serde(deserialize_with = "lenient_number")]
    pub shutter_min: Option<f64>,
    /// Raw value corresponding to position 100.
    #[serde(deserialize_with = "lenient_number")]
    pub shutter_max: Option<f64>,
    /// Window panes, in rendering order.
    #[serde(deserialize_with = "lenient_panes")]
    pub panes: Vec<PaneSpec>,

    // ===== Display (common) =====
    /// Icon placement relative to the value.
    #[serde(deserialize_with = "lenient")]
    pub display_icon_position: Option<IconPosition>,
    /// Click behavior.
    #[serde(deserialize_with = "lenient")]
    pub display_click_action: Option<ClickAction>,
    /// Navigation target view for [`ClickAction::Navigate`].
    #[serde(deserialize_with = "lenient")]
    pub display_target_view: Option<String>,
    /// Value text color when no threshold color applies.
    #[serde(deserialize_with = "lenient")]
    pub display_text_color: Option<String>,

    // ===== Numeric display =====
    /// OID providing the displayed number.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_value_oid: Option<String>,
    /// Decimal places.
    #[serde(deserialize_with = "lenient_number")]
    pub numeric_display_decimals: Option<f64>,
    /// Rounding mode.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_decimal_mode: Option<DecimalMode>,
    /// Decimal separator.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_decimal_separator: Option<DecimalSeparator>,
    /// Thousands separator.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_thousand_separator: Option<ThousandSeparator>,
    /// Unit appended after the suffix.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_unit: Option<String>,
    /// Prefix prepended to the value.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_prefix: Option<String>,
    /// Suffix appended to the value.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_suffix: Option<String>,
    /// Whether threshold coloring is enabled.
    #[serde(deserialize_with = "lenient_bool")]
    pub numeric_display_use_color_thresholds: Option<bool>,
    /// Upper bound (inclusive) of the low color zone.
    #[serde(deserialize_with = "lenient_number")]
    pub numeric_display_threshold_low: Option<f64>,
    /// Upper bound (inclusive) of the medium color zone.
    #[serde(deserialize_with = "lenient_number")]
    pub numeric_display_threshold_high: Option<f64>,
    /// Low zone color.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_color_low: Option<String>,
    /// Medium zone color.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_color_medium: Option<String>,
    /// High zone color.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_color_high: Option<String>,
    /// JSON-encoded value→label table.
    #[serde(deserialize_with = "lenient")]
    pub numeric_display_value_mapping: Option<String>,

    // ===== String display =====
    /// OID providing the displayed text.
    #[serde(deserialize_with = "lenient")]
    pub string_display_value_oid: Option<String>,
    /// Maximum rendered length.
    #[serde(deserialize_with = "lenient_number")]
    pub string_display_max_length: Option<f64>,
    /// Whether truncation appends an ellipsis.
    #[serde(deserialize_with = "lenient_bool")]
    pub string_display_ellipsis: Option<bool>,
    /// Text transformation.
    #[serde(deserialize_with = "lenient")]
    pub string_display_text_transform: Option<TextTransform>,
    /// Prefix prepended to the value.
    #[serde(deserialize_with = "lenient")]
    pub string_display_prefix: Option<String>,
    /// Suffix appended to the value.
    #[serde(deserialize_with = "lenient")]
    pub string_display_suffix: Option<String>,
    /// JSON-encoded value→label table.
    #[serde(deserialize_with = "lenient")]
    pub string_display_value_mapping: Option<String>,
}

impl WidgetConfig {
    /// Builds a configuration from a host-supplied JSON object.
    ///
    /// Never fails: unknown fields are ignored, wrong-typed fields decode
    /// as absent, and a non-object input yields the all-defaults
    /// configuration (logged).
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!(error = %error, "Malformed widget configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Language for broker object-name resolution, defaulting to `"en"`.
    #[must_use]
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }
}

/// Decodes any value leniently: a failed inner decode becomes absent
/// instead of an error.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Decodes a value leniently, falling back to the type's default.
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Decodes a boolean leniently: native booleans, the string literals
/// `"true"`/`"false"`, and numbers (positive = true). Anything else is
/// absent.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_f64().map(|n| n > 0.0),
        _ => None,
    })
}

/// Decodes a number leniently: native numbers and numeric strings.
/// Anything else is absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(to_number))
}

/// Decodes the pane list leniently: a malformed entry falls back to the
/// default pane rather than dropping the whole list (pane count is part of
/// the window geometry, so it must survive bad fields).
fn lenient_panes<'de, D>(deserializer: D) -> Result<Vec<PaneSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(entries)) = value else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::pane::SensorMode;
    use serde_json::json;

    #[test]
    fn defaults_are_all_absent() {
        let config = WidgetConfig::default();
        assert_eq!(config.mode, Mode::Dimmer);
        assert!(config.control_oid.is_none());
        assert!(config.panes.is_empty());
        assert_eq!(config.language(), "en");
    }

    #[test]
    fn deserializes_camel_case_keys() {
        let config = WidgetConfig::from_json(json!({
            "mode": "switch",
            "controlOid": "light.power",
            "switchOnValue": "1",
            "showStatusText": true,
        }));
        assert_eq!(config.mode, Mode::Switch);
        assert_eq!(config.control_oid.as_deref(), Some("light.power"));
        assert_eq!(config.switch_on_value.as_deref(), Some("1"));
        assert_eq!(config.show_status_text, Some(true));
    }

    #[test]
    fn wrong_typed_fields_decode_as_absent_per_field() {
        let config = WidgetConfig::from_json(json!({
            "mode": "dimmer",
            "controlOid": "light.level",
            "dimmerMaxValue": "not a number",
            "showPercentage": {"nested": true},
        }));
        // The malformed fields fall back without taking the others down.
        assert_eq!(config.mode, Mode::Dimmer);
        assert_eq!(config.control_oid.as_deref(), Some("light.level"));
        assert!(config.dimmer_max_value.is_none());
        assert!(config.show_percentage.is_none());
    }

    #[test]
    fn unknown_mode_falls_back_to_default() {
        let config = WidgetConfig::from_json(json!({
            "mode": "hologram",
            "controlOid": "x",
        }));
        assert_eq!(config.mode, Mode::Dimmer);
        assert_eq!(config.control_oid.as_deref(), Some("x"));
    }

    #[test]
    fn lenient_fields_coerce_strings() {
        let config = WidgetConfig::from_json(json!({
            "dimmerMaxValue": "80",
            "shutterInvert": "true",
        }));
        assert_eq!(config.dimmer_max_value, Some(80.0));
        assert_eq!(config.shutter_invert, Some(true));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let config = WidgetConfig::from_json(json!({
            "mode": "heating",
            "someHostInternalField": 42,
        }));
        assert_eq!(config.mode, Mode::Heating);
    }

    #[test]
    fn non_object_input_yields_defaults() {
        let config = WidgetConfig::from_json(json!("nonsense"));
        assert_eq!(config, WidgetConfig::default());
    }

    #[test]
    fn panes_deserialize_inline() {
        let config = WidgetConfig::from_json(json!({
            "mode": "window_shutter",
            "panes": [
                {"openOid": "p1", "sensorMode": "oneOid"},
                {"openOid": "p2o", "tiltOid": "p2t", "sensorMode": "twoOids", "ratio": 2.0},
            ],
        }));
        assert_eq!(config.panes.len(), 2);
        assert_eq!(config.panes[1].tilt_oid.as_deref(), Some("p2t"));
    }

    #[test]
    fn malformed_pane_entry_keeps_pane_count() {
        let config = WidgetConfig::from_json(json!({
            "panes": [
                {"openOid": "p1"},
                "garbage",
            ],
        }));
        assert_eq!(config.panes.len(), 2);
        assert_eq!(config.panes[0].open_oid.as_deref(), Some("p1"));
        assert_eq!(config.panes[1].sensor_mode, SensorMode::OneOid);
    }
}
