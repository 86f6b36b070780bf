// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heating mode: setpoint shift, valve display, operating-mode switching.
//!
//! Operating modes come from a JSON-configured list of
//! `{label, statusValue, controlValue}` entries. `statusValue` is what the
//! status OID reports, `controlValue` is what gets written to switch into
//! the mode. KNX installations routinely use different numbers for the
//! two. Older configurations carry a single `value` field; it stands in
//! for both when the paired fields are absent.
//!
//! Setpoint changes are edge-triggered shift pulses to a dedicated OID,
//! not absolute setpoint writes.

use std::sync::Arc;

use serde_json::Value;

use crate::broker::BrokerClient;
use crate::config::{HeatingControlStyle, WidgetConfig};
use crate::error::ConfigError;
use crate::value::{LooseValue, PLACEHOLDER, compact_number, to_number};

use super::ModeLogic;

/// One operating mode entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatingModeEntry {
    /// Human-readable label. May be empty for malformed entries.
    pub label: String,
    /// Value the status OID reports while this mode is active.
    pub status_value: f64,
    /// Value written to the control OID to activate this mode.
    pub control_value: f64,
}

/// Heating configuration, extracted from the widget configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatingConfig {
    /// OID receiving setpoint shift pulses.
    pub setpoint_shift_oid: Option<String>,
    /// Pulse value for an increase (parsed loosely).
    pub setpoint_increase_value: String,
    /// Pulse value for a decrease (parsed loosely).
    pub setpoint_decrease_value: String,
    /// OID reporting the valve position.
    pub valve_position_oid: Option<String>,
    /// OID reporting the current setpoint.
    pub setpoint_oid: Option<String>,
    /// OID reporting the active operating mode.
    pub mode_status_oid: Option<String>,
    /// OID receiving operating-mode writes.
    pub mode_control_oid: Option<String>,
    /// Raw JSON mode list.
    pub modes_config: Option<String>,
    /// Whether formatted values carry `°C` / `%` units.
    pub show_units: bool,
    /// Mode selection style offered by the dialog.
    pub control_style: HeatingControlStyle,
}

impl HeatingConfig {
    /// Extracts the heating-relevant fields, applying defaults.
    #[must_use]
    pub fn from_widget(config: &WidgetConfig) -> Self {
        Self {
            setpoint_shift_oid: config.heating_setpoint_shift_oid.clone(),
            setpoint_increase_value: config
                .heating_setpoint_increase_value
                .clone()
                .unwrap_or_else(|| "true".to_string()),
            setpoint_decrease_value: config
                .heating_setpoint_decrease_value
                .clone()
                .unwrap_or_else(|| "false".to_string()),
            valve_position_oid: config.heating_valve_position_oid.clone(),
            setpoint_oid: config.heating_setpoint_oid.clone(),
            mode_status_oid: config.heating_mode_status_oid.clone(),
            mode_control_oid: config.heating_mode_control_oid.clone(),
            modes_config: config.heating_modes_config.clone(),
            show_units: config.heating_show_units.unwrap_or(false),
            control_style: config.heating_mode_control_type.unwrap_or_default(),
        }
    }
}

/// Heating runtime state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeatingState {
    /// Current setpoint temperature, if reported.
    pub setpoint_value: Option<f64>,
    /// Current valve position, if reported.
    pub valve_value: Option<f64>,
    /// Status value of the active operating mode, if reported.
    pub current_mode: Option<f64>,
}

/// Heating mode logic unit.
pub struct HeatingLogic<B> {
    config: HeatingConfig,
    broker: Arc<B>,
    state: HeatingState,
    modes: Vec<HeatingModeEntry>,
}

/// Built-in mode list used when the configured JSON is absent, malformed,
/// or empty.
fn default_modes() -> Vec<HeatingModeEntry> {
    vec![
        HeatingModeEntry {
            label: "Komfort".to_string(),
            status_value: 33.0,
            control_value: 1.0,
        },
        HeatingModeEntry {
            label: "Standby".to_string(),
            status_value: 34.0,
            control_value: 2.0,
        },
        HeatingModeEntry {
            label: "Nacht".to_string(),
            status_value: 36.0,
            control_value: 3.0,
        },
        HeatingModeEntry {
            label: "Frost".to_string(),
            status_value: 40.0,
            control_value: 4.0,
        },
    ]
}

/// Parses the configured mode list, falling back to [`default_modes`] for
/// absent, malformed, or empty configurations.
fn parse_modes(json: Option<&str>) -> Vec<HeatingModeEntry> {
    let Some(json) = json.map(str::trim).filter(|j| !j.is_empty()) else {
        return default_modes();
    };
    match try_parse_modes(json) {
        Ok(modes) if modes.is_empty() => default_modes(),
        Ok(modes) => modes,
        Err(error) => {
            tracing::warn!(error = %error, "Failed to parse heating modes config, using defaults");
            default_modes()
        }
    }
}

/// Strict mode-list parse. Entries that are not objects are skipped.
fn try_parse_modes(json: &str) -> Result<Vec<HeatingModeEntry>, ConfigError> {
    let parsed: Value = serde_json::from_str(json)?;
    let Value::Array(entries) = parsed else {
        return Err(ConfigError::UnexpectedShape(
            "heating modes config must be a JSON array".to_string(),
        ));
    };

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let object = entry.as_object()?;
            let label = object
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            // Back-compat: a single `value` field stands in for both.
            let legacy = object.get("value").and_then(to_number);
            let status_value = object
                .get("statusValue")
                .and_then(to_number)
                .or(legacy)
                .unwrap_or(0.0);
            let control_value = object
                .get("controlValue")
                .and_then(to_number)
                .or(legacy)
                .unwrap_or(0.0);
            Some(HeatingModeEntry {
                label,
                status_value,
                control_value,
            })
        })
        .collect())
}

impl<B: BrokerClient> HeatingLogic<B> {
    /// Creates the unit; the mode list is parsed once per unit lifetime.
    #[must_use]
    pub fn new(config: HeatingConfig, broker: Arc<B>) -> Self {
        let modes = parse_modes(config.modes_config.as_deref());
        Self {
            config,
            broker,
            state: HeatingState::default(),
            modes,
        }
    }

    /// Snapshot of the current runtime state.
    #[must_use]
    pub fn state(&self) -> HeatingState {
        self.state
    }

    /// The parsed operating-mode list.
    #[must_use]
    pub fn modes(&self) -> &[HeatingModeEntry] {
        &self.modes
    }

    /// The unit's configuration.
    #[must_use]
    pub fn config(&self) -> &HeatingConfig {
        &self.config
    }

    /// Sends a setpoint increase pulse.
    pub async fn handle_increase(&self, edit_mode: bool) {
        self.pulse(&self.config.setpoint_increase_value, edit_mode)
            .await;
    }

    /// Sends a setpoint decrease pulse.
    pub async fn handle_decrease(&self, edit_mode: bool) {
        self.pulse(&self.config.setpoint_decrease_value, edit_mode)
            .await;
    }

    async fn pulse(&self, configured: &str, edit_mode: bool) {
        if edit_mode {
            return;
        }
        let Some(oid) = self.config.setpoint_shift_oid.as_deref() else {
            return;
        };
        let value = LooseValue::parse(configured);
        if let Err(error) = self.broker.set_value(oid, value.to_json()).await {
            tracing::warn!(oid = %oid, error = %error, "Setpoint shift write failed");
        }
    }

    /// Cycles to the next operating mode.
    ///
    /// The current index is found by matching `status_value` against the
    /// reported mode; when not found (or at the end) the cycle wraps to
    /// the first entry.
    pub async fn handle_mode_cycle(&self, edit_mode: bool) {
        if edit_mode {
            return;
        }
        let Some(oid) = self.config.mode_control_oid.as_deref() else {
            return;
        };
        let current_index = self.state.current_mode.and_then(|current| {
            self.modes
                .iter()
                .position(|m| (m.status_value - current).abs() < f64::EPSILON)
        });
        let next_index = match current_index {
            Some(index) => (index + 1) % self.modes.len(),
            None => 0,
        };
        let control_value = self.modes[next_index].control_value;
        if let Err(error) = self.broker.set_value(oid, Value::from(control_value)).await {
            tracing::warn!(oid = %oid, error = %error, "Mode cycle write failed");
        }
    }

    /// Activates a mode directly by its control value (dropdown and
    /// button-grid dialog styles).
    pub async fn handle_mode_select(&self, control_value: f64, edit_mode: bool) {
        if edit_mode {
            return;
        }
        let Some(oid) = self.config.mode_control_oid.as_deref() else {
            return;
        };
        if let Err(error) = self.broker.set_value(oid, Value::from(control_value)).await {
            tracing::warn!(oid = %oid, error = %error, "Mode select write failed");
        }
    }

    /// Formats a temperature: one decimal, `°C` when units are shown.
    #[must_use]
    pub fn format_temperature(&self, value: Option<f64>) -> String {
        let Some(value) = value else {
            return PLACEHOLDER.to_string();
        };
        if self.config.show_units {
            format!("{value:.1}°C")
        } else {
            format!("{value:.1}")
        }
    }

    /// Formats a valve position: rounded integer, `%` when units are
    /// shown.
    #[must_use]
    pub fn format_valve_position(&self, value: Option<f64>) -> String {
        let Some(value) = value else {
            return PLACEHOLDER.to_string();
        };
        let rounded = value.round();
        if self.config.show_units {
            format!("{}%", compact_number(rounded))
        } else {
            compact_number(rounded)
        }
    }

    /// Label of the active operating mode, with a `"Mode {n}"` fallback
    /// for unknown status values.
    #[must_use]
    pub fn current_mode_name(&self) -> String {
        let found = self.state.current_mode.and_then(|current| {
            self.modes
                .iter()
                .find(|m| (m.status_value - current).abs() < f64::EPSILON)
        });
        match found {
            Some(entry) if !entry.label.is_empty() => entry.label.clone(),
            _ => match self.state.current_mode {
                Some(current) => format!("Mode {}", compact_number(current)),
                None => "Mode unknown".to_string(),
            },
        }
    }
}

/// Fetches a numeric value, degrading every failure to `None`.
async fn fetch_number<B: BrokerClient>(broker: &B, oid: &str) -> Option<f64> {
    match broker.get_state(oid).await {
        Ok(Some(state)) => to_number(&state.val),
        Ok(None) => None,
        Err(error) => {
            tracing::warn!(oid = %oid, error = %error, "Heating initialization fetch failed");
            None
        }
    }
}

impl<B: BrokerClient> ModeLogic for HeatingLogic<B> {
    async fn initialize(&mut self) {
        if let Some(oid) = self.config.setpoint_oid.clone() {
            self.state.setpoint_value = fetch_number(&*self.broker, &oid).await;
        }
        if let Some(oid) = self.config.valve_position_oid.clone() {
            self.state.valve_value = fetch_number(&*self.broker, &oid).await;
        }
        if let Some(oid) = self.config.mode_status_oid.clone() {
            self.state.current_mode = fetch_number(&*self.broker, &oid).await;
        }
    }

    fn subscription_oids(&self) -> Vec<String> {
        [
            self.config.setpoint_oid.as_ref(),
            self.config.valve_position_oid.as_ref(),
            self.config.mode_status_oid.as_ref(),
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }

    fn handle_state_change(&mut self, oid: &str, value: &Value) {
        let number = to_number(value);
        if self.config.setpoint_oid.as_deref() == Some(oid) {
            self.state.setpoint_value = number;
        } else if self.config.valve_position_oid.as_deref() == Some(oid) {
            self.state.valve_value = number;
        } else if self.config.mode_status_oid.as_deref() == Some(oid) {
            self.state.current_mode = number;
        }
    }

    fn is_active(&self) -> bool {
        self.state.valve_value.is_some_and(|v| v > 0.0)
            || self.state.setpoint_value.is_some_and(|v| v > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;
    use serde_json::json;

    fn config() -> HeatingConfig {
        HeatingConfig {
            setpoint_shift_oid: Some("knx.shift".to_string()),
            setpoint_increase_value: "true".to_string(),
            setpoint_decrease_value: "false".to_string(),
            valve_position_oid: Some("knx.valve".to_string()),
            setpoint_oid: Some("knx.setpoint".to_string()),
            mode_status_oid: Some("knx.mode_status".to_string()),
            mode_control_oid: Some("knx.mode_control".to_string()),
            modes_config: None,
            show_units: true,
            control_style: HeatingControlStyle::Button,
        }
    }

    fn unit(broker: &Arc<MemoryBroker>) -> HeatingLogic<MemoryBroker> {
        HeatingLogic::new(config(), Arc::clone(broker))
    }

    #[test]
    fn parses_paired_mode_values() {
        let modes = parse_modes(Some(
            r#"[{"label": "Eco", "statusValue": 1, "controlValue": 10}]"#,
        ));
        assert_eq!(
            modes,
            vec![HeatingModeEntry {
                label: "Eco".to_string(),
                status_value: 1.0,
                control_value: 10.0,
            }]
        );
    }

    #[test]
    fn legacy_value_field_stands_in_for_both() {
        let modes = parse_modes(Some(r#"[{"label": "Comfort", "value": 7}]"#));
        assert_eq!(modes[0].status_value, 7.0);
        assert_eq!(modes[0].control_value, 7.0);
    }

    #[test]
    fn malformed_or_empty_config_falls_back_to_builtin_list() {
        for input in [None, Some("not json"), Some("[]"), Some("{}")] {
            let modes = parse_modes(input);
            assert_eq!(modes.len(), 4);
            assert_eq!(modes[0].label, "Komfort");
            assert_eq!(modes[0].status_value, 33.0);
            assert_eq!(modes[0].control_value, 1.0);
            assert_eq!(modes[3].label, "Frost");
        }
    }

    #[tokio::test]
    async fn mode_cycle_writes_next_control_value() {
        let broker = Arc::new(MemoryBroker::new());
        let mut heating = HeatingLogic::new(
            HeatingConfig {
                modes_config: Some(
                    r#"[{"statusValue": 1, "controlValue": 10},
                        {"statusValue": 2, "controlValue": 20}]"#
                        .to_string(),
                ),
                ..config()
            },
            Arc::clone(&broker),
        );

        heating.handle_state_change("knx.mode_status", &json!(1));
        heating.handle_mode_cycle(false).await;
        assert_eq!(
            broker.writes(),
            vec![("knx.mode_control".to_string(), json!(20.0))]
        );
    }

    #[tokio::test]
    async fn mode_cycle_wraps_and_handles_unknown_status() {
        let broker = Arc::new(MemoryBroker::new());
        let mut heating = HeatingLogic::new(
            HeatingConfig {
                modes_config: Some(
                    r#"[{"statusValue": 1, "controlValue": 10},
                        {"statusValue": 2, "controlValue": 20}]"#
                        .to_string(),
                ),
                ..config()
            },
            Arc::clone(&broker),
        );

        // At the last entry: wraps to the first.
        heating.handle_state_change("knx.mode_status", &json!(2));
        heating.handle_mode_cycle(false).await;
        assert_eq!(broker.writes()[0].1, json!(10.0));

        // Unknown status: starts from the first.
        heating.handle_state_change("knx.mode_status", &json!(99));
        heating.handle_mode_cycle(false).await;
        assert_eq!(broker.writes()[1].1, json!(10.0));
    }

    #[tokio::test]
    async fn mode_select_writes_directly() {
        let broker = Arc::new(MemoryBroker::new());
        let heating = unit(&broker);
        heating.handle_mode_select(3.0, false).await;
        assert_eq!(
            broker.writes(),
            vec![("knx.mode_control".to_string(), json!(3.0))]
        );
    }

    #[tokio::test]
    async fn setpoint_pulses_write_parsed_values() {
        let broker = Arc::new(MemoryBroker::new());
        let heating = unit(&broker);

        heating.handle_increase(false).await;
        heating.handle_decrease(false).await;
        assert_eq!(
            broker.writes(),
            vec![
                ("knx.shift".to_string(), json!(true)),
                ("knx.shift".to_string(), json!(false)),
            ]
        );
    }

    #[tokio::test]
    async fn edit_mode_suppresses_all_writes() {
        let broker = Arc::new(MemoryBroker::new());
        let heating = unit(&broker);

        heating.handle_increase(true).await;
        heating.handle_mode_cycle(true).await;
        heating.handle_mode_select(1.0, true).await;
        assert!(broker.writes().is_empty());
    }

    #[tokio::test]
    async fn initialize_pulls_all_three_oids() {
        let broker = Arc::new(
            MemoryBroker::new()
                .with_state("knx.setpoint", json!(21.5))
                .with_state("knx.valve", json!(40))
                .with_state("knx.mode_status", json!(33)),
        );
        let mut heating = unit(&broker);
        heating.initialize().await;

        let state = heating.state();
        assert_eq!(state.setpoint_value, Some(21.5));
        assert_eq!(state.valve_value, Some(40.0));
        assert_eq!(state.current_mode, Some(33.0));
        assert_eq!(heating.current_mode_name(), "Komfort");
    }

    #[test]
    fn formatting_with_and_without_units() {
        let broker = Arc::new(MemoryBroker::new());
        let heating = unit(&broker);
        assert_eq!(heating.format_temperature(Some(21.46)), "21.5°C");
        assert_eq!(heating.format_temperature(None), "--");
        assert_eq!(heating.format_valve_position(Some(39.6)), "40%");
        assert_eq!(heating.format_valve_position(None), "--");

        let plain = HeatingLogic::new(
            HeatingConfig {
                show_units: false,
                ..config()
            },
            broker,
        );
        assert_eq!(plain.format_temperature(Some(21.0)), "21.0");
        assert_eq!(plain.format_valve_position(Some(39.6)), "40");
    }

    #[tokio::test]
    async fn current_mode_name_falls_back_for_unknown_status() {
        let broker = Arc::new(MemoryBroker::new());
        let mut heating = unit(&broker);
        assert_eq!(heating.current_mode_name(), "Mode unknown");

        heating.handle_state_change("knx.mode_status", &json!(99));
        assert_eq!(heating.current_mode_name(), "Mode 99");
    }

    #[test]
    fn active_when_either_valve_or_setpoint_positive() {
        let broker = Arc::new(MemoryBroker::new());
        let mut heating = unit(&broker);
        assert!(!heating.is_active());

        heating.state.valve_value = Some(10.0);
        assert!(heating.is_active());

        heating.state = HeatingState {
            setpoint_value: Some(21.0),
            ..HeatingState::default()
        };
        assert!(heating.is_active());

        heating.state = HeatingState {
            setpoint_value: Some(0.0),
            valve_value: Some(0.0),
            current_mode: Some(33.0),
        };
        assert!(!heating.is_active());
    }
}
