// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Numeric display mode: read-only formatted number.
//!
//! A configured mapping table takes precedence over numeric formatting:
//! when the raw value matches a key, the mapped label is used verbatim
//! (prefix/suffix still apply, the unit does not). Never writes.

use std::sync::Arc;

use serde_json::Value;

use crate::broker::BrokerClient;
use crate::config::WidgetConfig;
use crate::value::{
    ColorThresholds, NumberFormat, PLACEHOLDER, ValueMapping, compact_number, format_number,
    to_number,
};

use super::ModeLogic;

/// Numeric display configuration, extracted from the widget
/// configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericDisplayConfig {
    /// Displayed data point.
    pub value_oid: Option<String>,
    /// Number format (unit kept separate; see [`Self::unit`]).
    pub format: NumberFormat,
    /// Unit appended after the suffix on the formatting path.
    pub unit: String,
    /// Prefix prepended to the rendered value.
    pub prefix: String,
    /// Suffix appended to the rendered value.
    pub suffix: String,
    /// Threshold color classification.
    pub thresholds: ColorThresholds,
    /// Optional value→label table; takes precedence over formatting.
    pub mapping: Option<ValueMapping>,
}

impl NumericDisplayConfig {
    /// Extracts the numeric-display fields, applying defaults.
    #[must_use]
    pub fn from_widget(config: &WidgetConfig) -> Self {
        // Decimal counts beyond two digits are not meaningful for a
        // dashboard; the cast is safe after the clamp.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let decimals = config
            .numeric_display_decimals
            .unwrap_or(0.0)
            .clamp(0.0, 10.0) as u8;

        let defaults = ColorThresholds::default();
        Self {
            value_oid: config.numeric_display_value_oid.clone(),
            format: NumberFormat {
                decimals,
                decimal_mode: config.numeric_display_decimal_mode.unwrap_or_default(),
                decimal_separator: config.numeric_display_decimal_separator.unwrap_or_default(),
                thousand_separator: config
                    .numeric_display_thousand_separator
                    .unwrap_or_default(),
                // The unit is appended after the suffix, not by the
                // number formatter.
                unit: String::new(),
            },
            unit: config.numeric_display_unit.clone().unwrap_or_default(),
            prefix: config.numeric_display_prefix.clone().unwrap_or_default(),
            suffix: config.numeric_display_suffix.clone().unwrap_or_default(),
            thresholds: ColorThresholds {
                enabled: config.numeric_display_use_color_thresholds.unwrap_or(false),
                threshold_low: config
                    .numeric_display_threshold_low
                    .unwrap_or(defaults.threshold_low),
                threshold_high: config
                    .numeric_display_threshold_high
                    .unwrap_or(defaults.threshold_high),
                color_low: config
                    .numeric_display_color_low
                    .clone()
                    .unwrap_or(defaults.color_low),
                color_medium: config
                    .numeric_display_color_medium
                    .clone()
                    .unwrap_or(defaults.color_medium),
                color_high: config
                    .numeric_display_color_high
                    .clone()
                    .unwrap_or(defaults.color_high),
            },
            mapping: ValueMapping::parse(config.numeric_display_value_mapping.as_deref()),
        }
    }
}

/// Numeric display runtime state.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericDisplayState {
    /// Last coerced value, if numeric.
    pub value: Option<f64>,
    /// Fully rendered display string.
    pub formatted_value: String,
    /// Threshold color; empty = inherit the default text color.
    pub current_color: String,
}

impl Default for NumericDisplayState {
    fn default() -> Self {
        Self {
            value: None,
            formatted_value: PLACEHOLDER.to_string(),
            current_color: String::new(),
        }
    }
}

/// Numeric display logic unit. Read-only: never writes to the broker.
pub struct NumericDisplayLogic<B> {
    config: NumericDisplayConfig,
    broker: Arc<B>,
    state: NumericDisplayState,
}

impl<B: BrokerClient> NumericDisplayLogic<B> {
    /// Creates the unit.
    #[must_use]
    pub fn new(config: NumericDisplayConfig, broker: Arc<B>) -> Self {
        Self {
            config,
            broker,
            state: NumericDisplayState::default(),
        }
    }

    /// Snapshot of the current runtime state.
    #[must_use]
    pub fn state(&self) -> &NumericDisplayState {
        &self.state
    }

    fn update_value(&mut self, raw: &Value) {
        let Some(value) = to_number(raw) else {
            self.state = NumericDisplayState::default();
            return;
        };

        let color = self
            .config
            .thresholds
            .color_for(Some(value))
            .unwrap_or_default()
            .to_string();

        let mapped = self
            .config
            .mapping
            .as_ref()
            .and_then(|mapping| mapping.lookup(&compact_number(value)));

        let formatted_value = match mapped {
            // Mapped labels bypass formatting and carry no unit.
            Some(label) => format!("{}{}{}", self.config.prefix, label, self.config.suffix),
            None => {
                let body = format_number(Some(value), &self.config.format);
                let mut rendered =
                    format!("{}{}{}", self.config.prefix, body, self.config.suffix);
                if !self.config.unit.is_empty() {
                    rendered.push(' ');
                    rendered.push_str(&self.config.unit);
                }
                rendered
            }
        };

        self.state = NumericDisplayState {
            value: Some(value),
            formatted_value,
            current_color: color,
        };
    }
}

impl<B: BrokerClient> ModeLogic for NumericDisplayLogic<B> {
    async fn initialize(&mut self) {
        let Some(oid) = self.config.value_oid.clone() else {
            self.state = NumericDisplayState::default();
            return;
        };
        match self.broker.get_state(&oid).await {
            Ok(Some(state)) => self.update_value(&state.val),
            Ok(None) => self.state = NumericDisplayState::default(),
            Err(error) => {
                tracing::warn!(oid = %oid, error = %error, "Numeric display fetch failed");
                self.state = NumericDisplayState::default();
            }
        }
    }

    fn subscription_oids(&self) -> Vec<String> {
        self.config.value_oid.iter().cloned().collect()
    }

    fn handle_state_change(&mut self, _oid: &str, value: &Value) {
        self.update_value(value);
    }

    /// Display modes never highlight.
    fn is_active(&self) -> bool {
        false
    }
}
