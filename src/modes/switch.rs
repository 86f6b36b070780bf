// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch mode: on/off toggle with loosely-typed on/off values.
//!
//! The configured on/off values are strings and get parsed loosely, so a
//! switch can drive boolean, numeric, or string data points alike. The
//! on-state derives from loose equality with the parsed on-value only,
//! never from equality with the off-value.

use std::sync::Arc;

use serde_json::Value;

use crate::broker::BrokerClient;
use crate::config::WidgetConfig;
use crate::value::{LooseValue, loose_eq};

use super::ModeLogic;

/// Switch configuration, extracted from the widget configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchConfig {
    /// Controlled data point.
    pub control_oid: Option<String>,
    /// Configured "on" value (parsed loosely).
    pub on_value: String,
    /// Configured "off" value (parsed loosely).
    pub off_value: String,
}

impl SwitchConfig {
    /// Extracts the switch-relevant fields, applying defaults.
    #[must_use]
    pub fn from_widget(config: &WidgetConfig) -> Self {
        Self {
            control_oid: config.control_oid.clone(),
            on_value: config
                .switch_on_value
                .clone()
                .unwrap_or_else(|| "true".to_string()),
            off_value: config
                .switch_off_value
                .clone()
                .unwrap_or_else(|| "false".to_string()),
        }
    }
}

/// Switch runtime state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchState {
    /// Whether the broker value currently equals the configured on-value.
    pub is_on: bool,
}

/// Switch mode logic unit.
pub struct SwitchLogic<B> {
    config: SwitchConfig,
    broker: Arc<B>,
    state: SwitchState,
}

impl<B: BrokerClient> SwitchLogic<B> {
    /// Creates the unit.
    #[must_use]
    pub fn new(config: SwitchConfig, broker: Arc<B>) -> Self {
        Self {
            config,
            broker,
            state: SwitchState::default(),
        }
    }

    /// Snapshot of the current runtime state.
    #[must_use]
    pub fn state(&self) -> SwitchState {
        self.state
    }

    /// Whether a broker value counts as "on".
    #[must_use]
    pub fn check_is_on(&self, value: &Value) -> bool {
        loose_eq(value, &LooseValue::parse(&self.config.on_value))
    }

    /// Toggles the switch: writes the configured opposite of the current
    /// on-state. Local state is not touched; the broker push confirms.
    pub async fn toggle(&mut self, edit_mode: bool) {
        if edit_mode {
            return;
        }
        let Some(oid) = self.config.control_oid.as_deref() else {
            return;
        };
        let next = if self.state.is_on {
            LooseValue::parse(&self.config.off_value)
        } else {
            LooseValue::parse(&self.config.on_value)
        };
        if let Err(error) = self.broker.set_value(oid, next.to_json()).await {
            tracing::warn!(oid = %oid, error = %error, "Switch toggle write failed");
        }
    }
}

impl<B: BrokerClient> ModeLogic for SwitchLogic<B> {
    async fn initialize(&mut self) {
        let Some(oid) = self.config.control_oid.clone() else {
            return;
        };
        match self.broker.get_state(&oid).await {
            Ok(Some(state)) => {
                self.state.is_on = self.check_is_on(&state.val);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(oid = %oid, error = %error, "Switch initialization fetch failed");
            }
        }
    }

    fn subscription_oids(&self) -> Vec<String> {
        self.config.control_oid.iter().cloned().collect()
    }

    fn handle_state_change(&mut self, _oid: &str, value: &Value) {
        self.state.is_on = self.check_is_on(value);
    }

    fn is_active(&self) -> bool {
        self.state.is_on
    }
}
