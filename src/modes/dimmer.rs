// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimmer mode: brightness control with debounced slider writes.
//!
//! While the user drags the slider, the local value updates immediately
//! and a 300 ms single-slot debounce window opens; the write goes out when
//! the window fires, carrying the most recent value. Releasing the slider
//! commits immediately and cancels the window. Broker pushes arriving
//! while a window is open are dropped; the user's in-flight edit wins.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::broker::BrokerClient;
use crate::config::WidgetConfig;
use crate::value::to_number;

use super::ModeLogic;

/// Debounce window for live slider changes.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Dimmer configuration, extracted from the widget configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DimmerConfig {
    /// Controlled data point.
    pub control_oid: Option<String>,
    /// Lower bound of the value range.
    pub min: f64,
    /// Upper bound of the value range.
    pub max: f64,
    /// Slider step.
    pub step: f64,
    /// Whether the dialog offers quick-set buttons.
    pub show_quick_buttons: bool,
}

impl DimmerConfig {
    /// Extracts the dimmer-relevant fields, applying defaults.
    #[must_use]
    pub fn from_widget(config: &WidgetConfig) -> Self {
        Self {
            control_oid: config.control_oid.clone(),
            min: config.dimmer_min_value.unwrap_or(0.0),
            max: config.dimmer_max_value.unwrap_or(100.0),
            step: config.dimmer_step.unwrap_or(1.0),
            show_quick_buttons: config.dimmer_show_quick_buttons.unwrap_or(true),
        }
    }

    /// Clamps a value into the configured range.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if self.min <= self.max {
            value.clamp(self.min, self.max)
        } else {
            // Degenerate configuration; treat the bounds as swapped.
            value.clamp(self.max, self.min)
        }
    }
}

/// Dimmer runtime state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimmerState {
    /// Current local value, clamped to the configured range. Optimistic:
    /// reflects the user's in-flight edit before the broker confirms.
    pub local_value: f64,
    /// True while a debounce window is open.
    pub is_changing: bool,
}

impl Default for DimmerState {
    fn default() -> Self {
        Self {
            local_value: 0.0,
            is_changing: false,
        }
    }
}

/// Dimmer mode logic unit.
pub struct DimmerLogic<B> {
    config: DimmerConfig,
    broker: Arc<B>,
    state: Arc<Mutex<DimmerState>>,
    pending: Option<JoinHandle<()>>,
}

impl<B: BrokerClient> DimmerLogic<B> {
    /// Creates the unit. No broker traffic happens until
    /// [`ModeLogic::initialize`].
    #[must_use]
    pub fn new(config: DimmerConfig, broker: Arc<B>) -> Self {
        Self {
            config,
            broker,
            state: Arc::new(Mutex::new(DimmerState::default())),
            pending: None,
        }
    }

    /// Snapshot of the current runtime state.
    #[must_use]
    pub fn state(&self) -> DimmerState {
        *self.state.lock()
    }

    /// The unit's configuration.
    #[must_use]
    pub fn config(&self) -> &DimmerConfig {
        &self.config
    }

    /// Live slider change: update the local value and (re)start the
    /// debounce window. The write happens when the window fires, unless a
    /// newer change restarts it first.
    pub fn handle_live_change(&mut self, value: f64, edit_mode: bool) {
        let value = self.config.clamp(value);
        {
            let mut state = self.state.lock();
            state.local_value = value;
            state.is_changing = true;
        }

        self.abort_pending();
        let broker = Arc::clone(&self.broker);
        let state = Arc::clone(&self.state);
        let oid = self.config.control_oid.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;
            settle(&*broker, &state, oid.as_deref(), value, edit_mode).await;
        }));
    }

    /// Committed slider change (release): write immediately, cancelling
    /// any pending debounce window.
    pub async fn handle_commit(&mut self, value: f64, edit_mode: bool) {
        let value = self.config.clamp(value);
        self.abort_pending();
        self.state.lock().local_value = value;
        settle(
            &*self.broker,
            &self.state,
            self.config.control_oid.as_deref(),
            value,
            edit_mode,
        )
        .await;
    }

    /// Quick-set button: set and write immediately, no debounce.
    pub async fn handle_quick_set(&mut self, value: f64, edit_mode: bool) {
        let value = self.config.clamp(value);
        self.state.lock().local_value = value;
        if !edit_mode
            && let Some(oid) = self.config.control_oid.as_deref()
            && let Err(error) = self.broker.set_value(oid, Value::from(value)).await
        {
            tracing::warn!(oid = %oid, error = %error, "Dimmer quick-set write failed");
        }
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

/// Writes the settled value (outside edit mode) and closes the debounce
/// window.
async fn settle<B: BrokerClient>(
    broker: &B,
    state: &Mutex<DimmerState>,
    oid: Option<&str>,
    value: f64,
    edit_mode: bool,
) {
    if !edit_mode
        && let Some(oid) = oid
        && let Err(error) = broker.set_value(oid, Value::from(value)).await
    {
        tracing::warn!(oid = %oid, error = %error, "Dimmer write failed");
    }
    state.lock().is_changing = false;
}

impl<B: BrokerClient> ModeLogic for DimmerLogic<B> {
    async fn initialize(&mut self) {
        let Some(oid) = self.config.control_oid.clone() else {
            return;
        };
        match self.broker.get_state(&oid).await {
            Ok(Some(state)) => {
                let value = to_number(&state.val).unwrap_or(0.0);
                self.state.lock().local_value = self.config.clamp(value);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(oid = %oid, error = %error, "Dimmer initialization fetch failed");
            }
        }
    }

    fn subscription_oids(&self) -> Vec<String> {
        self.config.control_oid.iter().cloned().collect()
    }

    fn handle_state_change(&mut self, _oid: &str, value: &Value) {
        let mut state = self.state.lock();
        // A push during an open debounce window loses to the user's edit.
        if state.is_changing {
            return;
        }
        state.local_value = self.config.clamp(to_number(value).unwrap_or(0.0));
    }

    fn is_active(&self) -> bool {
        self.state.lock().local_value > 0.0
    }
}

impl<B> Drop for DimmerLogic<B> {
    fn drop(&mut self) {
        // No write may survive the unit.
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
