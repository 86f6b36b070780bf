// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Window/shutter mode: per-pane open/tilt states plus shutter position.
//!
//! The unit keeps its own cache of raw sensor values, keyed by OID. The
//! cache lives and dies with the unit: any configuration change rebuilds
//! the whole unit with a fresh cache rather than patching entries.
//!
//! Shutter positions are normalized to 0-100 on read (scale from the
//! configured min/max, then optionally invert) and denormalized with the
//! exact inverse transform on write.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::broker::BrokerClient;
use crate::config::{HingeSide, PaneSpec, SensorMode, WidgetConfig};
use crate::value::{PLACEHOLDER, to_bool, to_number};

use super::ModeLogic;

/// Window/shutter configuration, extracted from the widget configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowShutterConfig {
    /// OID holding the shutter position.
    pub position_oid: Option<String>,
    /// Dedicated "move up" OID.
    pub up_oid: Option<String>,
    /// Dedicated "move down" OID.
    pub down_oid: Option<String>,
    /// Dedicated "stop movement" OID.
    pub stop_oid: Option<String>,
    /// Whether the hardware reports 0 = down / 100 = up.
    pub invert: bool,
    /// Raw value corresponding to position 0.
    pub min: f64,
    /// Raw value corresponding to position 100.
    pub max: f64,
    /// Pane configurations, in rendering order.
    pub panes: Vec<PaneSpec>,
}

impl WindowShutterConfig {
    /// Extracts the window/shutter fields, applying defaults.
    #[must_use]
    pub fn from_widget(config: &WidgetConfig) -> Self {
        Self {
            position_oid: config.shutter_position_oid.clone(),
            up_oid: config.shutter_up_oid.clone(),
            down_oid: config.shutter_down_oid.clone(),
            stop_oid: config.shutter_stop_oid.clone(),
            invert: config.shutter_invert.unwrap_or(false),
            min: config.shutter_min.unwrap_or(0.0),
            max: config.shutter_max.unwrap_or(100.0),
            panes: config.panes.clone(),
        }
    }
}

/// Derived state of a single pane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaneState {
    /// Fully closed.
    #[default]
    Closed,
    /// Opened.
    Open,
    /// Tilted.
    Tilt,
}

/// One pane's derived state plus the geometry the renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneStatus {
    /// Derived open/tilt/closed state.
    pub state: PaneState,
    /// Relative width weight.
    pub ratio: f64,
    /// Hinge side.
    pub hinge: HingeSide,
}

/// Window/shutter runtime state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowShutterState {
    /// Normalized shutter position (0 = up, 100 = down), if known.
    pub shutter_position: Option<f64>,
    /// Per-pane states, one entry per configured pane.
    pub pane_states: Vec<PaneStatus>,
    /// Whether any pane is open.
    pub has_open_panes: bool,
    /// Whether any pane is tilted.
    pub has_tilted_panes: bool,
}

/// Window/shutter mode logic unit.
pub struct WindowShutterLogic<B> {
    config: WindowShutterConfig,
    broker: Arc<B>,
    /// Raw sensor values keyed by OID, exclusive to this unit instance.
    cache: HashMap<String, Value>,
    state: WindowShutterState,
}

impl<B: BrokerClient> WindowShutterLogic<B> {
    /// Creates the unit with an empty value cache.
    #[must_use]
    pub fn new(config: WindowShutterConfig, broker: Arc<B>) -> Self {
        Self {
            config,
            broker,
            cache: HashMap::new(),
            state: WindowShutterState::default(),
        }
    }

    /// Snapshot of the current runtime state.
    #[must_use]
    pub fn state(&self) -> &WindowShutterState {
        &self.state
    }

    /// The unit's configuration.
    #[must_use]
    pub fn config(&self) -> &WindowShutterConfig {
        &self.config
    }

    /// Normalizes a raw broker position to 0-100.
    #[must_use]
    pub fn normalize_position(&self, raw: f64) -> f64 {
        let range = self.config.max - self.config.min;
        if range <= 0.0 {
            // Degenerate bounds; nothing sensible to scale against.
            return 0.0;
        }
        let mut normalized = ((raw - self.config.min) / range) * 100.0;
        if self.config.invert {
            normalized = 100.0 - normalized;
        }
        normalized.clamp(0.0, 100.0)
    }

    /// Denormalizes a 0-100 position back to the raw broker value. Exact
    /// inverse of [`Self::normalize_position`].
    #[must_use]
    pub fn denormalize_position(&self, percent: f64) -> f64 {
        let mut value = percent.clamp(0.0, 100.0);
        if self.config.invert {
            value = 100.0 - value;
        }
        (value / 100.0) * (self.config.max - self.config.min) + self.config.min
    }

    /// Writes a user-chosen position (0-100) to the position OID.
    pub async fn set_position(&self, percent: f64, edit_mode: bool) {
        let Some(oid) = self.config.position_oid.as_deref() else {
            tracing::warn!("No shutter position OID configured, ignoring position request");
            return;
        };
        if edit_mode {
            return;
        }
        let raw = self.denormalize_position(percent);
        if let Err(error) = self.broker.set_value(oid, Value::from(raw)).await {
            tracing::warn!(oid = %oid, error = %error, "Shutter position write failed");
        }
    }

    /// Moves the shutter up: dedicated OID when configured, else position
    /// 100.
    pub async fn shutter_up(&self, edit_mode: bool) {
        if edit_mode {
            return;
        }
        if let Some(oid) = self.config.up_oid.as_deref() {
            if let Err(error) = self.broker.set_value(oid, Value::Bool(true)).await {
                tracing::warn!(oid = %oid, error = %error, "Shutter up write failed");
            }
        } else if self.config.position_oid.is_some() {
            self.set_position(100.0, edit_mode).await;
        }
    }

    /// Moves the shutter down: dedicated OID when configured, else
    /// position 0.
    pub async fn shutter_down(&self, edit_mode: bool) {
        if edit_mode {
            return;
        }
        if let Some(oid) = self.config.down_oid.as_deref() {
            if let Err(error) = self.broker.set_value(oid, Value::Bool(true)).await {
                tracing::warn!(oid = %oid, error = %error, "Shutter down write failed");
            }
        } else if self.config.position_oid.is_some() {
            self.set_position(0.0, edit_mode).await;
        }
    }

    /// Stops shutter movement. Only acts when a stop OID is configured.
    pub async fn shutter_stop(&self, edit_mode: bool) {
        if edit_mode {
            return;
        }
        let Some(oid) = self.config.stop_oid.as_deref() else {
            return;
        };
        if let Err(error) = self.broker.set_value(oid, Value::Bool(true)).await {
            tracing::warn!(oid = %oid, error = %error, "Shutter stop write failed");
        }
    }

    /// Formats the normalized position for display.
    #[must_use]
    pub fn format_position(&self, position: Option<f64>) -> String {
        match position {
            Some(position) => format!("{}%", position.round()),
            None => PLACEHOLDER.to_string(),
        }
    }

    /// Derives one pane's state from the cached sensor values.
    fn pane_state(&self, pane: &PaneSpec) -> PaneState {
        match pane.sensor_mode {
            SensorMode::TwoOids => {
                let open = pane
                    .open_oid
                    .as_ref()
                    .and_then(|oid| self.cache.get(oid))
                    .is_some_and(to_bool);
                let tilt = pane
                    .tilt_oid
                    .as_ref()
                    .and_then(|oid| self.cache.get(oid))
                    .is_some_and(to_bool);
                // Priority: open > tilt > closed.
                if open {
                    PaneState::Open
                } else if tilt {
                    PaneState::Tilt
                } else {
                    PaneState::Closed
                }
            }
            SensorMode::OneOidWithTilt => {
                let value = pane
                    .open_oid
                    .as_ref()
                    .and_then(|oid| self.cache.get(oid))
                    .and_then(to_number)
                    .unwrap_or(0.0);
                if value >= 2.0 {
                    PaneState::Open
                } else if value >= 1.0 {
                    PaneState::Tilt
                } else {
                    PaneState::Closed
                }
            }
            SensorMode::OneOid => {
                let open = pane
                    .open_oid
                    .as_ref()
                    .and_then(|oid| self.cache.get(oid))
                    .is_some_and(to_bool);
                if open { PaneState::Open } else { PaneState::Closed }
            }
        }
    }

    /// Recomputes every pane state and the OR-reductions over them.
    fn recompute_panes(&mut self) {
        let pane_states: Vec<PaneStatus> = self
            .config
            .panes
            .iter()
            .map(|pane| PaneStatus {
                state: self.pane_state(pane),
                ratio: pane.effective_ratio(),
                hinge: pane.hinge,
            })
            .collect();
        self.state.has_open_panes = pane_states.iter().any(|p| p.state == PaneState::Open);
        self.state.has_tilted_panes = pane_states.iter().any(|p| p.state == PaneState::Tilt);
        self.state.pane_states = pane_states;
    }
}

impl<B: BrokerClient> ModeLogic for WindowShutterLogic<B> {
    async fn initialize(&mut self) {
        if let Some(oid) = self.config.position_oid.clone() {
            match self.broker.get_state(&oid).await {
                Ok(Some(state)) => {
                    if let Some(raw) = to_number(&state.val) {
                        self.state.shutter_position = Some(self.normalize_position(raw));
                    }
                    self.cache.insert(oid, state.val);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(oid = %oid, error = %error, "Shutter position fetch failed");
                }
            }
        }

        let pane_oids: Vec<String> = self
            .config
            .panes
            .iter()
            .flat_map(|pane| [pane.open_oid.clone(), pane.tilt_oid.clone()])
            .flatten()
            .collect();
        for oid in pane_oids {
            match self.broker.get_state(&oid).await {
                Ok(Some(state)) => {
                    self.cache.insert(oid, state.val);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(oid = %oid, error = %error, "Pane sensor fetch failed");
                }
            }
        }

        // Pane states are derived even with no OIDs configured, so an
        // edit-mode preview reflects pane count/ratio/hinge immediately.
        self.recompute_panes();
    }

    fn subscription_oids(&self) -> Vec<String> {
        let mut oids: Vec<String> = self.config.position_oid.iter().cloned().collect();
        for pane in &self.config.panes {
            oids.extend(pane.open_oid.iter().cloned());
            oids.extend(pane.tilt_oid.iter().cloned());
        }
        oids
    }

    fn handle_state_change(&mut self, oid: &str, value: &Value) {
        self.cache.insert(oid.to_string(), value.clone());

        if self.config.position_oid.as_deref() == Some(oid) {
            self.state.shutter_position = to_number(value).map(|raw| self.normalize_position(raw));
        } else {
            // A pane sensor changed; recompute all pane states.
            self.recompute_panes();
        }
    }

    fn is_active(&self) -> bool {
        self.state.has_open_panes || self.state.has_tilted_panes
    }
}
