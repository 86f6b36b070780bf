// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared dialog shell: title resolution and per-mode content payloads.
//!
//! The dialog itself is a host concern (it must stay within the visible
//! viewport, however the host achieves that). The core contributes the
//! resolved title and a structured content payload encoding the
//! interaction contract: slider bounds and quick-set values for the
//! dimmer, mode entries and control style for heating, pane states and
//! available movement commands for the shutter.

use crate::config::HeatingControlStyle;
use crate::modes::{HeatingModeEntry, Mode, PaneStatus};

/// A resolved dialog, title plus mode-specific content.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogView {
    /// Resolved title (configured title → OID display name → mode label).
    pub title: String,
    /// Mode-specific body payload.
    pub content: DialogContent,
}

/// Mode-specific dialog body.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogContent {
    /// Slider plus quick-set buttons.
    Dimmer(DimmerDialog),
    /// Setpoint shift buttons plus operating-mode selection.
    Heating(HeatingDialog),
    /// Position slider plus up/stop/down movement buttons.
    WindowShutter(WindowShutterDialog),
}

/// One quick-set preset of the dimmer dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickButton {
    /// Button label (`Off`, `20%`, ...).
    pub label: String,
    /// Value to quick-set, already scaled into the configured range.
    pub value: f64,
}

/// Dimmer dialog payload.
///
/// Slider changes are live (debounced) until committed; quick-set buttons
/// write immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct DimmerDialog {
    /// Current local value.
    pub value: f64,
    /// Slider lower bound.
    pub min: f64,
    /// Slider upper bound.
    pub max: f64,
    /// Slider step.
    pub step: f64,
    /// Quick-set presets; empty when disabled.
    pub quick_buttons: Vec<QuickButton>,
}

/// Heating dialog payload.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatingDialog {
    /// Formatted setpoint temperature.
    pub setpoint_text: String,
    /// Formatted valve position.
    pub valve_text: String,
    /// Label of the active operating mode.
    pub current_mode_name: String,
    /// Selectable operating modes, in configured order.
    pub modes: Vec<HeatingModeEntry>,
    /// How the mode selection is presented.
    pub control_style: HeatingControlStyle,
}

/// Window/shutter dialog payload.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowShutterDialog {
    /// Pane states, in rendering order.
    pub panes: Vec<PaneStatus>,
    /// Normalized shutter position; 0 when unknown.
    pub position: f64,
    /// Formatted position text.
    pub position_text: String,
    /// Whether an up command is available (dedicated OID or position
    /// fallback).
    pub can_move_up: bool,
    /// Whether a down command is available.
    pub can_move_down: bool,
    /// Whether a stop command is available (dedicated OID only).
    pub can_stop: bool,
}

/// Fractions of the configured range offered as quick-set presets.
const QUICK_FRACTIONS: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Builds the quick-set preset table for a dimmer range.
///
/// The first preset is `Off` at the range minimum; the rest are 20%
/// increments scaled into the range.
#[must_use]
pub fn quick_buttons(min: f64, max: f64) -> Vec<QuickButton> {
    let range = max - min;
    QUICK_FRACTIONS
        .iter()
        .map(|fraction| QuickButton {
            label: if *fraction == 0.0 {
                "Off".to_string()
            } else {
                format!("{}%", (fraction * 100.0).round())
            },
            value: fraction.mul_add(range, min),
        })
        .collect()
}

/// Resolves the dialog title.
///
/// Priority: explicitly configured title → fetched display name of the
/// mode's primary OID → the mode's default label → `"Control"`.
#[must_use]
pub fn resolve_title(configured: Option<&str>, oid_name: Option<&str>, mode: Mode) -> String {
    if let Some(title) = configured.filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    if let Some(name) = oid_name.filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    let label = mode.label();
    if label.is_empty() {
        "Control".to_string()
    } else {
        label.to_string()
    }
}
