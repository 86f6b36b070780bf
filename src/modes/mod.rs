// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mode logic units.
//!
//! Each operating mode owns its configuration shape, derived state,
//! subscription list, initialization, broker-push handling, user actions,
//! and activity predicate. The orchestrator constructs one unit per mode
//! and drives only the one matching the configured [`Mode`] tag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod dimmer;
mod heating;
mod numeric_display;
mod string_display;
mod switch;
mod window_shutter;

pub use dimmer::{DEBOUNCE, DimmerConfig, DimmerLogic, DimmerState};
pub use heating::{HeatingConfig, HeatingLogic, HeatingModeEntry, HeatingState};
pub use numeric_display::{NumericDisplayConfig, NumericDisplayLogic, NumericDisplayState};
pub use string_display::{StringDisplayConfig, StringDisplayLogic, StringDisplayState};
pub use switch::{SwitchConfig, SwitchLogic, SwitchState};
pub use window_shutter::{
    PaneState, PaneStatus, WindowShutterConfig, WindowShutterLogic, WindowShutterState,
};

/// The operating mode of a widget instance.
///
/// Exactly one mode is active at a time; switching modes discards the
/// prior mode's runtime state and reinitializes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Brightness control with a slider dialog.
    #[default]
    Dimmer,
    /// On/off toggle, no dialog.
    Switch,
    /// Heating control: setpoint shift, valve display, operating modes.
    Heating,
    /// Window pane states plus shutter position control.
    WindowShutter,
    /// Read-only formatted number.
    NumericDisplay,
    /// Read-only transformed text.
    StringDisplay,
}

impl Mode {
    /// All modes, in registry order.
    pub const ALL: [Self; 6] = [
        Self::Dimmer,
        Self::Switch,
        Self::Heating,
        Self::WindowShutter,
        Self::NumericDisplay,
        Self::StringDisplay,
    ];

    /// Default human-readable label, used as the last dialog-title
    /// fallback before the literal `"Control"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dimmer => "Dimmer",
            Self::Switch => "Switch",
            Self::Heating => "Heating",
            Self::WindowShutter => "Window & Shutter",
            Self::NumericDisplay => "Numeric Display",
            Self::StringDisplay => "String Display",
        }
    }

    /// Whether clicking the widget opens the shared dialog.
    #[must_use]
    pub const fn has_dialog(self) -> bool {
        matches!(self, Self::Dimmer | Self::Heating | Self::WindowShutter)
    }

    /// Whether the mode exposes a percentage-style value.
    #[must_use]
    pub const fn has_percentage(self) -> bool {
        matches!(self, Self::Dimmer | Self::WindowShutter)
    }
}

/// The contract every mode logic unit implements.
///
/// Mode-specific user actions (toggle, quick-set, movement commands) are
/// inherent methods on the unit types; this trait covers the lifecycle the
/// orchestrator drives uniformly.
pub trait ModeLogic {
    /// Pulls the current broker values for all configured OIDs.
    ///
    /// Never fails: a missing value leaves the field at its default, and
    /// transport errors are logged and swallowed.
    fn initialize(&mut self) -> impl Future<Output = ()> + Send;

    /// The OIDs the orchestrator must live-subscribe to for this unit.
    fn subscription_oids(&self) -> Vec<String>;

    /// Applies a broker push for a subscribed OID.
    fn handle_state_change(&mut self, oid: &str, value: &Value);

    /// Whether the widget should render in its highlighted state.
    fn is_active(&self) -> bool;
}
