// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Render projection: everything the rendering surface needs, computed
//! per render and never stored.

use crate::config::IconPosition;
use crate::modes::PaneStatus;

use super::dialog::DialogView;

/// Default value text color for display modes when neither a threshold
/// color nor a configured color applies.
pub const DEFAULT_TEXT_COLOR: &str = "#555555";

/// The derived values the rendering surface paints.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProjection {
    /// Whether the widget renders highlighted.
    pub is_active: bool,
    /// Icon to render (inactive variant already selected).
    pub icon: String,
    /// Icon color for the current activity state.
    pub icon_color: String,
    /// Status text above the icon (heating setpoint).
    pub top_text: Option<String>,
    /// Status text below the icon (heating valve, dimmer percentage,
    /// switch status text).
    pub bottom_text: Option<String>,
    /// Value layout for the display modes.
    pub display: Option<DisplayLayout>,
    /// Multi-pane window graphic data for the window/shutter mode.
    pub shutter: Option<ShutterGraphic>,
    /// Whether the shared dialog is open.
    pub dialog_open: bool,
    /// Resolved dialog content, present while open for dialog modes.
    pub dialog: Option<DialogView>,
}

/// Value placement and coloring for the display modes.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLayout {
    /// Fully formatted value string.
    pub value: String,
    /// Icon placement relative to the value.
    pub icon_position: IconPosition,
    /// Value text color (threshold color, configured color, or the
    /// default).
    pub color: String,
}

/// Data for the window/shutter graphic.
#[derive(Debug, Clone, PartialEq)]
pub struct ShutterGraphic {
    /// Pane states in rendering order.
    pub panes: Vec<PaneStatus>,
    /// Fraction of the window the shutter covers (0 = fully up, 1 =
    /// fully down; 0 while unknown).
    pub coverage: f64,
}
