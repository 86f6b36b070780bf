// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Widget configuration types.
//!
//! [`WidgetConfig`] is the flat, loosely-validated field set the host
//! passes in; [`PaneSpec`] describes one window pane for the
//! window/shutter mode.

mod pane;
mod widget_config;

pub use pane::{HingeSide, PaneSpec, SensorMode};
pub use widget_config::{
    ClickAction, HeatingControlStyle, IconPosition, TextTransform, WidgetConfig,
};
