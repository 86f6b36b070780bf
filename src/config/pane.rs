// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Window pane configuration for the window/shutter mode.

use serde::{Deserialize, Serialize};

/// How a pane's open/tilt state is encoded on the broker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensorMode {
    /// One binary OID: true = open, false = closed.
    #[default]
    OneOid,
    /// One numeric OID: `>= 2` open, `>= 1` tilted, else closed.
    OneOidWithTilt,
    /// Separate open and tilt OIDs, each coerced to bool. Open wins over
    /// tilt.
    TwoOids,
}

/// Which side a pane is hinged on. Only affects how the rendering surface
/// draws the pane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HingeSide {
    /// Hinged on the left edge.
    #[default]
    Left,
    /// Hinged on the right edge.
    Right,
    /// Hinged on the top edge (tilt-style pane).
    Top,
}

/// Configuration of a single window pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaneSpec {
    /// OID reporting the open state (also the single OID for the one-OID
    /// sensor modes).
    pub open_oid: Option<String>,
    /// OID reporting the tilt state (two-OID sensor mode only).
    pub tilt_oid: Option<String>,
    /// How the sensor values encode the pane state.
    pub sensor_mode: SensorMode,
    /// Hinge side, for rendering.
    pub hinge: HingeSide,
    /// Relative width weight of this pane. Must be positive; non-positive
    /// values fall back to 1.
    pub ratio: f64,
}

impl Default for PaneSpec {
    fn default() -> Self {
        Self {
            open_oid: None,
            tilt_oid: None,
            sensor_mode: SensorMode::default(),
            hinge: HingeSide::default(),
            ratio: 1.0,
        }
    }
}

impl PaneSpec {
    /// The pane's width weight, with non-positive values normalized to 1.
    #[must_use]
    pub fn effective_ratio(&self) -> f64 {
        if self.ratio > 0.0 { self.ratio } else { 1.0 }
    }
}
