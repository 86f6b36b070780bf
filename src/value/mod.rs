// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value utilities shared by the mode logic units.
//!
//! These are small, pure helpers: number formatting, loose parsing and
//! coercion of broker values, value→label mapping tables, and threshold
//! color classification.

mod format;
mod loose;
mod mapping;
mod threshold;

pub use format::{
    DecimalMode, DecimalSeparator, NumberFormat, PLACEHOLDER, ThousandSeparator, compact_number,
    format_number,
};
pub use loose::{LooseValue, loose_eq, to_bool, to_display_string, to_number};
pub use mapping::{ValueMapping, map_value};
pub use threshold::ColorThresholds;
