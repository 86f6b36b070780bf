// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The widget orchestrator and its render-facing contracts.
//!
//! [`FlexWidget`] drives the mode logic units; [`RenderProjection`] is
//! what the rendering surface paints; the dialog types encode the
//! interaction contracts of the shared modal dialog.

mod dialog;
mod orchestrator;
mod projection;

pub use dialog::{
    DialogContent, DialogView, DimmerDialog, HeatingDialog, QuickButton, WindowShutterDialog,
    quick_buttons, resolve_title,
};
pub use orchestrator::{ClickOutcome, FlexWidget};
pub use projection::{DEFAULT_TEXT_COLOR, DisplayLayout, RenderProjection, ShutterGraphic};
