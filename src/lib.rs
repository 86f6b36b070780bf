// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Flexicon` Lib - a multi-mode dashboard control widget engine.
//!
//! This library implements the logic core of a "one icon to rule them
//! all" dashboard widget for state-broker based home automation: a single
//! widget shell whose behavior, configuration, and rendering output are
//! redefined by a selected operating mode.
//!
//! # Operating Modes
//!
//! - **Dimmer**: brightness slider with debounced writes and quick-set
//!   presets
//! - **Switch**: on/off toggle with loosely-typed on/off values
//! - **Heating**: setpoint shift pulses, valve display, operating-mode
//!   switching
//! - **Window & Shutter**: per-pane open/tilt states plus shutter
//!   position control
//! - **Numeric / String Display**: read-only formatted values with
//!   mapping tables and threshold coloring
//!
//! The rendering surface, broker transport, and host framework are
//! external collaborators: the widget consumes a [`broker::BrokerClient`]
//! and produces a [`widget::RenderProjection`] per render.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use flexicon_lib::broker::MemoryBroker;
//! use flexicon_lib::config::WidgetConfig;
//! use flexicon_lib::widget::FlexWidget;
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let broker = Arc::new(MemoryBroker::new().with_state("light.level", json!(40)));
//!
//!     let config = WidgetConfig::from_json(json!({
//!         "mode": "dimmer",
//!         "controlOid": "light.level",
//!         "showPercentage": true,
//!     }));
//!
//!     let mut widget = FlexWidget::new(config, broker);
//!     widget.initialize().await;
//!
//!     let projection = widget.projection();
//!     assert!(projection.is_active);
//!     assert_eq!(projection.bottom_text.as_deref(), Some("40%"));
//! }
//! ```
//!
//! # Error Philosophy
//!
//! This is a best-effort display system. Unavailable data renders as the
//! `"--"` placeholder, malformed configuration blobs fall back to
//! defaults, and transport failures are logged and swallowed. Nothing in
//! this crate is fatal to the host.

pub mod broker;
pub mod config;
pub mod error;
pub mod modes;
pub mod value;
pub mod widget;

pub use error::{BrokerError, ConfigError, Error, Result};
