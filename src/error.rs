// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `flexicon` library.
//!
//! This module provides the error hierarchy for failures that can actually
//! surface from the widget core: broker transport problems and malformed
//! configuration blobs.
//!
//! Unavailable data is deliberately NOT an error. A missing OID, an
//! unconfigured field, or a broker that reports no value all degrade to
//! `None` / `"--"` placeholders at the call site; only genuine transport
//! failures travel through these types, and even those are logged and
//! swallowed inside the mode units rather than surfaced to the host.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while talking to the state broker.
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),

    /// Error occurred while parsing configuration data.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to broker communication.
///
/// These are transport-level failures: the subscription channel went away,
/// a fetch could not be delivered. They never indicate "no value"; that
/// case is `Ok(None)` on the read APIs.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The underlying transport failed.
    #[error("transport failed: {0}")]
    Transport(String),

    /// Internal channel to the broker task was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to parsing configuration-embedded JSON.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration blob had an unexpected shape.
    #[error("unexpected configuration shape: {0}")]
    UnexpectedShape(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
