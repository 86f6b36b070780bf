// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State-broker access.
//!
//! [`BrokerClient`] is the contract to the external device/state broker;
//! [`MemoryBroker`] is the in-memory implementation used by the test suite
//! and for host bring-up.

mod client;
mod memory;

pub use client::{BrokerClient, ObjectInfo, ObjectName, OidState};
pub use memory::MemoryBroker;
