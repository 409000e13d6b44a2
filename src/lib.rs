/*
 * This file is part of lm90mon.
 *
 * Copyright (C) 2025 lm90mon contributors
 *
 * lm90mon is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * lm90mon is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with lm90mon. If not, see <https://www.gnu.org/licenses/>.
 */

//! lm90mon - Monitoring core for LM90 and ADM1032 temperature sensors
//!
//! Detects the chips on an SMBus segment, brings them into a known state and
//! exposes their local and remote temperature channels, limits and alarm
//! status through a small cached register model.
//!
//! # Module Structure
//!
//! - `hw/` - Register codec, probing, initialization, cache and device handle
//! - `data/` - Values exchanged with the host
//! - `registry` - Attached devices per bus
//! - `channels` / `display` - Named channel table and its text form
//!
//! The byte transport is supplied by the host through [`SmbusBus`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lm90mon::{DeviceRegistry, DriverConfig, SmbusBus};
//!
//! fn attach_all<B: SmbusBus>(bus: Arc<B>) {
//!     let registry = DeviceRegistry::new();
//!     for device in registry.scan(&bus, &DriverConfig::default()) {
//!         if let Ok(remote) = device.remote_temp() {
//!             println!("{}: {}", device.name(), remote.input);
//!         }
//!     }
//! }
//! ```

// Grouped modules
pub mod data;
pub mod hw;

// Standalone modules
pub mod channels;
pub mod clock;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod registry;

#[cfg(test)]
pub mod test_utils;

pub use channels::Channel;
pub use clock::{Clock, SystemClock};
pub use config::{load_config, save_config, validate_config, DriverConfig, ForcedDevice, InitDefaults};
pub use data::{
    AlarmFlags, DeviceVariant, LimitUpdate, LocalTemperature, ProbeInfo, ProbeMode,
    RemoteTemperature,
};
pub use display::{format_channel_values, parse_channel_values};
pub use error::{BusError, Lm90Error, ProbeError, Result};
pub use hw::{initialize, probe, Lm90Device, RefreshOutcome, RegisterSnapshot, SmbusBus};
pub use registry::DeviceRegistry;
