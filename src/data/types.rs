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

//! Core data types for lm90mon
//!
//! Defines the values that cross the boundary between the driver core and its host.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::alarms;

/// Supported chip variants
///
/// Determined once when the device is probed and fixed for the lifetime of its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceVariant {
    Lm90,
    Adm1032,
}

impl DeviceVariant {
    /// Short type name, as used by sensor configuration files
    pub fn type_name(&self) -> &'static str {
        match self {
            DeviceVariant::Lm90 => "lm90",
            DeviceVariant::Adm1032 => "adm1032",
        }
    }

    /// Human readable client name
    pub fn client_name(&self) -> &'static str {
        match self {
            DeviceVariant::Lm90 => "LM90 chip",
            DeviceVariant::Adm1032 => "ADM1032 chip",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lm90" => Some(DeviceVariant::Lm90),
            "adm1032" => Some(DeviceVariant::Adm1032),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// How much of the identification sequence to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// Generic detection: register template gate, then vendor identification
    Detect,
    /// Address forced by the host: skip the gate, still identify the chip
    Identify,
    /// Variant forced by the host: accept it without touching the chip
    Force(DeviceVariant),
}

/// What a successful probe learned about the chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeInfo {
    pub address: u8,
    pub variant: DeviceVariant,
    pub config1: Option<u8>,
    pub conversion_rate: Option<u8>,
    pub manufacturer_id: Option<u8>,
    pub chip_id: Option<u8>,
}

/// Local sensor reading with its limits, whole degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalTemperature {
    pub high: i32,
    pub low: i32,
    pub input: i32,
}

/// Remote sensor reading with its limits, tenths of a degree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemoteTemperature {
    pub high: i32,
    pub low: i32,
    pub input: i32,
}

/// New high and/or low limit for a temperature channel
///
/// Either side may be left out to change only the other one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitUpdate {
    pub high: Option<i32>,
    pub low: Option<i32>,
}

impl LimitUpdate {
    pub fn high(value: i32) -> Self {
        Self { high: Some(value), low: None }
    }

    pub fn low(value: i32) -> Self {
        Self { high: None, low: Some(value) }
    }

    pub fn both(high: i32, low: i32) -> Self {
        Self { high: Some(high), low: Some(low) }
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_none() && self.low.is_none()
    }
}

/// Contents of the status register
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AlarmFlags(u8);

impl AlarmFlags {
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    const fn has(&self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub const fn local_high(&self) -> bool {
        self.has(alarms::LOCAL_HIGH)
    }

    pub const fn local_low(&self) -> bool {
        self.has(alarms::LOCAL_LOW)
    }

    pub const fn local_crit(&self) -> bool {
        self.has(alarms::LOCAL_CRIT)
    }

    pub const fn remote_high(&self) -> bool {
        self.has(alarms::REMOTE_HIGH)
    }

    pub const fn remote_low(&self) -> bool {
        self.has(alarms::REMOTE_LOW)
    }

    pub const fn remote_crit(&self) -> bool {
        self.has(alarms::REMOTE_CRIT)
    }

    /// Remote diode is disconnected
    pub const fn remote_open(&self) -> bool {
        self.has(alarms::REMOTE_OPEN)
    }
}

impl fmt::Display for AlarmFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
