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

//! Driver configuration
//!
//! Tunables that the host may load from a JSON file. Every field has a
//! default, so an empty object (or a missing file) yields the stock
//! behaviour: probe 0x4c, 2 s staleness window, 5/70/85/10 degree limits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants::{addresses, defaults, detection, encoding, timing};
use crate::data::{DeviceVariant, ProbeMode};
use crate::error::{Lm90Error, Result};

/// Values written by the initialization routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitDefaults {
    /// Low limit, whole degrees
    pub low: i32,
    /// High limit, whole degrees
    pub high: i32,
    /// Critical limit, whole degrees
    pub crit: i32,
    /// Critical hysteresis, whole degrees
    pub hyst: i32,
    /// Conversion rate register code
    pub conversion_rate: u8,
}

impl Default for InitDefaults {
    fn default() -> Self {
        Self {
            low: defaults::LOW,
            high: defaults::HIGH,
            crit: defaults::CRIT,
            hyst: defaults::HYST,
            conversion_rate: defaults::CONVERSION_RATE,
        }
    }
}

/// An address the host wants probed regardless of the detection template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForcedDevice {
    pub address: u8,
    /// Skip identification too and assume this variant
    #[serde(default)]
    pub variant: Option<DeviceVariant>,
}

impl ForcedDevice {
    pub fn probe_mode(&self) -> ProbeMode {
        match self.variant {
            Some(variant) => ProbeMode::Force(variant),
            None => ProbeMode::Identify,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Maximum snapshot age before a read goes back to the chip
    pub staleness_window_ms: u64,
    /// Addresses probed with generic detection
    pub candidate_addresses: Vec<u8>,
    /// Addresses probed with a forced mode
    pub forced: Vec<ForcedDevice>,
    /// Candidate addresses to leave alone. Forced entries still apply.
    pub ignored_addresses: Vec<u8>,
    pub init: InitDefaults,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            staleness_window_ms: timing::STALENESS_WINDOW_MS,
            candidate_addresses: addresses::NORMAL.to_vec(),
            forced: Vec::new(),
            ignored_addresses: Vec::new(),
            init: InitDefaults::default(),
        }
    }
}

impl DriverConfig {
    pub fn staleness_window(&self) -> Duration {
        Duration::from_millis(self.staleness_window_ms)
    }

    /// Addresses to probe and how, in ascending address order
    pub fn probe_plan(&self) -> Vec<(u8, ProbeMode)> {
        let mut plan: BTreeMap<u8, ProbeMode> = self
            .candidate_addresses
            .iter()
            .copied()
            .filter(|address| !self.ignored_addresses.contains(address))
            .map(|address| (address, ProbeMode::Detect))
            .collect();

        for forced in &self.forced {
            plan.insert(forced.address, forced.probe_mode());
        }

        plan.into_iter().collect()
    }
}

fn check_address(field: &str, address: u8) -> Result<()> {
    if address > addresses::MAX_7BIT {
        return Err(Lm90Error::config(format!(
            "{} contains {:#04x}, which is not a 7-bit address",
            field, address
        )));
    }
    Ok(())
}

fn check_degrees(field: &str, value: i32) -> Result<()> {
    if !(i8::MIN as i32..=i8::MAX as i32).contains(&value) {
        return Err(Lm90Error::config(format!(
            "init.{} = {} does not fit the 8-bit limit registers",
            field, value
        )));
    }
    Ok(())
}

/// Check a configuration for values the chip cannot hold
pub fn validate_config(cfg: &DriverConfig) -> Result<()> {
    if cfg.staleness_window_ms == 0 {
        return Err(Lm90Error::config("staleness_window_ms must be greater than zero"));
    }

    for &address in &cfg.candidate_addresses {
        check_address("candidate_addresses", address)?;
    }
    for &address in &cfg.ignored_addresses {
        check_address("ignored_addresses", address)?;
    }
    for (i, forced) in cfg.forced.iter().enumerate() {
        check_address("forced", forced.address)?;
        if cfg.forced[..i].iter().any(|f| f.address == forced.address) {
            return Err(Lm90Error::config(format!(
                "address {:#04x} is forced more than once",
                forced.address
            )));
        }
    }

    check_degrees("low", cfg.init.low)?;
    check_degrees("high", cfg.init.high)?;
    check_degrees("crit", cfg.init.crit)?;
    if !(0..=encoding::HYSTERESIS_MAX).contains(&cfg.init.hyst) {
        return Err(Lm90Error::config(format!(
            "init.hyst = {} is outside 0..={}",
            cfg.init.hyst,
            encoding::HYSTERESIS_MAX
        )));
    }
    if cfg.init.conversion_rate > detection::CONVRATE_MAX {
        return Err(Lm90Error::config(format!(
            "init.conversion_rate = {} exceeds {}",
            cfg.init.conversion_rate,
            detection::CONVRATE_MAX
        )));
    }

    Ok(())
}

/// Load and validate a configuration file
///
/// A missing file is not an error: the defaults are returned instead.
pub fn load_config(path: &Path) -> Result<DriverConfig> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(DriverConfig::default());
        }
        Err(source) => {
            return Err(Lm90Error::ConfigRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let cfg: DriverConfig = serde_json::from_str(&data)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Write a configuration file as pretty JSON
pub fn save_config(path: &Path, cfg: &DriverConfig) -> Result<()> {
    validate_config(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Lm90Error::ConfigWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json).map_err(|source| Lm90Error::ConfigWrite {
        path: path.to_path_buf(),
        source,
    })
}
