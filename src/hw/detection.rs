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

//! Chip detection and identification
//!
//! Probing runs in up to three layers:
//!
//! 1. **Override**: a variant forced by the host is accepted as is.
//! 2. **Detection gate** (generic probing only): reserved CONFIG1 bits must
//!    read zero and the conversion rate must be in range. This rejects most
//!    foreign chips cheaply but does not prove anything.
//! 3. **Identification**: manufacturer and chip ID are matched against
//!    [`IDENTIFICATION_RULES`], evaluated in order; the first match wins.
//!
//! Scanning a bus normally fails at most addresses, so rejections are only
//! logged at debug level.

use tracing::{debug, trace};

use crate::constants::{detection, registers};
use crate::data::{DeviceVariant, ProbeInfo, ProbeMode};
use crate::error::{BusError, ProbeError};
use crate::hw::bus::{RegisterIo, SmbusBus};

/// Register values identification rules look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipSignature {
    pub manufacturer_id: u8,
    pub chip_id: u8,
    pub config1: u8,
    pub conversion_rate: u8,
    /// Only read for National Semiconductor parts
    pub config2: Option<u8>,
}

/// One entry of the identification table
pub struct IdentificationRule {
    pub name: &'static str,
    pub variant: DeviceVariant,
    pub matches: fn(&ChipSignature) -> bool,
}

/// Identification rules in precedence order
pub const IDENTIFICATION_RULES: &[IdentificationRule] = &[
    IdentificationRule {
        name: "National Semiconductor LM90",
        variant: DeviceVariant::Lm90,
        matches: is_lm90,
    },
    IdentificationRule {
        name: "Analog Devices ADM1032",
        variant: DeviceVariant::Adm1032,
        matches: is_adm1032,
    },
];

fn is_lm90(sig: &ChipSignature) -> bool {
    use detection::national::*;

    sig.manufacturer_id == MANUFACTURER_ID
        && (LM90_CHIP_ID_MIN..LM90_CHIP_ID_END).contains(&sig.chip_id)
        && sig
            .config2
            .map_or(false, |config2| config2 & CONFIG2_RESERVED_MASK == 0)
        && sig.conversion_rate <= LM90_CONVRATE_MAX
}

fn is_adm1032(sig: &ChipSignature) -> bool {
    use detection::analog_devices::*;

    sig.manufacturer_id == MANUFACTURER_ID
        && sig.chip_id & CHIP_ID_MASK == ADM1032_CHIP_ID
        && sig.config1 & CONFIG1_RESERVED_MASK == 0
}

/// Match a signature against [`IDENTIFICATION_RULES`]
pub fn identify(signature: &ChipSignature) -> Option<DeviceVariant> {
    IDENTIFICATION_RULES
        .iter()
        .find(|rule| (rule.matches)(signature))
        .map(|rule| {
            trace!(rule = rule.name, "identification rule matched");
            rule.variant
        })
}

/// Whether CONFIG1 and the conversion rate fit the register template of a supported chip
pub fn passes_detection_gate(config1: u8, conversion_rate: u8) -> bool {
    config1 & detection::CONFIG1_RESERVED_MASK == 0 && conversion_rate <= detection::CONVRATE_MAX
}

/// Determine whether a supported chip sits at `address`, and which one
///
/// On success the caller must construct a device handle and run
/// [`crate::hw::initialize`] before using any accessor.
pub fn probe<B: SmbusBus + ?Sized>(
    bus: &B,
    address: u8,
    mode: ProbeMode,
) -> Result<ProbeInfo, ProbeError> {
    if !bus.supports_byte_data() {
        debug!(address, "adapter lacks byte data support");
        return Err(ProbeError::BusUnavailable { address });
    }

    if let ProbeMode::Force(variant) = mode {
        debug!(address, %variant, "variant forced, skipping identification");
        return Ok(ProbeInfo {
            address,
            variant,
            config1: None,
            conversion_rate: None,
            manufacturer_id: None,
            chip_id: None,
        });
    }

    let io = RegisterIo::new(bus, address);
    let unsupported = |err: BusError| {
        trace!(address, error = %err, "no answer while probing");
        ProbeError::Unsupported { address }
    };

    let config1 = io.read(registers::CONFIG1_READ).map_err(unsupported)?;
    let conversion_rate = io.read(registers::CONVRATE_READ).map_err(unsupported)?;

    if mode == ProbeMode::Detect && !passes_detection_gate(config1, conversion_rate) {
        debug!(address, config1, conversion_rate, "detection failed");
        return Err(ProbeError::Unsupported { address });
    }

    let manufacturer_id = io.read(registers::MAN_ID).map_err(unsupported)?;
    let chip_id = io.read(registers::CHIP_ID).map_err(unsupported)?;
    let config2 = if manufacturer_id == detection::national::MANUFACTURER_ID {
        Some(io.read(registers::CONFIG2).map_err(unsupported)?)
    } else {
        None
    };

    let signature = ChipSignature {
        manufacturer_id,
        chip_id,
        config1,
        conversion_rate,
        config2,
    };

    match identify(&signature) {
        Some(variant) => {
            debug!(address, %variant, manufacturer_id, chip_id, "chip identified");
            Ok(ProbeInfo {
                address,
                variant,
                config1: Some(config1),
                conversion_rate: Some(conversion_rate),
                manufacturer_id: Some(manufacturer_id),
                chip_id: Some(chip_id),
            })
        }
        None => {
            debug!(address, manufacturer_id, chip_id, "unsupported chip");
            Err(ProbeError::Unsupported { address })
        }
    }
}
