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

//! Chip bring-up
//!
//! Every successfully probed chip is put into a known state before use:
//! limits and hysteresis set to the configured defaults, conversions
//! running at the configured rate. A failed write leaves the chip in an
//! unknown state, so it is reported as fatal for that device.

use tracing::{info, warn};

use crate::config::InitDefaults;
use crate::constants::{config1, registers};
use crate::error::{BusError, Lm90Error, Result};
use crate::hw::bus::{RegisterIo, SmbusBus};
use crate::hw::codec::{clamp_hysteresis, encode_local};

/// Write default limits and start continuous conversion
pub fn initialize<B: SmbusBus + ?Sized>(bus: &B, address: u8, defaults: &InitDefaults) -> Result<()> {
    let io = RegisterIo::new(bus, address);
    write_defaults(&io, defaults).map_err(|source| {
        warn!(address, error = %source, "chip initialization failed");
        Lm90Error::Init { address, source }
    })?;
    info!(address, "chip initialized");
    Ok(())
}

fn write_defaults<B: SmbusBus + ?Sized>(
    io: &RegisterIo<'_, B>,
    defaults: &InitDefaults,
) -> std::result::Result<(), BusError> {
    let high = encode_local(defaults.high);
    let low = encode_local(defaults.low);
    let crit = encode_local(defaults.crit);

    io.write(registers::LOCAL_HIGH_WRITE, high)?;
    io.write(registers::LOCAL_LOW_WRITE, low)?;
    io.write(registers::LOCAL_CRIT, crit)?;

    // Remote limits only get whole degrees, the fraction byte is cleared
    io.write(registers::REMOTE_HIGH_HIGH_WRITE, high)?;
    io.write(registers::REMOTE_HIGH_LOW, 0)?;
    io.write(registers::REMOTE_LOW_HIGH_WRITE, low)?;
    io.write(registers::REMOTE_LOW_LOW, 0)?;
    io.write(registers::REMOTE_CRIT, crit)?;

    io.write(registers::TCRIT_HYST, clamp_hysteresis(defaults.hyst))?;

    io.write(registers::CONVRATE_WRITE, defaults.conversion_rate)?;
    let config = io.read(registers::CONFIG1_READ)?;
    if config & config1::STANDBY != 0 {
        io.write(registers::CONFIG1_WRITE, config & !config1::STANDBY)?;
    }

    Ok(())
}
