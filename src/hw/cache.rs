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

//! Sensor cache
//!
//! Holds the last raw register snapshot of one chip and decides when it has
//! to be fetched again. A refresh reads every register into a local snapshot
//! and only commits it once all reads succeeded, so a failed refresh leaves
//! the previous snapshot and its validity untouched.
//!
//! # Remote temperature and torn reads
//!
//! The remote temperature spans two registers and the chip converts
//! autonomously, so a conversion can complete between the two reads. The
//! datasheet suggests one-shot mode (which stops monitoring) or polling the
//! busy bit (which cannot be read atomically with the data). Instead:
//!
//! 1. read the high byte, 2. read the low byte, 3. read the high byte again.
//! If both high bytes match, the pair is consistent. Otherwise a conversion
//! happened in between: re-read the low byte and pair it with the second
//! high byte.
//!
//! The second pair is not verified again, so a conversion landing between
//! steps 3 and the re-read can still tear the value. This window is tiny and
//! accepted.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::constants::registers;
use crate::error::BusError;
use crate::hw::bus::{RegisterIo, SmbusBus};
use crate::hw::codec::combine_bytes;

/// Raw register values as last read from (or written to) the chip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub local_temp: u8,
    pub local_high: u8,
    pub local_low: u8,
    pub local_crit: u8,
    /// High byte << 8 | low byte
    pub remote_temp: u16,
    pub remote_high: u16,
    pub remote_low: u16,
    /// 8-bit encoding, unlike the other remote values
    pub remote_crit: u8,
    pub hyst: u8,
    pub alarms: u8,
}

/// Whether a refresh touched the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Cached,
    Refreshed,
}

/// Per-device cache state
#[derive(Debug, Default)]
pub struct SensorCache {
    snapshot: RegisterSnapshot,
    valid: bool,
    last_refresh: Option<Instant>,
}

impl SensorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// False until the first successful refresh
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn snapshot(&self) -> &RegisterSnapshot {
        &self.snapshot
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    /// Whether the snapshot can be served at `now` without touching the bus
    ///
    /// A clock that appears to have gone backwards never counts as fresh.
    pub fn is_fresh(&self, now: Instant, window: Duration) -> bool {
        if !self.valid {
            return false;
        }
        self.last_refresh
            .and_then(|last| now.checked_duration_since(last))
            .map_or(false, |age| age <= window)
    }

    /// Fetch all registers unless the snapshot is still fresh
    pub(crate) fn refresh<B: SmbusBus + ?Sized>(
        &mut self,
        io: &RegisterIo<'_, B>,
        now: Instant,
        window: Duration,
    ) -> Result<RefreshOutcome, BusError> {
        if self.is_fresh(now, window) {
            return Ok(RefreshOutcome::Cached);
        }

        debug!("updating register snapshot");
        let snapshot = read_snapshot(io)?;

        self.snapshot = snapshot;
        self.valid = true;
        self.last_refresh = Some(now);
        Ok(RefreshOutcome::Refreshed)
    }

    /// Mutable access for write accessors mirroring a bus write
    pub(crate) fn snapshot_mut(&mut self) -> &mut RegisterSnapshot {
        &mut self.snapshot
    }

    /// Force the next read to go to the chip
    ///
    /// The snapshot stays valid, so it can still be served if that read fails.
    pub(crate) fn mark_stale(&mut self) {
        self.last_refresh = None;
    }
}

/// Read the remote temperature without mixing bytes of two conversions
pub(crate) fn read_remote_temp<B: SmbusBus + ?Sized>(
    io: &RegisterIo<'_, B>,
) -> Result<u16, BusError> {
    let old_high = io.read(registers::REMOTE_TEMP_HIGH)?;
    let mut low = io.read(registers::REMOTE_TEMP_LOW)?;
    let new_high = io.read(registers::REMOTE_TEMP_HIGH)?;

    if new_high != old_high {
        trace!(old_high, new_high, "conversion completed mid-read, re-reading low byte");
        low = io.read(registers::REMOTE_TEMP_LOW)?;
    }

    Ok(combine_bytes(new_high, low))
}

fn read_word<B: SmbusBus + ?Sized>(
    io: &RegisterIo<'_, B>,
    high_register: u8,
    low_register: u8,
) -> Result<u16, BusError> {
    let high = io.read(high_register)?;
    let low = io.read(low_register)?;
    Ok(combine_bytes(high, low))
}

fn read_snapshot<B: SmbusBus + ?Sized>(io: &RegisterIo<'_, B>) -> Result<RegisterSnapshot, BusError> {
    let local_temp = io.read(registers::LOCAL_TEMP)?;
    let local_high = io.read(registers::LOCAL_HIGH_READ)?;
    let local_low = io.read(registers::LOCAL_LOW_READ)?;
    let local_crit = io.read(registers::LOCAL_CRIT)?;

    let remote_temp = read_remote_temp(io)?;
    let remote_high = read_word(io, registers::REMOTE_HIGH_HIGH_READ, registers::REMOTE_HIGH_LOW)?;
    let remote_low = read_word(io, registers::REMOTE_LOW_HIGH_READ, registers::REMOTE_LOW_LOW)?;
    let remote_crit = io.read(registers::REMOTE_CRIT)?;

    let hyst = io.read(registers::TCRIT_HYST)?;
    let alarms = io.read(registers::STATUS)?;

    Ok(RegisterSnapshot {
        local_temp,
        local_high,
        local_low,
        local_crit,
        remote_temp,
        remote_high,
        remote_low,
        remote_crit,
        hyst,
        alarms,
    })
}
