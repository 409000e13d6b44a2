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

//! Attached device handle
//!
//! One [`Lm90Device`] exists per attached chip. All register traffic for a
//! chip goes through its handle, and every accessor holds the handle's lock
//! for the whole refresh-and-read (or write-and-mirror) sequence, so callers
//! on different threads never observe a half-updated snapshot.
//!
//! Reads are served from the cached snapshot while it is fresh. Writes go to
//! the chip first and are mirrored into the snapshot only after the bus
//! accepted them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::InitDefaults;
use crate::constants::registers;
use crate::data::{AlarmFlags, DeviceVariant, LimitUpdate, LocalTemperature, ProbeInfo, RemoteTemperature};
use crate::error::{BusError, Result};
use crate::hw::bus::{RegisterIo, SmbusBus};
use crate::hw::cache::{RefreshOutcome, RegisterSnapshot, SensorCache};
use crate::hw::codec::{
    clamp_hysteresis, decode_local, decode_remote, encode_local, encode_remote, split_bytes,
};
use crate::hw::init;

/// Handle to one attached LM90 family chip
pub struct Lm90Device<B: SmbusBus + ?Sized, C: Clock = SystemClock> {
    id: usize,
    address: u8,
    variant: DeviceVariant,
    bus: Arc<B>,
    clock: C,
    staleness_window: Duration,
    cache: Mutex<SensorCache>,
}

impl<B: SmbusBus + ?Sized> Lm90Device<B> {
    pub fn new(bus: Arc<B>, info: &ProbeInfo, staleness_window: Duration) -> Self {
        Self::with_clock(bus, info, staleness_window, SystemClock)
    }
}

impl<B: SmbusBus + ?Sized, C: Clock> Lm90Device<B, C> {
    pub fn with_clock(bus: Arc<B>, info: &ProbeInfo, staleness_window: Duration, clock: C) -> Self {
        Self {
            id: 0,
            address: info.address,
            variant: info.variant,
            bus,
            clock,
            staleness_window,
            cache: Mutex::new(SensorCache::new()),
        }
    }

    /// Assign the registry id
    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn variant(&self) -> DeviceVariant {
        self.variant
    }

    pub fn name(&self) -> &'static str {
        self.variant.type_name()
    }

    pub fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    fn io(&self) -> RegisterIo<'_, B> {
        RegisterIo::new(&*self.bus, self.address)
    }

    /// Program default limits and start conversions
    ///
    /// The snapshot is marked stale afterwards since the limits changed under it.
    pub fn initialize(&self, defaults: &InitDefaults) -> Result<()> {
        let mut cache = self.cache.lock();
        let result = init::initialize(&*self.bus, self.address, defaults);
        cache.mark_stale();
        result
    }

    /// Refresh the snapshot if it is stale
    pub fn refresh(&self) -> Result<RefreshOutcome> {
        self.refresh_at(self.clock.now())
    }

    /// Refresh the snapshot as if the current time were `now`
    pub fn refresh_at(&self, now: Instant) -> Result<RefreshOutcome> {
        let mut cache = self.cache.lock();
        Ok(cache.refresh(&self.io(), now, self.staleness_window)?)
    }

    /// Current snapshot without touching the bus, if one was ever read
    pub fn cached_snapshot(&self) -> Option<RegisterSnapshot> {
        let cache = self.cache.lock();
        cache.is_valid().then(|| *cache.snapshot())
    }

    /// Refresh if needed, then project the snapshot
    ///
    /// A failed refresh falls back to the previous snapshot when there is
    /// one. Only a device that was never read successfully reports the error.
    fn read_cached<T>(&self, project: impl FnOnce(&RegisterSnapshot) -> T) -> Result<T> {
        let now = self.clock.now();
        let mut cache = self.cache.lock();
        if let Err(err) = cache.refresh(&self.io(), now, self.staleness_window) {
            if !cache.is_valid() {
                return Err(err.into());
            }
            warn!(address = self.address, error = %err, "refresh failed, serving stale readings");
        }
        Ok(project(cache.snapshot()))
    }

    /// Write through to the chip, then mirror into the snapshot
    ///
    /// On a bus failure the chip may hold some of the new values, so the
    /// snapshot is marked stale and the next read goes to the chip. It stays
    /// valid as a fallback in case that read fails too.
    fn write_through(
        &self,
        write: impl FnOnce(&RegisterIo<'_, B>, &mut RegisterSnapshot) -> std::result::Result<(), BusError>,
    ) -> Result<()> {
        let mut cache = self.cache.lock();
        let mut staged = *cache.snapshot();
        match write(&self.io(), &mut staged) {
            Ok(()) => {
                *cache.snapshot_mut() = staged;
                Ok(())
            }
            Err(err) => {
                debug!(address = self.address, error = %err, "write failed, marking snapshot stale");
                cache.mark_stale();
                Err(err.into())
            }
        }
    }

    pub fn local_temp(&self) -> Result<LocalTemperature> {
        self.read_cached(|s| LocalTemperature {
            high: decode_local(s.local_high),
            low: decode_local(s.local_low),
            input: decode_local(s.local_temp),
        })
    }

    /// Update the local limits, whole degrees
    pub fn set_local_limits(&self, update: LimitUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        self.write_through(|io, snapshot| {
            if let Some(high) = update.high {
                let raw = encode_local(high);
                io.write(registers::LOCAL_HIGH_WRITE, raw)?;
                snapshot.local_high = raw;
            }
            if let Some(low) = update.low {
                let raw = encode_local(low);
                io.write(registers::LOCAL_LOW_WRITE, raw)?;
                snapshot.local_low = raw;
            }
            Ok(())
        })
    }

    pub fn remote_temp(&self) -> Result<RemoteTemperature> {
        self.read_cached(|s| RemoteTemperature {
            high: decode_remote(s.remote_high),
            low: decode_remote(s.remote_low),
            input: decode_remote(s.remote_temp),
        })
    }

    /// Update the remote limits, tenths of a degree
    pub fn set_remote_limits(&self, update: LimitUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        self.write_through(|io, snapshot| {
            if let Some(high) = update.high {
                let raw = encode_remote(high);
                let (msb, lsb) = split_bytes(raw);
                io.write(registers::REMOTE_HIGH_HIGH_WRITE, msb)?;
                io.write(registers::REMOTE_HIGH_LOW, lsb)?;
                snapshot.remote_high = raw;
            }
            if let Some(low) = update.low {
                let raw = encode_remote(low);
                let (msb, lsb) = split_bytes(raw);
                io.write(registers::REMOTE_LOW_HIGH_WRITE, msb)?;
                io.write(registers::REMOTE_LOW_LOW, lsb)?;
                snapshot.remote_low = raw;
            }
            Ok(())
        })
    }

    pub fn local_crit(&self) -> Result<i32> {
        self.read_cached(|s| decode_local(s.local_crit))
    }

    pub fn set_local_crit(&self, degrees: i32) -> Result<()> {
        self.write_through(|io, snapshot| {
            let raw = encode_local(degrees);
            io.write(registers::LOCAL_CRIT, raw)?;
            snapshot.local_crit = raw;
            Ok(())
        })
    }

    /// Remote critical limit, whole degrees
    pub fn remote_crit(&self) -> Result<i32> {
        self.read_cached(|s| decode_local(s.remote_crit))
    }

    pub fn set_remote_crit(&self, degrees: i32) -> Result<()> {
        self.write_through(|io, snapshot| {
            let raw = encode_local(degrees);
            io.write(registers::REMOTE_CRIT, raw)?;
            snapshot.remote_crit = raw;
            Ok(())
        })
    }

    /// Critical hysteresis, whole degrees
    pub fn hysteresis(&self) -> Result<i32> {
        self.read_cached(|s| i32::from(s.hyst))
    }

    /// Set the critical hysteresis, clamped to what the chip can hold
    pub fn set_hysteresis(&self, degrees: i32) -> Result<()> {
        self.write_through(|io, snapshot| {
            let raw = clamp_hysteresis(degrees);
            io.write(registers::TCRIT_HYST, raw)?;
            snapshot.hyst = raw;
            Ok(())
        })
    }

    pub fn alarms(&self) -> Result<AlarmFlags> {
        self.read_cached(|s| AlarmFlags::from_bits(s.alarms))
    }
}

impl<B: SmbusBus + ?Sized, C: Clock> std::fmt::Debug for Lm90Device<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lm90Device")
            .field("id", &self.id)
            .field("address", &format_args!("{:#04x}", self.address))
            .field("variant", &self.variant)
            .field("staleness_window", &self.staleness_window)
            .finish()
    }
}
