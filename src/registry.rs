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

//! Attached device registry
//!
//! Tracks which addresses on a bus have a chip attached. Attaching runs the
//! full bring-up (probe, then initialization) and only registers the device
//! once both succeeded.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::DriverConfig;
use crate::data::ProbeMode;
use crate::error::{Lm90Error, Result};
use crate::hw::{probe, Lm90Device, SmbusBus};

/// Attached devices, keyed by address
pub struct DeviceRegistry<B: SmbusBus + ?Sized, C: Clock + Clone = SystemClock> {
    clock: C,
    devices: RwLock<BTreeMap<u8, Arc<Lm90Device<B, C>>>>,
    next_id: AtomicUsize,
}

impl<B: SmbusBus + ?Sized> DeviceRegistry<B> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<B: SmbusBus + ?Sized> Default for DeviceRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: SmbusBus + ?Sized, C: Clock + Clone> DeviceRegistry<B, C> {
    /// Registry whose devices read time from `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            devices: RwLock::new(BTreeMap::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    /// Probe, initialize and register the chip at `address`
    ///
    /// The registry stays locked for the whole sequence, so two callers
    /// cannot bring up the same address concurrently.
    pub fn attach(
        &self,
        bus: &Arc<B>,
        address: u8,
        mode: ProbeMode,
        config: &DriverConfig,
    ) -> Result<Arc<Lm90Device<B, C>>> {
        let mut devices = self.devices.write();
        if devices.contains_key(&address) {
            return Err(Lm90Error::AddressInUse(address));
        }

        let info = probe(&**bus, address, mode)?;
        let device = Lm90Device::with_clock(
            bus.clone(),
            &info,
            config.staleness_window(),
            self.clock.clone(),
        );
        device.initialize(&config.init)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let device = Arc::new(device.with_id(id));
        devices.insert(address, device.clone());
        info!(address, id, variant = %info.variant, "attached {}", info.variant.client_name());
        Ok(device)
    }

    /// Attach every chip found on `bus` according to the configured probe plan
    ///
    /// Addresses without a supported chip are skipped quietly. A chip that was
    /// identified but failed initialization is logged and left unregistered.
    pub fn scan(&self, bus: &Arc<B>, config: &DriverConfig) -> Vec<Arc<Lm90Device<B, C>>> {
        let mut attached = Vec::new();
        for (address, mode) in config.probe_plan() {
            match self.attach(bus, address, mode, config) {
                Ok(device) => attached.push(device),
                Err(Lm90Error::Probe(err)) => debug!(address, error = %err, "skipping address"),
                Err(Lm90Error::AddressInUse(_)) => debug!(address, "already attached"),
                Err(err) => warn!(address, error = %err, "failed to attach device"),
            }
        }
        attached
    }

    /// Remove the device at `address`
    ///
    /// Handles still held elsewhere stay usable; the registry just stops
    /// handing them out.
    pub fn detach(&self, address: u8) -> Result<Arc<Lm90Device<B, C>>> {
        let device = self
            .devices
            .write()
            .remove(&address)
            .ok_or(Lm90Error::DeviceNotFound(address))?;
        info!(address, id = device.id(), "detached device");
        Ok(device)
    }

    pub fn get(&self, address: u8) -> Option<Arc<Lm90Device<B, C>>> {
        self.devices.read().get(&address).cloned()
    }

    /// Attached addresses in ascending order
    pub fn addresses(&self) -> Vec<u8> {
        self.devices.read().keys().copied().collect()
    }

    pub fn devices(&self) -> Vec<Arc<Lm90Device<B, C>>> {
        self.devices.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}
