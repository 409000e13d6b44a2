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

//! Bus access seam
//!
//! The byte-level transport (SMBus adapter, i2c-dev node, test double) lives
//! outside this crate. Everything here talks to the chip through [`SmbusBus`].

use crate::error::BusError;

/// Single-byte register access on a shared bus
///
/// Implementations are expected to serialize their own transfers; one bus
/// handle is shared by every device attached to the same adapter.
#[cfg_attr(test, mockall::automock)]
pub trait SmbusBus: Send + Sync {
    /// Whether the adapter supports SMBus byte-data transfers
    fn supports_byte_data(&self) -> bool {
        true
    }

    /// Read one register
    fn read_byte(&self, address: u8, register: u8) -> Result<u8, BusError>;

    /// Write one register
    fn write_byte(&self, address: u8, register: u8, value: u8) -> Result<(), BusError>;
}

/// A bus handle bound to one device address
///
/// Keeps the address out of every call site and emits per-transfer trace events.
pub(crate) struct RegisterIo<'a, B: SmbusBus + ?Sized> {
    bus: &'a B,
    address: u8,
}

impl<'a, B: SmbusBus + ?Sized> RegisterIo<'a, B> {
    pub(crate) fn new(bus: &'a B, address: u8) -> Self {
        Self { bus, address }
    }

    pub(crate) fn read(&self, register: u8) -> Result<u8, BusError> {
        let value = self.bus.read_byte(self.address, register)?;
        tracing::trace!(address = self.address, register, value, "register read");
        Ok(value)
    }

    pub(crate) fn write(&self, register: u8, value: u8) -> Result<(), BusError> {
        tracing::trace!(address = self.address, register, value, "register write");
        self.bus.write_byte(self.address, register, value)
    }
}
