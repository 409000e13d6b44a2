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

//! Hardware interaction modules
//!
//! Everything that talks to the chip: register codec, probing, bring-up,
//! the sensor cache and the per-device handle.

mod bus;
mod cache;
pub mod codec;
mod detection;
mod device;
mod init;

pub use bus::SmbusBus;
pub use cache::{RefreshOutcome, RegisterSnapshot, SensorCache};
pub use detection::{
    identify, passes_detection_gate, probe, ChipSignature, IdentificationRule,
    IDENTIFICATION_RULES,
};
pub use device::Lm90Device;
pub use init::initialize;
