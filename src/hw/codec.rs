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

//! Register codec
//!
//! Conversions between raw register contents and temperatures.
//!
//! # Encodings
//!
//! - **8-bit** (local temperature, all critical limits, local limits):
//!   two's complement whole degrees.
//! - **16-bit** (remote temperature and remote high/low limits): two's
//!   complement in 1/256 degree, of which only the top 11 bits are
//!   significant. Values are exposed in tenths of a degree.
//!
//! The 16-bit formulas do not round negative values symmetrically: the
//! `+128` bias followed by an arithmetic shift rounds half-steps toward
//! positive infinity, so e.g. -2.25 degrees decodes to -22 tenths while 2.25
//! decodes to 23.

use crate::constants::encoding::{HYSTERESIS_MAX, REMOTE_RESOLUTION_MASK};

/// Decode an 8-bit register into whole degrees
pub fn decode_local(raw: u8) -> i32 {
    raw as i8 as i32
}

/// Encode whole degrees into an 8-bit register
///
/// Values outside `-128..=127` wrap around, as they would on the chip.
pub fn encode_local(degrees: i32) -> u8 {
    degrees as u8
}

/// Decode a 16-bit remote register into tenths of a degree
pub fn decode_remote(raw: u16) -> i32 {
    ((raw as i16 as i32) * 10 + 128) >> 8
}

/// Encode tenths of a degree into a 16-bit remote register
///
/// The result has its 5 reserved bits cleared, giving the chip's 1/8 degree resolution.
pub fn encode_remote(tenths: i32) -> u16 {
    let scaled = (tenths as i64 * 256) / 10;
    (scaled as u16) & REMOTE_RESOLUTION_MASK
}

/// Clamp a hysteresis value into the 5-bit register range
pub fn clamp_hysteresis(degrees: i32) -> u8 {
    degrees.clamp(0, HYSTERESIS_MAX) as u8
}

/// Combine high and low register bytes
pub fn combine_bytes(high: u8, low: u8) -> u16 {
    ((high as u16) << 8) | low as u16
}

/// Split a 16-bit register value into (high, low) bytes
pub fn split_bytes(raw: u16) -> (u8, u8) {
    ((raw >> 8) as u8, (raw & 0xFF) as u8)
}
