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

//! Constants and configuration values for lm90mon
//!
//! Centralizes register addresses, identification signatures, defaults and timing.
//! Never use magic numbers in other files - add them here first.

/// Register map shared by every supported variant
///
/// The chip uses distinct addresses for reading and writing most configuration
/// and limit registers. Registers with a single address are listed once.
pub mod registers {
    pub const MAN_ID: u8 = 0xFE;
    pub const CHIP_ID: u8 = 0xFF;

    pub const CONFIG1_READ: u8 = 0x03;
    pub const CONFIG1_WRITE: u8 = 0x09;
    pub const CONFIG2: u8 = 0xBF;
    pub const CONVRATE_READ: u8 = 0x04;
    pub const CONVRATE_WRITE: u8 = 0x0A;
    pub const STATUS: u8 = 0x02;

    pub const LOCAL_TEMP: u8 = 0x00;
    pub const LOCAL_HIGH_READ: u8 = 0x05;
    pub const LOCAL_HIGH_WRITE: u8 = 0x0B;
    pub const LOCAL_LOW_READ: u8 = 0x06;
    pub const LOCAL_LOW_WRITE: u8 = 0x0C;
    pub const LOCAL_CRIT: u8 = 0x20;

    pub const REMOTE_TEMP_HIGH: u8 = 0x01;
    pub const REMOTE_TEMP_LOW: u8 = 0x10;
    pub const REMOTE_HIGH_HIGH_READ: u8 = 0x07;
    pub const REMOTE_HIGH_HIGH_WRITE: u8 = 0x0D;
    pub const REMOTE_HIGH_LOW: u8 = 0x13;
    pub const REMOTE_LOW_HIGH_READ: u8 = 0x08;
    pub const REMOTE_LOW_HIGH_WRITE: u8 = 0x0E;
    pub const REMOTE_LOW_LOW: u8 = 0x14;
    pub const REMOTE_CRIT: u8 = 0x19;

    pub const TCRIT_HYST: u8 = 0x21;
}

/// Register codec bit layouts
pub mod encoding {
    /// The low 5 bits of 16-bit remote registers are reserved
    pub const REMOTE_RESOLUTION_MASK: u16 = 0xFFE0;

    /// Largest hysteresis the 5-bit register can hold
    pub const HYSTERESIS_MAX: i32 = 31;
}

/// Configuration register bits
pub mod config1 {
    /// Standby (stop conversions) bit
    pub const STANDBY: u8 = 0x40;
}

/// Identification signatures and the generic detection template
pub mod detection {
    /// Bits of CONFIG1 that read zero on every supported chip
    pub const CONFIG1_RESERVED_MASK: u8 = 0x2A;

    /// Highest conversion rate code any supported chip accepts
    pub const CONVRATE_MAX: u8 = 0x0A;

    pub mod national {
        pub const MANUFACTURER_ID: u8 = 0x01;
        /// LM90 chip IDs occupy `0x21..0x30`
        pub const LM90_CHIP_ID_MIN: u8 = 0x21;
        pub const LM90_CHIP_ID_END: u8 = 0x30;
        pub const CONFIG2_RESERVED_MASK: u8 = 0xF8;
        pub const LM90_CONVRATE_MAX: u8 = 0x09;
    }

    pub mod analog_devices {
        pub const MANUFACTURER_ID: u8 = 0x41;
        pub const CHIP_ID_MASK: u8 = 0xF0;
        pub const ADM1032_CHIP_ID: u8 = 0x40;
        pub const CONFIG1_RESERVED_MASK: u8 = 0x3F;
    }
}

/// Status register alarm bits
pub mod alarms {
    pub const LOCAL_HIGH: u8 = 0x40;
    pub const LOCAL_LOW: u8 = 0x20;
    pub const REMOTE_HIGH: u8 = 0x10;
    pub const REMOTE_LOW: u8 = 0x08;
    pub const REMOTE_OPEN: u8 = 0x04;
    pub const REMOTE_CRIT: u8 = 0x02;
    pub const LOCAL_CRIT: u8 = 0x01;
}

/// Limits written by the initialization routine
pub mod defaults {
    /// Low limit in degrees
    pub const LOW: i32 = 5;
    /// High limit in degrees
    pub const HIGH: i32 = 70;
    /// Critical limit in degrees
    pub const CRIT: i32 = 85;
    /// Critical hysteresis in degrees
    pub const HYST: i32 = 10;
    /// Conversion rate code 5 = 2 conversions per second
    pub const CONVERSION_RATE: u8 = 5;
}

/// Bus addresses
pub mod addresses {
    /// The LM90 address is fixed internally and cannot be changed
    pub const NORMAL: &[u8] = &[0x4c];

    /// Largest 7-bit bus address
    pub const MAX_7BIT: u8 = 0x7F;
}

/// Timing values
pub mod timing {
    /// Maximum age of a cached snapshot before a read triggers a refresh
    pub const STALENESS_WINDOW_MS: u64 = 2000;
}
