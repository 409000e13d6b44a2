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

//! Named channel table
//!
//! Exposes the accessor layer as a flat list of named channels, each holding
//! a fixed number of integer values. Hosts that speak in channel names and
//! value lists (sysfs-style attribute trees, config tools) go through here.

use std::fmt;
use std::str::FromStr;

use crate::clock::Clock;
use crate::data::LimitUpdate;
use crate::error::{Lm90Error, Result};
use crate::hw::{Lm90Device, SmbusBus};

/// One entry of the channel table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Local sensor: high, low, current
    Temp1,
    /// Remote sensor: high, low, current (tenths)
    Temp2,
    Tcrit1,
    Tcrit2,
    Hyst,
    Alarms,
}

impl Channel {
    /// Table order
    pub const ALL: [Channel; 6] = [
        Channel::Temp1,
        Channel::Temp2,
        Channel::Tcrit1,
        Channel::Tcrit2,
        Channel::Hyst,
        Channel::Alarms,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Temp1 => "temp1",
            Channel::Temp2 => "temp2",
            Channel::Tcrit1 => "tcrit1",
            Channel::Tcrit2 => "tcrit2",
            Channel::Hyst => "hyst",
            Channel::Alarms => "alarms",
        }
    }

    /// Number of values a read returns
    pub fn value_count(&self) -> usize {
        match self {
            Channel::Temp1 | Channel::Temp2 => 3,
            _ => 1,
        }
    }

    /// Decimal places carried by the integer values
    pub fn magnitude(&self) -> u32 {
        match self {
            Channel::Temp2 => 1,
            _ => 0,
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, Channel::Alarms)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.name() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = Lm90Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s.trim()).ok_or_else(|| Lm90Error::UnknownChannel(s.to_string()))
    }
}

impl<B: SmbusBus + ?Sized, C: Clock> Lm90Device<B, C> {
    /// Read a channel's values in table order
    pub fn read_channel(&self, channel: Channel) -> Result<Vec<i32>> {
        let values = match channel {
            Channel::Temp1 => {
                let t = self.local_temp()?;
                vec![t.high, t.low, t.input]
            }
            Channel::Temp2 => {
                let t = self.remote_temp()?;
                vec![t.high, t.low, t.input]
            }
            Channel::Tcrit1 => vec![self.local_crit()?],
            Channel::Tcrit2 => vec![self.remote_crit()?],
            Channel::Hyst => vec![self.hysteresis()?],
            Channel::Alarms => vec![i32::from(self.alarms()?.bits())],
        };
        Ok(values)
    }

    /// Write a channel
    ///
    /// The first value sets the high (or only) limit, the second the low
    /// limit. Values beyond what the channel accepts are ignored.
    pub fn write_channel(&self, channel: Channel, values: &[i32]) -> Result<()> {
        if !channel.is_writable() {
            return Err(Lm90Error::ReadOnlyChannel(channel.name()));
        }
        let first = *values
            .first()
            .ok_or_else(|| Lm90Error::invalid_values(channel.name(), "no values given"))?;

        match channel {
            Channel::Temp1 | Channel::Temp2 => {
                let update = LimitUpdate {
                    high: Some(first),
                    low: values.get(1).copied(),
                };
                if channel == Channel::Temp1 {
                    self.set_local_limits(update)
                } else {
                    self.set_remote_limits(update)
                }
            }
            Channel::Tcrit1 => self.set_local_crit(first),
            Channel::Tcrit2 => self.set_remote_crit(first),
            Channel::Hyst => self.set_hysteresis(first),
            Channel::Alarms => Err(Lm90Error::ReadOnlyChannel(channel.name())),
        }
    }
}
