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

//! Text rendering of channel values
//!
//! Channel values are fixed-point integers; a channel's magnitude is the
//! number of decimal places they carry (`451` at magnitude 1 is `45.1`).

use crate::error::{Lm90Error, Result};

/// Render one fixed-point value
pub fn format_value(value: i32, magnitude: u32) -> String {
    if magnitude == 0 {
        return value.to_string();
    }
    let scale = 10i64.pow(magnitude);
    let value = i64::from(value);
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.abs();
    format!(
        "{}{}.{:0width$}",
        sign,
        abs / scale,
        abs % scale,
        width = magnitude as usize
    )
}

/// Render a channel's values separated by spaces
///
/// `format_channel_values(&[700, 50, 453], 1)` gives `"70.0 5.0 45.3"`.
pub fn format_channel_values(values: &[i32], magnitude: u32) -> String {
    values
        .iter()
        .map(|&v| format_value(v, magnitude))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse one decimal number into a fixed-point value
///
/// Extra decimal places are rounded away.
pub fn parse_value(text: &str, magnitude: u32) -> Result<i32> {
    let parsed: f64 = text
        .trim()
        .parse()
        .map_err(|_| Lm90Error::invalid_value(text, "not a number"))?;
    if !parsed.is_finite() {
        return Err(Lm90Error::invalid_value(text, "not a finite number"));
    }
    let scaled = (parsed * 10f64.powi(magnitude as i32)).round();
    if scaled < f64::from(i32::MIN) || scaled > f64::from(i32::MAX) {
        return Err(Lm90Error::invalid_value(text, "out of range"));
    }
    Ok(scaled as i32)
}

/// Parse whitespace separated values, the inverse of [`format_channel_values`]
pub fn parse_channel_values(text: &str, magnitude: u32) -> Result<Vec<i32>> {
    text.split_whitespace()
        .map(|word| parse_value(word, magnitude))
        .collect()
}
