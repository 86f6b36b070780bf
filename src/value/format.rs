// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configurable number formatting for display values.
//!
//! Formatting is pure and deterministic: scale by `10^decimals`, apply the
//! rounding mode, render with a fixed number of decimals, group the integer
//! part in threes, then append the unit. Missing values always render as
//! the `"--"` placeholder.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder rendered for missing or non-numeric values.
pub const PLACEHOLDER: &str = "--";

/// Rounding mode applied before fixing the decimal count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalMode {
    /// Round half away from zero.
    #[default]
    Round,
    /// Round towards negative infinity.
    Floor,
    /// Round towards positive infinity.
    Ceil,
    /// Round towards zero.
    Trunc,
}

/// Separator between the integer and decimal part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecimalSeparator {
    /// `.` (default).
    #[default]
    #[serde(rename = ".")]
    Dot,
    /// `,`.
    #[serde(rename = ",")]
    Comma,
}

impl DecimalSeparator {
    /// Returns the separator character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Dot => '.',
            Self::Comma => ',',
        }
    }
}

/// Separator inserted between thousands groups of the integer part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThousandSeparator {
    /// No grouping (default).
    #[default]
    #[serde(rename = "none")]
    None,
    /// `.`.
    #[serde(rename = ".")]
    Dot,
    /// `,`.
    #[serde(rename = ",")]
    Comma,
    /// `'`.
    #[serde(rename = "'")]
    Apostrophe,
    /// Space.
    #[serde(rename = " ")]
    Space,
}

impl ThousandSeparator {
    /// Returns the separator character, or `None` when grouping is off.
    #[must_use]
    pub const fn as_char(self) -> Option<char> {
        match self {
            Self::None => None,
            Self::Dot => Some('.'),
            Self::Comma => Some(','),
            Self::Apostrophe => Some('\''),
            Self::Space => Some(' '),
        }
    }
}

/// Number formatting options.
///
/// # Examples
///
/// ```
/// use flexicon_lib::value::{format_number, NumberFormat, ThousandSeparator};
///
/// let format = NumberFormat {
///     decimals: 2,
///     thousand_separator: ThousandSeparator::Comma,
///     ..NumberFormat::default()
/// };
/// assert_eq!(format_number(Some(1234.567), &format), "1,234.57");
/// assert_eq!(format_number(None, &NumberFormat::default()), "--");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberFormat {
    /// Number of decimal places to render.
    pub decimals: u8,
    /// Rounding mode applied at `decimals` precision.
    pub decimal_mode: DecimalMode,
    /// Separator between integer and decimal part.
    pub decimal_separator: DecimalSeparator,
    /// Grouping separator for the integer part.
    pub thousand_separator: ThousandSeparator,
    /// Unit appended after the value, separated by a space. Empty = none.
    pub unit: String,
}

/// Formats a number according to the given options.
///
/// Returns [`PLACEHOLDER`] for `None` and non-finite inputs.
#[must_use]
pub fn format_number(value: Option<f64>, format: &NumberFormat) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }

    let factor = 10f64.powi(i32::from(format.decimals));
    let scaled = value * factor;
    let processed = match format.decimal_mode {
        DecimalMode::Round => scaled.round(),
        DecimalMode::Floor => scaled.floor(),
        DecimalMode::Ceil => scaled.ceil(),
        DecimalMode::Trunc => scaled.trunc(),
    } / factor;

    let fixed = format!("{processed:.prec$}", prec = usize::from(format.decimals));
    let (integer_part, decimal_part) = match fixed.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (fixed.as_str(), None),
    };

    let mut result = group_thousands(integer_part, format.thousand_separator);
    if let Some(dec) = decimal_part {
        result.push(format.decimal_separator.as_char());
        result.push_str(dec);
    }
    if !format.unit.is_empty() {
        result.push(' ');
        result.push_str(&format.unit);
    }
    result
}

/// Renders a number the way loosely-typed brokers stringify it: integral
/// values without a trailing `.0`, everything else in shortest form.
///
/// Used for mapping-table lookups and label fallbacks, where `5` must
/// match the key `"5"`.
#[must_use]
pub fn compact_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Inserts the grouping separator every 3 digits, counting from the right.
///
/// A leading sign is left untouched.
fn group_thousands(integer_part: &str, separator: ThousandSeparator) -> String {
    let Some(sep) = separator.as_char() else {
        return integer_part.to_string();
    };

    let (sign, digits) = match integer_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(sep);
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

impl fmt::Display for DecimalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Round => "round",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Trunc => "trunc",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(decimals: u8) -> NumberFormat {
        NumberFormat {
            decimals,
            ..NumberFormat::default()
        }
    }

    #[test]
    fn formats_with_thousand_and_decimal_separator() {
        let format = NumberFormat {
            decimals: 2,
            thousand_separator: ThousandSeparator::Comma,
            ..NumberFormat::default()
        };
        assert_eq!(format_number(Some(1234.567), &format), "1,234.57");
    }

    #[test]
    fn missing_value_renders_placeholder() {
        assert_eq!(format_number(None, &NumberFormat::default()), "--");
        assert_eq!(format_number(Some(f64::NAN), &NumberFormat::default()), "--");
        assert_eq!(
            format_number(Some(f64::INFINITY), &NumberFormat::default()),
            "--"
        );
    }

    #[test]
    fn decimal_modes() {
        assert_eq!(format_number(Some(1.25), &fmt(1)), "1.3");

        let floor = NumberFormat {
            decimals: 1,
            decimal_mode: DecimalMode::Floor,
            ..NumberFormat::default()
        };
        assert_eq!(format_number(Some(1.29), &floor), "1.2");

        let ceil = NumberFormat {
            decimals: 1,
            decimal_mode: DecimalMode::Ceil,
            ..NumberFormat::default()
        };
        assert_eq!(format_number(Some(1.21), &ceil), "1.3");

        let trunc = NumberFormat {
            decimals: 0,
            decimal_mode: DecimalMode::Trunc,
            ..NumberFormat::default()
        };
        assert_eq!(format_number(Some(-1.7), &trunc), "-1");
    }

    #[test]
    fn comma_decimal_separator() {
        let format = NumberFormat {
            decimals: 1,
            decimal_separator: DecimalSeparator::Comma,
            thousand_separator: ThousandSeparator::Dot,
            ..NumberFormat::default()
        };
        assert_eq!(format_number(Some(1234.5), &format), "1.234,5");
    }

    #[test]
    fn grouping_skips_short_integers() {
        let format = NumberFormat {
            thousand_separator: ThousandSeparator::Space,
            ..NumberFormat::default()
        };
        assert_eq!(format_number(Some(999.0), &format), "999");
        assert_eq!(format_number(Some(1000.0), &format), "1 000");
        assert_eq!(format_number(Some(1_000_000.0), &format), "1 000 000");
    }

    #[test]
    fn negative_numbers_keep_sign_out_of_grouping() {
        let format = NumberFormat {
            thousand_separator: ThousandSeparator::Comma,
            ..NumberFormat::default()
        };
        assert_eq!(format_number(Some(-1234.0), &format), "-1,234");
    }

    #[test]
    fn unit_appended_with_space() {
        let format = NumberFormat {
            decimals: 1,
            unit: "kWh".to_string(),
            ..NumberFormat::default()
        };
        assert_eq!(format_number(Some(3.14), &format), "3.1 kWh");
    }

    #[test]
    fn zero_decimals_have_no_separator() {
        assert_eq!(format_number(Some(42.4), &fmt(0)), "42");
    }

    #[test]
    fn compact_number_drops_trailing_zero_fraction() {
        assert_eq!(compact_number(5.0), "5");
        assert_eq!(compact_number(-3.0), "-3");
        assert_eq!(compact_number(5.5), "5.5");
        assert_eq!(compact_number(0.0), "0");
    }
}
