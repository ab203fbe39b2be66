// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Number formatting shared by the summary tables and their images.

/// Format a number with thousands separators and fixed decimals.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1234.0, 0), "1,234");
        assert_eq!(format_thousands(1234567.891, 1), "1,234,567.9");
        assert_eq!(format_thousands(-4321.0, 0), "-4,321");
        assert_eq!(format_thousands(-0.04, 1), "0.0");
    }

    #[test]
    fn test_format_thousands_rounding_carries_into_group() {
        assert_eq!(format_thousands(999.96, 1), "1,000.0");
        assert_eq!(format_thousands(999_999.7, 0), "1,000,000");
    }
}
