//! Lossy conversion of free-text price/surface fields into comparable numbers.
//!
//! Listings store price and surface exactly as published ("450 000 €",
//! "85,5 m²"). Range filtering needs numbers, so this module pulls the first
//! decimal number out of a string. The conversion is total: no digits means
//! 0.0, never an error.

/// Extract the first decimal number from `text`.
///
/// Digit groups may be separated by regular or non-breaking spaces
/// ("450 000"). A single `.` or `,` followed by a digit is taken as the
/// decimal separator. Returns 0.0 when the text contains no digit.
pub fn leading_number(text: &str) -> f64 {
    let chars: Vec<char> = text.chars().collect();

    let mut i = match chars.iter().position(|c| c.is_ascii_digit()) {
        Some(pos) => pos,
        None => return 0.0,
    };

    let mut digits = String::new();
    let mut decimal_seen = false;

    while i < chars.len() {
        let c = chars[i];
        let next_is_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());

        if c.is_ascii_digit() {
            digits.push(c);
        } else if is_group_separator(c) && !decimal_seen && next_is_digit {
            // thousands grouping, e.g. "450 000"
        } else if (c == '.' || c == ',') && !decimal_seen && next_is_digit {
            digits.push('.');
            decimal_seen = true;
        } else {
            break;
        }
        i += 1;
    }

    digits.parse().unwrap_or(0.0)
}

fn is_group_separator(c: char) -> bool {
    c == ' ' || c == '\u{a0}' || c == '\u{202f}'
}
