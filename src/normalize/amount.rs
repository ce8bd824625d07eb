// src/normalize/amount.rs
//! Revenue amount stages: strip currency formatting, split off the magnitude
//! suffix, parse the remaining decimal text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::error::ParseError;

// Plain decimal only; rejects `nan`, `inf` and exponent forms that `f64::from_str` accepts.
static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").expect("Failed to compile DECIMAL_RE")
});

/// Multiplier carried by a trailing letter on an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magnitude {
    Units,
    Millions,
    Billions,
}

impl Magnitude {
    pub fn factor(self) -> f64 {
        match self {
            Magnitude::Units => 1.0,
            Magnitude::Millions => 1e6,
            Magnitude::Billions => 1e9,
        }
    }
}

/// Removes `$`, grouping commas and surrounding whitespace.
pub fn strip_currency(text: &str) -> Result<String, ParseError> {
    let stripped: String = text.chars().filter(|c| *c != '$' && *c != ',').collect();
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return Err(ParseError::EmptyAmount);
    }
    Ok(stripped.to_string())
}

/// Splits a trailing `B`/`M` (either case) off the amount text.
pub fn split_magnitude(text: &str) -> (&str, Magnitude) {
    let magnitude = match text.chars().last() {
        Some('B') | Some('b') => Magnitude::Billions,
        Some('M') | Some('m') => Magnitude::Millions,
        _ => return (text, Magnitude::Units),
    };
    (text[..text.len() - 1].trim_end(), magnitude)
}

pub fn parse_number(text: &str) -> Result<f64, ParseError> {
    if text.is_empty() {
        return Err(ParseError::EmptyAmount);
    }
    if !DECIMAL_RE.is_match(text) {
        return Err(ParseError::InvalidAmount(text.to_string()));
    }
    text.parse::<f64>()
        .map_err(|_| ParseError::InvalidAmount(text.to_string()))
}

/// Full amount pipeline: `"$1.5B"` -> `1.5e9`. Rejects negative amounts, `-0` included.
pub fn convert_magnitude(text: &str) -> Result<f64, ParseError> {
    let stripped = strip_currency(text)?;
    let (number, magnitude) = split_magnitude(&stripped);
    let value = parse_number(number)? * magnitude.factor();

    if !value.is_finite() {
        return Err(ParseError::NonFiniteAmount(text.to_string()));
    }
    if value.is_sign_negative() {
        return Err(ParseError::NegativeAmount(text.to_string()));
    }
    Ok(value)
}

/// Renders an amount as `$` plus a comma-grouped integer, e.g. `$24,318`.
pub fn format_usd(value: f64) -> String {
    let digits = format!("{:.0}", value.round().abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value.round() < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
