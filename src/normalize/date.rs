// src/normalize/date.rs
use chrono::NaiveDate;

use crate::utils::error::ParseError;

/// Formats tried in order when none are configured: ISO (macrotrends),
/// day/month/year, and the abbreviated/long month names ycharts publishes.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%b %d, %Y", "%B %d, %Y"];

pub fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
}

/// Parses `text` with the first matching format.
pub fn parse_date(text: &str, formats: &[String]) -> Result<NaiveDate, ParseError> {
    let text = text.trim();
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .ok_or_else(|| ParseError::InvalidDate(text.to_string()))
}
