// Utility functions
use chrono::{Datelike, NaiveDate};

/// Extracts the year from a TMDB `YYYY-MM-DD` release date.
pub fn parse_release_year(date_str: &str) -> Option<i32> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

/// Turns a display name into a file-name-safe kebab-case slug.
pub fn to_kebab_case(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
