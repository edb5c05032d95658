//! Shared utility functions.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Formats the `PO-Revision-Date` header value, e.g. `2024-01-01 12:00+0100`.
pub fn format_revision_date<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format("%Y-%m-%d %H:%M%z").to_string()
}

/// Formats the creation stamp written into exported PO banners.
pub fn format_created_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Returns `true` when the string is empty or whitespace only.
pub fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}
