//! A collection of utility functions
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::errors::Error;

/// Formats a `SystemTime` into a RFC 3339 - Z format.
/// For example "2018-01-26T18:30:09.453Z"
pub fn format_system_time(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = time.into();
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Builds a `SystemTime` from a RFC 3339 - Z formatted string.
/// For example "2018-01-26T18:30:09.453Z"
pub fn parse_system_time(s: &str) -> Result<SystemTime, Error> {
    let datetime = DateTime::parse_from_rfc3339(s).map_err(|e| Error::InvalidArgument(
        format!("bad timestamp {s}: {e}"),
    ))?;
    Ok(SystemTime::from(datetime))
}

/// Converts a signed depth, as read from user input, into a walk depth.
///
/// Negative depths are rejected before any file system access happens.
pub fn max_depth_from(depth: i64) -> Result<usize, Error> {
    usize::try_from(depth)
        .map_err(|_| Error::InvalidArgument(format!("max depth must not be negative: {depth}")))
}
