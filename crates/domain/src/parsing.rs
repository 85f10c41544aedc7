// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wire formats for calendar values: `YYYY-MM-DD` dates and `HH:MM` times.

use crate::error::DomainError;
use crate::types::TimeWindow;
use time::macros::format_description;
use time::{Date, Time};

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Parses an `HH:MM` wall-clock time.
///
/// # Errors
///
/// Returns `DomainError::TimeParseError` if the string is not a valid time.
pub fn parse_time(value: &str) -> Result<Time, DomainError> {
    Time::parse(value.trim(), format_description!("[hour]:[minute]")).map_err(|e| {
        DomainError::TimeParseError {
            time_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Parses a start/end pair into a window.
///
/// # Errors
///
/// Returns an error if either time is malformed or start is not before end.
pub fn parse_window(start: &str, end: &str) -> Result<TimeWindow, DomainError> {
    TimeWindow::new(parse_time(start)?, parse_time(end)?)
}

/// Formats a time as `HH:MM`.
#[must_use]
pub fn format_time(value: Time) -> String {
    format!("{:02}:{:02}", value.hour(), value.minute())
}
