// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::TimeWindow;
use time::{Date, Time};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A time window does not start before it ends.
    InvalidTimeWindow {
        /// The window start.
        start: Time,
        /// The window end.
        end: Time,
    },
    /// Day of week outside `0..=6`.
    InvalidDayOfWeek(u8),
    /// Slot duration must be positive.
    InvalidSlotDuration(u16),
    /// The requested date range is inverted.
    InvalidDateRange {
        /// The first date of the range.
        from: Date,
        /// The last date of the range.
        to: Date,
    },
    /// The requested date range spans too many days.
    DateRangeTooLong {
        /// The number of days requested.
        days: i64,
        /// The maximum number of days allowed.
        max: i64,
    },
    /// Two recurring rules on the same day overlap.
    OverlappingRecurringRules {
        /// Day of week (0 = Sunday).
        day_of_week: u8,
        /// The first rule's window.
        first: TimeWindow,
        /// The second rule's window.
        second: TimeWindow,
    },
    /// Two specific slots on the same date overlap.
    OverlappingSpecificSlots {
        /// The date of both slots.
        date: Date,
        /// The first slot's window.
        first: TimeWindow,
        /// The second slot's window.
        second: TimeWindow,
    },
    /// A booked specific slot would be removed or altered.
    BookedSlotModified {
        /// The date of the booked slot.
        date: Date,
        /// The window of the booked slot.
        window: TimeWindow,
    },
    /// A resource-consuming provider was resolved without a resource set.
    MissingResources {
        /// The provider identifier.
        provider_id: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Item title is empty or invalid.
    InvalidTitle(String),
    /// Unknown role string.
    InvalidRole(String),
    /// Unknown item kind string.
    InvalidItemKind(String),
    /// Unknown item status string.
    InvalidItemStatus(String),
    /// Unknown assignment type string.
    InvalidAssignmentType(String),
    /// Unknown priority string.
    InvalidPriority(String),
    /// Unknown booking type string.
    InvalidBookingType(String),
    /// An item is assigned to a specific person but has no assignee.
    AssignmentWithoutAssignee {
        /// The item identifier.
        item_id: i64,
    },
    /// An assignee is recorded on an item that is not specifically assigned.
    UnexpectedAssignee {
        /// The item identifier.
        item_id: i64,
    },
    /// A completed item has no completion timestamp.
    CompletionWithoutTimestamp {
        /// The item identifier.
        item_id: i64,
    },
    /// Failed to parse a date.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a time of day.
    TimeParseError {
        /// The invalid time string.
        time_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeWindow { start, end } => {
                write!(f, "Time window start {start} must be before end {end}")
            }
            Self::InvalidDayOfWeek(day) => {
                write!(f, "Invalid day of week: {day}. Must be between 0 and 6")
            }
            Self::InvalidSlotDuration(minutes) => {
                write!(
                    f,
                    "Invalid slot duration: {minutes} minutes. Must be between 1 and 1440"
                )
            }
            Self::InvalidDateRange { from, to } => {
                write!(f, "Invalid date range: {from} is after {to}")
            }
            Self::DateRangeTooLong { days, max } => {
                write!(
                    f,
                    "Date range spans {days} days; at most {max} days may be resolved at once"
                )
            }
            Self::OverlappingRecurringRules {
                day_of_week,
                first,
                second,
            } => {
                write!(
                    f,
                    "Recurring rules {first} and {second} overlap on day {day_of_week}"
                )
            }
            Self::OverlappingSpecificSlots {
                date,
                first,
                second,
            } => {
                write!(f, "Specific slots {first} and {second} overlap on {date}")
            }
            Self::BookedSlotModified { date, window } => {
                write!(
                    f,
                    "Slot {window} on {date} is booked and cannot be edited or removed"
                )
            }
            Self::MissingResources { provider_id } => {
                write!(
                    f,
                    "Provider '{provider_id}' consumes shared resources; at least one resource is required"
                )
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::InvalidTitle(msg) => write!(f, "Invalid title: {msg}"),
            Self::InvalidRole(role) => write!(f, "Invalid role: '{role}'"),
            Self::InvalidItemKind(kind) => write!(f, "Invalid item kind: '{kind}'"),
            Self::InvalidItemStatus(status) => write!(f, "Invalid item status: '{status}'"),
            Self::InvalidAssignmentType(value) => {
                write!(f, "Invalid assignment type: '{value}'")
            }
            Self::InvalidPriority(value) => write!(f, "Invalid priority: '{value}'"),
            Self::InvalidBookingType(value) => write!(f, "Invalid booking type: '{value}'"),
            Self::AssignmentWithoutAssignee { item_id } => {
                write!(
                    f,
                    "Item {item_id} is assigned to a specific person but has no assignee"
                )
            }
            Self::UnexpectedAssignee { item_id } => {
                write!(
                    f,
                    "Item {item_id} records an assignee without a specific assignment"
                )
            }
            Self::CompletionWithoutTimestamp { item_id } => {
                write!(f, "Item {item_id} is completed but has no completion time")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::TimeParseError { time_string, error } => {
                write!(f, "Failed to parse time '{time_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
