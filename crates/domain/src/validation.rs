// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{AvailabilityMode, RecurringRule, SpecificSlot};
use time::Date;

/// The maximum number of days a single resolve may span.
pub const MAX_RANGE_DAYS: i64 = 366;

/// The longest slot a provider may offer: one full day.
pub const MAX_SLOT_DURATION_MINUTES: u16 = 1440;

/// Validates that a date range is ordered and not excessively long.
///
/// # Errors
///
/// Returns an error if:
/// - `from` is after `to`
/// - The range covers more than `MAX_RANGE_DAYS` days
pub fn validate_date_range(from: Date, to: Date) -> Result<(), DomainError> {
    if from > to {
        return Err(DomainError::InvalidDateRange { from, to });
    }

    // Inclusive range
    let days: i64 = (to - from).whole_days() + 1;
    if days > MAX_RANGE_DAYS {
        return Err(DomainError::DateRangeTooLong {
            days,
            max: MAX_RANGE_DAYS,
        });
    }
    Ok(())
}

/// Validates a provider's slot duration.
///
/// # Errors
///
/// Returns an error if the duration is zero or longer than
/// `MAX_SLOT_DURATION_MINUTES`.
pub const fn validate_slot_duration(minutes: u16) -> Result<(), DomainError> {
    if minutes == 0 || minutes > MAX_SLOT_DURATION_MINUTES {
        return Err(DomainError::InvalidSlotDuration(minutes));
    }
    Ok(())
}

/// Validates that no two recurring rules overlap on the same day.
///
/// Touching rules (one ends when the next starts) are allowed.
///
/// # Errors
///
/// Returns the first overlapping pair found, in rule order.
pub fn validate_recurring_rules(rules: &[RecurringRule]) -> Result<(), DomainError> {
    for (index, rule) in rules.iter().enumerate() {
        if let Some(other) = rules[index + 1..].iter().find(|other| {
            other.day_of_week() == rule.day_of_week() && other.window().overlaps(&rule.window())
        }) {
            return Err(DomainError::OverlappingRecurringRules {
                day_of_week: rule.day_of_week(),
                first: rule.window(),
                second: other.window(),
            });
        }
    }
    Ok(())
}

/// Validates that no two specific slots overlap on the same date.
///
/// # Errors
///
/// Returns the first overlapping pair found, in slot order.
pub fn validate_specific_slots(slots: &[SpecificSlot]) -> Result<(), DomainError> {
    for (index, slot) in slots.iter().enumerate() {
        if let Some(other) = slots[index + 1..]
            .iter()
            .find(|other| other.date == slot.date && other.window.overlaps(&slot.window))
        {
            return Err(DomainError::OverlappingSpecificSlots {
                date: slot.date,
                first: slot.window,
                second: other.window,
            });
        }
    }
    Ok(())
}

/// Validates an availability configuration before it is stored.
///
/// # Errors
///
/// Returns an error if the slot duration is zero or the rules/slots overlap.
pub fn validate_availability(
    mode: &AvailabilityMode,
    slot_duration_minutes: u16,
) -> Result<(), DomainError> {
    validate_slot_duration(slot_duration_minutes)?;
    match mode {
        AvailabilityMode::Recurring(rules) => validate_recurring_rules(rules),
        AvailabilityMode::Specific(slots) => validate_specific_slots(slots),
        AvailabilityMode::Always | AvailabilityMode::None => Ok(()),
    }
}

/// Validates that every booked slot of `current` survives unchanged in `replacement`.
///
/// Booked slots are released only by cancelling their reservation.
///
/// # Errors
///
/// Returns `DomainError::BookedSlotModified` for the first booked slot missing
/// from the replacement.
pub fn validate_booked_slots_preserved(
    current: &AvailabilityMode,
    replacement: &AvailabilityMode,
) -> Result<(), DomainError> {
    let kept: Vec<SpecificSlot> = replacement.booked_slots();
    for slot in current.booked_slots() {
        if !kept.contains(&slot) {
            return Err(DomainError::BookedSlotModified {
                date: slot.date,
                window: slot.window,
            });
        }
    }
    Ok(())
}

/// Validates an item title.
///
/// # Errors
///
/// Returns an error if the title is blank or longer than 200 characters.
pub fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::InvalidTitle(String::from(
            "Title cannot be empty",
        )));
    }
    if title.chars().count() > 200 {
        return Err(DomainError::InvalidTitle(String::from(
            "Title must be at most 200 characters",
        )));
    }
    Ok(())
}
