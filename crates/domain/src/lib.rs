// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod availability;
mod error;
mod item;
mod parsing;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use availability::{
    AvailabilityQuery, ResolveMode, ResourceBooking, ResourceRequirement, SlotChoice,
    TimeSlotAvailability, find_slot, first_free_slot, resolve_availability,
};
pub use error::DomainError;
pub use item::{
    AssignmentType, ItemKind, ItemStatus, Priority, SchedulableItem, SlotSelection,
    validate_item_invariants,
};
pub use parsing::{format_time, parse_date, parse_time, parse_window};
pub use types::{
    ActorId, AvailabilityMode, BookingType, ItemId, Provider, ProviderId, RecurringRule,
    Reservation, ReservationStatus, Resource, ResourceId, Role, SpecificSlot, TimeWindow,
    VenueHours,
};
pub use validation::{
    MAX_RANGE_DAYS, MAX_SLOT_DURATION_MINUTES, validate_availability, validate_booked_slots_preserved, validate_date_range,
    validate_recurring_rules, validate_slot_duration, validate_specific_slots, validate_title,
};
