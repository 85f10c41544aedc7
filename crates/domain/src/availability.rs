// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability resolution.
//!
//! This module turns a provider's availability configuration and the
//! set of already-placed reservations into an ordered slot grid.
//!
//! Resolution is read-only and deterministic:
//! - It never filters on the current time
//! - It never hides configuration errors (overlapping rules yield
//!   overlapping slots)
//! - It reports fully booked slots; free/busy is decided by the caller
//!   through [`TimeSlotAvailability::is_free`] or [`first_free_slot`]
//! - A slot overlapping any active reservation of the provider is busy,
//!   even when that reservation's resource is outside the query set

use crate::error::DomainError;
use crate::types::{
    AvailabilityMode, BookingType, Provider, Reservation, ResourceId, TimeWindow, VenueHours,
};
use crate::validation::{validate_date_range, validate_slot_duration};
use serde::{Deserialize, Serialize};
use time::Date;

/// Which reservations count as conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    /// Only the provider's own reservations count.
    #[default]
    SingleProvider,
    /// Every active reservation on the resource set counts, whoever placed it.
    Combined,
}

/// How many resources a booking needs to be considered free.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRequirement {
    /// Any resource of the set will do.
    #[default]
    AnyResource,
    /// Exactly this resource is required.
    Specific(ResourceId),
}

/// Parameters of a single resolve call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    /// First date of the range (inclusive).
    pub date_from: Date,
    /// Last date of the range (inclusive).
    pub date_to: Date,
    /// The target resource set.
    pub resource_ids: Vec<ResourceId>,
    /// The conflict mode.
    pub mode: ResolveMode,
}

/// One reservation attached to a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceBooking {
    /// The resource consumed, or `None` for provider-only bookings.
    pub resource_id: Option<ResourceId>,
    /// The kind of booking.
    pub booking_type: BookingType,
    /// The reservation that occupies the slot.
    pub reservation_id: i64,
}

/// A candidate slot annotated with the bookings that overlap it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotAvailability {
    /// The calendar date.
    pub date: Date,
    /// The slot window.
    pub window: TimeWindow,
    /// One entry per overlapping active reservation.
    pub resource_bookings: Vec<ResourceBooking>,
    /// The provider's own explicit slot is already taken.
    pub provider_booked: bool,
    /// The provider has an active reservation overlapping this slot,
    /// whichever resource it uses.
    #[serde(default)]
    pub provider_busy: bool,
}

impl TimeSlotAvailability {
    /// Returns true if the given resource has a booking in this slot.
    #[must_use]
    pub fn is_resource_booked(&self, resource_id: &ResourceId) -> bool {
        self.resource_bookings
            .iter()
            .any(|b| b.resource_id.as_ref() == Some(resource_id))
    }

    /// Returns true if the provider itself can take another booking here.
    #[must_use]
    pub const fn is_provider_available(&self) -> bool {
        !self.provider_booked && !self.provider_busy
    }

    /// Returns the resources of `resource_ids` that can take a booking with
    /// this provider, lowest id first.
    ///
    /// Empty when the provider is unavailable.
    #[must_use]
    pub fn free_resources<'a>(&self, resource_ids: &'a [ResourceId]) -> Vec<&'a ResourceId> {
        if !self.is_provider_available() {
            return Vec::new();
        }
        let mut free: Vec<&ResourceId> = resource_ids
            .iter()
            .filter(|id| !self.is_resource_booked(id))
            .collect();
        free.sort();
        free.dedup();
        free
    }

    /// Decides whether the slot can still take a booking.
    ///
    /// With an empty resource set the slot is free only if nothing is booked.
    #[must_use]
    pub fn is_free(&self, resource_ids: &[ResourceId], requirement: &ResourceRequirement) -> bool {
        if !self.is_provider_available() {
            return false;
        }
        match requirement {
            ResourceRequirement::Specific(resource_id) => !self.is_resource_booked(resource_id),
            ResourceRequirement::AnyResource => {
                if resource_ids.is_empty() {
                    self.resource_bookings.is_empty()
                } else {
                    !self.free_resources(resource_ids).is_empty()
                }
            }
        }
    }
}

/// A concrete free slot picked for a booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotChoice {
    /// The calendar date.
    pub date: Date,
    /// The slot window.
    pub window: TimeWindow,
    /// The resource to book, if the provider consumes resources.
    pub resource_id: Option<ResourceId>,
}

/// Resolves the slot grid for a provider over a date range.
///
/// # Arguments
///
/// * `provider` - The provider whose availability is resolved
/// * `query` - Date range, resource set and conflict mode
/// * `venue` - The venue default working window (used by `always` mode)
/// * `reservations` - Reservations to consider; in combined mode this must
///   be the resource set's global reservation set
///
/// # Returns
///
/// Slots ordered by `(date, start, end)`. Overlapping recurring rules
/// produce overlapping slots, in rule order.
///
/// # Errors
///
/// Returns an error if:
/// - `date_from` is after `date_to`, or the range is too long
/// - The provider's slot duration is zero
/// - The provider consumes resources but no resource was given
pub fn resolve_availability(
    provider: &Provider,
    query: &AvailabilityQuery,
    venue: &VenueHours,
    reservations: &[Reservation],
) -> Result<Vec<TimeSlotAvailability>, DomainError> {
    validate_date_range(query.date_from, query.date_to)?;
    validate_slot_duration(provider.slot_duration_minutes)?;

    let resource_ids: &[ResourceId] = if provider.consumes_resources {
        if query.resource_ids.is_empty() {
            return Err(DomainError::MissingResources {
                provider_id: provider.provider_id.value().to_string(),
            });
        }
        &query.resource_ids
    } else {
        &[]
    };

    let relevant: Vec<&Reservation> = reservations
        .iter()
        .filter(|r| is_relevant(r, provider, resource_ids, query.mode))
        .collect();
    // Any of the provider's own reservations occupies the provider, in any mode
    let own: Vec<&Reservation> = reservations
        .iter()
        .filter(|r| r.is_active() && r.provider_id == provider.provider_id)
        .collect();

    let mut slots: Vec<TimeSlotAvailability> = Vec::new();
    let mut date: Date = query.date_from;
    loop {
        for (window, provider_booked) in candidate_windows(provider, venue, date) {
            let mut resource_bookings: Vec<ResourceBooking> = relevant
                .iter()
                .filter(|r| r.overlaps(date, &window))
                .map(|r| ResourceBooking {
                    resource_id: r.resource_id.clone(),
                    booking_type: r.booking_type,
                    reservation_id: r.reservation_id,
                })
                .collect();
            resource_bookings.sort_by(|a, b| {
                (&a.resource_id, a.reservation_id).cmp(&(&b.resource_id, b.reservation_id))
            });

            let provider_busy: bool = own.iter().any(|r| r.overlaps(date, &window));

            slots.push(TimeSlotAvailability {
                date,
                window,
                resource_bookings,
                provider_booked,
                provider_busy,
            });
        }

        if date >= query.date_to {
            break;
        }
        date = date
            .next_day()
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("advancing past {date}"),
            })?;
    }

    // Stable: duplicates from overlapping rules keep rule order
    slots.sort_by(|a, b| (a.date, a.window).cmp(&(b.date, b.window)));

    Ok(slots)
}

/// Picks the earliest free slot.
///
/// Ordering is lowest date, then lowest start time, then lowest free
/// resource id.
#[must_use]
pub fn first_free_slot(
    slots: &[TimeSlotAvailability],
    resource_ids: &[ResourceId],
    requirement: &ResourceRequirement,
) -> Option<SlotChoice> {
    let mut ordered: Vec<&TimeSlotAvailability> = slots.iter().collect();
    ordered.sort_by(|a, b| (a.date, a.window).cmp(&(b.date, b.window)));

    ordered.into_iter().find_map(|slot| {
        if !slot.is_free(resource_ids, requirement) {
            return None;
        }
        let resource_id: Option<ResourceId> = match requirement {
            ResourceRequirement::Specific(resource_id) => Some(resource_id.clone()),
            ResourceRequirement::AnyResource => {
                slot.free_resources(resource_ids).first().copied().cloned()
            }
        };
        Some(SlotChoice {
            date: slot.date,
            window: slot.window,
            resource_id,
        })
    })
}

/// Finds the slot with exactly the given date and window.
#[must_use]
pub fn find_slot<'a>(
    slots: &'a [TimeSlotAvailability],
    date: Date,
    window: &TimeWindow,
) -> Option<&'a TimeSlotAvailability> {
    slots
        .iter()
        .find(|slot| slot.date == date && slot.window == *window)
}

/// Produces the provider's candidate windows for one date.
///
/// The flag marks specific slots that are already booked.
fn candidate_windows(provider: &Provider, venue: &VenueHours, date: Date) -> Vec<(TimeWindow, bool)> {
    let duration: u16 = provider.slot_duration_minutes;
    match &provider.mode {
        AvailabilityMode::Always => venue
            .window
            .slices(duration)
            .into_iter()
            .map(|w| (w, false))
            .collect(),
        AvailabilityMode::Recurring(rules) => rules
            .iter()
            .filter(|rule| rule.applies_to(date))
            .flat_map(|rule| rule.window().slices(duration))
            .map(|w| (w, false))
            .collect(),
        AvailabilityMode::Specific(slots) => slots
            .iter()
            .filter(|slot| slot.date == date)
            .map(|slot| (slot.window, slot.booked))
            .collect(),
        AvailabilityMode::None => Vec::new(),
    }
}

/// Decides whether a reservation can conflict with the provider's slots.
fn is_relevant(
    reservation: &Reservation,
    provider: &Provider,
    resource_ids: &[ResourceId],
    mode: ResolveMode,
) -> bool {
    if !reservation.is_active() {
        return false;
    }

    let provider_matches: bool = reservation.provider_id == provider.provider_id;
    let resource_matches: bool = reservation
        .resource_id
        .as_ref()
        .is_some_and(|id| resource_ids.contains(id));

    match mode {
        ResolveMode::SingleProvider => {
            provider_matches && (resource_ids.is_empty() || resource_matches)
        }
        ResolveMode::Combined => {
            if resource_ids.is_empty() {
                provider_matches
            } else {
                resource_matches
            }
        }
    }
}
