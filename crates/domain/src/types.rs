// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::macros::time;
use time::{Date, Duration, Time, Weekday};

/// Identifies a bookable provider (a coach, or any resource with a calendar).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    /// Creates a new `ProviderId`.
    ///
    /// Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a shared resource such as an arena.
///
/// Resource ids are ordered; the ordering is the tie-break used when
/// picking the next free slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates a new `ResourceId`.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a person acting in the system (admin, staff member, coach or client).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    /// Creates a new `ActorId`.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a schedulable item (lesson request or yard task).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(i64);

impl ItemId {
    /// Creates a new `ItemId`.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the numeric identifier.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller roles supplied by the authentication context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Yard administrators: full triage and corrective authority.
    Admin,
    /// Yard staff: may triage and complete tasks.
    Staff,
    /// Coaches: providers of lessons.
    Coach,
    /// Livery clients: may request lessons and report tasks.
    Client,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Coach => "coach",
            Self::Client => "client",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "coach" => Ok(Self::Coach),
            "client" => Ok(Self::Client),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A half-open `[start, end)` window of wall-clock time within one day.
///
/// Invariant: `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: Time,
    end: Time,
}

impl TimeWindow {
    /// Creates a new `TimeWindow`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeWindow` if `start` is not before `end`.
    pub fn new(start: Time, end: Time) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidTimeWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the start of the window.
    #[must_use]
    pub const fn start(&self) -> Time {
        self.start
    }

    /// Returns the (exclusive) end of the window.
    #[must_use]
    pub const fn end(&self) -> Time {
        self.end
    }

    /// Returns true if the two windows share any instant.
    ///
    /// Windows that merely touch (`a.end == b.start`) do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true if `other` lies entirely within this window.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns the length of the window in whole minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).whole_minutes()
    }

    /// Slices the window into consecutive slots of `minutes` length.
    ///
    /// A trailing remainder shorter than `minutes` is dropped, so a
    /// duration longer than the window yields no slots. A zero duration
    /// yields no slots.
    #[must_use]
    pub fn slices(&self, minutes: u16) -> Vec<Self> {
        let mut slots: Vec<Self> = Vec::new();
        let step: i64 = i64::from(minutes);
        let length: i64 = self.duration_minutes();
        if step == 0 {
            return slots;
        }

        // Offsets stay within the window, so `Time + Duration` never wraps
        let mut offset: i64 = 0;
        while offset + step <= length {
            slots.push(Self {
                start: self.start + Duration::minutes(offset),
                end: self.start + Duration::minutes(offset + step),
            });
            offset += step;
        }
        slots
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        )
    }
}

/// The venue-wide default working window used by `AvailabilityMode::Always`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueHours {
    /// The daily working window.
    pub window: TimeWindow,
}

impl VenueHours {
    /// Creates venue hours from an opening and closing time.
    ///
    /// # Errors
    ///
    /// Returns an error if opening is not before closing.
    pub fn new(opening: Time, closing: Time) -> Result<Self, DomainError> {
        Ok(Self {
            window: TimeWindow::new(opening, closing)?,
        })
    }
}

impl Default for VenueHours {
    fn default() -> Self {
        Self {
            window: TimeWindow {
                start: time!(8:00),
                end: time!(20:00),
            },
        }
    }
}

/// A weekly recurring availability rule.
///
/// Day-of-week numbering follows the venue calendar: 0 is Sunday, 6 is Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecurringRule {
    day_of_week: u8,
    window: TimeWindow,
}

impl RecurringRule {
    /// Creates a new `RecurringRule`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDayOfWeek` if `day_of_week` is not in `0..=6`.
    pub fn new(day_of_week: u8, window: TimeWindow) -> Result<Self, DomainError> {
        if day_of_week > 6 {
            return Err(DomainError::InvalidDayOfWeek(day_of_week));
        }
        Ok(Self {
            day_of_week,
            window,
        })
    }

    /// Creates a rule from a `time::Weekday`.
    #[must_use]
    pub fn for_weekday(weekday: Weekday, window: TimeWindow) -> Self {
        Self {
            day_of_week: weekday.number_days_from_sunday(),
            window,
        }
    }

    /// Returns the day of week (0 = Sunday).
    #[must_use]
    pub const fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    /// Returns the rule's time window.
    #[must_use]
    pub const fn window(&self) -> TimeWindow {
        self.window
    }

    /// Returns true if the rule applies on the given date.
    #[must_use]
    pub fn applies_to(&self, date: Date) -> bool {
        date.weekday().number_days_from_sunday() == self.day_of_week
    }
}

/// A one-off availability slot on an explicit date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecificSlot {
    /// The calendar date of the slot.
    pub date: Date,
    /// The slot's time window.
    pub window: TimeWindow,
    /// Whether the slot has been taken by a reservation.
    pub booked: bool,
}

impl SpecificSlot {
    /// Creates a new, unbooked `SpecificSlot`.
    #[must_use]
    pub const fn new(date: Date, window: TimeWindow) -> Self {
        Self {
            date,
            window,
            booked: false,
        }
    }
}

/// How a provider's bookable time is described.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "entries", rename_all = "snake_case")]
pub enum AvailabilityMode {
    /// Bookable for the whole venue working window every day.
    Always,
    /// Bookable according to weekly rules.
    Recurring(Vec<RecurringRule>),
    /// Bookable only at explicitly listed slots.
    Specific(Vec<SpecificSlot>),
    /// Not bookable.
    None,
}

impl AvailabilityMode {
    /// Returns the string representation of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Recurring(_) => "recurring",
            Self::Specific(_) => "specific",
            Self::None => "none",
        }
    }

    /// Returns the booked specific slots, if any.
    #[must_use]
    pub fn booked_slots(&self) -> Vec<SpecificSlot> {
        match self {
            Self::Specific(slots) => slots.iter().filter(|s| s.booked).copied().collect(),
            Self::Always | Self::Recurring(_) | Self::None => Vec::new(),
        }
    }
}

/// An entity that can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// The provider identifier.
    pub provider_id: ProviderId,
    /// Display name.
    pub name: String,
    /// The availability configuration.
    pub mode: AvailabilityMode,
    /// Length of one bookable slot in minutes.
    pub slot_duration_minutes: u16,
    /// Whether bookings with this provider consume shared resources (arenas).
    pub consumes_resources: bool,
}

impl Provider {
    /// Creates a new `Provider`.
    #[must_use]
    pub const fn new(
        provider_id: ProviderId,
        name: String,
        mode: AvailabilityMode,
        slot_duration_minutes: u16,
        consumes_resources: bool,
    ) -> Self {
        Self {
            provider_id,
            name,
            mode,
            slot_duration_minutes,
            consumes_resources,
        }
    }
}

/// A bookable capacity unit such as an arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// The resource identifier.
    pub resource_id: ResourceId,
    /// Display name.
    pub name: String,
}

impl Resource {
    /// Creates a new `Resource`.
    #[must_use]
    pub const fn new(resource_id: ResourceId, name: String) -> Self {
        Self { resource_id, name }
    }
}

/// What kind of booking a reservation represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    /// A lesson with a coach.
    Lesson,
    /// A client hiring the arena directly.
    ArenaBooking,
    /// Resource blocked out (maintenance, events).
    Blocked,
}

impl BookingType {
    /// Returns the string representation of the booking type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lesson => "lesson",
            Self::ArenaBooking => "arena_booking",
            Self::Blocked => "blocked",
        }
    }
}

impl FromStr for BookingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lesson" => Ok(Self::Lesson),
            "arena_booking" => Ok(Self::ArenaBooking),
            "blocked" => Ok(Self::Blocked),
            _ => Err(DomainError::InvalidBookingType(s.to_string())),
        }
    }
}

/// Lifecycle of a reservation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Declined,
}

impl ReservationStatus {
    /// Returns true if the reservation still occupies its slot.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

/// An already-placed booking of a provider and/or resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// The reservation identifier.
    pub reservation_id: i64,
    /// The provider booked.
    pub provider_id: ProviderId,
    /// The resource consumed, if any.
    pub resource_id: Option<ResourceId>,
    /// The calendar date.
    pub date: Date,
    /// The booked time window.
    pub window: TimeWindow,
    /// The booking type.
    pub booking_type: BookingType,
    /// The reservation status.
    pub status: ReservationStatus,
    /// The schedulable item that produced this reservation, if any.
    pub item_id: Option<ItemId>,
}

impl Reservation {
    /// Returns true if the reservation still occupies its slot.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns true if the reservation overlaps the given date and window.
    #[must_use]
    pub fn overlaps(&self, date: Date, window: &TimeWindow) -> bool {
        self.date == date && self.window.overlaps(window)
    }
}
