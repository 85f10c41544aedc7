// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates cross the boundary as `YYYY-MM-DD` strings and times as `HH:MM`.

use paddock_audit::AuditEvent;
use paddock_domain::{
    ResourceBooking, ResourceId, SchedulableItem, SlotChoice, SlotSelection,
    TimeSlotAvailability, format_time,
};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Query parameters for an availability lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    /// The provider to resolve.
    pub provider_id: String,
    /// Comma-separated resource ids. Empty for providers without resources.
    #[serde(default)]
    pub resource_ids: Option<String>,
    /// First date (inclusive).
    pub date_from: String,
    /// Last date (inclusive).
    pub date_to: String,
    /// `single_provider` (default) or `combined`.
    #[serde(default)]
    pub mode: Option<String>,
    /// Require this resource when deciding whether a slot is free.
    #[serde(default)]
    pub resource_id: Option<String>,
    /// Drop slots starting sooner than this many minutes from now.
    #[serde(default)]
    pub min_notice_minutes: Option<u32>,
}

/// One booking attached to a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResponse {
    /// The booked resource, if any.
    pub resource_id: Option<String>,
    /// `lesson`, `arena_booking` or `blocked`.
    pub booking_type: String,
    /// The occupying reservation.
    pub reservation_id: i64,
}

impl From<&ResourceBooking> for BookingResponse {
    fn from(booking: &ResourceBooking) -> Self {
        Self {
            resource_id: booking
                .resource_id
                .as_ref()
                .map(|id| id.value().to_string()),
            booking_type: booking.booking_type.as_str().to_string(),
            reservation_id: booking.reservation_id,
        }
    }
}

/// One resolved slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotResponse {
    pub date: String,
    pub start: String,
    pub end: String,
    /// The provider's own explicit slot is taken.
    pub provider_booked: bool,
    /// The provider has another reservation overlapping this slot.
    pub provider_busy: bool,
    /// The slot can take a booking under the requested resource requirement.
    pub is_free: bool,
    /// Resources of the requested set that can take a booking with this
    /// provider, lowest id first.
    pub free_resource_ids: Vec<String>,
    pub bookings: Vec<BookingResponse>,
}

impl SlotResponse {
    /// Builds the response for one slot.
    #[must_use]
    pub fn new(slot: &TimeSlotAvailability, is_free: bool, resource_ids: &[ResourceId]) -> Self {
        Self {
            date: slot.date.to_string(),
            start: format_time(slot.window.start()),
            end: format_time(slot.window.end()),
            provider_booked: slot.provider_booked,
            provider_busy: slot.provider_busy,
            is_free,
            free_resource_ids: slot
                .free_resources(resource_ids)
                .into_iter()
                .map(|id| id.value().to_string())
                .collect(),
            bookings: slot
                .resource_bookings
                .iter()
                .map(BookingResponse::from)
                .collect(),
        }
    }
}

/// A concrete slot choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotChoiceResponse {
    pub date: String,
    pub start: String,
    pub end: String,
    pub resource_id: Option<String>,
}

impl From<&SlotChoice> for SlotChoiceResponse {
    fn from(choice: &SlotChoice) -> Self {
        Self {
            date: choice.date.to_string(),
            start: format_time(choice.window.start()),
            end: format_time(choice.window.end()),
            resource_id: choice
                .resource_id
                .as_ref()
                .map(|id| id.value().to_string()),
        }
    }
}

impl From<&SlotSelection> for SlotChoiceResponse {
    fn from(slot: &SlotSelection) -> Self {
        Self {
            date: slot.date.to_string(),
            start: format_time(slot.window.start()),
            end: format_time(slot.window.end()),
            resource_id: slot.resource_id.as_ref().map(|id| id.value().to_string()),
        }
    }
}

/// API response for an availability lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub provider_id: String,
    /// Slots ordered by date, then start, then end.
    pub slots: Vec<SlotResponse>,
    /// The earliest free slot, if any.
    pub next_free: Option<SlotChoiceResponse>,
}

/// A slot named by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequest {
    pub date: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub resource_id: Option<String>,
}

/// API request to create an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItemRequest {
    /// `task` or `lesson_request`.
    pub kind: String,
    pub title: String,
    /// Defaults to `medium`.
    #[serde(default)]
    pub priority: Option<String>,
    /// Required for lesson requests.
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub requested_slot: Option<SlotRequest>,
}

/// A transition event and its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransitionRequest {
    AssignToPool {
        date: String,
    },
    AssignToPerson {
        assignee: String,
        date: String,
    },
    ReassignToPool,
    Unschedule,
    Complete {
        #[serde(default)]
        notes: Option<String>,
    },
    Reopen,
    Cancel {
        #[serde(default)]
        reason: Option<String>,
    },
    /// Without a slot the requested slot is accepted.
    Accept {
        #[serde(default)]
        slot: Option<SlotRequest>,
    },
    Decline {
        #[serde(default)]
        reason: Option<String>,
    },
}

/// API request to assign several tasks to one person for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAssignRequest {
    pub item_ids: Vec<i64>,
    pub assignee: String,
    pub date: String,
}

/// One weekly rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRuleRequest {
    /// 0 = Sunday.
    pub day_of_week: u8,
    pub start: String,
    pub end: String,
}

/// One explicit slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificSlotRequest {
    pub date: String,
    pub start: String,
    pub end: String,
}

/// An availability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AvailabilityModeRequest {
    Always,
    Recurring { rules: Vec<RecurringRuleRequest> },
    Specific { slots: Vec<SpecificSlotRequest> },
    None,
}

/// API request to replace a provider's availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAvailabilityRequest {
    pub availability: AvailabilityModeRequest,
    pub slot_duration_minutes: u16,
}

/// API response for a successful availability update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAvailabilityResponse {
    pub provider_id: String,
    pub mode: String,
    pub slot_duration_minutes: u16,
    /// A success message.
    pub message: String,
}

/// An item as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResponse {
    pub item_id: i64,
    pub kind: String,
    pub title: String,
    pub status: String,
    pub assignment_type: String,
    pub assigned_to: Option<String>,
    pub scheduled_date: Option<String>,
    pub priority: String,
    pub created_by: String,
    pub provider_id: Option<String>,
    pub requested_slot: Option<SlotChoiceResponse>,
    pub confirmed_slot: Option<SlotChoiceResponse>,
    pub reported_at: String,
    pub completed_at: Option<String>,
    pub completed_by: Option<String>,
    pub completion_notes: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancelled_by: Option<String>,
    pub closing_reason: Option<String>,
    pub version: u64,
}

fn rfc3339(value: OffsetDateTime) -> String {
    value
        .format(&Rfc3339)
        .unwrap_or_else(|_| value.unix_timestamp().to_string())
}

impl From<&SchedulableItem> for ItemResponse {
    fn from(item: &SchedulableItem) -> Self {
        Self {
            item_id: item.item_id.value(),
            kind: item.kind.as_str().to_string(),
            title: item.title.clone(),
            status: item.status.as_str().to_string(),
            assignment_type: item.assignment_type.as_str().to_string(),
            assigned_to: item.assigned_to.as_ref().map(|a| a.value().to_string()),
            scheduled_date: item.scheduled_date.map(|d| d.to_string()),
            priority: item.priority.as_str().to_string(),
            created_by: item.created_by.value().to_string(),
            provider_id: item.provider_id.as_ref().map(|p| p.value().to_string()),
            requested_slot: item.requested_slot.as_ref().map(SlotChoiceResponse::from),
            confirmed_slot: item.confirmed_slot.as_ref().map(SlotChoiceResponse::from),
            reported_at: rfc3339(item.reported_at),
            completed_at: item.completed_at.map(rfc3339),
            completed_by: item.completed_by.as_ref().map(|a| a.value().to_string()),
            completion_notes: item.completion_notes.clone(),
            cancelled_at: item.cancelled_at.map(rfc3339),
            cancelled_by: item.cancelled_by.as_ref().map(|a| a.value().to_string()),
            closing_reason: item.closing_reason.clone(),
            version: item.version,
        }
    }
}

/// API response for a committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResponse {
    pub item: ItemResponse,
    /// Soft warnings; the transition was still committed.
    pub warnings: Vec<String>,
}

/// One item a bulk assignment could not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailureResponse {
    pub item_id: i64,
    /// `conflict`, `unauthorized`, `invalid_input` or `not_found`.
    pub kind: String,
    pub message: String,
}

/// API response for a bulk assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAssignResponse {
    pub succeeded: Vec<TransitionResponse>,
    pub failed: Vec<BulkFailureResponse>,
}

/// Query parameters for an audit timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTimelineRequest {
    pub item_id: i64,
}

/// API response for an audit timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTimelineResponse {
    pub item_id: i64,
    /// Oldest first.
    pub events: Vec<AuditEvent>,
}
