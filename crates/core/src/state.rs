// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use paddock_audit::{Actor, AuditEvent, Cause};
use paddock_domain::{
    ActorId, ItemId, Provider, ProviderId, Reservation, ResourceId, SchedulableItem, TimeWindow,
    VenueHours,
};
use time::{Date, OffsetDateTime};

/// Roster facts about a proposed assignee on the scheduled date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssigneeEligibility {
    /// The assignee is on the duty roster for the date.
    pub on_duty: bool,
    /// The assignee has standing permission to take tasks off-roster.
    pub explicitly_permitted: bool,
}

impl AssigneeEligibility {
    /// Returns true if assigning this person needs no warning.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.on_duty || self.explicitly_permitted
    }
}

/// Everything `accept` needs to re-check a lesson slot.
///
/// `reservations` must be the global reservation set for the date so the
/// combined-mode resolve sees bookings made through other providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingCheck {
    /// The lesson provider.
    pub provider: Provider,
    /// The venue's shared resources.
    pub resource_ids: Vec<ResourceId>,
    /// Active and inactive reservations on the slot date.
    pub reservations: Vec<Reservation>,
    /// The venue working window.
    pub venue: VenueHours,
}

/// Call-time inputs to a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionContext {
    /// The authenticated caller.
    pub actor: Actor,
    /// Why the transition was requested.
    pub cause: Cause,
    /// The evaluation time.
    pub now: OffsetDateTime,
    /// Roster lookup for `assign_to_person`. `None` skips the check.
    pub assignee_eligibility: Option<AssigneeEligibility>,
    /// Slot re-check inputs for `accept`.
    pub booking: Option<BookingCheck>,
}

impl TransitionContext {
    /// Creates a context with no roster or booking information.
    #[must_use]
    pub const fn new(actor: Actor, cause: Cause, now: OffsetDateTime) -> Self {
        Self {
            actor,
            cause,
            now,
            assignee_eligibility: None,
            booking: None,
        }
    }

    /// Attaches roster facts about the proposed assignee.
    #[must_use]
    pub const fn with_eligibility(mut self, eligibility: AssigneeEligibility) -> Self {
        self.assignee_eligibility = Some(eligibility);
        self
    }

    /// Attaches the slot re-check inputs.
    #[must_use]
    pub fn with_booking(mut self, booking: BookingCheck) -> Self {
        self.booking = Some(booking);
        self
    }
}

/// Non-fatal findings reported alongside a committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionWarning {
    /// The assignee is neither on duty nor explicitly permitted.
    AssigneeNotOnDuty {
        /// The assignee.
        assignee: ActorId,
        /// The scheduled date.
        date: Date,
    },
}

impl std::fmt::Display for TransitionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AssigneeNotOnDuty { assignee, date } => write!(
                f,
                "{assignee} is not on duty on {date} and has no explicit permission"
            ),
        }
    }
}

/// Writes the store must perform when the transition commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Record a confirmed lesson reservation.
    AttachReservation {
        /// The lesson item.
        item_id: ItemId,
        /// The lesson provider.
        provider_id: ProviderId,
        /// The arena consumed, if any.
        resource_id: Option<ResourceId>,
        /// The lesson date.
        date: Date,
        /// The lesson window.
        window: TimeWindow,
    },
    /// Mark the provider's explicit slot as booked.
    BookSpecificSlot {
        /// The lesson provider.
        provider_id: ProviderId,
        /// The slot date.
        date: Date,
        /// The slot window.
        window: TimeWindow,
    },
    /// Cancel the reservation produced by an item.
    ReleaseReservation {
        /// The lesson item.
        item_id: ItemId,
    },
    /// Clear the booked flag of a provider's explicit slot, if it has one.
    ReleaseSpecificSlot {
        /// The lesson provider.
        provider_id: ProviderId,
        /// The slot date.
        date: Date,
        /// The slot window.
        window: TimeWindow,
    },
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The item after the transition, with its version advanced.
    pub new_item: SchedulableItem,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
    /// Soft warnings; the transition still commits.
    pub warnings: Vec<TransitionWarning>,
    /// Store writes that must accompany the commit.
    pub side_effects: Vec<SideEffect>,
}
