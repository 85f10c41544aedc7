// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use paddock_domain::{DomainError, ItemId, ItemStatus, TimeWindow};
use time::Date;

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The event is not permitted from the item's current state.
    InvalidTransition {
        /// The item identifier.
        item_id: ItemId,
        /// The item's current status.
        from: ItemStatus,
        /// The event that was attempted.
        event: &'static str,
    },
    /// The requested slot is not free at commit time.
    SlotUnavailable {
        /// The slot date.
        date: Date,
        /// The slot window.
        window: TimeWindow,
    },
    /// The caller may not trigger this event.
    Unauthorized {
        /// The event that was attempted.
        action: &'static str,
        /// Who may trigger it.
        required_role: &'static str,
    },
    /// A payload field the event needs is missing or blank.
    MissingField(&'static str),
    /// An item referenced by a bulk operation does not exist.
    ItemNotFound(ItemId),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::InvalidTransition {
                item_id,
                from,
                event,
            } => write!(f, "Cannot {event} item {item_id} while it is {from}"),
            Self::SlotUnavailable { date, window } => {
                write!(f, "Slot {window} on {date} is no longer available")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => write!(f, "Unauthorized: '{action}' requires {required_role}"),
            Self::MissingField(field) => write!(f, "Missing required field '{field}'"),
            Self::ItemNotFound(item_id) => write!(f, "Item {item_id} does not exist"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl CoreError {
    /// Returns true if the error is a retryable conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. } | Self::SlotUnavailable { .. }
        )
    }
}
