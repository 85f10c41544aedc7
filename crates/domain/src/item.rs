// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Schedulable items and their status vocabulary.
//!
//! Yard tasks and lesson requests share one shape. Tasks move through
//! `unassigned`/`backlog`/`pool`/`specific`; lesson requests use
//! `pending`/`confirmed`. Both end in `completed`, `cancelled` or
//! `declined`. The transition table itself lives in the core crate.

use crate::error::DomainError;
use crate::types::{ActorId, ItemId, ProviderId, ResourceId, TimeWindow};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

/// The kind of work an item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A yard task (mucking out, turnout, repairs).
    Task,
    /// A lesson requested from a coach.
    LessonRequest,
}

impl ItemKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::LessonRequest => "lesson_request",
        }
    }
}

impl FromStr for ItemKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(Self::Task),
            "lesson_request" => Ok(Self::LessonRequest),
            _ => Err(DomainError::InvalidItemKind(s.to_string())),
        }
    }
}

/// How an item is currently assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    /// Assigned to one named actor.
    Specific,
    /// Assigned to whoever is on duty on the scheduled date.
    Pool,
    /// Intentionally unscheduled, awaiting triage.
    Backlog,
    /// Never triaged.
    Unassigned,
}

impl AssignmentType {
    /// Returns the string representation of the assignment type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Specific => "specific",
            Self::Pool => "pool",
            Self::Backlog => "backlog",
            Self::Unassigned => "unassigned",
        }
    }
}

impl FromStr for AssignmentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "specific" => Ok(Self::Specific),
            "pool" => Ok(Self::Pool),
            "backlog" => Ok(Self::Backlog),
            "unassigned" => Ok(Self::Unassigned),
            _ => Err(DomainError::InvalidAssignmentType(s.to_string())),
        }
    }
}

/// Item status states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Task reported but never triaged
    Unassigned,
    /// Task awaiting a date and assignee
    Backlog,
    /// Task scheduled for whoever is on duty
    Pool,
    /// Task scheduled for a named actor
    Specific,
    /// Lesson requested, not yet committed to a slot
    Pending,
    /// Lesson committed to a slot
    Confirmed,
    /// Work done
    Completed,
    /// Withdrawn by either party
    Cancelled,
    /// Lesson request refused by the provider
    Declined,
}

impl ItemStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for storage and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Backlog => "backlog",
            Self::Pool => "pool",
            Self::Specific => "specific",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Declined => "declined",
        }
    }

    /// Returns true if no further work can happen without `reopen`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Declined)
    }

    /// The task status matching an assignment type.
    #[must_use]
    pub const fn for_assignment(assignment_type: AssignmentType) -> Self {
        match assignment_type {
            AssignmentType::Specific => Self::Specific,
            AssignmentType::Pool => Self::Pool,
            AssignmentType::Backlog => Self::Backlog,
            AssignmentType::Unassigned => Self::Unassigned,
        }
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unassigned" => Ok(Self::Unassigned),
            "backlog" => Ok(Self::Backlog),
            "pool" => Ok(Self::Pool),
            "specific" => Ok(Self::Specific),
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "declined" => Ok(Self::Declined),
            _ => Err(DomainError::InvalidItemStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Returns the string representation of the priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(DomainError::InvalidPriority(s.to_string())),
        }
    }
}

/// A concrete slot chosen for a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotSelection {
    /// The lesson date.
    pub date: Date,
    /// The lesson window.
    pub window: TimeWindow,
    /// The arena (or other resource) to use, if any.
    pub resource_id: Option<ResourceId>,
}

/// The unit tracked by the assignment state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulableItem {
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub title: String,
    pub status: ItemStatus,
    pub assignment_type: AssignmentType,
    /// Present iff `assignment_type` is `Specific`.
    pub assigned_to: Option<ActorId>,
    pub scheduled_date: Option<Date>,
    pub priority: Priority,
    pub created_by: ActorId,
    /// The coach a lesson was requested from.
    pub provider_id: Option<ProviderId>,
    /// The slot the requester asked for.
    pub requested_slot: Option<SlotSelection>,
    /// The slot the provider committed to.
    pub confirmed_slot: Option<SlotSelection>,
    pub reported_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
    pub completed_by: Option<ActorId>,
    pub completion_notes: Option<String>,
    pub cancelled_at: Option<OffsetDateTime>,
    pub cancelled_by: Option<ActorId>,
    /// Reason given when cancelling or declining.
    pub closing_reason: Option<String>,
    /// Incremented on every committed transition.
    pub version: u64,
}

impl SchedulableItem {
    /// Returns true if the item is a lesson request.
    #[must_use]
    pub const fn is_lesson(&self) -> bool {
        matches!(self.kind, ItemKind::LessonRequest)
    }
}

/// Checks the structural invariants of an item.
///
/// # Errors
///
/// Returns an error if:
/// - A specifically assigned item has no assignee
/// - A non-specific item records an assignee
/// - A completed item has no completion time
pub fn validate_item_invariants(item: &SchedulableItem) -> Result<(), DomainError> {
    let item_id: i64 = item.item_id.value();

    match (item.assignment_type, item.assigned_to.is_some()) {
        (AssignmentType::Specific, false) => {
            return Err(DomainError::AssignmentWithoutAssignee { item_id });
        }
        (AssignmentType::Pool | AssignmentType::Backlog | AssignmentType::Unassigned, true) => {
            return Err(DomainError::UnexpectedAssignee { item_id });
        }
        _ => {}
    }

    if item.status == ItemStatus::Completed && item.completed_at.is_none() {
        return Err(DomainError::CompletionWithoutTimestamp { item_id });
    }

    Ok(())
}
