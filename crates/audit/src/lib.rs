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
    clippy::all
)]

use paddock_domain::{ActorId, ItemId, Role, SchedulableItem};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// Represents the entity performing an action.
///
/// Actors are identified by the id and role supplied with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: ActorId,
    /// The role the actor acted under.
    pub role: Role,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role the actor acted under
    #[must_use]
    pub const fn new(id: ActorId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`AssignToPool`", "`Accept`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The assignment-relevant state of an item at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// A compact `key=value` rendering of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Captures the assignment fields of an item.
    ///
    /// Absent values render as `-`.
    #[must_use]
    pub fn from_item(item: &SchedulableItem) -> Self {
        let assigned_to: &str = item.assigned_to.as_ref().map_or("-", ActorId::value);
        let scheduled_date: String = item
            .scheduled_date
            .map_or_else(|| String::from("-"), |d| d.to_string());

        Self {
            data: format!(
                "status={} assignment={} assigned_to={assigned_to} scheduled_date={scheduled_date} version={}",
                item.status,
                item.assignment_type.as_str(),
                item.version
            ),
        }
    }

    /// The snapshot used for the "before" side of a creation.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: String::from("none"),
        }
    }
}

/// An immutable audit event representing one committed transition.
///
/// Every committed transition produces exactly one audit event capturing
/// who acted, why, what was done and the item state on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Assigned by the sink once recorded.
    pub event_id: Option<i64>,
    /// The item the transition applied to.
    pub item_id: ItemId,
    /// When the transition was evaluated.
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new, unrecorded `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `item_id` - The item the transition applied to
    /// * `occurred_at` - When the transition was evaluated
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub const fn new(
        item_id: ItemId,
        occurred_at: OffsetDateTime,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            item_id,
            occurred_at,
            actor,
            cause,
            action,
            before,
            after,
        }
    }

    /// Returns a copy of this event carrying the given id.
    #[must_use]
    pub fn with_event_id(mut self, event_id: i64) -> Self {
        self.event_id = Some(event_id);
        self
    }
}
