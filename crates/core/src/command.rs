// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use paddock_domain::{ActorId, ItemKind, Priority, ProviderId, SlotSelection};
use time::Date;

/// A command represents caller intent as data only.
///
/// Commands are the only way to request a change to an existing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Schedule a task for whoever is on duty on `date`.
    AssignToPool {
        /// The scheduled date.
        date: Date,
    },
    /// Schedule a task for a named person on `date`.
    AssignToPerson {
        /// The person the task is assigned to.
        assignee: ActorId,
        /// The scheduled date.
        date: Date,
    },
    /// Return a task to the pool, keeping its date.
    ReassignToPool,
    /// Return a task to the backlog.
    Unschedule,
    /// Mark the work done.
    Complete {
        /// Free-form completion notes.
        notes: Option<String>,
    },
    /// Undo a completion.
    Reopen,
    /// Withdraw the item.
    Cancel {
        /// Why the item was cancelled. Required for lessons.
        reason: Option<String>,
    },
    /// Commit a lesson request to a slot.
    Accept {
        /// The slot the provider commits to.
        slot: SlotSelection,
    },
    /// Refuse a lesson request.
    Decline {
        /// Why the request was declined.
        reason: Option<String>,
    },
}

impl Command {
    /// Returns the event name used in audit records and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AssignToPool { .. } => "assign_to_pool",
            Self::AssignToPerson { .. } => "assign_to_person",
            Self::ReassignToPool => "reassign_to_pool",
            Self::Unschedule => "unschedule",
            Self::Complete { .. } => "complete",
            Self::Reopen => "reopen",
            Self::Cancel { .. } => "cancel",
            Self::Accept { .. } => "accept",
            Self::Decline { .. } => "decline",
        }
    }
}

/// The caller-supplied fields of a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Task or lesson request.
    pub kind: ItemKind,
    /// Short description.
    pub title: String,
    /// Task priority.
    pub priority: Priority,
    /// The coach a lesson is requested from. Ignored for tasks.
    pub provider_id: Option<ProviderId>,
    /// The slot the requester would like. Ignored for tasks.
    pub requested_slot: Option<SlotSelection>,
}
