// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk day assignment.
//!
//! A bulk assignment is a sequence of independent `assign_to_person`
//! transitions sharing one assignee and date. Each item is evaluated
//! against the state left by the items before it, so a repeated id fails
//! the second time. Failures do not stop the run.

use crate::apply::apply;
use crate::command::Command;
use crate::error::CoreError;
use crate::state::{TransitionContext, TransitionResult};
use paddock_domain::{ActorId, ItemId, SchedulableItem};
use std::collections::BTreeMap;
use time::Date;

/// One item that could not be assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    /// The item that failed.
    pub item_id: ItemId,
    /// Why it failed.
    pub error: CoreError,
}

/// The per-item outcome of a bulk assignment, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkAssignOutcome {
    /// Transitions to commit.
    pub succeeded: Vec<TransitionResult>,
    /// Items left untouched.
    pub failed: Vec<BulkFailure>,
}

/// Assigns every listed item to `assignee` on `date`.
///
/// # Arguments
///
/// * `item_ids` - The items to assign, in order
/// * `items` - The items as loaded at call time
/// * `assignee` - The person receiving the items
/// * `date` - The scheduled date
/// * `context` - The caller, cause and roster facts about the assignee
#[must_use]
pub fn apply_bulk_assign(
    item_ids: &[ItemId],
    items: &BTreeMap<ItemId, SchedulableItem>,
    assignee: &ActorId,
    date: Date,
    context: &TransitionContext,
) -> BulkAssignOutcome {
    let mut working: BTreeMap<ItemId, SchedulableItem> = BTreeMap::new();
    let mut outcome: BulkAssignOutcome = BulkAssignOutcome::default();

    for item_id in item_ids {
        let Some(current) = working.get(item_id).or_else(|| items.get(item_id)) else {
            outcome.failed.push(BulkFailure {
                item_id: *item_id,
                error: CoreError::ItemNotFound(*item_id),
            });
            continue;
        };

        let command: Command = Command::AssignToPerson {
            assignee: assignee.clone(),
            date,
        };
        match apply(current, command, context) {
            Ok(result) => {
                working.insert(*item_id, result.new_item.clone());
                outcome.succeeded.push(result);
            }
            Err(error) => outcome.failed.push(BulkFailure {
                item_id: *item_id,
                error,
            }),
        }
    }

    outcome
}
