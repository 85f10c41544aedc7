// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, NewItem};
use crate::error::CoreError;
use crate::state::{
    BookingCheck, SideEffect, TransitionContext, TransitionResult, TransitionWarning,
};
use paddock_audit::{Action, Actor, AuditEvent, StateSnapshot};
use paddock_domain::{
    ActorId, AssignmentType, AvailabilityMode, AvailabilityQuery, ItemId, ItemKind, ItemStatus,
    ResolveMode, ResourceId, ResourceRequirement, Role, SchedulableItem, SlotSelection,
    TimeSlotAvailability, find_slot, resolve_availability, validate_item_invariants,
    validate_title,
};

/// Creates a new item from caller-supplied fields.
///
/// Tasks start in `backlog`, or `unassigned` when reported by a client.
/// Lesson requests start in `pending`. No date or assignee is set on create.
///
/// # Arguments
///
/// * `item_id` - The identifier allocated by the store
/// * `new_item` - The caller-supplied fields
/// * `context` - The caller, cause and evaluation time
///
/// # Errors
///
/// Returns an error if:
/// - The title is blank or too long
/// - A lesson request names no provider
pub fn create_item(
    item_id: ItemId,
    new_item: NewItem,
    context: &TransitionContext,
) -> Result<TransitionResult, CoreError> {
    validate_title(&new_item.title)?;

    let (status, assignment_type, provider_id, requested_slot) = match new_item.kind {
        ItemKind::Task => {
            let assignment_type: AssignmentType = if context.actor.role == Role::Client {
                AssignmentType::Unassigned
            } else {
                AssignmentType::Backlog
            };
            (
                ItemStatus::for_assignment(assignment_type),
                assignment_type,
                None,
                None,
            )
        }
        ItemKind::LessonRequest => {
            let provider_id = new_item
                .provider_id
                .ok_or(CoreError::MissingField("provider_id"))?;
            (
                ItemStatus::Pending,
                AssignmentType::Unassigned,
                Some(provider_id),
                new_item.requested_slot,
            )
        }
    };

    let item: SchedulableItem = SchedulableItem {
        item_id,
        kind: new_item.kind,
        title: new_item.title.trim().to_string(),
        status,
        assignment_type,
        assigned_to: None,
        scheduled_date: None,
        priority: new_item.priority,
        created_by: context.actor.id.clone(),
        provider_id,
        requested_slot,
        confirmed_slot: None,
        reported_at: context.now,
        completed_at: None,
        completed_by: None,
        completion_notes: None,
        cancelled_at: None,
        cancelled_by: None,
        closing_reason: None,
        version: 0,
    };
    validate_item_invariants(&item)?;

    let action: Action = Action::new(
        String::from("create"),
        Some(format!("Created {} '{}'", item.kind.as_str(), item.title)),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        item_id,
        context.now,
        context.actor.clone(),
        context.cause.clone(),
        action,
        StateSnapshot::empty(),
        StateSnapshot::from_item(&item),
    );

    Ok(TransitionResult {
        new_item: item,
        audit_event,
        warnings: Vec::new(),
        side_effects: Vec::new(),
    })
}

/// Applies a command to an item, producing the next item and an audit event.
///
/// This function is pure: the input item is never modified and nothing is
/// written. The caller commits `new_item` against the input item's version
/// and performs the returned side effects.
///
/// Checks run in a fixed order: the (state, event) pair first, then the
/// caller's authority, then the payload.
///
/// # Arguments
///
/// * `item` - The item as loaded at call time
/// * `command` - The event to apply
/// * `context` - The caller, cause, evaluation time and lookups
///
/// # Errors
///
/// Returns an error if:
/// - The event is not permitted from the current state (a conflict)
/// - The caller's role or identity does not permit the event
/// - A required reason or booking input is missing
/// - An accepted slot is not free in combined mode
pub fn apply(
    item: &SchedulableItem,
    command: Command,
    context: &TransitionContext,
) -> Result<TransitionResult, CoreError> {
    let event: &'static str = command.name();
    if !is_permitted(item, &command) {
        return Err(CoreError::InvalidTransition {
            item_id: item.item_id,
            from: item.status,
            event,
        });
    }

    let actor: &Actor = &context.actor;
    let mut next: SchedulableItem = item.clone();
    let mut warnings: Vec<TransitionWarning> = Vec::new();
    let mut side_effects: Vec<SideEffect> = Vec::new();

    let details: Option<String> = match command {
        Command::AssignToPool { date } => {
            require_triage_role(actor, event)?;
            next.status = ItemStatus::Pool;
            next.assignment_type = AssignmentType::Pool;
            next.assigned_to = None;
            next.scheduled_date = Some(date);
            Some(format!("Pooled for {date}"))
        }
        Command::AssignToPerson { assignee, date } => {
            require_triage_role(actor, event)?;
            if context
                .assignee_eligibility
                .is_some_and(|eligibility| !eligibility.is_eligible())
            {
                warnings.push(TransitionWarning::AssigneeNotOnDuty {
                    assignee: assignee.clone(),
                    date,
                });
            }
            let details: String = format!("Assigned to {assignee} for {date}");
            next.status = ItemStatus::Specific;
            next.assignment_type = AssignmentType::Specific;
            next.assigned_to = Some(assignee);
            next.scheduled_date = Some(date);
            Some(details)
        }
        Command::ReassignToPool => {
            require_triage_role(actor, event)?;
            next.status = ItemStatus::Pool;
            next.assignment_type = AssignmentType::Pool;
            next.assigned_to = None;
            item.assigned_to
                .as_ref()
                .map(|previous| format!("Returned to pool from {previous}"))
        }
        Command::Unschedule => {
            require_triage_role(actor, event)?;
            next.status = ItemStatus::Backlog;
            next.assignment_type = AssignmentType::Backlog;
            next.assigned_to = None;
            next.scheduled_date = None;
            None
        }
        Command::Complete { notes } => {
            require_completer(item, actor, event)?;
            next.status = ItemStatus::Completed;
            next.completed_at = Some(context.now);
            next.completed_by = Some(actor.id.clone());
            next.completion_notes = non_blank(notes);
            next.completion_notes.clone()
        }
        Command::Reopen => {
            let original_assignee: Option<&ActorId> =
                item.assigned_to.as_ref().or(item.completed_by.as_ref());
            if actor.role != Role::Admin && original_assignee != Some(&actor.id) {
                return Err(CoreError::Unauthorized {
                    action: event,
                    required_role: "admin or the original assignee",
                });
            }
            next.status = if item.is_lesson() {
                ItemStatus::Confirmed
            } else {
                ItemStatus::for_assignment(item.assignment_type)
            };
            next.completed_at = None;
            next.completed_by = None;
            next.completion_notes = None;
            None
        }
        Command::Cancel { reason } => {
            let reason: Option<String> = if item.is_lesson() {
                if actor.role != Role::Admin
                    && actor.id != item.created_by
                    && !is_provider_coach(item, actor)
                {
                    return Err(CoreError::Unauthorized {
                        action: event,
                        required_role: "the requester, the provider coach or admin",
                    });
                }
                Some(required_reason(reason)?)
            } else {
                if actor.role != Role::Admin {
                    return Err(CoreError::Unauthorized {
                        action: event,
                        required_role: "admin",
                    });
                }
                non_blank(reason)
            };

            if item.status == ItemStatus::Confirmed {
                side_effects.extend(release_lesson(item));
            }
            next.status = ItemStatus::Cancelled;
            next.cancelled_at = Some(context.now);
            next.cancelled_by = Some(actor.id.clone());
            next.closing_reason.clone_from(&reason);
            reason
        }
        Command::Accept { slot } => {
            require_provider_or_admin(item, actor, event)?;
            let booking: &BookingCheck = context
                .booking
                .as_ref()
                .ok_or(CoreError::MissingField("provider availability"))?;
            if item.provider_id.as_ref() != Some(&booking.provider.provider_id) {
                return Err(CoreError::MissingField("provider availability"));
            }

            let resource_id: Option<ResourceId> = check_slot_free(&slot, booking)?;
            let provider_id = booking.provider.provider_id.clone();

            side_effects.push(SideEffect::AttachReservation {
                item_id: item.item_id,
                provider_id: provider_id.clone(),
                resource_id: resource_id.clone(),
                date: slot.date,
                window: slot.window,
            });
            if matches!(booking.provider.mode, AvailabilityMode::Specific(_)) {
                side_effects.push(SideEffect::BookSpecificSlot {
                    provider_id: provider_id.clone(),
                    date: slot.date,
                    window: slot.window,
                });
            }

            let details: String = format!(
                "Confirmed {} on {}{}",
                slot.window,
                slot.date,
                resource_id
                    .as_ref()
                    .map_or_else(String::new, |id| format!(" in {id}"))
            );
            next.status = ItemStatus::Confirmed;
            next.assignment_type = AssignmentType::Specific;
            next.assigned_to = Some(ActorId::new(provider_id.value()));
            next.scheduled_date = Some(slot.date);
            next.confirmed_slot = Some(SlotSelection {
                date: slot.date,
                window: slot.window,
                resource_id,
            });
            Some(details)
        }
        Command::Decline { reason } => {
            require_provider_or_admin(item, actor, event)?;
            let reason: String = required_reason(reason)?;
            next.status = ItemStatus::Declined;
            next.closing_reason = Some(reason.clone());
            Some(reason)
        }
    };

    validate_item_invariants(&next)?;
    next.version = item.version.saturating_add(1);

    let audit_event: AuditEvent = AuditEvent::new(
        item.item_id,
        context.now,
        actor.clone(),
        context.cause.clone(),
        Action::new(event.to_string(), details),
        StateSnapshot::from_item(item),
        StateSnapshot::from_item(&next),
    );

    Ok(TransitionResult {
        new_item: next,
        audit_event,
        warnings,
        side_effects,
    })
}

/// The transition table. Every pair not listed here is a conflict.
const fn is_permitted(item: &SchedulableItem, command: &Command) -> bool {
    let status: ItemStatus = item.status;
    match (item.kind, command) {
        (ItemKind::Task, Command::AssignToPool { .. }) => {
            matches!(status, ItemStatus::Backlog | ItemStatus::Unassigned)
        }
        (ItemKind::Task, Command::AssignToPerson { .. }) => matches!(
            status,
            ItemStatus::Backlog | ItemStatus::Unassigned | ItemStatus::Pool
        ),
        (ItemKind::Task, Command::ReassignToPool | Command::Complete { .. }) => {
            matches!(status, ItemStatus::Specific | ItemStatus::Pool)
        }
        (ItemKind::Task, Command::Unschedule) => matches!(
            status,
            ItemStatus::Specific | ItemStatus::Pool | ItemStatus::Backlog
        ),
        (ItemKind::LessonRequest, Command::Complete { .. }) => {
            matches!(status, ItemStatus::Confirmed)
        }
        (ItemKind::LessonRequest, Command::Accept { .. } | Command::Decline { .. }) => {
            matches!(status, ItemStatus::Pending)
        }
        (_, Command::Reopen) => matches!(status, ItemStatus::Completed),
        (_, Command::Cancel { .. }) => !status.is_terminal(),
        (
            ItemKind::LessonRequest,
            Command::AssignToPool { .. }
            | Command::AssignToPerson { .. }
            | Command::ReassignToPool
            | Command::Unschedule,
        )
        | (ItemKind::Task, Command::Accept { .. } | Command::Decline { .. }) => false,
    }
}

fn require_triage_role(actor: &Actor, event: &'static str) -> Result<(), CoreError> {
    if matches!(actor.role, Role::Admin | Role::Staff) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized {
            action: event,
            required_role: "admin or staff",
        })
    }
}

fn is_provider_coach(item: &SchedulableItem, actor: &Actor) -> bool {
    item.provider_id
        .as_ref()
        .is_some_and(|provider_id| provider_id.value() == actor.id.value())
}

fn require_provider_or_admin(
    item: &SchedulableItem,
    actor: &Actor,
    event: &'static str,
) -> Result<(), CoreError> {
    if actor.role == Role::Admin || is_provider_coach(item, actor) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized {
            action: event,
            required_role: "the provider coach or admin",
        })
    }
}

fn require_completer(
    item: &SchedulableItem,
    actor: &Actor,
    event: &'static str,
) -> Result<(), CoreError> {
    if item.is_lesson() {
        return require_provider_or_admin(item, actor, event);
    }

    let allowed: bool = match item.assignment_type {
        AssignmentType::Pool => matches!(actor.role, Role::Admin | Role::Staff),
        _ => actor.role == Role::Admin || item.assigned_to.as_ref() == Some(&actor.id),
    };
    if allowed {
        Ok(())
    } else {
        Err(CoreError::Unauthorized {
            action: event,
            required_role: match item.assignment_type {
                AssignmentType::Pool => "staff or admin",
                _ => "the assignee or admin",
            },
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_reason(reason: Option<String>) -> Result<String, CoreError> {
    non_blank(reason).ok_or(CoreError::MissingField("reason"))
}

fn release_lesson(item: &SchedulableItem) -> Vec<SideEffect> {
    let mut effects: Vec<SideEffect> = vec![SideEffect::ReleaseReservation {
        item_id: item.item_id,
    }];
    if let (Some(provider_id), Some(slot)) = (&item.provider_id, &item.confirmed_slot) {
        effects.push(SideEffect::ReleaseSpecificSlot {
            provider_id: provider_id.clone(),
            date: slot.date,
            window: slot.window,
        });
    }
    effects
}

/// Re-checks a lesson slot in combined mode.
///
/// Returns the resource to book: the requested one, or the lowest free
/// resource id when none was requested.
fn check_slot_free(
    slot: &SlotSelection,
    booking: &BookingCheck,
) -> Result<Option<ResourceId>, CoreError> {
    let unavailable = || CoreError::SlotUnavailable {
        date: slot.date,
        window: slot.window,
    };
    let provider = &booking.provider;

    let resource_ids: Vec<ResourceId> = if provider.consumes_resources {
        booking.resource_ids.clone()
    } else {
        Vec::new()
    };
    let query: AvailabilityQuery = AvailabilityQuery {
        date_from: slot.date,
        date_to: slot.date,
        resource_ids: resource_ids.clone(),
        mode: ResolveMode::Combined,
    };
    let slots: Vec<TimeSlotAvailability> =
        resolve_availability(provider, &query, &booking.venue, &booking.reservations)?;
    let candidate: &TimeSlotAvailability =
        find_slot(&slots, slot.date, &slot.window).ok_or_else(unavailable)?;

    if !provider.consumes_resources {
        return if candidate.is_free(&[], &ResourceRequirement::AnyResource) {
            Ok(None)
        } else {
            Err(unavailable())
        };
    }

    match &slot.resource_id {
        Some(resource_id) => {
            let requirement: ResourceRequirement =
                ResourceRequirement::Specific(resource_id.clone());
            if resource_ids.contains(resource_id) && candidate.is_free(&resource_ids, &requirement)
            {
                Ok(Some(resource_id.clone()))
            } else {
                Err(unavailable())
            }
        }
        None => {
            if !candidate.is_free(&resource_ids, &ResourceRequirement::AnyResource) {
                return Err(unavailable());
            }
            candidate
                .free_resources(&resource_ids)
                .first()
                .map(|id| Some((*id).clone()))
                .ok_or_else(unavailable)
        }
    }
}
