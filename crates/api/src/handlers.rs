// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Handlers are synchronous and generic over [`SchedulingBackend`]. Each
//! call reads what it needs at call time, runs the pure core function, and
//! commits the result against the version it read.

use paddock::{
    AssigneeEligibility, BookingCheck, BulkAssignOutcome, Command, NewItem, SideEffect,
    TransitionContext, TransitionResult, apply, apply_bulk_assign,
};
use paddock_audit::{AuditEvent, Cause};
use paddock_domain::{
    ActorId, AvailabilityMode, AvailabilityQuery, DomainError, ItemId, ItemKind, Priority,
    Provider, ProviderId, RecurringRule, Reservation, ResolveMode, ResourceId, ResourceRequirement,
    SchedulableItem, SlotChoice, SlotSelection, SpecificSlot, TimeSlotAvailability, VenueHours,
    first_free_slot, parse_date, parse_window, resolve_availability, validate_availability,
    validate_booked_slots_preserved,
};
use std::collections::BTreeMap;
use std::str::FromStr;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    AuditTimelineResponse, AvailabilityModeRequest, AvailabilityRequest, AvailabilityResponse,
    BulkAssignRequest, BulkAssignResponse, BulkFailureResponse, CreateItemRequest, ItemResponse,
    SetAvailabilityRequest, SetAvailabilityResponse, SlotChoiceResponse, SlotRequest,
    SlotResponse, TransitionRequest, TransitionResponse,
};
use crate::store::{AuditSink, SchedulingBackend, StoreError};

/// How many times a transition is re-validated after losing a commit race.
pub const MAX_RECHECKS: u8 = 3;

/// Resolves a provider's slots for a date range.
///
/// # Arguments
///
/// * `backend` - The store to read providers and reservations from
/// * `request` - Provider, resources, range, conflict mode and notice
/// * `venue` - The venue default working window
/// * `now` - The evaluation time, used only for the minimum notice filter
///
/// # Errors
///
/// Returns an error if:
/// - The provider does not exist
/// - A date or the mode cannot be parsed
/// - The range is invalid, or the provider consumes resources and none were given
pub fn get_availability<B: SchedulingBackend>(
    backend: &B,
    request: &AvailabilityRequest,
    venue: &VenueHours,
    now: OffsetDateTime,
) -> Result<AvailabilityResponse, ApiError> {
    let provider_id: ProviderId = ProviderId::new(&request.provider_id);
    let provider: Provider = backend.load_provider(&provider_id)?;

    let date_from: Date = parse_date(&request.date_from).map_err(translate_domain_error)?;
    let date_to: Date = parse_date(&request.date_to).map_err(translate_domain_error)?;
    let resource_ids: Vec<ResourceId> = parse_resource_ids(request.resource_ids.as_deref());
    let mode: ResolveMode = parse_resolve_mode(request.mode.as_deref())?;
    let requirement: ResourceRequirement = parse_requirement(
        request.resource_id.as_deref(),
        &resource_ids,
        provider.consumes_resources,
    )?;

    debug!(
        provider_id = %provider_id,
        %date_from,
        %date_to,
        resources = resource_ids.len(),
        "Resolving availability"
    );

    let query: AvailabilityQuery = AvailabilityQuery {
        date_from,
        date_to,
        resource_ids,
        mode,
    };
    let reservations: Vec<Reservation> = backend.reservations_between(date_from, date_to);
    let mut slots: Vec<TimeSlotAvailability> =
        resolve_availability(&provider, &query, venue, &reservations)
            .map_err(translate_domain_error)?;

    if let Some(minutes) = request.min_notice_minutes {
        let cutoff: OffsetDateTime = now
            .checked_add(Duration::minutes(i64::from(minutes)))
            .ok_or_else(|| ApiError::InvalidInput {
                field: String::from("min_notice_minutes"),
                message: format!("A notice of {minutes} minutes is out of range"),
            })?;
        slots.retain(|slot| {
            PrimitiveDateTime::new(slot.date, slot.window.start()).assume_offset(now.offset())
                >= cutoff
        });
    }

    // Providers without resources resolve against an empty set
    let effective_ids: &[ResourceId] = if provider.consumes_resources {
        &query.resource_ids
    } else {
        &[]
    };
    let next_free: Option<SlotChoice> = first_free_slot(&slots, effective_ids, &requirement);

    Ok(AvailabilityResponse {
        provider_id: provider_id.value().to_string(),
        slots: slots
            .iter()
            .map(|slot| {
                SlotResponse::new(slot, slot.is_free(effective_ids, &requirement), effective_ids)
            })
            .collect(),
        next_free: next_free.as_ref().map(SlotChoiceResponse::from),
    })
}

/// Creates a task or lesson request.
///
/// # Errors
///
/// Returns an error if:
/// - The kind or priority is unknown, or a slot cannot be parsed
/// - A lesson request names no provider, or a provider that does not exist
/// - The title is blank or too long
pub fn create_item<B: SchedulingBackend>(
    backend: &mut B,
    request: &CreateItemRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ItemResponse, ApiError> {
    let kind: ItemKind = ItemKind::from_str(&request.kind).map_err(translate_domain_error)?;
    let priority: Priority = match request.priority.as_deref() {
        Some(value) => Priority::from_str(value).map_err(translate_domain_error)?,
        None => Priority::default(),
    };
    let provider_id: Option<ProviderId> = request.provider_id.as_deref().map(ProviderId::new);
    if kind == ItemKind::LessonRequest
        && let Some(provider_id) = &provider_id
    {
        backend.load_provider(provider_id)?;
    }
    let requested_slot: Option<SlotSelection> = request
        .requested_slot
        .as_ref()
        .map(parse_slot)
        .transpose()
        .map_err(translate_domain_error)?;

    let new_item: NewItem = NewItem {
        kind,
        title: request.title.clone(),
        priority,
        provider_id,
        requested_slot,
    };
    let context: TransitionContext =
        TransitionContext::new(authenticated_actor.to_audit_actor(), cause, now);

    let item_id: ItemId = backend.allocate_item_id();
    let result: TransitionResult =
        paddock::create_item(item_id, new_item, &context).map_err(translate_core_error)?;
    backend.insert_item(result.new_item.clone())?;
    record_audit(backend, result.audit_event);

    info!(
        item_id = item_id.value(),
        kind = kind.as_str(),
        actor_id = %authenticated_actor.id,
        "Created item"
    );

    Ok(ItemResponse::from(&result.new_item))
}

/// Loads one item.
///
/// # Errors
///
/// Returns an error if the item does not exist.
pub fn get_item<B: SchedulingBackend>(backend: &B, item_id: i64) -> Result<ItemResponse, ApiError> {
    let item: SchedulableItem = backend.load_item(ItemId::new(item_id))?;
    Ok(ItemResponse::from(&item))
}

/// Applies one transition event to an item and commits it.
///
/// The item is read once, the transition computed, then committed against
/// the version read. A commit that loses a race reloads the item and
/// re-validates, up to [`MAX_RECHECKS`] times.
///
/// # Arguments
///
/// * `backend` - The store
/// * `item_id` - The item to transition
/// * `request` - The event and its payload
/// * `authenticated_actor` - The caller
/// * `cause` - Why the transition was requested
/// * `venue` - The venue working window, used when accepting lessons
/// * `now` - The evaluation time
///
/// # Errors
///
/// Returns an error if:
/// - The item does not exist
/// - The event is not permitted from the item's current state (conflict)
/// - The caller may not perform the event
/// - The payload is invalid or incomplete
/// - The lesson slot is no longer free (conflict)
pub fn submit_transition<B: SchedulingBackend>(
    backend: &mut B,
    item_id: i64,
    request: &TransitionRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    venue: &VenueHours,
    now: OffsetDateTime,
) -> Result<TransitionResponse, ApiError> {
    let snapshot: SchedulableItem = backend.load_item(ItemId::new(item_id))?;
    submit_against_snapshot(
        backend,
        snapshot,
        request,
        authenticated_actor,
        cause,
        venue,
        now,
    )
}

/// Runs a transition starting from an already loaded (possibly stale) item.
pub(crate) fn submit_against_snapshot<B: SchedulingBackend>(
    backend: &mut B,
    snapshot: SchedulableItem,
    request: &TransitionRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    venue: &VenueHours,
    now: OffsetDateTime,
) -> Result<TransitionResponse, ApiError> {
    let mut item: SchedulableItem = snapshot;
    let mut rechecks: u8 = 0;

    loop {
        let command: Command = build_command(&item, request)?;
        let event: &'static str = command.name();
        let context: TransitionContext = build_context(
            backend,
            &item,
            &command,
            authenticated_actor,
            cause.clone(),
            venue,
            now,
        )?;
        let result: TransitionResult =
            apply(&item, command, &context).map_err(translate_core_error)?;

        match commit_transition(backend, &result, item.version) {
            Ok(()) => {
                info!(
                    item_id = item.item_id.value(),
                    event,
                    status = result.new_item.status.as_str(),
                    version = result.new_item.version,
                    "Committed transition"
                );
                return Ok(transition_response(&result));
            }
            Err(StoreError::VersionConflict { actual, .. }) if rechecks < MAX_RECHECKS => {
                rechecks += 1;
                warn!(
                    item_id = item.item_id.value(),
                    event,
                    expected = item.version,
                    actual,
                    rechecks,
                    "Item changed before commit, re-validating"
                );
                item = backend.load_item(item.item_id)?;
            }
            Err(err) => return Err(ApiError::from(err)),
        }
    }
}

/// Assigns several tasks to one person for one date.
///
/// Each item succeeds or fails on its own; failures leave their item
/// untouched and do not roll back the others.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not admin or staff
/// - The date cannot be parsed
pub fn bulk_assign<B: SchedulingBackend>(
    backend: &mut B,
    request: &BulkAssignRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<BulkAssignResponse, ApiError> {
    AuthorizationService::authorize_bulk_assign(authenticated_actor)?;

    let assignee: ActorId = ActorId::new(&request.assignee);
    let date: Date = parse_date(&request.date).map_err(translate_domain_error)?;
    let item_ids: Vec<ItemId> = request.item_ids.iter().copied().map(ItemId::new).collect();

    let mut items: BTreeMap<ItemId, SchedulableItem> = BTreeMap::new();
    for item_id in &item_ids {
        if let Ok(item) = backend.load_item(*item_id) {
            items.insert(*item_id, item);
        }
    }

    let eligibility: AssigneeEligibility = AssigneeEligibility {
        on_duty: backend.is_on_duty(&assignee, date),
        explicitly_permitted: backend.is_explicitly_permitted(&assignee),
    };
    let context: TransitionContext =
        TransitionContext::new(authenticated_actor.to_audit_actor(), cause, now)
            .with_eligibility(eligibility);

    let outcome: BulkAssignOutcome =
        apply_bulk_assign(&item_ids, &items, &assignee, date, &context);

    let mut response: BulkAssignResponse = BulkAssignResponse {
        succeeded: Vec::new(),
        failed: outcome
            .failed
            .into_iter()
            .map(|failure| {
                bulk_failure(failure.item_id, &translate_core_error(failure.error))
            })
            .collect(),
    };

    for result in outcome.succeeded {
        let item_id: ItemId = result.new_item.item_id;
        let expected_version: u64 = items.get(&item_id).map_or(0, |item| item.version);
        match commit_transition(backend, &result, expected_version) {
            Ok(()) => response.succeeded.push(transition_response(&result)),
            Err(err) => response
                .failed
                .push(bulk_failure(item_id, &ApiError::from(err))),
        }
    }
    response.failed.sort_by_key(|failure| failure.item_id);

    info!(
        actor_id = %authenticated_actor.id,
        assignee = %assignee,
        %date,
        succeeded = response.succeeded.len(),
        failed = response.failed.len(),
        "Completed bulk assignment"
    );

    Ok(response)
}

/// Replaces a provider's availability configuration.
///
/// Booked explicit slots must appear unchanged in the replacement; their
/// booked flag is carried over.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is neither an admin nor the provider coach
/// - The provider does not exist
/// - A rule or slot cannot be parsed, has start >= end, or overlaps another
/// - The slot duration is zero
/// - A booked slot would be dropped or altered
pub fn set_availability<B: SchedulingBackend>(
    backend: &mut B,
    provider_id: &str,
    request: &SetAvailabilityRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<SetAvailabilityResponse, ApiError> {
    let provider_id: ProviderId = ProviderId::new(provider_id);
    AuthorizationService::authorize_set_availability(authenticated_actor, &provider_id)?;

    let mut provider: Provider = backend.load_provider(&provider_id)?;
    let mut replacement: AvailabilityMode =
        parse_availability_mode(&request.availability).map_err(translate_domain_error)?;

    let booked: Vec<SpecificSlot> = provider.mode.booked_slots();
    if let AvailabilityMode::Specific(slots) = &mut replacement {
        for slot in slots.iter_mut() {
            slot.booked = booked
                .iter()
                .any(|b| b.date == slot.date && b.window == slot.window);
        }
    }

    validate_availability(&replacement, request.slot_duration_minutes)
        .map_err(translate_domain_error)?;
    validate_booked_slots_preserved(&provider.mode, &replacement)
        .map_err(translate_domain_error)?;

    provider.mode = replacement;
    provider.slot_duration_minutes = request.slot_duration_minutes;
    let mode: &'static str = provider.mode.as_str();
    backend.save_provider(provider);

    info!(
        provider_id = %provider_id,
        mode,
        slot_duration_minutes = request.slot_duration_minutes,
        actor_id = %authenticated_actor.id,
        "Replaced provider availability"
    );

    Ok(SetAvailabilityResponse {
        provider_id: provider_id.value().to_string(),
        mode: mode.to_string(),
        slot_duration_minutes: request.slot_duration_minutes,
        message: format!("Updated availability for '{provider_id}'"),
    })
}

/// Returns the audit events recorded for an item, oldest first.
///
/// # Errors
///
/// Returns an error if the caller is not admin or staff, or the item does
/// not exist.
pub fn audit_timeline<B: SchedulingBackend>(
    backend: &B,
    item_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<AuditTimelineResponse, ApiError> {
    AuthorizationService::authorize_audit_timeline(authenticated_actor)?;

    let item_id: ItemId = ItemId::new(item_id);
    backend.load_item(item_id)?;
    let events: Vec<AuditEvent> = backend.timeline(item_id);

    Ok(AuditTimelineResponse {
        item_id: item_id.value(),
        events,
    })
}

/// Converts an availability configuration from its request form.
///
/// # Errors
///
/// Returns an error if a date, time, window or weekday is invalid.
pub fn parse_availability_mode(
    request: &AvailabilityModeRequest,
) -> Result<AvailabilityMode, DomainError> {
    match request {
        AvailabilityModeRequest::Always => Ok(AvailabilityMode::Always),
        AvailabilityModeRequest::None => Ok(AvailabilityMode::None),
        AvailabilityModeRequest::Recurring { rules } => rules
            .iter()
            .map(|rule| RecurringRule::new(rule.day_of_week, parse_window(&rule.start, &rule.end)?))
            .collect::<Result<Vec<RecurringRule>, DomainError>>()
            .map(AvailabilityMode::Recurring),
        AvailabilityModeRequest::Specific { slots } => slots
            .iter()
            .map(|slot| {
                Ok(SpecificSlot::new(
                    parse_date(&slot.date)?,
                    parse_window(&slot.start, &slot.end)?,
                ))
            })
            .collect::<Result<Vec<SpecificSlot>, DomainError>>()
            .map(AvailabilityMode::Specific),
    }
}

/// Converts a caller-named slot.
fn parse_slot(slot: &SlotRequest) -> Result<SlotSelection, DomainError> {
    Ok(SlotSelection {
        date: parse_date(&slot.date)?,
        window: parse_window(&slot.start, &slot.end)?,
        resource_id: slot.resource_id.as_deref().map(ResourceId::new),
    })
}

/// Splits a comma-separated resource list, dropping blanks and duplicates.
fn parse_resource_ids(value: Option<&str>) -> Vec<ResourceId> {
    let mut ids: Vec<ResourceId> = value
        .unwrap_or_default()
        .split(',')
        .map(ResourceId::new)
        .filter(|id| !id.value().is_empty())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Builds the resource requirement for a query.
///
/// A named resource must be part of the queried set. Providers that do not
/// consume resources ignore it, as they ignore the set.
fn parse_requirement(
    resource_id: Option<&str>,
    resource_ids: &[ResourceId],
    consumes_resources: bool,
) -> Result<ResourceRequirement, ApiError> {
    let Some(id) = resource_id.map(str::trim).filter(|id| !id.is_empty()) else {
        return Ok(ResourceRequirement::AnyResource);
    };
    if !consumes_resources {
        return Ok(ResourceRequirement::AnyResource);
    }
    let resource_id: ResourceId = ResourceId::new(id);
    if !resource_ids.contains(&resource_id) {
        return Err(ApiError::InvalidInput {
            field: String::from("resource_id"),
            message: format!("Resource '{id}' is not in the queried resource set"),
        });
    }
    Ok(ResourceRequirement::Specific(resource_id))
}

fn parse_resolve_mode(value: Option<&str>) -> Result<ResolveMode, ApiError> {
    match value {
        None | Some("single_provider") => Ok(ResolveMode::SingleProvider),
        Some("combined") => Ok(ResolveMode::Combined),
        Some(other) => Err(ApiError::InvalidInput {
            field: String::from("mode"),
            message: format!("Unknown resolve mode '{other}'"),
        }),
    }
}

/// Builds the core command for a request.
///
/// An `accept` without a slot accepts the requested slot.
fn build_command(item: &SchedulableItem, request: &TransitionRequest) -> Result<Command, ApiError> {
    let command: Command = match request {
        TransitionRequest::AssignToPool { date } => Command::AssignToPool {
            date: parse_date(date).map_err(translate_domain_error)?,
        },
        TransitionRequest::AssignToPerson { assignee, date } => Command::AssignToPerson {
            assignee: ActorId::new(assignee),
            date: parse_date(date).map_err(translate_domain_error)?,
        },
        TransitionRequest::ReassignToPool => Command::ReassignToPool,
        TransitionRequest::Unschedule => Command::Unschedule,
        TransitionRequest::Complete { notes } => Command::Complete {
            notes: notes.clone(),
        },
        TransitionRequest::Reopen => Command::Reopen,
        TransitionRequest::Cancel { reason } => Command::Cancel {
            reason: reason.clone(),
        },
        TransitionRequest::Accept { slot } => {
            let slot: SlotSelection = match slot {
                Some(slot) => parse_slot(slot).map_err(translate_domain_error)?,
                None => item
                    .requested_slot
                    .clone()
                    .ok_or_else(|| ApiError::InvalidInput {
                        field: String::from("slot"),
                        message: String::from("No slot given and none was requested"),
                    })?,
            };
            Command::Accept { slot }
        }
        TransitionRequest::Decline { reason } => Command::Decline {
            reason: reason.clone(),
        },
    };
    Ok(command)
}

/// Gathers the roster or booking facts a command needs.
fn build_context<B: SchedulingBackend>(
    backend: &B,
    item: &SchedulableItem,
    command: &Command,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    venue: &VenueHours,
    now: OffsetDateTime,
) -> Result<TransitionContext, ApiError> {
    let context: TransitionContext =
        TransitionContext::new(authenticated_actor.to_audit_actor(), cause, now);

    match command {
        Command::AssignToPerson { assignee, date } => {
            Ok(context.with_eligibility(AssigneeEligibility {
                on_duty: backend.is_on_duty(assignee, *date),
                explicitly_permitted: backend.is_explicitly_permitted(assignee),
            }))
        }
        Command::Accept { slot } => {
            let Some(provider_id) = &item.provider_id else {
                return Ok(context);
            };
            let provider: Provider = backend.load_provider(provider_id)?;
            let booking: BookingCheck = BookingCheck {
                provider,
                resource_ids: backend
                    .resources()
                    .into_iter()
                    .map(|resource| resource.resource_id)
                    .collect(),
                reservations: backend.reservations_between(slot.date, slot.date),
                venue: *venue,
            };
            Ok(context.with_booking(booking))
        }
        _ => Ok(context),
    }
}

/// Commits a transition result against the version it was computed from.
///
/// Side effects run after the version check and before the item write, so
/// a lost race or a taken slot leaves nothing behind.
fn commit_transition<B: SchedulingBackend>(
    backend: &mut B,
    result: &TransitionResult,
    expected_version: u64,
) -> Result<(), StoreError> {
    let item_id: ItemId = result.new_item.item_id;
    let current: SchedulableItem = backend.load_item(item_id)?;
    if current.version != expected_version {
        return Err(StoreError::VersionConflict {
            item_id,
            expected: expected_version,
            actual: current.version,
        });
    }

    // The only fallible effect goes first
    for effect in &result.side_effects {
        if let SideEffect::BookSpecificSlot {
            provider_id,
            date,
            window,
        } = effect
        {
            backend.book_specific_slot(provider_id, *date, *window)?;
        }
    }
    for effect in &result.side_effects {
        match effect {
            SideEffect::AttachReservation {
                item_id,
                provider_id,
                resource_id,
                date,
                window,
            } => {
                let reservation: Reservation = backend.attach_reservation(
                    *item_id,
                    provider_id.clone(),
                    resource_id.clone(),
                    *date,
                    *window,
                );
                debug!(
                    item_id = item_id.value(),
                    reservation_id = reservation.reservation_id,
                    "Attached reservation"
                );
            }
            SideEffect::ReleaseReservation { item_id } => {
                if let Some(reservation) = backend.release_reservation(*item_id) {
                    debug!(
                        item_id = item_id.value(),
                        reservation_id = reservation.reservation_id,
                        "Released reservation"
                    );
                }
            }
            SideEffect::ReleaseSpecificSlot {
                provider_id,
                date,
                window,
            } => backend.release_specific_slot(provider_id, *date, *window),
            SideEffect::BookSpecificSlot { .. } => {}
        }
    }

    backend.commit_item(result.new_item.clone(), expected_version)?;
    record_audit(backend, result.audit_event.clone());
    Ok(())
}

/// Delivers an audit event. A refused event is logged and dropped.
fn record_audit<B: AuditSink>(backend: &mut B, event: AuditEvent) {
    let item_id: ItemId = event.item_id;
    let action: String = event.action.name.clone();
    if let Err(err) = backend.record(event) {
        warn!(
            item_id = item_id.value(),
            action = %action,
            error = %err,
            "Audit event dropped"
        );
    }
}

fn transition_response(result: &TransitionResult) -> TransitionResponse {
    for warning in &result.warnings {
        warn!(item_id = result.new_item.item_id.value(), %warning, "Transition warning");
    }
    TransitionResponse {
        item: ItemResponse::from(&result.new_item),
        warnings: result.warnings.iter().map(ToString::to_string).collect(),
    }
}

fn bulk_failure(item_id: ItemId, err: &ApiError) -> BulkFailureResponse {
    let kind: &str = match err {
        ApiError::Conflict { .. } => "conflict",
        ApiError::Unauthorized { .. } | ApiError::AuthenticationFailed { .. } => "unauthorized",
        ApiError::InvalidInput { .. } => "invalid_input",
        ApiError::ResourceNotFound { .. } => "not_found",
        ApiError::Internal { .. } => "internal",
    };
    BulkFailureResponse {
        item_id: item_id.value(),
        kind: String::from(kind),
        message: err.to_string(),
    }
}
