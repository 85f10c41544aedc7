// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use paddock_domain::{ItemId, ReservationStatus, SchedulableItem};
use time::macros::time;

use super::helpers::{
    arena_hire, assign_to, create_lesson, create_task, create_test_admin, create_test_cause,
    create_test_client, create_test_coach, create_test_flat_coach, create_test_staff,
    create_test_store, now, slot_request, transition, venue,
};
use crate::handlers::submit_against_snapshot;
use crate::{
    ApiError, AuditTimelineResponse, CreateItemRequest, InMemoryStore, ItemResponse, ItemStore,
    TransitionRequest, TransitionResponse, audit_timeline, create_item, get_item,
};

#[test]
fn test_create_task_starts_in_backlog() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "  Fix the school gate  ");

    let item: ItemResponse = get_item(&store, item_id).unwrap();
    assert_eq!(item.kind, "task");
    assert_eq!(item.title, "Fix the school gate");
    assert_eq!(item.status, "backlog");
    assert_eq!(item.assignment_type, "backlog");
    assert_eq!(item.priority, "medium");
    assert_eq!(item.created_by, "admin-kim");
    assert_eq!(item.reported_at, "2025-03-10T07:00:00Z");
    assert_eq!(item.version, 0);
}

#[test]
fn test_client_reported_task_is_unassigned() {
    let mut store: InMemoryStore = create_test_store();
    let request: CreateItemRequest = CreateItemRequest {
        kind: String::from("task"),
        title: String::from("Loose shoe on Bramble"),
        priority: Some(String::from("high")),
        provider_id: None,
        requested_slot: None,
    };

    let item: ItemResponse =
        create_item(&mut store, &request, &create_test_client(), create_test_cause(), now())
            .unwrap();

    assert_eq!(item.status, "unassigned");
    assert_eq!(item.priority, "high");
}

#[test]
fn test_create_item_rejects_bad_input() {
    let mut store: InMemoryStore = create_test_store();
    let base: CreateItemRequest = CreateItemRequest {
        kind: String::from("lesson_request"),
        title: String::from("Lesson"),
        priority: None,
        provider_id: None,
        requested_slot: None,
    };

    match create_item(&mut store, &base, &create_test_client(), create_test_cause(), now()) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "provider_id"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let mut unknown_provider: CreateItemRequest = base.clone();
    unknown_provider.provider_id = Some(String::from("coach-nobody"));
    assert!(matches!(
        create_item(&mut store, &unknown_provider, &create_test_client(), create_test_cause(), now()),
        Err(ApiError::ResourceNotFound { .. })
    ));

    let mut blank_title: CreateItemRequest = base.clone();
    blank_title.provider_id = Some(String::from("coach-alex"));
    blank_title.title = String::from("   ");
    match create_item(&mut store, &blank_title, &create_test_client(), create_test_cause(), now()) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "title"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let mut bad_kind: CreateItemRequest = base;
    bad_kind.kind = String::from("errand");
    match create_item(&mut store, &bad_kind, &create_test_client(), create_test_cause(), now()) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "kind"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_assign_on_duty_person_has_no_warning() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "Muck out row B");

    let response: TransitionResponse =
        transition(&mut store, item_id, &assign_to("staff-jo"), &create_test_admin()).unwrap();

    assert!(response.warnings.is_empty());
    assert_eq!(response.item.status, "specific");
    assert_eq!(response.item.assigned_to.as_deref(), Some("staff-jo"));
    assert_eq!(response.item.scheduled_date.as_deref(), Some("2025-03-10"));
    assert_eq!(response.item.version, 1);
    assert_eq!(get_item(&store, item_id).unwrap(), response.item);
}

#[test]
fn test_assign_off_roster_person_warns_but_commits() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "Muck out row B");

    let response: TransitionResponse =
        transition(&mut store, item_id, &assign_to("staff-lee"), &create_test_staff()).unwrap();

    assert_eq!(response.warnings.len(), 1);
    assert!(response.warnings[0].contains("staff-lee is not on duty on 2025-03-10"));
    assert_eq!(get_item(&store, item_id).unwrap().status, "specific");
}

#[test]
fn test_explicit_permission_suppresses_warning() {
    let mut store: InMemoryStore = create_test_store();
    store.permit(paddock_domain::ActorId::new("staff-lee"));
    let item_id: i64 = create_task(&mut store, "Muck out row B");

    let response: TransitionResponse =
        transition(&mut store, item_id, &assign_to("staff-lee"), &create_test_admin()).unwrap();

    assert!(response.warnings.is_empty());
}

#[test]
fn test_unauthorized_caller_is_rejected() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "Muck out row B");

    let result = transition(&mut store, item_id, &assign_to("staff-jo"), &create_test_client());

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert_eq!(get_item(&store, item_id).unwrap().version, 0);
}

#[test]
fn test_unknown_item_is_not_found() {
    let mut store: InMemoryStore = create_test_store();

    let result = transition(&mut store, 99, &TransitionRequest::Reopen, &create_test_admin());

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_cancel_twice_is_a_conflict() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "Muck out row B");
    let cancel: TransitionRequest = TransitionRequest::Cancel { reason: None };

    transition(&mut store, item_id, &cancel, &create_test_admin()).unwrap();
    let second = transition(&mut store, item_id, &cancel, &create_test_admin());

    assert!(matches!(second, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_complete_then_reopen_restores_assignment() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "Muck out row B");
    transition(&mut store, item_id, &assign_to("staff-jo"), &create_test_admin()).unwrap();
    let before: ItemResponse = get_item(&store, item_id).unwrap();

    let completed: TransitionResponse = transition(
        &mut store,
        item_id,
        &TransitionRequest::Complete {
            notes: Some(String::from("Fresh shavings")),
        },
        &create_test_staff(),
    )
    .unwrap();
    assert_eq!(completed.item.status, "completed");
    assert_eq!(completed.item.completed_by.as_deref(), Some("staff-jo"));
    assert_eq!(completed.item.completion_notes.as_deref(), Some("Fresh shavings"));

    let reopened: TransitionResponse =
        transition(&mut store, item_id, &TransitionRequest::Reopen, &create_test_staff()).unwrap();
    assert_eq!(reopened.item.status, before.status);
    assert_eq!(reopened.item.assigned_to, before.assigned_to);
    assert_eq!(reopened.item.scheduled_date, before.scheduled_date);
    assert_eq!(reopened.item.completed_at, None);
    assert_eq!(reopened.item.version, 3);
}

#[test]
fn test_stale_assignment_loses_race() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "Muck out row B");
    let snapshot: SchedulableItem = store.load_item(ItemId::new(item_id)).unwrap();

    transition(&mut store, item_id, &assign_to("staff-jo"), &create_test_admin()).unwrap();
    let second = submit_against_snapshot(
        &mut store,
        snapshot,
        &assign_to("staff-lee"),
        &create_test_staff(),
        create_test_cause(),
        &venue(),
        now(),
    );

    assert!(matches!(second, Err(ApiError::Conflict { .. })));
    let stored: ItemResponse = get_item(&store, item_id).unwrap();
    assert_eq!(stored.assigned_to.as_deref(), Some("staff-jo"));
    assert_eq!(stored.version, 1);
}

#[test]
fn test_stale_request_still_valid_after_recheck_commits() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "Muck out row B");
    let snapshot: SchedulableItem = store.load_item(ItemId::new(item_id)).unwrap();

    transition(
        &mut store,
        item_id,
        &TransitionRequest::AssignToPool {
            date: String::from("2025-03-10"),
        },
        &create_test_staff(),
    )
    .unwrap();
    let response: TransitionResponse = submit_against_snapshot(
        &mut store,
        snapshot,
        &TransitionRequest::Cancel { reason: None },
        &create_test_admin(),
        create_test_cause(),
        &venue(),
        now(),
    )
    .unwrap();

    assert_eq!(response.item.status, "cancelled");
    assert_eq!(response.item.version, 2);
}

#[test]
fn test_accept_lesson_books_arena() {
    let mut store: InMemoryStore = create_test_store();
    let lesson: ItemResponse =
        create_lesson(&mut store, "coach-alex", Some(slot_request("10:00", "11:00", None)));
    assert_eq!(lesson.status, "pending");

    let response: TransitionResponse = transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_coach(),
    )
    .unwrap();

    assert_eq!(response.item.status, "confirmed");
    assert_eq!(response.item.assigned_to.as_deref(), Some("coach-alex"));
    let confirmed = response.item.confirmed_slot.unwrap();
    assert_eq!(confirmed.start, "10:00");
    assert_eq!(confirmed.resource_id.as_deref(), Some("arena-a"));

    let reservations = store.reservations();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0].item_id, Some(ItemId::new(lesson.item_id)));
    assert_eq!(reservations[0].status, ReservationStatus::Confirmed);
}

#[test]
fn test_accept_picks_free_arena() {
    let mut store: InMemoryStore = create_test_store();
    store.add_reservation(arena_hire("arena-a", time!(10:00), time!(11:00)));
    let lesson: ItemResponse = create_lesson(&mut store, "coach-alex", None);

    let response: TransitionResponse = transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Accept {
            slot: Some(slot_request("10:00", "11:00", None)),
        },
        &create_test_admin(),
    )
    .unwrap();

    assert_eq!(
        response.item.confirmed_slot.unwrap().resource_id.as_deref(),
        Some("arena-b")
    );
}

#[test]
fn test_accept_full_slot_is_a_conflict() {
    let mut store: InMemoryStore = create_test_store();
    store.add_reservation(arena_hire("arena-a", time!(10:00), time!(11:00)));
    store.add_reservation(arena_hire("arena-b", time!(10:00), time!(11:00)));
    let lesson: ItemResponse =
        create_lesson(&mut store, "coach-alex", Some(slot_request("10:00", "11:00", None)));

    let result = transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_coach(),
    );

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
    assert_eq!(get_item(&store, lesson.item_id).unwrap().status, "pending");
}

#[test]
fn test_accept_without_any_slot_is_invalid() {
    let mut store: InMemoryStore = create_test_store();
    let lesson: ItemResponse = create_lesson(&mut store, "coach-alex", None);

    match transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_coach(),
    ) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "slot"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_second_lesson_in_same_specific_slot_conflicts() {
    let mut store: InMemoryStore = create_test_store();
    let first: ItemResponse =
        create_lesson(&mut store, "coach-sam", Some(slot_request("14:00", "15:00", None)));
    let second: ItemResponse =
        create_lesson(&mut store, "coach-sam", Some(slot_request("14:00", "15:00", None)));
    let accept: TransitionRequest = TransitionRequest::Accept { slot: None };

    transition(&mut store, first.item_id, &accept, &create_test_flat_coach()).unwrap();
    let result = transition(&mut store, second.item_id, &accept, &create_test_flat_coach());

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_other_coach_cannot_accept() {
    let mut store: InMemoryStore = create_test_store();
    let lesson: ItemResponse =
        create_lesson(&mut store, "coach-alex", Some(slot_request("10:00", "11:00", None)));

    let result = transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_flat_coach(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_cancel_confirmed_lesson_releases_bookings() {
    let mut store: InMemoryStore = create_test_store();
    let lesson: ItemResponse =
        create_lesson(&mut store, "coach-sam", Some(slot_request("14:00", "15:00", None)));
    transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_flat_coach(),
    )
    .unwrap();

    let response: TransitionResponse = transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Cancel {
            reason: Some(String::from("Horse is lame")),
        },
        &create_test_client(),
    )
    .unwrap();

    assert_eq!(response.item.status, "cancelled");
    assert_eq!(response.item.closing_reason.as_deref(), Some("Horse is lame"));
    assert_eq!(store.reservations()[0].status, ReservationStatus::Cancelled);

    // The slot can be taken again
    let retry: ItemResponse =
        create_lesson(&mut store, "coach-sam", Some(slot_request("14:00", "15:00", None)));
    let accepted: TransitionResponse = transition(
        &mut store,
        retry.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_flat_coach(),
    )
    .unwrap();
    assert_eq!(accepted.item.status, "confirmed");
}

#[test]
fn test_cancel_lesson_needs_reason() {
    let mut store: InMemoryStore = create_test_store();
    let lesson: ItemResponse = create_lesson(&mut store, "coach-alex", None);

    match transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Cancel { reason: None },
        &create_test_client(),
    ) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "reason"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_decline_lesson() {
    let mut store: InMemoryStore = create_test_store();
    let lesson: ItemResponse = create_lesson(&mut store, "coach-alex", None);

    let response: TransitionResponse = transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Decline {
            reason: Some(String::from("Away at a show")),
        },
        &create_test_coach(),
    )
    .unwrap();

    assert_eq!(response.item.status, "declined");
    assert_eq!(response.item.closing_reason.as_deref(), Some("Away at a show"));
    assert!(store.reservations().is_empty());
}

#[test]
fn test_audit_timeline_records_every_commit() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "Muck out row B");
    transition(&mut store, item_id, &assign_to("staff-jo"), &create_test_admin()).unwrap();

    let timeline: AuditTimelineResponse =
        audit_timeline(&store, item_id, &create_test_staff()).unwrap();

    assert_eq!(timeline.item_id, item_id);
    let actions: Vec<&str> = timeline
        .events
        .iter()
        .map(|e| e.action.name.as_str())
        .collect();
    assert_eq!(actions, vec!["create", "assign_to_person"]);
    assert_eq!(timeline.events[0].event_id, Some(1));
    assert_eq!(timeline.events[1].event_id, Some(2));
    assert_eq!(timeline.events[1].actor.id.value(), "admin-kim");
    assert!(timeline.events[1].after.data.contains("assigned_to=staff-jo"));
}

#[test]
fn test_audit_timeline_requires_staff() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "Muck out row B");

    assert!(matches!(
        audit_timeline(&store, item_id, &create_test_client()),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        audit_timeline(&store, 42, &create_test_admin()),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_audit_sink_failure_does_not_block_transition() {
    let mut store: InMemoryStore = create_test_store();
    let item_id: i64 = create_task(&mut store, "Muck out row B");
    store.set_audit_available(false);

    let response: TransitionResponse =
        transition(&mut store, item_id, &assign_to("staff-jo"), &create_test_admin()).unwrap();

    assert_eq!(response.item.status, "specific");
    let timeline: AuditTimelineResponse =
        audit_timeline(&store, item_id, &create_test_admin()).unwrap();
    assert_eq!(timeline.events.len(), 1);
}
