// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use paddock_domain::{BookingType, ProviderId, Reservation};
use time::macros::{datetime, time};

use super::helpers::{
    arena_hire, availability_request, create_lesson, create_test_coach, create_test_flat_coach,
    create_test_store, now, slot_request, transition, venue,
};
use crate::{
    ApiError, AvailabilityRequest, AvailabilityResponse, InMemoryStore, TransitionRequest,
    get_availability,
};

fn starts(response: &AvailabilityResponse) -> Vec<&str> {
    response.slots.iter().map(|s| s.start.as_str()).collect()
}

#[test]
fn test_recurring_rules_produce_hour_slots() {
    let store: InMemoryStore = create_test_store();
    let request: AvailabilityRequest = availability_request("coach-alex", "arena-a,arena-b");

    let response: AvailabilityResponse = get_availability(&store, &request, &venue(), now()).unwrap();

    assert_eq!(response.provider_id, "coach-alex");
    assert_eq!(starts(&response), vec!["09:00", "10:00", "11:00"]);
    assert_eq!(response.slots[2].end, "12:00");
    assert!(response.slots.iter().all(|s| s.is_free));
    assert!(response.slots.iter().all(|s| s.bookings.is_empty()));
    assert_eq!(response.slots[0].free_resource_ids, vec!["arena-a", "arena-b"]);

    let next = response.next_free.unwrap();
    assert_eq!(next.date, "2025-03-10");
    assert_eq!(next.start, "09:00");
    assert_eq!(next.resource_id.as_deref(), Some("arena-a"));
}

#[test]
fn test_resource_list_is_trimmed_and_deduplicated() {
    let store: InMemoryStore = create_test_store();
    let request: AvailabilityRequest =
        availability_request("coach-alex", " arena-b , arena-a,,arena-b ");

    let response: AvailabilityResponse = get_availability(&store, &request, &venue(), now()).unwrap();

    assert_eq!(response.slots[0].free_resource_ids, vec!["arena-a", "arena-b"]);
}

#[test]
fn test_other_party_booking_only_conflicts_in_combined_mode() {
    let mut store: InMemoryStore = create_test_store();
    let reservation_id: i64 = store.add_reservation(arena_hire("arena-a", time!(10:00), time!(11:00)));

    let single: AvailabilityResponse = get_availability(
        &store,
        &availability_request("coach-alex", "arena-a,arena-b"),
        &venue(),
        now(),
    )
    .unwrap();
    assert!(single.slots.iter().all(|s| s.bookings.is_empty()));

    let mut request: AvailabilityRequest = availability_request("coach-alex", "arena-a,arena-b");
    request.mode = Some(String::from("combined"));
    let combined: AvailabilityResponse = get_availability(&store, &request, &venue(), now()).unwrap();

    let slot = &combined.slots[1];
    assert_eq!(slot.start, "10:00");
    assert_eq!(slot.bookings.len(), 1);
    assert_eq!(slot.bookings[0].resource_id.as_deref(), Some("arena-a"));
    assert_eq!(slot.bookings[0].booking_type, "arena_booking");
    assert_eq!(slot.bookings[0].reservation_id, reservation_id);
    assert_eq!(slot.free_resource_ids, vec!["arena-b"]);
    assert!(slot.is_free);
    assert!(combined.slots[0].bookings.is_empty());
    assert!(combined.slots[2].bookings.is_empty());
}

#[test]
fn test_specific_resource_requirement() {
    let mut store: InMemoryStore = create_test_store();
    store.add_reservation(arena_hire("arena-a", time!(9:00), time!(10:00)));

    let mut request: AvailabilityRequest = availability_request("coach-alex", "arena-a,arena-b");
    request.mode = Some(String::from("combined"));
    request.resource_id = Some(String::from("arena-a"));

    let response: AvailabilityResponse = get_availability(&store, &request, &venue(), now()).unwrap();

    assert!(!response.slots[0].is_free);
    assert!(response.slots[1].is_free);
    let next = response.next_free.unwrap();
    assert_eq!(next.start, "10:00");
    assert_eq!(next.resource_id.as_deref(), Some("arena-a"));
}

#[test]
fn test_minimum_notice_drops_early_slots() {
    let store: InMemoryStore = create_test_store();
    let mut request: AvailabilityRequest = availability_request("coach-alex", "arena-a");
    request.min_notice_minutes = Some(60);

    let response: AvailabilityResponse = get_availability(
        &store,
        &request,
        &venue(),
        datetime!(2025-03-10 9:30 UTC),
    )
    .unwrap();

    assert_eq!(starts(&response), vec!["11:00"]);
}

#[test]
fn test_past_slots_are_kept_without_notice() {
    let store: InMemoryStore = create_test_store();
    let request: AvailabilityRequest = availability_request("coach-alex", "arena-a");

    let response: AvailabilityResponse = get_availability(
        &store,
        &request,
        &venue(),
        datetime!(2025-03-11 9:00 UTC),
    )
    .unwrap();

    assert_eq!(response.slots.len(), 3);
}

#[test]
fn test_provider_without_resources_ignores_resource_list() {
    let store: InMemoryStore = create_test_store();
    let request: AvailabilityRequest = availability_request("coach-sam", "arena-a");

    let response: AvailabilityResponse = get_availability(&store, &request, &venue(), now()).unwrap();

    assert_eq!(starts(&response), vec!["14:00", "15:00"]);
    assert!(response.slots.iter().all(|s| s.free_resource_ids.is_empty()));
    assert_eq!(response.next_free.unwrap().resource_id, None);
}

#[test]
fn test_booked_specific_slot_is_reported_but_not_free() {
    let mut store: InMemoryStore = create_test_store();
    let lesson = create_lesson(&mut store, "coach-sam", Some(slot_request("14:00", "15:00", None)));
    transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_flat_coach(),
    )
    .unwrap();

    let response: AvailabilityResponse = get_availability(
        &store,
        &availability_request("coach-sam", ""),
        &venue(),
        now(),
    )
    .unwrap();

    assert_eq!(starts(&response), vec!["14:00", "15:00"]);
    assert!(response.slots[0].provider_booked);
    assert!(!response.slots[0].is_free);
    assert!(response.slots[1].is_free);
    assert_eq!(response.next_free.unwrap().start, "15:00");
}

#[test]
fn test_confirmed_lesson_shows_as_booking() {
    let mut store: InMemoryStore = create_test_store();
    let lesson = create_lesson(
        &mut store,
        "coach-alex",
        Some(slot_request("10:00", "11:00", Some("arena-b"))),
    );
    transition(
        &mut store,
        lesson.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_coach(),
    )
    .unwrap();

    let response: AvailabilityResponse = get_availability(
        &store,
        &availability_request("coach-alex", "arena-a,arena-b"),
        &venue(),
        now(),
    )
    .unwrap();

    let slot = &response.slots[1];
    assert_eq!(slot.bookings.len(), 1);
    assert_eq!(slot.bookings[0].booking_type, "lesson");
    // Arena A has no booking, but the coach is taken
    assert!(slot.provider_busy);
    assert!(!slot.is_free);
    assert!(slot.free_resource_ids.is_empty());
}

#[test]
fn test_coach_with_lesson_is_not_offered_the_other_arena() {
    let mut store: InMemoryStore = create_test_store();
    let first = create_lesson(
        &mut store,
        "coach-alex",
        Some(slot_request("10:00", "11:00", Some("arena-a"))),
    );
    transition(
        &mut store,
        first.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_coach(),
    )
    .unwrap();

    let mut request: AvailabilityRequest = availability_request("coach-alex", "arena-a,arena-b");
    request.mode = Some(String::from("combined"));
    let response: AvailabilityResponse = get_availability(&store, &request, &venue(), now()).unwrap();

    let slot = &response.slots[1];
    assert_eq!(slot.start, "10:00");
    assert!(slot.provider_busy);
    assert!(!slot.is_free);
    assert!(slot.free_resource_ids.is_empty());
    assert_eq!(response.next_free.unwrap().start, "09:00");

    // Accept agrees with what availability reported
    let second = create_lesson(
        &mut store,
        "coach-alex",
        Some(slot_request("10:00", "11:00", Some("arena-b"))),
    );
    let result = transition(
        &mut store,
        second.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_coach(),
    );
    assert!(matches!(result, Err(ApiError::Conflict { .. })));

    // And accepts the slot it reported as free
    let third = create_lesson(
        &mut store,
        "coach-alex",
        Some(slot_request("09:00", "10:00", None)),
    );
    let accepted = transition(
        &mut store,
        third.item_id,
        &TransitionRequest::Accept { slot: None },
        &create_test_coach(),
    )
    .unwrap();
    assert_eq!(
        accepted
            .item
            .confirmed_slot
            .and_then(|slot| slot.resource_id)
            .as_deref(),
        Some("arena-a")
    );
}

#[test]
fn test_own_booking_outside_queried_arenas_blocks_the_slot() {
    let mut store: InMemoryStore = create_test_store();
    store.add_reservation(Reservation {
        provider_id: ProviderId::new("coach-alex"),
        booking_type: BookingType::Lesson,
        ..arena_hire("arena-b", time!(9:00), time!(10:00))
    });

    for mode in ["single_provider", "combined"] {
        let mut request: AvailabilityRequest = availability_request("coach-alex", "arena-a");
        request.mode = Some(mode.to_string());
        let response: AvailabilityResponse =
            get_availability(&store, &request, &venue(), now()).unwrap();

        assert!(response.slots[0].bookings.is_empty(), "{mode}");
        assert!(response.slots[0].provider_busy, "{mode}");
        assert!(!response.slots[0].is_free, "{mode}");
        assert!(response.slots[1].is_free, "{mode}");
        let next = response.next_free.unwrap();
        assert_eq!(next.start, "10:00", "{mode}");
        assert_eq!(next.resource_id.as_deref(), Some("arena-a"));
    }
}

#[test]
fn test_resourceless_block_for_arena_coach_blocks_the_slot() {
    let mut store: InMemoryStore = create_test_store();
    store.add_reservation(Reservation {
        provider_id: ProviderId::new("coach-alex"),
        resource_id: None,
        booking_type: BookingType::Blocked,
        ..arena_hire("arena-a", time!(11:00), time!(12:00))
    });

    for mode in ["single_provider", "combined"] {
        let mut request: AvailabilityRequest = availability_request("coach-alex", "arena-a,arena-b");
        request.mode = Some(mode.to_string());
        let response: AvailabilityResponse =
            get_availability(&store, &request, &venue(), now()).unwrap();

        assert!(response.slots[0].is_free, "{mode}");
        assert!(response.slots[2].provider_busy, "{mode}");
        assert!(!response.slots[2].is_free, "{mode}");
        assert!(response.slots[2].free_resource_ids.is_empty(), "{mode}");
        assert_eq!(response.next_free.unwrap().start, "09:00", "{mode}");
    }
}

#[test]
fn test_resolving_is_deterministic() {
    let mut store: InMemoryStore = create_test_store();
    store.add_reservation(arena_hire("arena-b", time!(11:00), time!(12:00)));
    let mut request: AvailabilityRequest = availability_request("coach-alex", "arena-a,arena-b");
    request.mode = Some(String::from("combined"));

    let first: AvailabilityResponse = get_availability(&store, &request, &venue(), now()).unwrap();
    let second: AvailabilityResponse = get_availability(&store, &request, &venue(), now()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_unknown_provider_is_not_found() {
    let store: InMemoryStore = create_test_store();
    let result = get_availability(
        &store,
        &availability_request("coach-nobody", "arena-a"),
        &venue(),
        now(),
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_arena_coach_needs_resources() {
    let store: InMemoryStore = create_test_store();
    let result = get_availability(&store, &availability_request("coach-alex", ""), &venue(), now());

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "resource_ids"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_invalid_query_values() {
    let store: InMemoryStore = create_test_store();

    let mut bad_mode: AvailabilityRequest = availability_request("coach-alex", "arena-a");
    bad_mode.mode = Some(String::from("everyone"));
    match get_availability(&store, &bad_mode, &venue(), now()) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "mode"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let mut bad_date: AvailabilityRequest = availability_request("coach-alex", "arena-a");
    bad_date.date_to = String::from("10/03/2025");
    match get_availability(&store, &bad_date, &venue(), now()) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "date"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let mut reversed: AvailabilityRequest = availability_request("coach-alex", "arena-a");
    reversed.date_from = String::from("2025-03-12");
    match get_availability(&store, &reversed, &venue(), now()) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "date"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}


#[test]
fn test_out_of_range_notice_is_invalid_input() {
    let store: InMemoryStore = create_test_store();
    let mut request: AvailabilityRequest = availability_request("coach-alex", "arena-a");
    request.min_notice_minutes = Some(u32::MAX);

    match get_availability(&store, &request, &venue(), now()) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "min_notice_minutes"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_required_resource_must_be_in_queried_set() {
    let store: InMemoryStore = create_test_store();
    let mut request: AvailabilityRequest = availability_request("coach-alex", "arena-a");
    request.resource_id = Some(String::from("arena-b"));

    match get_availability(&store, &request, &venue(), now()) {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "resource_id"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    // Providers without resources ignore the requirement like the set
    let mut flat: AvailabilityRequest = availability_request("coach-sam", "arena-a");
    flat.resource_id = Some(String::from("arena-b"));
    let response: AvailabilityResponse = get_availability(&store, &flat, &venue(), now()).unwrap();
    assert_eq!(response.next_free.unwrap().resource_id, None);
}
