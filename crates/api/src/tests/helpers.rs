// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use paddock_audit::Cause;
use paddock_domain::{
    ActorId, AvailabilityMode, BookingType, Provider, ProviderId, RecurringRule, Reservation,
    ReservationStatus, Resource, ResourceId, Role, SpecificSlot, TimeWindow, VenueHours,
};
use time::macros::{date, datetime, time};
use time::{Date, OffsetDateTime, Time};

use crate::{
    ApiError, AuthenticatedActor, AvailabilityRequest, CreateItemRequest, InMemoryStore,
    ItemResponse, SlotRequest, TransitionRequest, TransitionResponse, create_item,
    submit_transition,
};

pub fn create_test_actor(id: &str, role: Role) -> AuthenticatedActor {
    AuthenticatedActor::new(ActorId::new(id), role)
}

pub fn create_test_admin() -> AuthenticatedActor {
    create_test_actor("admin-kim", Role::Admin)
}

pub fn create_test_staff() -> AuthenticatedActor {
    create_test_actor("staff-jo", Role::Staff)
}

pub fn create_test_client() -> AuthenticatedActor {
    create_test_actor("client-pat", Role::Client)
}

/// The arena coach.
pub fn create_test_coach() -> AuthenticatedActor {
    create_test_actor("coach-alex", Role::Coach)
}

/// The flatwork coach, who works from explicit slots.
pub fn create_test_flat_coach() -> AuthenticatedActor {
    create_test_actor("coach-sam", Role::Coach)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

/// Monday morning, before the first lesson.
pub fn now() -> OffsetDateTime {
    datetime!(2025-03-10 7:00 UTC)
}

pub fn monday() -> Date {
    date!(2025 - 03 - 10)
}

pub fn venue() -> VenueHours {
    VenueHours::default()
}

pub fn window(start: Time, end: Time) -> TimeWindow {
    TimeWindow::new(start, end).unwrap()
}

/// A store with two arenas, an arena coach and a flatwork coach.
///
/// - `coach-alex`: Mondays 09:00-12:00, hour slots, uses an arena
/// - `coach-sam`: explicit slots on Monday 14:00-15:00 and 15:00-16:00
/// - `staff-jo` is on duty on Monday
pub fn create_test_store() -> InMemoryStore {
    let mut store: InMemoryStore = InMemoryStore::new();
    store.add_resource(Resource::new(
        ResourceId::new("arena-a"),
        String::from("Indoor school"),
    ));
    store.add_resource(Resource::new(
        ResourceId::new("arena-b"),
        String::from("Outdoor arena"),
    ));
    store.add_provider(Provider::new(
        ProviderId::new("coach-alex"),
        String::from("Alex Jumper"),
        AvailabilityMode::Recurring(vec![
            RecurringRule::new(1, window(time!(9:00), time!(12:00))).unwrap(),
        ]),
        60,
        true,
    ));
    store.add_provider(Provider::new(
        ProviderId::new("coach-sam"),
        String::from("Sam Dressage"),
        AvailabilityMode::Specific(vec![
            SpecificSlot::new(monday(), window(time!(14:00), time!(15:00))),
            SpecificSlot::new(monday(), window(time!(15:00), time!(16:00))),
        ]),
        60,
        false,
    ));
    store.add_to_roster(monday(), ActorId::new("staff-jo"));
    store
}

pub fn arena_hire(resource: &str, start: Time, end: Time) -> Reservation {
    Reservation {
        reservation_id: 0,
        provider_id: ProviderId::new("livery-hire"),
        resource_id: Some(ResourceId::new(resource)),
        date: monday(),
        window: window(start, end),
        booking_type: BookingType::ArenaBooking,
        status: ReservationStatus::Confirmed,
        item_id: None,
    }
}

pub fn availability_request(provider: &str, resources: &str) -> AvailabilityRequest {
    AvailabilityRequest {
        provider_id: provider.to_string(),
        resource_ids: Some(resources.to_string()),
        date_from: String::from("2025-03-10"),
        date_to: String::from("2025-03-10"),
        mode: None,
        resource_id: None,
        min_notice_minutes: None,
    }
}

pub fn slot_request(start: &str, end: &str, resource: Option<&str>) -> SlotRequest {
    SlotRequest {
        date: String::from("2025-03-10"),
        start: start.to_string(),
        end: end.to_string(),
        resource_id: resource.map(ToString::to_string),
    }
}

/// Creates a backlog task as the admin and returns its id.
pub fn create_task(store: &mut InMemoryStore, title: &str) -> i64 {
    let request: CreateItemRequest = CreateItemRequest {
        kind: String::from("task"),
        title: title.to_string(),
        priority: None,
        provider_id: None,
        requested_slot: None,
    };
    create_item(store, &request, &create_test_admin(), create_test_cause(), now())
        .unwrap()
        .item_id
}

/// Creates a pending lesson requested by the client and returns it.
pub fn create_lesson(
    store: &mut InMemoryStore,
    provider: &str,
    requested_slot: Option<SlotRequest>,
) -> ItemResponse {
    let request: CreateItemRequest = CreateItemRequest {
        kind: String::from("lesson_request"),
        title: String::from("Lesson"),
        priority: None,
        provider_id: Some(provider.to_string()),
        requested_slot,
    };
    create_item(store, &request, &create_test_client(), create_test_cause(), now()).unwrap()
}

pub fn transition(
    store: &mut InMemoryStore,
    item_id: i64,
    request: &TransitionRequest,
    actor: &AuthenticatedActor,
) -> Result<TransitionResponse, ApiError> {
    submit_transition(
        store,
        item_id,
        request,
        actor,
        create_test_cause(),
        &venue(),
        now(),
    )
}

pub fn assign_to(assignee: &str) -> TransitionRequest {
    TransitionRequest::AssignToPerson {
        assignee: assignee.to_string(),
        date: String::from("2025-03-10"),
    }
}
