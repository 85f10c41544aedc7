// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BookingCheck, Command, NewItem, TransitionContext, create_item};
use paddock_audit::{Actor, Cause};
use paddock_domain::{
    ActorId, AvailabilityMode, BookingType, ItemId, ItemKind, Priority, Provider, ProviderId,
    RecurringRule, Reservation, ReservationStatus, ResourceId, Role, SchedulableItem,
    SlotSelection, TimeWindow, VenueHours,
};
use time::macros::{date, datetime, time};
use time::{Date, Time};

pub fn create_test_actor(id: &str, role: Role) -> Actor {
    Actor::new(ActorId::new(id), role)
}

pub fn admin() -> Actor {
    create_test_actor("admin-kim", Role::Admin)
}

pub fn staff() -> Actor {
    create_test_actor("staff-jo", Role::Staff)
}

pub fn client() -> Actor {
    create_test_actor("client-pat", Role::Client)
}

pub fn coach() -> Actor {
    create_test_actor("coach-alex", Role::Coach)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Yard office request"))
}

pub fn context(actor: Actor) -> TransitionContext {
    TransitionContext::new(actor, create_test_cause(), datetime!(2025-03-10 9:00 UTC))
}

pub fn window(start: Time, end: Time) -> TimeWindow {
    TimeWindow::new(start, end).unwrap()
}

pub fn monday() -> Date {
    date!(2025 - 03 - 10)
}

/// A backlog task created by the admin.
pub fn backlog_task(item_id: i64) -> SchedulableItem {
    create_item(
        ItemId::new(item_id),
        NewItem {
            kind: ItemKind::Task,
            title: format!("Task {item_id}"),
            priority: Priority::Medium,
            provider_id: None,
            requested_slot: None,
        },
        &context(admin()),
    )
    .unwrap()
    .new_item
}

/// A pending lesson with coach-alex requested by client-pat.
pub fn pending_lesson(item_id: i64) -> SchedulableItem {
    create_item(
        ItemId::new(item_id),
        NewItem {
            kind: ItemKind::LessonRequest,
            title: String::from("Jumping lesson"),
            priority: Priority::Medium,
            provider_id: Some(ProviderId::new("coach-alex")),
            requested_slot: Some(lesson_slot(None)),
        },
        &context(client()),
    )
    .unwrap()
    .new_item
}

pub fn lesson_slot(resource: Option<&str>) -> SlotSelection {
    SlotSelection {
        date: monday(),
        window: window(time!(10:00), time!(11:00)),
        resource_id: resource.map(ResourceId::new),
    }
}

pub fn arena_coach(mode: AvailabilityMode) -> Provider {
    Provider::new(
        ProviderId::new("coach-alex"),
        String::from("Alex Jumper"),
        mode,
        60,
        true,
    )
}

pub fn monday_mornings() -> AvailabilityMode {
    AvailabilityMode::Recurring(vec![
        RecurringRule::new(1, window(time!(9:00), time!(12:00))).unwrap(),
    ])
}

pub fn booking_check(provider: Provider, reservations: Vec<Reservation>) -> BookingCheck {
    BookingCheck {
        provider,
        resource_ids: vec![ResourceId::new("arena-a"), ResourceId::new("arena-b")],
        reservations,
        venue: VenueHours::default(),
    }
}

pub fn arena_reservation(
    reservation_id: i64,
    provider: &str,
    resource: &str,
    start: Time,
    end: Time,
) -> Reservation {
    Reservation {
        reservation_id,
        provider_id: ProviderId::new(provider),
        resource_id: Some(ResourceId::new(resource)),
        date: monday(),
        window: window(start, end),
        booking_type: BookingType::ArenaBooking,
        status: ReservationStatus::Confirmed,
        item_id: None,
    }
}

/// Applies a command that is expected to succeed and returns the new item.
pub fn step(item: &SchedulableItem, command: Command, actor: Actor) -> SchedulableItem {
    crate::apply(item, command, &context(actor)).unwrap().new_item
}
