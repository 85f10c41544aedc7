// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AvailabilityMode, AvailabilityQuery, BookingType, ItemId, Provider, ProviderId, RecurringRule,
    Reservation, ReservationStatus, ResolveMode, ResourceId, TimeWindow,
};
use time::{Date, Time};

pub fn window(start: Time, end: Time) -> TimeWindow {
    TimeWindow::new(start, end).unwrap()
}

pub fn rule(day_of_week: u8, start: Time, end: Time) -> RecurringRule {
    RecurringRule::new(day_of_week, window(start, end)).unwrap()
}

pub fn create_coach(mode: AvailabilityMode) -> Provider {
    Provider::new(
        ProviderId::new("coach-sam"),
        String::from("Sam Rider"),
        mode,
        60,
        false,
    )
}

pub fn create_arena_coach(mode: AvailabilityMode) -> Provider {
    Provider::new(
        ProviderId::new("coach-alex"),
        String::from("Alex Jumper"),
        mode,
        60,
        true,
    )
}

pub fn arenas() -> Vec<ResourceId> {
    vec![ResourceId::new("arena-a"), ResourceId::new("arena-b")]
}

pub fn query(from: Date, to: Date, resource_ids: Vec<ResourceId>, mode: ResolveMode) -> AvailabilityQuery {
    AvailabilityQuery {
        date_from: from,
        date_to: to,
        resource_ids,
        mode,
    }
}

pub fn reservation(
    reservation_id: i64,
    provider: &str,
    resource: Option<&str>,
    date: Date,
    start: Time,
    end: Time,
) -> Reservation {
    Reservation {
        reservation_id,
        provider_id: ProviderId::new(provider),
        resource_id: resource.map(ResourceId::new),
        date,
        window: window(start, end),
        booking_type: BookingType::Lesson,
        status: ReservationStatus::Confirmed,
        item_id: Some(ItemId::new(reservation_id)),
    }
}
