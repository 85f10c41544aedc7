// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Startup data for the in-memory store.

use paddock_audit::Cause;
use paddock_domain::{
    ActorId, AvailabilityMode, BookingType, Provider, ProviderId, Reservation,
    ReservationStatus, Resource, ResourceId, Role, parse_date, parse_window,
    validate_availability,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

use crate::auth::AuthenticatedActor;
use crate::error::{ApiError, translate_domain_error};
use crate::handlers::{create_item, parse_availability_mode};
use crate::request_response::{AvailabilityModeRequest, CreateItemRequest};
use crate::store::InMemoryStore;

/// A shared resource to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResource {
    pub resource_id: String,
    pub name: String,
}

/// A provider to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedProvider {
    pub provider_id: String,
    pub name: String,
    pub availability: AvailabilityModeRequest,
    pub slot_duration_minutes: u16,
    #[serde(default)]
    pub consumes_resources: bool,
}

/// An existing reservation to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReservation {
    pub provider_id: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    pub date: String,
    pub start: String,
    pub end: String,
    /// `lesson`, `arena_booking` or `blocked`.
    pub booking_type: String,
}

/// The people on duty for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRosterDay {
    pub date: String,
    pub actor_ids: Vec<String>,
}

/// An item to create at startup, on behalf of `created_by`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedItem {
    pub created_by: String,
    pub role: String,
    #[serde(flatten)]
    pub item: CreateItemRequest,
}

/// The contents of a seed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub resources: Vec<SeedResource>,
    #[serde(default)]
    pub providers: Vec<SeedProvider>,
    #[serde(default)]
    pub reservations: Vec<SeedReservation>,
    #[serde(default)]
    pub roster: Vec<SeedRosterDay>,
    /// Actors who may take tasks on any date.
    #[serde(default)]
    pub permitted: Vec<String>,
    #[serde(default)]
    pub items: Vec<SeedItem>,
}

/// Builds a store from seed data.
///
/// Items are created through the normal create path, so they start in their
/// initial state and get a `create` audit event.
///
/// # Errors
///
/// Returns an error if any entry is malformed, a provider's availability is
/// invalid, or an item cannot be created.
pub fn build_store(seed: &SeedData, now: OffsetDateTime) -> Result<InMemoryStore, ApiError> {
    let mut store: InMemoryStore = InMemoryStore::new();

    for resource in &seed.resources {
        store.add_resource(Resource::new(
            ResourceId::new(&resource.resource_id),
            resource.name.clone(),
        ));
    }

    for provider in &seed.providers {
        let mode: AvailabilityMode =
            parse_availability_mode(&provider.availability).map_err(translate_domain_error)?;
        validate_availability(&mode, provider.slot_duration_minutes)
            .map_err(translate_domain_error)?;
        store.add_provider(Provider::new(
            ProviderId::new(&provider.provider_id),
            provider.name.clone(),
            mode,
            provider.slot_duration_minutes,
            provider.consumes_resources,
        ));
    }

    for reservation in &seed.reservations {
        store.add_reservation(Reservation {
            reservation_id: 0,
            provider_id: ProviderId::new(&reservation.provider_id),
            resource_id: reservation.resource_id.as_deref().map(ResourceId::new),
            date: parse_date(&reservation.date).map_err(translate_domain_error)?,
            window: parse_window(&reservation.start, &reservation.end)
                .map_err(translate_domain_error)?,
            booking_type: BookingType::from_str(&reservation.booking_type)
                .map_err(translate_domain_error)?,
            status: ReservationStatus::Confirmed,
            item_id: None,
        });
    }

    for day in &seed.roster {
        let date: Date = parse_date(&day.date).map_err(translate_domain_error)?;
        for actor_id in &day.actor_ids {
            store.add_to_roster(date, ActorId::new(actor_id));
        }
    }

    for actor_id in &seed.permitted {
        store.permit(ActorId::new(actor_id));
    }

    for item in &seed.items {
        let role: Role = Role::from_str(&item.role).map_err(translate_domain_error)?;
        let actor: AuthenticatedActor =
            AuthenticatedActor::new(ActorId::new(&item.created_by), role);
        let cause: Cause =
            Cause::new(String::from("seed"), String::from("Loaded from seed data"));
        create_item(&mut store, &item.item, &actor, cause, now)?;
    }

    Ok(store)
}
