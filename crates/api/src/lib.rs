// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod auth;
mod error;
mod handlers;
mod request_response;
mod seed;
mod store;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use auth::{AuthenticatedActor, AuthorizationService};
pub use error::{ApiError, AuthError, translate_core_error, translate_domain_error};
pub use handlers::{
    MAX_RECHECKS, audit_timeline, bulk_assign, create_item, get_availability, get_item,
    parse_availability_mode, set_availability, submit_transition,
};
pub use request_response::{
    AuditTimelineRequest, AuditTimelineResponse, AvailabilityModeRequest, AvailabilityRequest,
    AvailabilityResponse, BookingResponse, BulkAssignRequest, BulkAssignResponse,
    BulkFailureResponse, CreateItemRequest, ItemResponse, RecurringRuleRequest,
    SetAvailabilityRequest, SetAvailabilityResponse, SlotChoiceResponse, SlotRequest,
    SlotResponse, SpecificSlotRequest, TransitionRequest, TransitionResponse,
};
pub use seed::{
    SeedData, SeedItem, SeedProvider, SeedReservation, SeedResource, SeedRosterDay, build_store,
};
pub use store::{
    AuditSink, DutyRoster, InMemoryStore, ItemStore, ProviderStore, ReservationStore,
    SchedulingBackend, StoreError,
};
