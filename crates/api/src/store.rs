// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator traits and the in-memory reference store.
//!
//! Handlers are generic over [`SchedulingBackend`], which is implemented for
//! anything providing all five collaborator traits.

use paddock_audit::AuditEvent;
use paddock_domain::{
    ActorId, AvailabilityMode, BookingType, ItemId, Provider, ProviderId, Reservation,
    ReservationStatus, Resource, ResourceId, SchedulableItem, TimeWindow,
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use time::Date;

/// Errors raised by store implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No item with this id.
    #[error("Item {0} does not exist")]
    ItemNotFound(ItemId),

    /// An item with this id already exists.
    #[error("Item {0} already exists")]
    DuplicateItem(ItemId),

    /// No provider with this id.
    #[error("Provider '{0}' does not exist")]
    ProviderNotFound(ProviderId),

    /// The item changed after it was loaded.
    #[error("Item {item_id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        item_id: ItemId,
        expected: u64,
        actual: u64,
    },

    /// The provider's explicit slot is missing or already taken.
    #[error("Slot {window} on {date} is not open for '{provider_id}'")]
    SlotAlreadyBooked {
        provider_id: ProviderId,
        date: Date,
        window: TimeWindow,
    },

    /// The audit sink refused the event.
    #[error("Audit sink unavailable: {0}")]
    AuditSinkUnavailable(String),
}

/// Persistence of schedulable items.
pub trait ItemStore {
    /// Reserves the next item id.
    fn allocate_item_id(&mut self) -> ItemId;

    /// Loads an item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ItemNotFound` if the id is unknown.
    fn load_item(&self, item_id: ItemId) -> Result<SchedulableItem, StoreError>;

    /// Stores a newly created item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateItem` if the id is taken.
    fn insert_item(&mut self, item: SchedulableItem) -> Result<(), StoreError>;

    /// Replaces an item if its stored version is still `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::VersionConflict` if the stored version differs.
    fn commit_item(
        &mut self,
        item: SchedulableItem,
        expected_version: u64,
    ) -> Result<(), StoreError>;
}

/// Persistence of reservations.
pub trait ReservationStore {
    /// Returns every reservation dated within `[from, to]`, active or not.
    fn reservations_between(&self, from: Date, to: Date) -> Vec<Reservation>;

    /// Records a confirmed lesson reservation and returns it with its id.
    fn attach_reservation(
        &mut self,
        item_id: ItemId,
        provider_id: ProviderId,
        resource_id: Option<ResourceId>,
        date: Date,
        window: TimeWindow,
    ) -> Reservation;

    /// Cancels the active reservation produced by an item, if any.
    fn release_reservation(&mut self, item_id: ItemId) -> Option<Reservation>;
}

/// Persistence of providers and the venue's shared resources.
pub trait ProviderStore {
    /// Loads a provider.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ProviderNotFound` if the id is unknown.
    fn load_provider(&self, provider_id: &ProviderId) -> Result<Provider, StoreError>;

    /// Replaces a provider's stored configuration.
    fn save_provider(&mut self, provider: Provider);

    /// Returns the venue's shared resources, ordered by id.
    fn resources(&self) -> Vec<Resource>;

    /// Marks an explicit slot as booked.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SlotAlreadyBooked` if the slot is missing or taken.
    fn book_specific_slot(
        &mut self,
        provider_id: &ProviderId,
        date: Date,
        window: TimeWindow,
    ) -> Result<(), StoreError>;

    /// Clears the booked flag of an explicit slot. Unknown slots are ignored.
    fn release_specific_slot(&mut self, provider_id: &ProviderId, date: Date, window: TimeWindow);
}

/// Duty roster lookups.
pub trait DutyRoster {
    /// Returns true if the person is rostered on for the date.
    fn is_on_duty(&self, actor_id: &ActorId, date: Date) -> bool;

    /// Returns true if the person may take tasks on any date.
    fn is_explicitly_permitted(&self, actor_id: &ActorId) -> bool;
}

/// Receiver of audit events.
///
/// Delivery is fire-and-forget: a failing sink never fails a transition.
pub trait AuditSink {
    /// Records an event and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AuditSinkUnavailable` if the event was not kept.
    fn record(&mut self, event: AuditEvent) -> Result<i64, StoreError>;

    /// Returns the recorded events of one item, oldest first.
    fn timeline(&self, item_id: ItemId) -> Vec<AuditEvent>;
}

/// Everything the handlers need from storage.
pub trait SchedulingBackend:
    ItemStore + ReservationStore + ProviderStore + DutyRoster + AuditSink
{
}

impl<T> SchedulingBackend for T where
    T: ItemStore + ReservationStore + ProviderStore + DutyRoster + AuditSink
{
}

/// In-memory reference implementation of every collaborator.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    items: BTreeMap<ItemId, SchedulableItem>,
    next_item_id: i64,
    reservations: Vec<Reservation>,
    next_reservation_id: i64,
    providers: BTreeMap<ProviderId, Provider>,
    resources: BTreeMap<ResourceId, Resource>,
    roster: BTreeMap<Date, BTreeSet<ActorId>>,
    permitted: BTreeSet<ActorId>,
    audit_log: Vec<AuditEvent>,
    audit_unavailable: bool,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a shared resource.
    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.insert(resource.resource_id.clone(), resource);
    }

    /// Adds or replaces a provider.
    pub fn add_provider(&mut self, provider: Provider) {
        self.providers.insert(provider.provider_id.clone(), provider);
    }

    /// Adds an existing reservation, assigning it the next reservation id.
    pub fn add_reservation(&mut self, mut reservation: Reservation) -> i64 {
        self.next_reservation_id += 1;
        reservation.reservation_id = self.next_reservation_id;
        self.reservations.push(reservation);
        self.next_reservation_id
    }

    /// Puts a person on the roster for a date.
    pub fn add_to_roster(&mut self, date: Date, actor_id: ActorId) {
        self.roster.entry(date).or_default().insert(actor_id);
    }

    /// Grants a person standing permission to take tasks off-roster.
    pub fn permit(&mut self, actor_id: ActorId) {
        self.permitted.insert(actor_id);
    }

    /// Makes the audit sink refuse (or accept) further events.
    pub const fn set_audit_available(&mut self, available: bool) {
        self.audit_unavailable = !available;
    }

    /// Returns every stored reservation.
    #[must_use]
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }
}

impl ItemStore for InMemoryStore {
    fn allocate_item_id(&mut self) -> ItemId {
        self.next_item_id += 1;
        ItemId::new(self.next_item_id)
    }

    fn load_item(&self, item_id: ItemId) -> Result<SchedulableItem, StoreError> {
        self.items
            .get(&item_id)
            .cloned()
            .ok_or(StoreError::ItemNotFound(item_id))
    }

    fn insert_item(&mut self, item: SchedulableItem) -> Result<(), StoreError> {
        if self.items.contains_key(&item.item_id) {
            return Err(StoreError::DuplicateItem(item.item_id));
        }
        self.items.insert(item.item_id, item);
        Ok(())
    }

    fn commit_item(
        &mut self,
        item: SchedulableItem,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let stored: &mut SchedulableItem = self
            .items
            .get_mut(&item.item_id)
            .ok_or(StoreError::ItemNotFound(item.item_id))?;
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                item_id: item.item_id,
                expected: expected_version,
                actual: stored.version,
            });
        }
        *stored = item;
        Ok(())
    }
}

impl ReservationStore for InMemoryStore {
    fn reservations_between(&self, from: Date, to: Date) -> Vec<Reservation> {
        self.reservations
            .iter()
            .filter(|r| r.date >= from && r.date <= to)
            .cloned()
            .collect()
    }

    fn attach_reservation(
        &mut self,
        item_id: ItemId,
        provider_id: ProviderId,
        resource_id: Option<ResourceId>,
        date: Date,
        window: TimeWindow,
    ) -> Reservation {
        self.next_reservation_id += 1;
        let reservation: Reservation = Reservation {
            reservation_id: self.next_reservation_id,
            provider_id,
            resource_id,
            date,
            window,
            booking_type: BookingType::Lesson,
            status: ReservationStatus::Confirmed,
            item_id: Some(item_id),
        };
        self.reservations.push(reservation.clone());
        reservation
    }

    fn release_reservation(&mut self, item_id: ItemId) -> Option<Reservation> {
        let reservation: &mut Reservation = self
            .reservations
            .iter_mut()
            .find(|r| r.item_id == Some(item_id) && r.is_active())?;
        reservation.status = ReservationStatus::Cancelled;
        Some(reservation.clone())
    }
}

impl ProviderStore for InMemoryStore {
    fn load_provider(&self, provider_id: &ProviderId) -> Result<Provider, StoreError> {
        self.providers
            .get(provider_id)
            .cloned()
            .ok_or_else(|| StoreError::ProviderNotFound(provider_id.clone()))
    }

    fn save_provider(&mut self, provider: Provider) {
        self.add_provider(provider);
    }

    fn resources(&self) -> Vec<Resource> {
        self.resources.values().cloned().collect()
    }

    fn book_specific_slot(
        &mut self,
        provider_id: &ProviderId,
        date: Date,
        window: TimeWindow,
    ) -> Result<(), StoreError> {
        let not_open = || StoreError::SlotAlreadyBooked {
            provider_id: provider_id.clone(),
            date,
            window,
        };
        let provider: &mut Provider = self
            .providers
            .get_mut(provider_id)
            .ok_or_else(|| StoreError::ProviderNotFound(provider_id.clone()))?;
        let AvailabilityMode::Specific(slots) = &mut provider.mode else {
            return Err(not_open());
        };
        let slot = slots
            .iter_mut()
            .find(|s| s.date == date && s.window == window && !s.booked)
            .ok_or_else(not_open)?;
        slot.booked = true;
        Ok(())
    }

    fn release_specific_slot(&mut self, provider_id: &ProviderId, date: Date, window: TimeWindow) {
        if let Some(Provider {
            mode: AvailabilityMode::Specific(slots),
            ..
        }) = self.providers.get_mut(provider_id)
        {
            for slot in slots
                .iter_mut()
                .filter(|s| s.date == date && s.window == window)
            {
                slot.booked = false;
            }
        }
    }
}

impl DutyRoster for InMemoryStore {
    fn is_on_duty(&self, actor_id: &ActorId, date: Date) -> bool {
        self.roster
            .get(&date)
            .is_some_and(|on_duty| on_duty.contains(actor_id))
    }

    fn is_explicitly_permitted(&self, actor_id: &ActorId) -> bool {
        self.permitted.contains(actor_id)
    }
}

impl AuditSink for InMemoryStore {
    fn record(&mut self, event: AuditEvent) -> Result<i64, StoreError> {
        if self.audit_unavailable {
            return Err(StoreError::AuditSinkUnavailable(String::from(
                "audit log is read-only",
            )));
        }
        let event_id: i64 = i64::try_from(self.audit_log.len())
            .map_err(|e| StoreError::AuditSinkUnavailable(e.to_string()))?
            + 1;
        self.audit_log.push(event.with_event_id(event_id));
        Ok(event_id)
    }

    fn timeline(&self, item_id: ItemId) -> Vec<AuditEvent> {
        self.audit_log
            .iter()
            .filter(|e| e.item_id == item_id)
            .cloned()
            .collect()
    }
}
