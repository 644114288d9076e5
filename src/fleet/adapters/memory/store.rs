//! In-memory fleet store for tests and the console runner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::fleet::{
    domain::{ChatUserId, Reservation, ReservationId, Truck, TruckId, TruckName, UserProfile},
    ports::{
        FleetStore, FleetStoreError, FleetStoreResult, FleetTransaction, ReservationLedger,
        TruckRegistry, UserDirectory, single_active,
    },
};

/// Thread-safe in-memory fleet store.
///
/// Units of work run one at a time against a staged copy of the state. The
/// copy replaces the live state only when the work succeeds, so a failed
/// unit of work leaves nothing behind.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFleetStore {
    state: Arc<RwLock<FleetState>>,
}

#[derive(Debug, Clone, Default)]
struct FleetState {
    trucks: HashMap<TruckId, Truck>,
    name_index: HashMap<TruckName, TruckId>,
    reservations: HashMap<ReservationId, Reservation>,
    users: HashMap<ChatUserId, UserProfile>,
}

impl InMemoryFleetStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetStore for InMemoryFleetStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<FleetStoreError> + Send + 'static,
        F: FnOnce(&mut dyn FleetTransaction) -> Result<T, E> + Send + 'static,
    {
        let mut live = self.state.write().map_err(|err| {
            E::from(FleetStoreError::persistence(std::io::Error::other(
                err.to_string(),
            )))
        })?;
        let mut staged = live.clone();
        let outcome = work(&mut staged)?;
        *live = staged;
        Ok(outcome)
    }
}

impl FleetState {
    fn reservations_for(&self, truck_id: TruckId) -> impl Iterator<Item = &Reservation> {
        self.reservations
            .values()
            .filter(move |reservation| reservation.truck_id() == truck_id)
    }

    fn is_reserved_at(&self, truck_id: TruckId, as_of: DateTime<Utc>) -> bool {
        self.reservations_for(truck_id)
            .any(|reservation| reservation.is_active_at(as_of))
    }
}

fn sorted_by_name(mut trucks: Vec<Truck>) -> Vec<Truck> {
    trucks.sort_by_key(|truck| truck.name().as_str());
    trucks
}

impl TruckRegistry for FleetState {
    fn insert_truck(&mut self, truck: &Truck) -> FleetStoreResult<()> {
        if self.name_index.contains_key(&truck.name()) || self.trucks.contains_key(&truck.id()) {
            return Err(FleetStoreError::DuplicateTruckName(truck.name()));
        }
        self.name_index.insert(truck.name(), truck.id());
        self.trucks.insert(truck.id(), truck.clone());
        Ok(())
    }

    fn find_truck_by_name(&mut self, name: TruckName) -> FleetStoreResult<Option<Truck>> {
        Ok(self
            .name_index
            .get(&name)
            .and_then(|id| self.trucks.get(id))
            .cloned())
    }

    fn lock_truck_by_name(&mut self, name: TruckName) -> FleetStoreResult<Option<Truck>> {
        // The store-wide write guard already excludes other units of work.
        self.find_truck_by_name(name)
    }

    fn find_truck_by_id(&mut self, id: TruckId) -> FleetStoreResult<Option<Truck>> {
        Ok(self.trucks.get(&id).cloned())
    }

    fn update_truck(&mut self, truck: &Truck) -> FleetStoreResult<()> {
        let previous = self
            .trucks
            .get(&truck.id())
            .ok_or(FleetStoreError::TruckNotFound(truck.id()))?
            .name();
        if previous != truck.name() {
            if self.name_index.contains_key(&truck.name()) {
                return Err(FleetStoreError::DuplicateTruckName(truck.name()));
            }
            self.name_index.remove(&previous);
            self.name_index.insert(truck.name(), truck.id());
        }
        self.trucks.insert(truck.id(), truck.clone());
        Ok(())
    }

    fn list_trucks(&mut self) -> FleetStoreResult<Vec<Truck>> {
        Ok(sorted_by_name(self.trucks.values().cloned().collect()))
    }

    fn trucks_by_availability(
        &mut self,
        as_of: DateTime<Utc>,
        want_checked_out: bool,
    ) -> FleetStoreResult<Vec<Truck>> {
        let matching = self
            .trucks
            .values()
            .filter(|truck| {
                truck.is_checked_out() == want_checked_out
                    && self.is_reserved_at(truck.id(), as_of) == want_checked_out
            })
            .cloned()
            .collect();
        Ok(sorted_by_name(matching))
    }
}

impl ReservationLedger for FleetState {
    fn insert_reservation(&mut self, reservation: &Reservation) -> FleetStoreResult<()> {
        if self.reservations.contains_key(&reservation.id()) {
            return Err(FleetStoreError::DuplicateReservation(reservation.id()));
        }
        if !self.trucks.contains_key(&reservation.truck_id()) {
            return Err(FleetStoreError::TruckNotFound(reservation.truck_id()));
        }
        self.reservations
            .insert(reservation.id(), reservation.clone());
        Ok(())
    }

    fn find_reservation(&mut self, id: ReservationId) -> FleetStoreResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).cloned())
    }

    fn active_reservation_for_truck(
        &mut self,
        truck_id: TruckId,
        as_of: DateTime<Utc>,
    ) -> FleetStoreResult<Option<Reservation>> {
        let candidates = self
            .reservations_for(truck_id)
            .filter(|reservation| reservation.is_active_at(as_of))
            .cloned()
            .collect();
        single_active(truck_id, candidates)
    }

    fn release_reservation(
        &mut self,
        id: ReservationId,
        released_by: &ChatUserId,
        released_at: DateTime<Utc>,
    ) -> FleetStoreResult<()> {
        let reservation = self
            .reservations
            .get_mut(&id)
            .ok_or(FleetStoreError::ReservationNotFound(id))?;
        reservation
            .release(released_by.clone(), released_at)
            .map_err(|_| FleetStoreError::AlreadyReleased(id))
    }

    fn open_reservations_for_truck(
        &mut self,
        truck_id: TruckId,
    ) -> FleetStoreResult<Vec<Reservation>> {
        let mut open: Vec<Reservation> = self
            .reservations_for(truck_id)
            .filter(|reservation| !reservation.is_released())
            .cloned()
            .collect();
        open.sort_by_key(|reservation| (reservation.window().start(), reservation.created_at()));
        Ok(open)
    }

    fn reservation_history(&mut self, truck_id: TruckId) -> FleetStoreResult<Vec<Reservation>> {
        let mut history: Vec<Reservation> = self.reservations_for(truck_id).cloned().collect();
        history.sort_by_key(|reservation| std::cmp::Reverse(reservation.created_at()));
        Ok(history)
    }
}

impl UserDirectory for FleetState {
    fn find_user(&mut self, chat_user_id: &ChatUserId) -> FleetStoreResult<Option<UserProfile>> {
        Ok(self.users.get(chat_user_id).cloned())
    }

    fn insert_user(&mut self, user: &UserProfile) -> FleetStoreResult<()> {
        if self.users.contains_key(user.chat_user_id()) {
            return Err(FleetStoreError::DuplicateUser(user.chat_user_id().clone()));
        }
        self.users
            .insert(user.chat_user_id().clone(), user.clone());
        Ok(())
    }

    fn update_user(&mut self, user: &UserProfile) -> FleetStoreResult<()> {
        let existing = self
            .users
            .get_mut(user.chat_user_id())
            .ok_or_else(|| FleetStoreError::UserNotFound(user.chat_user_id().clone()))?;
        *existing = user.clone();
        Ok(())
    }

    fn list_users(&mut self) -> FleetStoreResult<Vec<UserProfile>> {
        let mut users: Vec<UserProfile> = self.users.values().cloned().collect();
        users.sort_by(|left, right| left.username().cmp(right.username()));
        Ok(users)
    }
}
