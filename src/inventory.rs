// Per-car-type capacity and the day-indexed occupancy ledger
//
// Occupancy is kept per calendar date: a reservation of `days` days adds one
// to every date in `[start.date(), start.date() + days)` for its car type.
// Time of day never takes part in conflict detection.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::InventoryConfig;
use crate::error::ValidationError;
use crate::ids::ReservationId;
use crate::reservation::{enumerate_days, CarType, Reservation};

// How try_add makes the capacity check and the ledger update one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    #[default]
    Serialized,
    // Per-cell check-and-increment, rolled back when a later day is full
    Optimistic,
}

pub trait Inventory: Send + Sync {
    fn capacity(&self) -> &HashMap<CarType, u32>;

    // Unchecked: a caller that skips has_availability can overbook
    fn add(&self, reservation: Reservation);

    fn try_add(&self, reservation: Reservation) -> bool;

    fn remove_reservation_by_id(&self, id: ReservationId) -> bool;

    fn get(&self, id: ReservationId) -> Option<Reservation>;

    // Detached copy, ordered by id
    fn all(&self) -> Vec<Reservation>;

    fn reserved_count(&self, car_type: CarType, date: NaiveDate) -> u32;

    fn capacity_of(&self, car_type: CarType) -> u32 {
        self.capacity().get(&car_type).copied().unwrap_or(0)
    }

    // Unknown car types have capacity 0
    fn has_availability(
        &self,
        car_type: CarType,
        start: NaiveDateTime,
        days: i64,
    ) -> Result<bool, ValidationError> {
        let capacity = self.capacity_of(car_type);
        let mut span = enumerate_days(start.date(), days)?;
        Ok(span.all(|date| self.reserved_count(car_type, date) < capacity))
    }
}

#[derive(Debug)]
pub struct InMemoryInventory {
    capacity: HashMap<CarType, u32>,
    policy: CommitPolicy,
    by_id: DashMap<ReservationId, Reservation>,
    // One ledger per car type, indexed by `CarType as usize`
    calendar: [DashMap<NaiveDate, u32>; CarType::ALL.len()],
    commit_lock: Mutex<()>,
}

impl InMemoryInventory {
    pub fn new(capacity: HashMap<CarType, u32>) -> Result<Self, ValidationError> {
        Self::with_policy(capacity, CommitPolicy::default())
    }

    pub fn with_policy(
        capacity: HashMap<CarType, u32>,
        policy: CommitPolicy,
    ) -> Result<Self, ValidationError> {
        if capacity.is_empty() {
            return Err(ValidationError::EmptyCapacity);
        }
        Ok(Self {
            capacity,
            policy,
            by_id: DashMap::new(),
            calendar: std::array::from_fn(|_| DashMap::new()),
            commit_lock: Mutex::new(()),
        })
    }

    pub fn from_config(config: &InventoryConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Self::with_policy(config.capacity.clone(), config.policy)
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    fn ledger(&self, car_type: CarType) -> &DashMap<NaiveDate, u32> {
        &self.calendar[car_type as usize]
    }

    fn commit_guard(&self) -> Option<MutexGuard<'_, ()>> {
        match self.policy {
            CommitPolicy::Serialized => Some(self.commit_lock.lock()),
            CommitPolicy::Optimistic => None,
        }
    }

    fn spans_free(&self, reservation: &Reservation) -> bool {
        let car_type = reservation.car_type();
        let capacity = self.capacity_of(car_type);
        reservation
            .covered_days()
            .all(|date| self.reserved_count(car_type, date) < capacity)
    }

    // Occupancy must already include `reservation`. A reservation replaced
    // under the same id has its days released so the ledger stays exact.
    fn insert_entry(&self, reservation: Reservation) {
        let id = reservation.id();
        if let Some(previous) = self.by_id.insert(id, reservation) {
            debug!(reservation_id = id, "replaced reservation with duplicate id");
            self.release_days(&previous);
        }
    }

    fn claim_days(&self, reservation: &Reservation) {
        let cells = self.ledger(reservation.car_type());
        for date in reservation.covered_days() {
            *cells.entry(date).or_insert(0) += 1;
        }
    }

    fn release_days(&self, reservation: &Reservation) {
        let cells = self.ledger(reservation.car_type());
        for date in reservation.covered_days() {
            release_cell(cells, date);
        }
    }

    fn commit_serialized(&self, reservation: Reservation) -> bool {
        let _guard = self.commit_lock.lock();
        if !self.spans_free(&reservation) {
            return false;
        }
        self.claim_days(&reservation);
        self.insert_entry(reservation);
        true
    }

    fn commit_optimistic(&self, reservation: Reservation) -> bool {
        let capacity = self.capacity_of(reservation.car_type());
        let cells = self.ledger(reservation.car_type());

        let mut claimed = Vec::with_capacity(reservation.days() as usize);
        for date in reservation.covered_days() {
            if !try_claim_cell(cells, date, capacity) {
                for date in claimed {
                    release_cell(cells, date);
                }
                debug!(
                    reservation_id = reservation.id(),
                    car_type = %reservation.car_type(),
                    full_date = %date,
                    "rolled back optimistic commit"
                );
                return false;
            }
            claimed.push(date);
        }

        self.insert_entry(reservation);
        true
    }
}

// Increments the cell only while it is below capacity. The shard lock held by
// the entry makes the check and the increment one step.
fn try_claim_cell(cells: &DashMap<NaiveDate, u32>, date: NaiveDate, capacity: u32) -> bool {
    let claimed = {
        let mut count = cells.entry(date).or_insert(0);
        if *count < capacity {
            *count += 1;
            true
        } else {
            false
        }
    };
    if !claimed {
        cells.remove_if(&date, |_, count| *count == 0);
    }
    claimed
}

fn release_cell(cells: &DashMap<NaiveDate, u32>, date: NaiveDate) {
    if let Some(mut count) = cells.get_mut(&date) {
        *count = count.saturating_sub(1);
    }
    cells.remove_if(&date, |_, count| *count == 0);
}

impl Inventory for InMemoryInventory {
    fn capacity(&self) -> &HashMap<CarType, u32> {
        &self.capacity
    }

    fn add(&self, reservation: Reservation) {
        let _guard = self.commit_guard();
        debug!(
            reservation_id = reservation.id(),
            car_type = %reservation.car_type(),
            start = %reservation.start(),
            days = reservation.days(),
            "adding reservation"
        );
        self.claim_days(&reservation);
        self.insert_entry(reservation);
    }

    fn try_add(&self, reservation: Reservation) -> bool {
        let id = reservation.id();
        let committed = match self.policy {
            CommitPolicy::Serialized => self.commit_serialized(reservation),
            CommitPolicy::Optimistic => self.commit_optimistic(reservation),
        };
        debug!(reservation_id = id, committed, policy = ?self.policy, "checked commit");
        committed
    }

    fn remove_reservation_by_id(&self, id: ReservationId) -> bool {
        let _guard = self.commit_guard();
        let Some((_, reservation)) = self.by_id.remove(&id) else {
            return false;
        };
        self.release_days(&reservation);
        debug!(
            reservation_id = id,
            car_type = %reservation.car_type(),
            "removed reservation"
        );
        true
    }

    fn get(&self, id: ReservationId) -> Option<Reservation> {
        self.by_id.get(&id).map(|entry| entry.value().clone())
    }

    fn all(&self) -> Vec<Reservation> {
        let mut reservations: Vec<Reservation> = self
            .by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        reservations.sort_by_key(Reservation::id);
        reservations
    }

    fn reserved_count(&self, car_type: CarType, date: NaiveDate) -> u32 {
        self.ledger(car_type)
            .get(&date)
            .map(|count| *count)
            .unwrap_or(0)
    }
}
