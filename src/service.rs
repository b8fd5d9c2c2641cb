// Reservation service: availability check, id issuance and ledger commit as one operation

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ReservationError;
use crate::ids::{AtomicIdGenerator, IdGenerator, ReservationId};
use crate::inventory::Inventory;
use crate::reservation::{Reservation, ReservationRequest};

// Message is display text only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationResult {
    pub success: bool,
    pub reservation_id: Option<ReservationId>,
    pub message: String,
}

impl ReservationResult {
    pub fn ok(id: ReservationId) -> Self {
        Self {
            success: true,
            reservation_id: Some(id),
            message: "Reserved".to_string(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            reservation_id: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ServiceStats {
    pub reserved: AtomicUsize,
    pub rejected: AtomicUsize,
    pub cancelled: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStatsReport {
    pub reserved: usize,
    pub rejected: usize,
    pub cancelled: usize,
}

#[derive(Debug)]
pub struct ReservationService<I: Inventory, G: IdGenerator = AtomicIdGenerator> {
    inventory: Arc<I>,
    ids: G,
    stats: ServiceStats,
}

impl<I: Inventory, G: IdGenerator> ReservationService<I, G> {
    pub fn new(inventory: Arc<I>, ids: G) -> Self {
        Self {
            inventory,
            ids,
            stats: ServiceStats::default(),
        }
    }

    pub fn inventory(&self) -> &Arc<I> {
        &self.inventory
    }

    pub fn reserve(&self, request: &ReservationRequest) -> ReservationResult {
        match self.commit(request) {
            Ok(id) => ReservationResult::ok(id),
            Err(ReservationError::OverbookingPrevented { car_type, .. }) => {
                ReservationResult::fail(format!("No availability for {} in requested period.", car_type))
            }
            Err(err) => ReservationResult::fail(err.to_string()),
        }
    }

    pub fn reserve_or_throw(&self, request: &ReservationRequest) -> Result<ReservationId, ReservationError> {
        self.commit(request)
    }

    pub fn cancel(&self, id: ReservationId) -> bool {
        let removed = self.inventory.remove_reservation_by_id(id);
        if removed {
            self.stats.cancelled.fetch_add(1, Ordering::SeqCst);
            info!(reservation_id = id, "reservation cancelled");
        }
        removed
    }

    pub fn stats(&self) -> ServiceStatsReport {
        ServiceStatsReport {
            reserved: self.stats.reserved.load(Ordering::SeqCst),
            rejected: self.stats.rejected.load(Ordering::SeqCst),
            cancelled: self.stats.cancelled.load(Ordering::SeqCst),
        }
    }

    fn commit(&self, request: &ReservationRequest) -> Result<ReservationId, ReservationError> {
        let available = self.inventory.has_availability(
            request.car_type(),
            request.start(),
            i64::from(request.days()),
        )?;
        if !available {
            return Err(self.reject(request));
        }

        let id = self.ids.next_id();
        let reservation = Reservation::from_request(id, request).map_err(|err| {
            self.stats.rejected.fetch_add(1, Ordering::SeqCst);
            warn!(reservation_id = id, error = %err, "generated reservation is invalid");
            err
        })?;

        // Another caller may have taken the last slot since the check above
        if !self.inventory.try_add(reservation) {
            return Err(self.reject(request));
        }

        self.stats.reserved.fetch_add(1, Ordering::SeqCst);
        info!(
            reservation_id = id,
            car_type = %request.car_type(),
            start = %request.start(),
            days = request.days(),
            "reservation committed"
        );
        Ok(id)
    }

    fn reject(&self, request: &ReservationRequest) -> ReservationError {
        self.stats.rejected.fetch_add(1, Ordering::SeqCst);
        warn!(
            car_type = %request.car_type(),
            start = %request.start(),
            days = request.days(),
            "overbooking prevented"
        );
        ReservationError::OverbookingPrevented {
            car_type: request.car_type(),
            start: request.start().date(),
            days: request.days(),
        }
    }
}
