// Car rental reservation tracker: per-car-type daily capacity and an occupancy ledger

pub mod config;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod reservation;
pub mod service;

// Re-export key types for convenience
pub use config::InventoryConfig;
pub use error::{ConfigError, ReservationError, ValidationError};
pub use ids::{AtomicIdGenerator, IdGenerator, ReservationId};
pub use inventory::{CommitPolicy, InMemoryInventory, Inventory};
pub use reservation::{enumerate_days, CarType, Reservation, ReservationRequest, ReservationRequestBuilder};
pub use service::{ReservationResult, ReservationService, ServiceStatsReport};
