// Error types for reservation construction, booking and configuration

use chrono::NaiveDate;
use thiserror::Error;

use crate::reservation::CarType;

// Raised when a request, reservation or capacity table is built from bad input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Days must be > 0, got {0}")]
    NonPositiveDays(i64),

    #[error("Reservation id must be positive, got {0}")]
    InvalidReservationId(u64),

    #[error("Capacity table must not be empty")]
    EmptyCapacity,

    #[error("Rental of {days} days starting {start} ends outside the supported calendar")]
    DateOutOfRange { start: NaiveDate, days: i64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    #[error("Overbooking prevented for {car_type}")]
    OverbookingPrevented {
        car_type: CarType,
        start: NaiveDate,
        days: u32,
    },

    #[error("Invalid reservation: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}
