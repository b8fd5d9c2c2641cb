// Reservation records, booking requests and the day-granularity span logic they share

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::ReservationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CarType {
    Sedan,
    Suv,
    Van,
}

impl CarType {
    pub const ALL: [CarType; 3] = [CarType::Sedan, CarType::Suv, CarType::Van];

    pub fn as_str(&self) -> &'static str {
        match self {
            CarType::Sedan => "SEDAN",
            CarType::Suv => "SUV",
            CarType::Van => "VAN",
        }
    }
}

impl fmt::Display for CarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Calendar dates covered by a rental: [start, start + days).
// Fails for days <= 0 and for spans that run off the calendar.
pub fn enumerate_days(
    start: NaiveDate,
    days: i64,
) -> Result<impl Iterator<Item = NaiveDate>, ValidationError> {
    if days <= 0 {
        return Err(ValidationError::NonPositiveDays(days));
    }
    let count = days as u64;
    if start.checked_add_days(Days::new(count)).is_none() {
        return Err(ValidationError::DateOutOfRange { start, days });
    }
    Ok(span_from(start, count))
}

// Caller guarantees start + count fits in the calendar
fn span_from(start: NaiveDate, count: u64) -> impl Iterator<Item = NaiveDate> {
    (0..count).map(move |i| start + Days::new(i))
}

// Checks the day count and computes the end of the span
fn validate_span(start: NaiveDateTime, days: i64) -> Result<(u32, NaiveDateTime), ValidationError> {
    if days <= 0 {
        return Err(ValidationError::NonPositiveDays(days));
    }
    let out_of_range = ValidationError::DateOutOfRange {
        start: start.date(),
        days,
    };
    let count = u32::try_from(days).map_err(|_| out_of_range.clone())?;
    let end = start
        .checked_add_days(Days::new(u64::from(count)))
        .ok_or(out_of_range)?;
    Ok((count, end))
}

// Equality and hashing use the id alone
#[derive(Debug, Clone, Serialize)]
pub struct Reservation {
    id: ReservationId,
    car_type: CarType,
    start: NaiveDateTime,
    days: u32,
    end: NaiveDateTime,
}

impl Reservation {
    pub fn new(
        id: ReservationId,
        car_type: CarType,
        start: NaiveDateTime,
        days: i64,
    ) -> Result<Self, ValidationError> {
        if id == 0 {
            return Err(ValidationError::InvalidReservationId(id));
        }
        let (days, end) = validate_span(start, days)?;
        Ok(Self {
            id,
            car_type,
            start,
            days,
            end,
        })
    }

    pub(crate) fn from_request(id: ReservationId, request: &ReservationRequest) -> Result<Self, ValidationError> {
        Self::new(id, request.car_type, request.start, i64::from(request.days))
    }

    pub fn id(&self) -> ReservationId {
        self.id
    }

    pub fn car_type(&self) -> CarType {
        self.car_type
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn covered_days(&self) -> impl Iterator<Item = NaiveDate> {
        span_from(self.start.date(), u64::from(self.days))
    }
}

impl PartialEq for Reservation {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Reservation {}

impl Hash for Reservation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReservationRequest")]
pub struct ReservationRequest {
    car_type: CarType,
    start: NaiveDateTime,
    days: u32,
}

impl ReservationRequest {
    pub fn new(car_type: CarType, start: NaiveDateTime, days: i64) -> Result<Self, ValidationError> {
        let (days, _) = validate_span(start, days)?;
        Ok(Self {
            car_type,
            start,
            days,
        })
    }

    pub fn builder() -> ReservationRequestBuilder {
        ReservationRequestBuilder::default()
    }

    pub fn car_type(&self) -> CarType {
        self.car_type
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn days(&self) -> u32 {
        self.days
    }
}

#[derive(Debug, Default, Clone)]
pub struct ReservationRequestBuilder {
    car_type: Option<CarType>,
    start: Option<NaiveDateTime>,
    days: Option<i64>,
}

impl ReservationRequestBuilder {
    pub fn car_type(mut self, car_type: CarType) -> Self {
        self.car_type = Some(car_type);
        self
    }

    pub fn start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    pub fn days(mut self, days: i64) -> Self {
        self.days = Some(days);
        self
    }

    pub fn build(self) -> Result<ReservationRequest, ValidationError> {
        let car_type = self.car_type.ok_or(ValidationError::MissingField("car_type"))?;
        let start = self.start.ok_or(ValidationError::MissingField("start"))?;
        let days = self.days.ok_or(ValidationError::MissingField("days"))?;
        ReservationRequest::new(car_type, start, days)
    }
}

// Wire shape of a request; every field may be absent until validated
#[derive(Debug, Deserialize)]
struct RawReservationRequest {
    car_type: Option<CarType>,
    start: Option<NaiveDateTime>,
    days: Option<i64>,
}

impl TryFrom<RawReservationRequest> for ReservationRequest {
    type Error = ValidationError;

    fn try_from(raw: RawReservationRequest) -> Result<Self, Self::Error> {
        ReservationRequestBuilder {
            car_type: raw.car_type,
            start: raw.start,
            days: raw.days,
        }
        .build()
    }
}
