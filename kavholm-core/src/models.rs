use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::BookingError;

pub const DEFAULT_PAYMENT_METHOD: &str = "card";
pub const DEFAULT_GUESTS: i32 = 1;

/// A booking as returned to callers, enriched with the creator's and the
/// host's current usernames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub payment_method: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
    pub total_cost: i64,
    pub listing_id: i64,
    pub user_id: i64,
    pub username: String,
    pub host_username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub user_id: i64,
    /// Nightly price in whole currency units.
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Identity of the caller, as established by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

impl AuthenticatedUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into() }
    }
}

/// Booking request body as it arrives over the wire. Dates are optional here
/// so that a missing field surfaces as a `BadRequest` naming it, rather than
/// as a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookingPayload {
    #[serde(default, deserialize_with = "flexible_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub end_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub guests: Option<i32>,
}

/// A booking request that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_method: String,
    pub guests: i32,
}

impl NewBookingPayload {
    pub fn validate(self) -> Result<NewBooking, BookingError> {
        let start_date = self.start_date.ok_or_else(|| missing("startDate"))?;
        let end_date = self.end_date.ok_or_else(|| missing("endDate"))?;

        // Empty strings and zero guests fall back the same way absent values do.
        let payment_method = self
            .payment_method
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
        let guests = self.guests.filter(|g| *g != 0).unwrap_or(DEFAULT_GUESTS);

        Ok(NewBooking {
            start_date,
            end_date,
            payment_method,
            guests,
        })
    }
}

fn missing(field: &str) -> BookingError {
    BookingError::BadRequest(format!("Missing {} in newBooking.", field))
}

/// Row handed to a repository for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub payment_method: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
    pub total_cost: i64,
    pub listing_id: i64,
    pub user_id: i64,
}

/// Accepts `2021-07-05` as well as full RFC 3339 timestamps such as
/// `2021-07-05T00:00:00.000Z`; the latter are reduced to their UTC date.
fn flexible_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_date(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| format!("invalid date: {}", s))
}
