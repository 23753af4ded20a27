use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{AuthenticatedUser, Booking, BookingRecord, Listing, NewBookingPayload};
use crate::pricing;
use crate::repository::{BookingRepository, UserRepository};
use crate::{BookingError, BookingResult};

/// Booking creation and retrieval on top of injected repositories.
///
/// Authorization (who may book or view what) is the caller's job; this type
/// only validates input, prices stays and reads/writes storage.
#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserRepository>,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { bookings, users }
    }

    pub async fn fetch_booking_by_id(&self, booking_id: i64) -> BookingResult<Booking> {
        debug!("Fetching booking {}", booking_id);

        self.bookings
            .fetch_booking(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("No booking found with that id.".to_string()))
    }

    /// All bookings the user has made, newest first.
    pub async fn list_bookings_from_user(&self, user: &AuthenticatedUser) -> BookingResult<Vec<Booking>> {
        let bookings = self.bookings.list_bookings_by_creator(&user.username).await?;
        debug!("Found {} bookings made by {}", bookings.len(), user.username);
        Ok(bookings)
    }

    /// All bookings made against listings the user owns, newest first.
    pub async fn list_bookings_for_user_listings(
        &self,
        user: &AuthenticatedUser,
    ) -> BookingResult<Vec<Booking>> {
        let bookings = self.bookings.list_bookings_by_host(&user.username).await?;
        debug!("Found {} bookings on listings of {}", bookings.len(), user.username);
        Ok(bookings)
    }

    pub async fn create_booking(
        &self,
        new_booking: NewBookingPayload,
        listing: &Listing,
        user: &AuthenticatedUser,
    ) -> BookingResult<Booking> {
        let new_booking = new_booking.validate()?;

        let creator = self
            .users
            .find_user_by_username(&user.username)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!("No user found with username {}.", user.username))
            })?;

        let total_cost = pricing::total_cost(new_booking.start_date, new_booking.end_date, listing.price)
            .ok_or_else(|| BookingError::BadRequest("Booking total is out of range.".to_string()))?;

        let record = BookingRecord {
            total_cost,
            payment_method: new_booking.payment_method,
            start_date: new_booking.start_date,
            end_date: new_booking.end_date,
            guests: new_booking.guests,
            listing_id: listing.id,
            user_id: creator.id,
        };

        let booking = self.bookings.insert_booking(&record).await?;

        info!(
            "Booking {} created by {} on listing {} (total {})",
            booking.id, booking.username, booking.listing_id, booking.total_cost
        );

        Ok(booking)
    }
}
