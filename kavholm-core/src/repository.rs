use async_trait::async_trait;

use crate::models::{Booking, BookingRecord, Listing, User};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for booking data access.
///
/// Every `Booking` handed back is enriched with the creator's and the host's
/// usernames as they are at read time.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn fetch_booking(&self, id: i64) -> Result<Option<Booking>, RepoError>;

    /// Bookings created by `username`, newest first.
    async fn list_bookings_by_creator(&self, username: &str) -> Result<Vec<Booking>, RepoError>;

    /// Bookings on any listing owned by `username`, newest first.
    async fn list_bookings_by_host(&self, username: &str) -> Result<Vec<Booking>, RepoError>;

    async fn insert_booking(&self, record: &BookingRecord) -> Result<Booking, RepoError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, RepoError>;
}
