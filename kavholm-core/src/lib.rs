pub mod memory;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod service;

pub use models::{AuthenticatedUser, Booking, Listing, NewBooking, NewBookingPayload, User};
pub use repository::{BookingRepository, ListingRepository, RepoError, UserRepository};
pub use service::BookingService;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[source] RepoError),
}

impl From<RepoError> for BookingError {
    fn from(err: RepoError) -> Self {
        BookingError::Storage(err)
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
