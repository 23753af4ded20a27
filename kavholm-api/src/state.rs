use std::sync::Arc;

use kavholm_core::repository::{BookingRepository, ListingRepository, UserRepository};
use kavholm_core::BookingService;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub bookings: BookingService,
    pub users: Arc<dyn UserRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub auth: AuthConfig,
}

impl AppState {
    /// Wires every collaborator from a single store implementing all three
    /// repositories.
    pub fn from_store<S>(store: Arc<S>, auth: AuthConfig) -> Self
    where
        S: BookingRepository + UserRepository + ListingRepository + 'static,
    {
        Self {
            bookings: BookingService::new(store.clone(), store.clone()),
            users: store.clone(),
            listings: store,
            auth,
        }
    }
}
