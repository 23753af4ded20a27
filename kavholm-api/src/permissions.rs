use kavholm_core::repository::UserRepository;
use kavholm_core::{AuthenticatedUser, Booking, Listing};

use crate::{error::AppError, state::AppState};

/// Hosts may not book their own listings.
pub async fn authed_user_is_not_listing_owner(
    state: &AppState,
    listing: &Listing,
    user: &AuthenticatedUser,
) -> Result<(), AppError> {
    let account = state
        .users
        .find_user_by_username(&user.username)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("Unknown user".to_string()))?;

    if account.id == listing.user_id {
        return Err(AppError::ValidationError(
            "Users are not allowed to book their own listings.".to_string(),
        ));
    }

    Ok(())
}

/// Only the guest who made a booking and the host of the listing may see it.
pub fn authed_user_is_booking_creator_or_host(
    booking: &Booking,
    user: &AuthenticatedUser,
) -> Result<(), AppError> {
    if booking.username == user.username || booking.host_username == user.username {
        Ok(())
    } else {
        Err(AppError::AuthorizationError(
            "You are not allowed to view this booking.".to_string(),
        ))
    }
}
