use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use kavholm_core::repository::ListingRepository;
use kavholm_core::{AuthenticatedUser, Booking, NewBookingPayload};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    middleware::require_authenticated_user,
    permissions::{authed_user_is_booking_creator_or_host, authed_user_is_not_listing_owner},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct BookingsResponse {
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking: Booking,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(rename = "newBooking", default)]
    pub new_booking: Option<NewBookingPayload>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_own_bookings))
        .route("/bookings/listings", get(list_bookings_on_owned_listings))
        .route("/bookings/listings/{listing_id}", post(create_booking))
        .route("/bookings/{booking_id}", get(get_booking))
        .route_layer(middleware::from_fn_with_state(state, require_authenticated_user))
}

/// GET /bookings
async fn list_own_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<BookingsResponse>, AppError> {
    let bookings = state.bookings.list_bookings_from_user(&user).await?;
    Ok(Json(BookingsResponse { bookings }))
}

/// GET /bookings/listings
async fn list_bookings_on_owned_listings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<BookingsResponse>, AppError> {
    let bookings = state.bookings.list_bookings_for_user_listings(&user).await?;
    Ok(Json(BookingsResponse { bookings }))
}

/// POST /bookings/listings/{listing_id}
async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(listing_id): Path<i64>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let Json(req) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;

    let listing = state
        .listings
        .fetch_listing(listing_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("No listing found with that id.".to_string()))?;

    authed_user_is_not_listing_owner(&state, &listing, &user).await?;

    let booking = state
        .bookings
        .create_booking(req.new_booking.unwrap_or_default(), &listing, &user)
        .await?;

    Ok((StatusCode::CREATED, Json(BookingResponse { booking })))
}

/// GET /bookings/{booking_id}
async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.fetch_booking_by_id(booking_id).await?;
    authed_user_is_booking_creator_or_host(&booking, &user)?;
    Ok(Json(BookingResponse { booking }))
}
