use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::typed_header::TypedHeaderRejection;
use axum_extra::TypedHeader;
use kavholm_core::AuthenticatedUser;

use crate::{auth::verify_token, error::AppError, state::AppState};

/// Rejects requests without a valid bearer token and injects the caller's
/// `AuthenticatedUser` into request extensions.
pub async fn require_authenticated_user(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .map_err(|_| AppError::AuthenticationError("Missing bearer token".to_string()))?;

    let claims = verify_token(&state.auth.secret, bearer.token()).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AppError::AuthenticationError("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(AuthenticatedUser::new(claims.username));

    Ok(next.run(req).await)
}
