pub mod auth;

pub use auth::require_authenticated_user;
