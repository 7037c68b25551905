use axum::{middleware, Router};

use crate::middleware::auth::require_login;
use crate::state::AppState;

pub mod handlers;
pub mod repo;

/// Event routes, all behind the login guard. Ownership is additionally
/// enforced per query.
pub fn router() -> Router<AppState> {
    handlers::event_routes().route_layer(middleware::from_fn(require_login))
}
