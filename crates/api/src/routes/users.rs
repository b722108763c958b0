use axum::routing::patch;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// PATCH /{id}/role  -> set_role (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/role", patch(users::set_role))
}
