pub mod auth;
pub mod figurines;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                        register (public)
/// /auth/login                           login (public)
/// /auth/profile                         get, update (requires auth)
///
/// /users/{id}/role                      change role (admin only)
///
/// /figurines                            list own, create (admin)
/// /figurines/{id}                       get, update, delete (admin)
/// /figurines/bulk-import                bulk import (admin)
/// /figurines/definitions/all            catalog (public)
/// /figurines/admin/all-possessions      every possession (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/figurines", figurines::router())
}
