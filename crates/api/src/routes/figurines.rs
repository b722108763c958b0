//! Route definitions for the `/figurines` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::figurines;
use crate::state::AppState;

/// Routes mounted at `/figurines`.
///
/// ```text
/// GET    /                       -> list_figurines
/// POST   /                       -> create_figurine (admin)
/// POST   /bulk-import            -> bulk_import (admin)
/// GET    /definitions/all        -> list_definitions (public)
/// GET    /admin/all-possessions  -> list_all_possessions (admin)
/// GET    /{id}                   -> get_figurine
/// PUT    /{id}                   -> update_figurine
/// DELETE /{id}                   -> delete_figurine (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(figurines::list_figurines).post(figurines::create_figurine),
        )
        .route("/bulk-import", post(figurines::bulk_import))
        .route("/definitions/all", get(figurines::list_definitions))
        .route(
            "/admin/all-possessions",
            get(figurines::list_all_possessions),
        )
        .route(
            "/{id}",
            get(figurines::get_figurine)
                .put(figurines::update_figurine)
                .delete(figurines::delete_figurine),
        )
}
