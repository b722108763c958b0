//! Handlers for the `/users` resource (admin account management).

use axum::extract::{Path, State};
use axum::Json;
use figtally_core::error::CoreError;
use figtally_core::roles::Role;
use figtally_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::auth::UserInfo;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PATCH /users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// PATCH /api/v1/users/{id}/role
///
/// Promote or demote an account. The new role is carried by tokens issued
/// from the next login onwards.
pub async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoleRequest>,
) -> AppResult<Json<DataResponse<UserInfo>>> {
    let user = state
        .store
        .set_role(id, input.role)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;

    tracing::info!(
        user_id = user.id,
        role = %user.role,
        changed_by = admin.user_id,
        "User role changed"
    );

    Ok(Json(DataResponse { data: user.into() }))
}
