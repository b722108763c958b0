//! Role-based access control (RBAC) extractors.
//!
//! Guards the admin-only routes: deleting possessions, the all-possessions
//! listing, bulk import and role management. The core operations repeat the
//! check.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use figtally_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role, as currently stored for the account.
/// Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     let caller = admin.caller();
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.caller().is_admin() {
            tracing::warn!(
                user_id = user.user_id,
                role = %user.role,
                method = %parts.method,
                path = %parts.uri.path(),
                "Admin route refused",
            );
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
