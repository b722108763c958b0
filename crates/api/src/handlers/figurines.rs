//! Handlers for the `/figurines` resource.
//!
//! Thin adapters: authorization beyond "is there a valid token" lives in
//! `figtally_core::figurines` and `figtally_core::import`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use figtally_core::figurines;
use figtally_core::import::{self, ImportReport};
use figtally_core::payload::{FigurineRecord, UpdatePayload};
use figtally_core::types::DbId;
use figtally_core::view::{DefinitionView, PossessionView};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Summary returned by `POST /figurines/bulk-import`.
#[derive(Debug, Serialize)]
pub struct BulkImportResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: ImportReport,
}

// ---------------------------------------------------------------------------
// Possessions
// ---------------------------------------------------------------------------

/// POST /api/v1/figurines
///
/// Add a figurine to the caller's collection, creating its definition if
/// the name is new. An existing possession has the quantities merged in.
pub async fn create_figurine(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<FigurineRecord>,
) -> AppResult<(StatusCode, Json<DataResponse<PossessionView>>)> {
    let view = figurines::create_or_merge_possession(&*state.store, &admin.caller(), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/figurines
///
/// The caller's own possessions.
pub async fn list_figurines(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PossessionView>>>> {
    let views = figurines::list_possessions(&*state.store, auth.user_id).await?;
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/figurines/{id}
pub async fn get_figurine(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PossessionView>>> {
    let view = figurines::get_possession(&*state.store, &auth.caller(), id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/figurines/{id}
///
/// Owners may change quantities; admins may also change the linked
/// definition.
pub async fn update_figurine(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePayload>,
) -> AppResult<Json<DataResponse<PossessionView>>> {
    let view = figurines::update_possession(&*state.store, &auth.caller(), id, &input).await?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/figurines/{id}
pub async fn delete_figurine(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    figurines::delete_possession(&*state.store, &admin.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/figurines/admin/all-possessions
pub async fn list_all_possessions(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PossessionView>>>> {
    let views = figurines::list_all_possessions(&*state.store, &admin.caller()).await?;
    Ok(Json(DataResponse { data: views }))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// GET /api/v1/figurines/definitions/all
///
/// The whole catalog. Public.
pub async fn list_definitions(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<DefinitionView>>>> {
    let views = figurines::list_definitions(&*state.store).await?;
    Ok(Json(DataResponse { data: views }))
}

// ---------------------------------------------------------------------------
// Bulk import
// ---------------------------------------------------------------------------

/// POST /api/v1/figurines/bulk-import
///
/// Body is a JSON array of figurine records. Responds 201 when every record
/// went through and 207 when at least one failed.
pub async fn bulk_import(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(records): Json<Vec<serde_json::Value>>,
) -> AppResult<(StatusCode, Json<DataResponse<BulkImportResponse>>)> {
    let report = import::bulk_import(&*state.store, &admin.caller(), records).await?;

    let status = if report.is_partial() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::CREATED
    };
    let data = BulkImportResponse {
        message: report.message(),
        report,
    };
    Ok((status, Json(DataResponse { data })))
}
