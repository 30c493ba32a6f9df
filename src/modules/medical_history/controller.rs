use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::CurrentUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{CreateMedicalHistoryDto, MedicalHistory, UpdateMedicalHistoryDto};
use super::service::MedicalHistoryService;

/// List medical history of students visible to the caller
#[utoipa::path(
    get,
    path = "/api/medical-history",
    responses(
        (status = 200, description = "Visible medical history records", body = [MedicalHistory]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Medical History"
)]
#[instrument(skip(state))]
pub async fn get_medical_history_list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<MedicalHistory>>, AppError> {
    let records = MedicalHistoryService::list(&state.db, &principal).await?;
    Ok(Json(records))
}

/// Record a medical condition for a student (admin or assigned teacher)
#[utoipa::path(
    post,
    path = "/api/medical-history",
    request_body = CreateMedicalHistoryDto,
    responses(
        (status = 201, description = "Medical history record created", body = MedicalHistory),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Medical History"
)]
#[instrument(skip(state, dto))]
pub async fn create_medical_history(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateMedicalHistoryDto>,
) -> Result<(StatusCode, Json<MedicalHistory>), AppError> {
    let record = MedicalHistoryService::create(&state.db, &principal, dto).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Retrieve a medical history record (caller must see the owning student)
#[utoipa::path(
    get,
    path = "/api/medical-history/{id}",
    params(("id" = Uuid, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record details", body = MedicalHistory),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Medical History"
)]
#[instrument(skip(state))]
pub async fn get_medical_history(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MedicalHistory>, AppError> {
    let record = MedicalHistoryService::get(&state.db, &principal, id).await?;
    Ok(Json(record))
}

/// Update a medical history record (admin or assigned teacher)
#[utoipa::path(
    put,
    path = "/api/medical-history/{id}",
    params(("id" = Uuid, Path, description = "Record ID")),
    request_body = UpdateMedicalHistoryDto,
    responses(
        (status = 200, description = "Record updated", body = MedicalHistory),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Medical History"
)]
#[instrument(skip(state, dto))]
pub async fn update_medical_history(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateMedicalHistoryDto>,
) -> Result<Json<MedicalHistory>, AppError> {
    let record = MedicalHistoryService::update(&state.db, &principal, id, dto).await?;
    Ok(Json(record))
}

/// Delete a medical history record (admin or assigned teacher)
#[utoipa::path(
    delete,
    path = "/api/medical-history/{id}",
    params(("id" = Uuid, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Medical History"
)]
#[instrument(skip(state))]
pub async fn delete_medical_history(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    MedicalHistoryService::delete(&state.db, &principal, id).await?;
    Ok(Json(json!({"message": "Medical history record deleted successfully"})))
}
