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

use super::model::{CreateHealthDataDto, HealthData, UpdateHealthDataDto};
use super::service::HealthDataService;

/// List health records of students visible to the caller
#[utoipa::path(
    get,
    path = "/api/health-data",
    responses(
        (status = 200, description = "Visible health records", body = [HealthData]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Health Data"
)]
#[instrument(skip(state))]
pub async fn get_health_data_list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<HealthData>>, AppError> {
    let records = HealthDataService::list(&state.db, &principal).await?;
    Ok(Json(records))
}

/// Record health data for a student (admin or assigned teacher)
#[utoipa::path(
    post,
    path = "/api/health-data",
    request_body = CreateHealthDataDto,
    responses(
        (status = 201, description = "Health record created", body = HealthData),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Health Data"
)]
#[instrument(skip(state, dto))]
pub async fn create_health_data(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateHealthDataDto>,
) -> Result<(StatusCode, Json<HealthData>), AppError> {
    let record = HealthDataService::create(&state.db, &principal, dto).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Retrieve a health record (caller must see the owning student)
#[utoipa::path(
    get,
    path = "/api/health-data/{id}",
    params(("id" = Uuid, Path, description = "Health record ID")),
    responses(
        (status = 200, description = "Health record details", body = HealthData),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Health record not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Health Data"
)]
#[instrument(skip(state))]
pub async fn get_health_data(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<HealthData>, AppError> {
    let record = HealthDataService::get(&state.db, &principal, id).await?;
    Ok(Json(record))
}

/// Update a health record (admin or assigned teacher)
#[utoipa::path(
    put,
    path = "/api/health-data/{id}",
    params(("id" = Uuid, Path, description = "Health record ID")),
    request_body = UpdateHealthDataDto,
    responses(
        (status = 200, description = "Health record updated", body = HealthData),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Health record not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Health Data"
)]
#[instrument(skip(state, dto))]
pub async fn update_health_data(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateHealthDataDto>,
) -> Result<Json<HealthData>, AppError> {
    let record = HealthDataService::update(&state.db, &principal, id, dto).await?;
    Ok(Json(record))
}

/// Delete a health record (admin or assigned teacher)
#[utoipa::path(
    delete,
    path = "/api/health-data/{id}",
    params(("id" = Uuid, Path, description = "Health record ID")),
    responses(
        (status = 200, description = "Health record deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Health record not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Health Data"
)]
#[instrument(skip(state))]
pub async fn delete_health_data(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    HealthDataService::delete(&state.db, &principal, id).await?;
    Ok(Json(json!({"message": "Health record deleted successfully"})))
}
