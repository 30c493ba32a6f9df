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

use super::model::{Allergy, CreateAllergyDto, UpdateAllergyDto};
use super::service::AllergyService;

/// List the allergy catalog
#[utoipa::path(
    get,
    path = "/api/allergies",
    responses(
        (status = 200, description = "Known allergies", body = [Allergy]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Allergies"
)]
#[instrument(skip(state))]
pub async fn get_allergies(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<Allergy>>, AppError> {
    let allergies = AllergyService::list(&state.db, &principal).await?;
    Ok(Json(allergies))
}

/// Add an allergy to the catalog (admin only)
#[utoipa::path(
    post,
    path = "/api/allergies",
    request_body = CreateAllergyDto,
    responses(
        (status = 201, description = "Allergy created", body = Allergy),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Allergies"
)]
#[instrument(skip(state, dto))]
pub async fn create_allergy(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateAllergyDto>,
) -> Result<(StatusCode, Json<Allergy>), AppError> {
    let allergy = AllergyService::create(&state.db, &principal, dto).await?;
    Ok((StatusCode::CREATED, Json(allergy)))
}

/// Retrieve an allergy
#[utoipa::path(
    get,
    path = "/api/allergies/{id}",
    params(("id" = Uuid, Path, description = "Allergy ID")),
    responses(
        (status = 200, description = "Allergy details", body = Allergy),
        (status = 404, description = "Allergy not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Allergies"
)]
#[instrument(skip(state))]
pub async fn get_allergy(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Allergy>, AppError> {
    let allergy = AllergyService::get(&state.db, &principal, id).await?;
    Ok(Json(allergy))
}

/// Update an allergy (admin only)
#[utoipa::path(
    put,
    path = "/api/allergies/{id}",
    params(("id" = Uuid, Path, description = "Allergy ID")),
    request_body = UpdateAllergyDto,
    responses(
        (status = 200, description = "Allergy updated", body = Allergy),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Allergy not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Allergies"
)]
#[instrument(skip(state, dto))]
pub async fn update_allergy(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAllergyDto>,
) -> Result<Json<Allergy>, AppError> {
    let allergy = AllergyService::update(&state.db, &principal, id, dto).await?;
    Ok(Json(allergy))
}

/// Delete an allergy (admin only)
#[utoipa::path(
    delete,
    path = "/api/allergies/{id}",
    params(("id" = Uuid, Path, description = "Allergy ID")),
    responses(
        (status = 200, description = "Allergy deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Allergy not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Allergies"
)]
#[instrument(skip(state))]
pub async fn delete_allergy(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    AllergyService::delete(&state.db, &principal, id).await?;
    Ok(Json(json!({"message": "Allergy deleted successfully"})))
}
