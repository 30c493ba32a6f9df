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

use super::model::{ClassGroup, CreateClassGroupDto, UpdateClassGroupDto};
use super::service::ClassGroupService;

/// List class groups visible to the caller
#[utoipa::path(
    get,
    path = "/api/classes",
    responses(
        (status = 200, description = "Visible class groups", body = [ClassGroup]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Class Groups"
)]
#[instrument(skip(state))]
pub async fn get_class_groups(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<ClassGroup>>, AppError> {
    let groups = ClassGroupService::list(&state.db, &principal).await?;
    Ok(Json(groups))
}

/// Create a class group (admin only)
#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassGroupDto,
    responses(
        (status = 201, description = "Class group created", body = ClassGroup),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Class Groups"
)]
#[instrument(skip(state, dto))]
pub async fn create_class_group(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateClassGroupDto>,
) -> Result<(StatusCode, Json<ClassGroup>), AppError> {
    let group = ClassGroupService::create(&state.db, &principal, dto).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// Retrieve a class group (admin or assigned teacher)
#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class group ID")),
    responses(
        (status = 200, description = "Class group details", body = ClassGroup),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Class group not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Class Groups"
)]
#[instrument(skip(state))]
pub async fn get_class_group(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassGroup>, AppError> {
    let group = ClassGroupService::get(&state.db, &principal, id).await?;
    Ok(Json(group))
}

/// Update a class group (admin only)
#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class group ID")),
    request_body = UpdateClassGroupDto,
    responses(
        (status = 200, description = "Class group updated", body = ClassGroup),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Class group not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Class Groups"
)]
#[instrument(skip(state, dto))]
pub async fn update_class_group(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateClassGroupDto>,
) -> Result<Json<ClassGroup>, AppError> {
    let group = ClassGroupService::update(&state.db, &principal, id, dto).await?;
    Ok(Json(group))
}

/// Delete a class group; its students remain, unassigned (admin only)
#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class group ID")),
    responses(
        (status = 200, description = "Class group deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Class group not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Class Groups"
)]
#[instrument(skip(state))]
pub async fn delete_class_group(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    ClassGroupService::delete(&state.db, &principal, id).await?;
    Ok(Json(json!({"message": "Class group deleted successfully"})))
}
