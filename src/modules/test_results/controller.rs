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

use super::model::{
    CreateTestDefinitionDto, CreateTestResultDto, TestDefinition, TestResult, UpdateTestResultDto,
};
use super::service::{TestDefinitionService, TestResultService};

/// List test results of students visible to the caller
#[utoipa::path(
    get,
    path = "/api/test-results",
    responses(
        (status = 200, description = "Visible test results", body = [TestResult]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Test Results"
)]
#[instrument(skip(state))]
pub async fn get_test_results(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<TestResult>>, AppError> {
    let records = TestResultService::list(&state.db, &principal).await?;
    Ok(Json(records))
}

/// Record a test result for a student (admin or assigned teacher)
#[utoipa::path(
    post,
    path = "/api/test-results",
    request_body = CreateTestResultDto,
    responses(
        (status = 201, description = "Test result created", body = TestResult),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Test Results"
)]
#[instrument(skip(state, dto))]
pub async fn create_test_result(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateTestResultDto>,
) -> Result<(StatusCode, Json<TestResult>), AppError> {
    let record = TestResultService::create(&state.db, &principal, dto).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Retrieve a test result (caller must see the owning student)
#[utoipa::path(
    get,
    path = "/api/test-results/{id}",
    params(("id" = Uuid, Path, description = "Test result ID")),
    responses(
        (status = 200, description = "Test result details", body = TestResult),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Test result not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Test Results"
)]
#[instrument(skip(state))]
pub async fn get_test_result(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TestResult>, AppError> {
    let record = TestResultService::get(&state.db, &principal, id).await?;
    Ok(Json(record))
}

/// Update a test result (admin or assigned teacher)
#[utoipa::path(
    put,
    path = "/api/test-results/{id}",
    params(("id" = Uuid, Path, description = "Test result ID")),
    request_body = UpdateTestResultDto,
    responses(
        (status = 200, description = "Test result updated", body = TestResult),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Test result not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Test Results"
)]
#[instrument(skip(state, dto))]
pub async fn update_test_result(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateTestResultDto>,
) -> Result<Json<TestResult>, AppError> {
    let record = TestResultService::update(&state.db, &principal, id, dto).await?;
    Ok(Json(record))
}

/// Delete a test result (admin or assigned teacher)
#[utoipa::path(
    delete,
    path = "/api/test-results/{id}",
    params(("id" = Uuid, Path, description = "Test result ID")),
    responses(
        (status = 200, description = "Test result deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Test result not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Test Results"
)]
#[instrument(skip(state))]
pub async fn delete_test_result(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    TestResultService::delete(&state.db, &principal, id).await?;
    Ok(Json(json!({"message": "Test result deleted successfully"})))
}

/// List the test catalog
#[utoipa::path(
    get,
    path = "/api/tests",
    responses(
        (status = 200, description = "Available tests", body = [TestDefinition]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Tests"
)]
#[instrument(skip(state))]
pub async fn get_tests(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<TestDefinition>>, AppError> {
    let tests = TestDefinitionService::list(&state.db, &principal).await?;
    Ok(Json(tests))
}

/// Add a test to the catalog (admin only)
#[utoipa::path(
    post,
    path = "/api/tests",
    request_body = CreateTestDefinitionDto,
    responses(
        (status = 201, description = "Test created", body = TestDefinition),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Tests"
)]
#[instrument(skip(state, dto))]
pub async fn create_test(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateTestDefinitionDto>,
) -> Result<(StatusCode, Json<TestDefinition>), AppError> {
    let test = TestDefinitionService::create(&state.db, &principal, dto).await?;
    Ok((StatusCode::CREATED, Json(test)))
}

/// Remove a test from the catalog (admin only)
#[utoipa::path(
    delete,
    path = "/api/tests/{id}",
    params(("id" = Uuid, Path, description = "Test ID")),
    responses(
        (status = 200, description = "Test deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Test not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "Tests"
)]
#[instrument(skip(state))]
pub async fn delete_test(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    TestDefinitionService::delete(&state.db, &principal, id).await?;
    Ok(Json(json!({"message": "Test deleted successfully"})))
}
