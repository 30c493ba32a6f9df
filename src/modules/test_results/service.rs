use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::students::service::StudentService;
use crate::policy::{self, Action, Principal, Resource, visibility};
use crate::utils::errors::AppError;

use super::model::{
    CreateTestDefinitionDto, CreateTestResultDto, TestDefinition, TestResult,
    TestResultWithAccess, UpdateTestResultDto,
};

const RECORD_WITH_ACCESS: &str = "SELECT r.id, r.test, r.result, r.student_id, r.notes,
            r.created_at, r.updated_at,
            s.parent_email,
            COALESCE(t.teacher_ids, ARRAY[]::uuid[]) AS teacher_ids
     FROM test_results r
     JOIN students s ON s.id = r.student_id
     LEFT JOIN (
         SELECT class_group_id, array_agg(teacher_id) AS teacher_ids
         FROM class_group_teachers
         GROUP BY class_group_id
     ) t ON t.class_group_id = s.class_group_id";

pub struct TestResultService;

impl TestResultService {
    /// Results of students visible to the caller.
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, principal: &Principal) -> Result<Vec<TestResult>, AppError> {
        let records = sqlx::query_as::<_, TestResultWithAccess>(&format!(
            "{RECORD_WITH_ACCESS} ORDER BY r.created_at"
        ))
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(visibility::filter_students(principal, records)
            .into_iter()
            .map(|row| row.record)
            .collect())
    }

    #[instrument(skip(db, dto))]
    pub async fn create(
        db: &PgPool,
        principal: &Principal,
        dto: CreateTestResultDto,
    ) -> Result<TestResult, AppError> {
        let access = StudentService::student_access(db, dto.student_id)
            .await?
            .ok_or_else(|| policy::not_found_for(principal, "Student"))?;

        policy::authorize(principal, Action::Create, Resource::HealthRecord(&access)).require()?;

        let record = sqlx::query_as::<_, TestResult>(
            "INSERT INTO test_results (test, result, student_id, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING id, test, result, student_id, notes, created_at, updated_at",
        )
        .bind(&dto.test)
        .bind(&dto.result)
        .bind(dto.student_id)
        .bind(&dto.notes)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(record)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, principal: &Principal, id: Uuid) -> Result<TestResult, AppError> {
        let row = Self::fetch(db, id).await?;

        match row {
            Some(row) => {
                policy::authorize(
                    principal,
                    Action::Read,
                    Resource::HealthRecord(&row.access()),
                )
                .require()?;
                Ok(row.record)
            }
            None => Err(policy::not_found_for(principal, "Health record")),
        }
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        principal: &Principal,
        id: Uuid,
        dto: UpdateTestResultDto,
    ) -> Result<TestResult, AppError> {
        let row = Self::fetch(db, id)
            .await?
            .ok_or_else(|| policy::not_found_for(principal, "Health record"))?;

        policy::authorize(
            principal,
            Action::Update,
            Resource::HealthRecord(&row.access()),
        )
        .require()?;

        let existing = row.record;
        let test = dto.test.unwrap_or(existing.test);
        let result = dto.result.unwrap_or(existing.result);
        let notes = dto.notes.unwrap_or(existing.notes);

        let record = sqlx::query_as::<_, TestResult>(
            "UPDATE test_results
             SET test = $1, result = $2, notes = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING id, test, result, student_id, notes, created_at, updated_at",
        )
        .bind(&test)
        .bind(&result)
        .bind(&notes)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(record)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, principal: &Principal, id: Uuid) -> Result<(), AppError> {
        let row = Self::fetch(db, id)
            .await?
            .ok_or_else(|| policy::not_found_for(principal, "Health record"))?;

        policy::authorize(
            principal,
            Action::Delete,
            Resource::HealthRecord(&row.access()),
        )
        .require()?;

        sqlx::query("DELETE FROM test_results WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        Ok(())
    }

    async fn fetch(db: &PgPool, id: Uuid) -> Result<Option<TestResultWithAccess>, AppError> {
        sqlx::query_as::<_, TestResultWithAccess>(&format!("{RECORD_WITH_ACCESS} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)
    }
}

/// The test-name catalog: reference data, not student-scoped.
pub struct TestDefinitionService;

impl TestDefinitionService {
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, principal: &Principal) -> Result<Vec<TestDefinition>, AppError> {
        policy::authorize(principal, Action::List, Resource::Catalog).require()?;

        let tests = sqlx::query_as::<_, TestDefinition>(
            "SELECT id, test_name FROM tests ORDER BY test_name",
        )
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(tests)
    }

    #[instrument(skip(db, dto))]
    pub async fn create(
        db: &PgPool,
        principal: &Principal,
        dto: CreateTestDefinitionDto,
    ) -> Result<TestDefinition, AppError> {
        policy::authorize(principal, Action::Create, Resource::Catalog).require()?;

        let test = sqlx::query_as::<_, TestDefinition>(
            "INSERT INTO tests (test_name) VALUES ($1) RETURNING id, test_name",
        )
        .bind(&dto.test_name)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(test)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, principal: &Principal, id: Uuid) -> Result<(), AppError> {
        policy::authorize(principal, Action::Delete, Resource::Catalog).require()?;

        let result = sqlx::query("DELETE FROM tests WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Test not found")));
        }

        Ok(())
    }
}
