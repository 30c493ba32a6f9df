use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::students::service::StudentService;
use crate::policy::{self, Action, Principal, Resource, visibility};
use crate::utils::errors::AppError;

use super::model::{
    CreateMedicalHistoryDto, MedicalHistory, MedicalHistoryWithAccess, UpdateMedicalHistoryDto,
};

const RECORD_WITH_ACCESS: &str = "SELECT m.id, m.student_id, m.medical_condition,
            m.created_at, m.updated_at,
            s.parent_email,
            COALESCE(t.teacher_ids, ARRAY[]::uuid[]) AS teacher_ids
     FROM medical_history m
     JOIN students s ON s.id = m.student_id
     LEFT JOIN (
         SELECT class_group_id, array_agg(teacher_id) AS teacher_ids
         FROM class_group_teachers
         GROUP BY class_group_id
     ) t ON t.class_group_id = s.class_group_id";

pub struct MedicalHistoryService;

impl MedicalHistoryService {
    /// Records of students visible to the caller.
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, principal: &Principal) -> Result<Vec<MedicalHistory>, AppError> {
        let records = sqlx::query_as::<_, MedicalHistoryWithAccess>(&format!(
            "{RECORD_WITH_ACCESS} ORDER BY m.created_at"
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
        dto: CreateMedicalHistoryDto,
    ) -> Result<MedicalHistory, AppError> {
        let access = StudentService::student_access(db, dto.student_id)
            .await?
            .ok_or_else(|| policy::not_found_for(principal, "Student"))?;

        policy::authorize(principal, Action::Create, Resource::HealthRecord(&access)).require()?;

        let record = sqlx::query_as::<_, MedicalHistory>(
            "INSERT INTO medical_history (student_id, medical_condition)
             VALUES ($1, $2)
             RETURNING id, student_id, medical_condition, created_at, updated_at",
        )
        .bind(dto.student_id)
        .bind(&dto.medical_condition)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(record)
    }

    #[instrument(skip(db))]
    pub async fn get(
        db: &PgPool,
        principal: &Principal,
        id: Uuid,
    ) -> Result<MedicalHistory, AppError> {
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
        dto: UpdateMedicalHistoryDto,
    ) -> Result<MedicalHistory, AppError> {
        let row = Self::fetch(db, id)
            .await?
            .ok_or_else(|| policy::not_found_for(principal, "Health record"))?;

        policy::authorize(
            principal,
            Action::Update,
            Resource::HealthRecord(&row.access()),
        )
        .require()?;

        let medical_condition = dto
            .medical_condition
            .unwrap_or(row.record.medical_condition);

        let record = sqlx::query_as::<_, MedicalHistory>(
            "UPDATE medical_history
             SET medical_condition = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING id, student_id, medical_condition, created_at, updated_at",
        )
        .bind(&medical_condition)
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

        sqlx::query("DELETE FROM medical_history WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        Ok(())
    }

    async fn fetch(db: &PgPool, id: Uuid) -> Result<Option<MedicalHistoryWithAccess>, AppError> {
        sqlx::query_as::<_, MedicalHistoryWithAccess>(&format!(
            "{RECORD_WITH_ACCESS} WHERE m.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)
    }
}
