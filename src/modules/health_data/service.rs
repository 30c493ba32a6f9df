use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::students::service::StudentService;
use crate::policy::{self, Action, Principal, Resource, visibility};
use crate::utils::errors::AppError;

use super::model::{CreateHealthDataDto, HealthData, HealthDataWithAccess, UpdateHealthDataDto};

const RECORD_WITH_ACCESS: &str = "SELECT h.id, h.student_id, h.height, h.weight, h.blood_type,
            COALESCE(a.allergy_ids, ARRAY[]::uuid[]) AS allergy_ids,
            h.created_at, h.updated_at,
            s.parent_email,
            COALESCE(t.teacher_ids, ARRAY[]::uuid[]) AS teacher_ids
     FROM health_data h
     JOIN students s ON s.id = h.student_id
     LEFT JOIN (
         SELECT health_data_id, array_agg(allergy_id) AS allergy_ids
         FROM health_data_allergies
         GROUP BY health_data_id
     ) a ON a.health_data_id = h.id
     LEFT JOIN (
         SELECT class_group_id, array_agg(teacher_id) AS teacher_ids
         FROM class_group_teachers
         GROUP BY class_group_id
     ) t ON t.class_group_id = s.class_group_id";

pub struct HealthDataService;

impl HealthDataService {
    /// Records of students visible to the caller.
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, principal: &Principal) -> Result<Vec<HealthData>, AppError> {
        let records = sqlx::query_as::<_, HealthDataWithAccess>(&format!(
            "{RECORD_WITH_ACCESS} ORDER BY h.created_at"
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
        dto: CreateHealthDataDto,
    ) -> Result<HealthData, AppError> {
        let access = StudentService::student_access(db, dto.student_id)
            .await?
            .ok_or_else(|| policy::not_found_for(principal, "Student"))?;

        policy::authorize(principal, Action::Create, Resource::HealthRecord(&access)).require()?;

        Self::check_allergy_ids(db, &dto.allergy_ids).await?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO health_data (student_id, height, weight, blood_type)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(dto.student_id)
        .bind(dto.height)
        .bind(dto.weight)
        .bind(&dto.blood_type)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        sqlx::query(
            "INSERT INTO health_data_allergies (health_data_id, allergy_id)
             SELECT $1, unnest($2::uuid[])",
        )
        .bind(id)
        .bind(&dto.allergy_ids)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        Self::fetch(db, id)
            .await?
            .map(|row| row.record)
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("Health record vanished after insert")))
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, principal: &Principal, id: Uuid) -> Result<HealthData, AppError> {
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
        dto: UpdateHealthDataDto,
    ) -> Result<HealthData, AppError> {
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
        let height = dto.height.unwrap_or(existing.height);
        let weight = dto.weight.unwrap_or(existing.weight);
        let blood_type = dto.blood_type.unwrap_or(existing.blood_type);

        let mut tx = db.begin().await.map_err(AppError::database)?;

        sqlx::query(
            "UPDATE health_data
             SET height = $1, weight = $2, blood_type = $3, updated_at = NOW()
             WHERE id = $4",
        )
        .bind(height)
        .bind(weight)
        .bind(&blood_type)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

        if let Some(allergy_ids) = &dto.allergy_ids {
            Self::check_allergy_ids(db, allergy_ids).await?;

            sqlx::query("DELETE FROM health_data_allergies WHERE health_data_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::database)?;

            sqlx::query(
                "INSERT INTO health_data_allergies (health_data_id, allergy_id)
                 SELECT $1, unnest($2::uuid[])",
            )
            .bind(id)
            .bind(allergy_ids)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;
        }

        tx.commit().await.map_err(AppError::database)?;

        Self::fetch(db, id)
            .await?
            .map(|row| row.record)
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("Health record vanished after update")))
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

        sqlx::query("DELETE FROM health_data WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        Ok(())
    }

    async fn fetch(db: &PgPool, id: Uuid) -> Result<Option<HealthDataWithAccess>, AppError> {
        sqlx::query_as::<_, HealthDataWithAccess>(&format!("{RECORD_WITH_ACCESS} WHERE h.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)
    }

    async fn check_allergy_ids(db: &PgPool, allergy_ids: &[Uuid]) -> Result<(), AppError> {
        if allergy_ids.is_empty() {
            return Ok(());
        }

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM allergies WHERE id = ANY($1)",
        )
        .bind(allergy_ids)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        if count as usize != allergy_ids.len() {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "allergy_ids must reference existing allergies"
            )));
        }

        Ok(())
    }
}
