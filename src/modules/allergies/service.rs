use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::policy::{self, Action, Principal, Resource};
use crate::utils::errors::AppError;

use super::model::{Allergy, CreateAllergyDto, UpdateAllergyDto};

const ALLERGY_COLUMNS: &str = "id, allergy, type, created_at, updated_at";

pub struct AllergyService;

impl AllergyService {
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, principal: &Principal) -> Result<Vec<Allergy>, AppError> {
        policy::authorize(principal, Action::List, Resource::Catalog).require()?;

        let allergies = sqlx::query_as::<_, Allergy>(&format!(
            "SELECT {ALLERGY_COLUMNS} FROM allergies ORDER BY allergy"
        ))
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(allergies)
    }

    #[instrument(skip(db, dto))]
    pub async fn create(
        db: &PgPool,
        principal: &Principal,
        dto: CreateAllergyDto,
    ) -> Result<Allergy, AppError> {
        policy::authorize(principal, Action::Create, Resource::Catalog).require()?;

        let allergy = sqlx::query_as::<_, Allergy>(&format!(
            "INSERT INTO allergies (allergy, type) VALUES ($1, $2) RETURNING {ALLERGY_COLUMNS}"
        ))
        .bind(&dto.allergy)
        .bind(dto.kind)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(allergy)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, principal: &Principal, id: Uuid) -> Result<Allergy, AppError> {
        policy::authorize(principal, Action::Read, Resource::Catalog).require()?;

        sqlx::query_as::<_, Allergy>(&format!(
            "SELECT {ALLERGY_COLUMNS} FROM allergies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Allergy not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        principal: &Principal,
        id: Uuid,
        dto: UpdateAllergyDto,
    ) -> Result<Allergy, AppError> {
        policy::authorize(principal, Action::Update, Resource::Catalog).require()?;

        let existing = sqlx::query_as::<_, Allergy>(&format!(
            "SELECT {ALLERGY_COLUMNS} FROM allergies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Allergy not found")))?;

        let name = dto.allergy.unwrap_or(existing.allergy);
        let kind = dto.kind.unwrap_or(existing.kind);

        let allergy = sqlx::query_as::<_, Allergy>(&format!(
            "UPDATE allergies SET allergy = $1, type = $2, updated_at = NOW()
             WHERE id = $3
             RETURNING {ALLERGY_COLUMNS}"
        ))
        .bind(&name)
        .bind(kind)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(allergy)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, principal: &Principal, id: Uuid) -> Result<(), AppError> {
        policy::authorize(principal, Action::Delete, Resource::Catalog).require()?;

        let result = sqlx::query("DELETE FROM allergies WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Allergy not found")));
        }

        Ok(())
    }
}
