use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::policy::{self, Action, Principal, Resource, Role, visibility};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

use super::model::{CreateUserDto, UpdateUserDto, User};

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

pub struct UserService;

impl UserService {
    /// Accounts visible to the caller; only admins see any.
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, principal: &Principal) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY name"
        ))
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(visibility::filter_users(principal, users))
    }

    #[instrument(skip(db, dto))]
    pub async fn create(
        db: &PgPool,
        principal: &Principal,
        dto: CreateUserDto,
    ) -> Result<User, AppError> {
        policy::authorize(principal, Action::Create, Resource::User(None)).require()?;

        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(dto.role)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request(anyhow::anyhow!(
                        "User with email {} already exists",
                        dto.email
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(user)
    }

    /// The target id is all the decision needs here, so the policy check
    /// happens before any row is read.
    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, principal: &Principal, id: Uuid) -> Result<User, AppError> {
        policy::authorize(principal, Action::Read, Resource::User(Some(id))).require()?;

        Self::fetch(db, id).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        principal: &Principal,
        id: Uuid,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        policy::authorize(principal, Action::Update, Resource::User(Some(id))).require()?;

        // Self-service must not be a road to self-escalation.
        if dto.role.is_some() && principal.role != Role::Admin {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Only admins change account roles"
            )));
        }

        let existing = Self::fetch(db, id).await?;

        let name = dto.name.unwrap_or(existing.name);
        let email = dto.email.unwrap_or(existing.email);
        let role = dto.role.unwrap_or(existing.role);
        let password = dto.password.map(|p| hash_password(&p)).transpose()?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = $1, email = $2, role = $3,
                 password = COALESCE($4, password),
                 updated_at = NOW()
             WHERE id = $5
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&name)
        .bind(&email)
        .bind(role)
        .bind(password)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request(anyhow::anyhow!(
                        "User with email {} already exists",
                        email
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, principal: &Principal, id: Uuid) -> Result<(), AppError> {
        policy::authorize(principal, Action::Delete, Resource::User(Some(id))).require()?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        Ok(())
    }

    async fn fetch(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }
}
