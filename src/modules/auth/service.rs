use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::config::session::SessionConfig;
use crate::modules::users::model::User;
use crate::policy::Role;
use crate::utils::errors::AppError;
use crate::utils::password::verify_password;

use super::model::LoginRequest;

pub struct AuthService;

impl AuthService {
    /// Verify credentials and open a session. Unknown email and wrong
    /// password produce the same answer.
    #[instrument(skip(db, dto))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        session_config: &SessionConfig,
    ) -> Result<(Uuid, User), AppError> {
        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: Uuid,
            name: String,
            email: String,
            role: Role,
            password: String,
            created_at: chrono::DateTime<Utc>,
            updated_at: chrono::DateTime<Utc>,
        }

        let row = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, name, email, role, password, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Invalid credentials")))?;

        if !verify_password(&dto.password, &row.password)? {
            return Err(AppError::unauthorized(anyhow::anyhow!("Invalid credentials")));
        }

        let expires_at = Utc::now() + Duration::seconds(session_config.ttl_seconds);

        let token = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO sessions (user_id, expires_at) VALUES ($1, $2) RETURNING token",
        )
        .bind(row.id)
        .bind(expires_at)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        let user = User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        Ok((token, user))
    }

    /// Close a session. Deleting an already-closed session is a no-op.
    #[instrument(skip(db))]
    pub async fn logout(db: &PgPool, token: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        Ok(())
    }
}
