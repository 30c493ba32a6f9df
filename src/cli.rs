//! Bootstrap commands that bypass the API's policy layer. Admin accounts
//! cannot be created over HTTP by a non-admin, so the first one comes from
//! here.

use sqlx::PgPool;

use crate::policy::Role;
use crate::utils::password::hash_password;

pub async fn create_admin(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let hashed_password = hash_password(password).map_err(|e| e.error)?;

    sqlx::query("INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4)")
        .bind(name)
        .bind(email)
        .bind(&hashed_password)
        .bind(Role::Admin)
        .execute(pool)
        .await?;

    Ok(())
}
