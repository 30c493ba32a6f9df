//! Identity resolution: session cookie to [`Principal`].

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::session::SESSION_COOKIE;
use crate::policy::{Principal, Role};
use crate::state::AppState;
use crate::utils::errors::AppError;

#[derive(Debug, sqlx::FromRow)]
struct PrincipalRow {
    id: Uuid,
    role: Role,
    email: String,
}

/// Extractor providing the authenticated caller.
///
/// Looks the session token up in the session store and produces a fresh
/// [`Principal`] for this request. A missing cookie, an unknown token, or an
/// expired session all reject with 401 — uniformly, so the response carries
/// no information about why the session was unusable.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

/// Pure lookup against the session store; no writes, no side effects.
pub async fn resolve_session(db: &PgPool, token: Uuid) -> Result<Option<Principal>, AppError> {
    let row = sqlx::query_as::<_, PrincipalRow>(
        "SELECT u.id, u.role, u.email
         FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = $1 AND s.expires_at > NOW()",
    )
    .bind(token)
    .fetch_optional(db)
    .await
    .map_err(AppError::database)?;

    Ok(row.map(|r| Principal {
        id: r.id,
        role: r.role,
        email: r.email,
    }))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
            .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Authentication required")))?;

        let principal = resolve_session(&state.db, token)
            .await?
            .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Authentication required")))?;

        Ok(CurrentUser(principal))
    }
}
