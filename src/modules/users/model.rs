//! User entities and DTOs.
//!
//! A user is an account holder: an admin, a teacher, or a parent. Students
//! are not users — they are records owned through `parent_email` and class
//! group assignment (see the students module).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::policy::Role;

/// A user account. The password hash never leaves the service layer.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Role,
}

/// Partial update; absent fields are left unchanged.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_deserializes_lowercase_only() {
        let dto: CreateUserDto = serde_json::from_str(
            r#"{"name":"Jane","email":"jane@test.com","password":"password123","role":"parent"}"#,
        )
        .unwrap();
        assert_eq!(dto.role, Role::Parent);

        let unknown = serde_json::from_str::<CreateUserDto>(
            r#"{"name":"Jane","email":"jane@test.com","password":"password123","role":"principal"}"#,
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn user_serializes_without_password() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            email: "jane@test.com".to_string(),
            role: Role::Teacher,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let serialized = serde_json::to_string(&user).unwrap();
        assert!(serialized.contains(r#""role":"teacher""#));
        assert!(!serialized.contains("password"));
    }

    #[test]
    fn update_dto_validates_short_password() {
        let dto = UpdateUserDto {
            name: None,
            email: None,
            password: Some("short".to_string()),
            role: None,
        };
        assert!(dto.validate().is_err());
    }
}
