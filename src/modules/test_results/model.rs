use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::policy::StudentAccess;
use crate::policy::visibility::StudentScoped;

/// A screening result recorded for one student. `test` is the test name as
/// administered, independent of the catalog below.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct TestResult {
    pub id: Uuid,
    pub test: String,
    pub result: String,
    pub student_id: Uuid,
    pub notes: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(FromRow, Debug, Clone)]
pub struct TestResultWithAccess {
    #[sqlx(flatten)]
    pub record: TestResult,
    pub parent_email: String,
    pub teacher_ids: Vec<Uuid>,
}

impl TestResultWithAccess {
    pub fn access(&self) -> StudentAccess {
        StudentAccess {
            parent_email: self.parent_email.clone(),
            teacher_ids: self.teacher_ids.clone(),
        }
    }
}

impl StudentScoped for TestResultWithAccess {
    fn parent_email(&self) -> &str {
        &self.parent_email
    }

    fn teacher_ids(&self) -> &[Uuid] {
        &self.teacher_ids
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateTestResultDto {
    pub student_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub test: String,
    #[validate(length(min = 1, max = 100))]
    pub result: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateTestResultDto {
    #[validate(length(min = 1, max = 100))]
    pub test: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub result: Option<String>,
    pub notes: Option<String>,
}

/// Catalog entry for a screening the school administers.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct TestDefinition {
    pub id: Uuid,
    pub test_name: String,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateTestDefinitionDto {
    #[validate(length(min = 1, max = 100))]
    pub test_name: String,
}
