//! Student entities and DTOs.
//!
//! Students are records, not accounts: a parent owns a student through the
//! denormalized `parent_email`, a teacher reaches one through class-group
//! assignment. All health-domain visibility is derived from the student's.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::policy::StudentAccess;
use crate::policy::visibility::StudentScoped;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub gender: Option<String>,
    pub address: String,
    pub parent_email: String,
    pub contact: String,
    pub class_group_id: Option<Uuid>,
}

/// A student row joined with its class group's teacher set, the owner
/// context every policy decision about the student needs. Not serialized.
#[derive(FromRow, Debug, Clone)]
pub struct StudentWithAccess {
    #[sqlx(flatten)]
    pub student: Student,
    pub teacher_ids: Vec<Uuid>,
}

impl StudentWithAccess {
    pub fn access(&self) -> StudentAccess {
        StudentAccess {
            parent_email: self.student.parent_email.clone(),
            teacher_ids: self.teacher_ids.clone(),
        }
    }
}

impl StudentScoped for StudentWithAccess {
    fn parent_email(&self) -> &str {
        &self.student.parent_email
    }

    fn teacher_ids(&self) -> &[Uuid] {
        &self.teacher_ids
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    #[validate(length(max = 10))]
    pub gender: Option<String>,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(email)]
    pub parent_email: String,
    #[validate(length(min = 1, max = 15))]
    pub contact: String,
    pub class_group_id: Option<Uuid>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    #[validate(length(max = 10))]
    pub gender: Option<String>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(email)]
    pub parent_email: Option<String>,
    #[validate(length(min = 1, max = 15))]
    pub contact: Option<String>,
    pub class_group_id: Option<Uuid>,
}
