use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::policy::StudentAccess;
use crate::policy::visibility::StudentScoped;

/// A diagnosed medical condition on a student's record.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct MedicalHistory {
    pub id: Uuid,
    pub student_id: Uuid,
    pub medical_condition: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(FromRow, Debug, Clone)]
pub struct MedicalHistoryWithAccess {
    #[sqlx(flatten)]
    pub record: MedicalHistory,
    pub parent_email: String,
    pub teacher_ids: Vec<Uuid>,
}

impl MedicalHistoryWithAccess {
    pub fn access(&self) -> StudentAccess {
        StudentAccess {
            parent_email: self.parent_email.clone(),
            teacher_ids: self.teacher_ids.clone(),
        }
    }
}

impl StudentScoped for MedicalHistoryWithAccess {
    fn parent_email(&self) -> &str {
        &self.parent_email
    }

    fn teacher_ids(&self) -> &[Uuid] {
        &self.teacher_ids
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateMedicalHistoryDto {
    pub student_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub medical_condition: String,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateMedicalHistoryDto {
    #[validate(length(min = 1, max = 100))]
    pub medical_condition: Option<String>,
}
