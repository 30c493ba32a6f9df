use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::policy::StudentAccess;
use crate::policy::visibility::StudentScoped;

/// A health measurement record for one student.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct HealthData {
    pub id: Uuid,
    pub student_id: Uuid,
    pub height: f64,
    pub weight: f64,
    pub blood_type: String,
    pub allergy_ids: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A health record joined with its student's owner context. Not serialized.
#[derive(FromRow, Debug, Clone)]
pub struct HealthDataWithAccess {
    #[sqlx(flatten)]
    pub record: HealthData,
    pub parent_email: String,
    pub teacher_ids: Vec<Uuid>,
}

impl HealthDataWithAccess {
    pub fn access(&self) -> StudentAccess {
        StudentAccess {
            parent_email: self.parent_email.clone(),
            teacher_ids: self.teacher_ids.clone(),
        }
    }
}

impl StudentScoped for HealthDataWithAccess {
    fn parent_email(&self) -> &str {
        &self.parent_email
    }

    fn teacher_ids(&self) -> &[Uuid] {
        &self.teacher_ids
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateHealthDataDto {
    pub student_id: Uuid,
    #[validate(range(min = 0.0))]
    pub height: f64,
    #[validate(range(min = 0.0))]
    pub weight: f64,
    #[validate(length(min = 1, max = 10))]
    pub blood_type: String,
    #[serde(default)]
    pub allergy_ids: Vec<Uuid>,
}

/// Partial update; a present `allergy_ids` replaces the whole link set. The
/// owning student cannot be changed.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateHealthDataDto {
    #[validate(range(min = 0.0))]
    pub height: Option<f64>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    #[validate(length(min = 1, max = 10))]
    pub blood_type: Option<String>,
    pub allergy_ids: Option<Vec<Uuid>>,
}
