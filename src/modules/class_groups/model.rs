use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::policy::visibility::TeacherSet;

/// A named grouping of students taught by a set of teachers.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ClassGroup {
    pub id: Uuid,
    pub name: String,
    pub teacher_ids: Vec<Uuid>,
}

impl TeacherSet for ClassGroup {
    fn teacher_ids(&self) -> &[Uuid] {
        &self.teacher_ids
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateClassGroupDto {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    /// Teacher accounts assigned to the group; every id must belong to a
    /// user with the teacher role.
    #[serde(default)]
    pub teacher_ids: Vec<Uuid>,
}

/// Partial update; a present `teacher_ids` replaces the whole set.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateClassGroupDto {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    pub teacher_ids: Option<Vec<Uuid>>,
}
