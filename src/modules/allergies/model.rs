use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Category of an allergy in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "allergy_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AllergyType {
    Food,
    Environment,
    Medication,
    Other,
}

/// Catalog entry describing a known allergy. Health records link to these.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Allergy {
    pub id: Uuid,
    pub allergy: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: AllergyType,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateAllergyDto {
    #[validate(length(min = 1, max = 100))]
    pub allergy: String,
    #[serde(rename = "type")]
    pub kind: AllergyType,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateAllergyDto {
    #[validate(length(min = 1, max = 100))]
    pub allergy: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AllergyType>,
}
