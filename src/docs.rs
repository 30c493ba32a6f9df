use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::config::session::SESSION_COOKIE;
use crate::modules::allergies::model::{Allergy, AllergyType, CreateAllergyDto, UpdateAllergyDto};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse, MessageResponse};
use crate::modules::class_groups::model::{
    ClassGroup, CreateClassGroupDto, UpdateClassGroupDto,
};
use crate::modules::health_data::model::{
    CreateHealthDataDto, HealthData, UpdateHealthDataDto,
};
use crate::modules::medical_history::model::{
    CreateMedicalHistoryDto, MedicalHistory, UpdateMedicalHistoryDto,
};
use crate::modules::students::model::{CreateStudentDto, Student, UpdateStudentDto};
use crate::modules::test_results::model::{
    CreateTestDefinitionDto, CreateTestResultDto, TestDefinition, TestResult, UpdateTestResultDto,
};
use crate::modules::users::model::{CreateUserDto, UpdateUserDto, User};
use crate::policy::Role;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::class_groups::controller::get_class_groups,
        crate::modules::class_groups::controller::create_class_group,
        crate::modules::class_groups::controller::get_class_group,
        crate::modules::class_groups::controller::update_class_group,
        crate::modules::class_groups::controller::delete_class_group,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::health_data::controller::get_health_data_list,
        crate::modules::health_data::controller::create_health_data,
        crate::modules::health_data::controller::get_health_data,
        crate::modules::health_data::controller::update_health_data,
        crate::modules::health_data::controller::delete_health_data,
        crate::modules::medical_history::controller::get_medical_history_list,
        crate::modules::medical_history::controller::create_medical_history,
        crate::modules::medical_history::controller::get_medical_history,
        crate::modules::medical_history::controller::update_medical_history,
        crate::modules::medical_history::controller::delete_medical_history,
        crate::modules::test_results::controller::get_test_results,
        crate::modules::test_results::controller::create_test_result,
        crate::modules::test_results::controller::get_test_result,
        crate::modules::test_results::controller::update_test_result,
        crate::modules::test_results::controller::delete_test_result,
        crate::modules::test_results::controller::get_tests,
        crate::modules::test_results::controller::create_test,
        crate::modules::test_results::controller::delete_test,
        crate::modules::allergies::controller::get_allergies,
        crate::modules::allergies::controller::create_allergy,
        crate::modules::allergies::controller::get_allergy,
        crate::modules::allergies::controller::update_allergy,
        crate::modules::allergies::controller::delete_allergy,
    ),
    components(
        schemas(
            Role,
            User,
            CreateUserDto,
            UpdateUserDto,
            LoginRequest,
            LoginResponse,
            MessageResponse,
            ErrorResponse,
            ClassGroup,
            CreateClassGroupDto,
            UpdateClassGroupDto,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            HealthData,
            CreateHealthDataDto,
            UpdateHealthDataDto,
            MedicalHistory,
            CreateMedicalHistoryDto,
            UpdateMedicalHistoryDto,
            TestResult,
            CreateTestResultDto,
            UpdateTestResultDto,
            TestDefinition,
            CreateTestDefinitionDto,
            Allergy,
            AllergyType,
            CreateAllergyDto,
            UpdateAllergyDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Session login and logout"),
        (name = "Users", description = "User account management"),
        (name = "Class Groups", description = "Class group management"),
        (name = "Students", description = "Student records"),
        (name = "Health Data", description = "Student health measurements"),
        (name = "Medical History", description = "Student medical conditions"),
        (name = "Test Results", description = "Student screening results"),
        (name = "Tests", description = "Screening test catalog"),
        (name = "Allergies", description = "Allergy catalog")
    ),
    info(
        title = "Healthtrack API",
        version = "0.1.0",
        description = "Role-based REST API for tracking student health records. Admins manage everything; teachers see their class groups; parents see their own children.",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            )
        }
    }
}
