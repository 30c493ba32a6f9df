use axum::Router;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::modules::allergies::router::init_allergies_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::class_groups::router::init_class_groups_router;
use crate::modules::health_data::router::init_health_data_router;
use crate::modules::medical_history::router::init_medical_history_router;
use crate::modules::students::router::init_students_router;
use crate::modules::test_results::router::{init_test_results_router, init_tests_router};
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest("/users", init_users_router())
                .nest("/classes", init_class_groups_router())
                .nest("/students", init_students_router())
                .nest("/health-data", init_health_data_router())
                .nest("/medical-history", init_medical_history_router())
                .nest("/test-results", init_test_results_router())
                .nest("/tests", init_tests_router())
                .nest("/allergies", init_allergies_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http())
}
