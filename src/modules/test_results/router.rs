use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    create_test, create_test_result, delete_test, delete_test_result, get_test_result,
    get_test_results, get_tests, update_test_result,
};

pub fn init_test_results_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_test_result).get(get_test_results))
        .route(
            "/{id}",
            get(get_test_result)
                .put(update_test_result)
                .delete(delete_test_result),
        )
}

pub fn init_tests_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_test).get(get_tests))
        .route("/{id}", delete(delete_test))
}
