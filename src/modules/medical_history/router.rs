use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_medical_history, delete_medical_history, get_medical_history,
    get_medical_history_list, update_medical_history,
};

pub fn init_medical_history_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_medical_history).get(get_medical_history_list))
        .route(
            "/{id}",
            get(get_medical_history)
                .put(update_medical_history)
                .delete(delete_medical_history),
        )
}
