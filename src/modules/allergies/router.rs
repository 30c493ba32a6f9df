use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_allergy, delete_allergy, get_allergies, get_allergy, update_allergy,
};

pub fn init_allergies_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_allergy).get(get_allergies))
        .route(
            "/{id}",
            get(get_allergy).put(update_allergy).delete(delete_allergy),
        )
}
