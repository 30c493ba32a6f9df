use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_health_data, delete_health_data, get_health_data, get_health_data_list,
    update_health_data,
};

pub fn init_health_data_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_health_data).get(get_health_data_list))
        .route(
            "/{id}",
            get(get_health_data)
                .put(update_health_data)
                .delete(delete_health_data),
        )
}
