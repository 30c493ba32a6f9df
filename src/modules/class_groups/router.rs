use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_class_group, delete_class_group, get_class_group, get_class_groups, update_class_group,
};

pub fn init_class_groups_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_class_group).get(get_class_groups))
        .route(
            "/{id}",
            get(get_class_group)
                .put(update_class_group)
                .delete(delete_class_group),
        )
}
