use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/fertilization",
            get(commands::fertilization::get_fertilization_events),
        )
        .route(
            "/api/fertilization/save",
            post(commands::fertilization::save_fertilization),
        )
        .route(
            "/api/fertilization/delete/:id",
            post(commands::fertilization::delete_fertilization),
        )
}
