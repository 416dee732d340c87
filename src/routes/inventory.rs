use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/inventory", get(commands::inventory::get_inventory))
        .route(
            "/api/inventory/low-stock",
            get(commands::inventory::get_low_stock),
        )
        .route(
            "/api/inventory/save",
            post(commands::inventory::save_inventory),
        )
        .route(
            "/api/inventory/delete/:id",
            post(commands::inventory::delete_inventory_item),
        )
}
