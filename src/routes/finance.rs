use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/costs", get(commands::finance::get_cost_entries))
        .route("/api/costs/save", post(commands::finance::save_cost_entry))
        .route(
            "/api/costs/delete/:id",
            post(commands::finance::delete_cost_entry),
        )
        .route(
            "/api/finance/profit-loss",
            post(commands::finance::compute_profit_loss),
        )
        .route(
            "/api/finance/profit-loss/snapshots",
            get(commands::finance::get_profit_loss_snapshots),
        )
}
