use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reports/production",
            get(commands::report::get_monthly_production),
        )
        .route(
            "/api/reports/stock-value",
            get(commands::report::get_stock_value_report),
        )
        .route(
            "/api/reports/staff-cost",
            get(commands::report::get_staff_cost_trend),
        )
}
