use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/invoices", get(commands::invoice::get_invoices))
        .route("/api/invoices/save", post(commands::invoice::save_invoice))
        .route(
            "/api/invoices/paid/:id",
            post(commands::invoice::mark_invoice_paid),
        )
        .route(
            "/api/invoices/delete/:id",
            post(commands::invoice::delete_invoice),
        )
}
