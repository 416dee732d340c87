use crate::state::AppState;
use axum::Router;

pub mod attendance;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod fertilization;
pub mod finance;
pub mod harvest;
pub mod inventory;
pub mod invoice;
pub mod irrigation;
pub mod planting;
pub mod report;
pub mod staff;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(planting::router())
        .merge(inventory::router())
        .merge(staff::router())
        .merge(attendance::router())
        .merge(irrigation::router())
        .merge(fertilization::router())
        .merge(harvest::router())
        .merge(invoice::router())
        .merge(finance::router())
        .merge(report::router())
        .merge(audit::router())
}
