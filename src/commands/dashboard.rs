use axum::extract::{Json, State};
use chrono::{Datelike, Local};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{
    DashboardStats, InventoryItem, PlantingBatch, PlantingStatus, TaskRecord,
};
use crate::error::SeraResult;
use crate::state::AppState;

pub async fn get_dashboard_stats(
    State(state): State<AppState>,
) -> SeraResult<Json<DashboardStats>> {
    let today = Local::now().date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    let active_planting_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM planting_batches WHERE status IN ($1, $2, $3)",
    )
    .bind(PlantingStatus::EkimYapildi)
    .bind(PlantingStatus::BuyumeDoneminde)
    .bind(PlantingStatus::Ciceklenme)
    .fetch_one(&state.pool)
    .await?;

    let low_stock_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM inventory_items WHERE quantity <= min_quantity AND min_quantity > 0",
    )
    .fetch_one(&state.pool)
    .await?;

    let monthly_staff_cost: Option<Decimal> = sqlx::query_scalar(
        "SELECT SUM(monthly_salary) FROM staff WHERE active = TRUE",
    )
    .fetch_one(&state.pool)
    .await?;

    let greenhouse_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT greenhouse_name) FROM planting_batches",
    )
    .fetch_one(&state.pool)
    .await?;

    let month_harvest_total: Option<Decimal> = sqlx::query_scalar(
        "SELECT SUM(quantity) FROM harvests WHERE harvest_date >= $1",
    )
    .bind(month_start)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(DashboardStats {
        active_planting_count: Some(active_planting_count),
        low_stock_count: Some(low_stock_count),
        monthly_staff_cost: Some(monthly_staff_cost.unwrap_or(Decimal::ZERO)),
        greenhouse_count: Some(greenhouse_count),
        month_harvest_total: Some(month_harvest_total.unwrap_or(Decimal::ZERO)),
    }))
}

#[derive(Serialize)]
pub struct RecentActivity {
    pub plantings: Vec<PlantingBatch>,
    pub stock_entries: Vec<InventoryItem>,
    pub tasks: Vec<TaskRecord>,
}

pub async fn get_recent_activity(
    State(state): State<AppState>,
) -> SeraResult<Json<RecentActivity>> {
    let plantings = sqlx::query_as::<_, PlantingBatch>(
        "SELECT * FROM planting_batches ORDER BY created_at DESC LIMIT 5",
    )
    .fetch_all(&state.pool)
    .await?;

    let stock_entries = sqlx::query_as::<_, InventoryItem>(
        "SELECT * FROM inventory_items ORDER BY record_date DESC, id DESC LIMIT 5",
    )
    .fetch_all(&state.pool)
    .await?;

    let tasks = sqlx::query_as::<_, TaskRecord>(
        "SELECT t.*, s.full_name AS staff_name FROM tasks t LEFT JOIN staff s ON t.staff_id = s.id ORDER BY t.task_date DESC, t.id DESC LIMIT 5",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(RecentActivity {
        plantings,
        stock_entries,
        tasks,
    }))
}
