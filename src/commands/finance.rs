use axum::extract::{Json, Path, State};
use axum::Extension;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::{record_audit, Actor};
use crate::db::{CostCategory, CostEntry, InvoiceStatus, ProfitLossSnapshot};
use crate::error::{SeraError, SeraResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub async fn get_cost_entries(State(state): State<AppState>) -> SeraResult<Json<Vec<CostEntry>>> {
    let entries = sqlx::query_as::<_, CostEntry>(
        "SELECT * FROM cost_entries ORDER BY cost_date DESC, id DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct CostInput {
    pub id: Option<i32>,
    pub cost_date: NaiveDate,
    pub category: CostCategory,
    pub amount: Decimal,
    pub description: Option<String>,
}

pub async fn save_cost_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CostInput>,
) -> SeraResult<Json<Value>> {
    if payload.amount <= Decimal::ZERO {
        return Err(SeraError::Validation(
            "Maliyet tutarı pozitif bir sayı olmalıdır.".to_string(),
        ));
    }

    let actor = Actor::from(&claims);

    if let Some(id) = payload.id {
        sqlx::query(
            "UPDATE cost_entries SET cost_date = $1, category = $2, amount = $3, description = $4, updated_by = $5, updated_at = CURRENT_TIMESTAMP WHERE id = $6",
        )
        .bind(payload.cost_date)
        .bind(payload.category)
        .bind(payload.amount)
        .bind(&payload.description)
        .bind(actor.name())
        .bind(id)
        .execute(&state.pool)
        .await?;

        record_audit(&state.pool, "cost_entries", Some(id), "update", &actor, None).await?;
        Ok(Json(json!({ "success": true, "id": id })))
    } else {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO cost_entries (cost_date, category, amount, description, created_by) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(payload.cost_date)
        .bind(payload.category)
        .bind(payload.amount)
        .bind(&payload.description)
        .bind(actor.name())
        .fetch_one(&state.pool)
        .await?;

        record_audit(&state.pool, "cost_entries", Some(id), "create", &actor, None).await?;
        Ok(Json(json!({ "success": true, "id": id })))
    }
}

pub async fn delete_cost_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> SeraResult<Json<Value>> {
    let actor = Actor::from(&claims);
    sqlx::query("DELETE FROM cost_entries WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    record_audit(&state.pool, "cost_entries", Some(id), "delete", &actor, None).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct ProfitLossRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Revenue (non-cancelled invoices) minus costs over the range, persisted as
/// a point-in-time snapshot.
pub async fn compute_profit_loss(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ProfitLossRequest>,
) -> SeraResult<Json<ProfitLossSnapshot>> {
    if payload.end_date < payload.start_date {
        return Err(SeraError::Validation(
            "Bitiş tarihi başlangıçtan önce olamaz.".to_string(),
        ));
    }

    let actor = Actor::from(&claims);
    let mut tx = state.pool.begin().await?;

    let revenue: Option<Decimal> = sqlx::query_scalar(
        "SELECT SUM(total_amount) FROM invoices WHERE invoice_date BETWEEN $1 AND $2 AND status != $3",
    )
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(InvoiceStatus::Iptal)
    .fetch_one(&mut *tx)
    .await?;

    let total_cost: Option<Decimal> = sqlx::query_scalar(
        "SELECT SUM(amount) FROM cost_entries WHERE cost_date BETWEEN $1 AND $2",
    )
    .bind(payload.start_date)
    .bind(payload.end_date)
    .fetch_one(&mut *tx)
    .await?;

    let revenue = revenue.unwrap_or(Decimal::ZERO);
    let total_cost = total_cost.unwrap_or(Decimal::ZERO);
    let net = revenue - total_cost;

    let snapshot = sqlx::query_as::<_, ProfitLossSnapshot>(
        "INSERT INTO profit_loss_snapshots (start_date, end_date, revenue, total_cost, net, computed_by) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(revenue)
    .bind(total_cost)
    .bind(net)
    .bind(actor.name())
    .fetch_one(&mut *tx)
    .await?;

    record_audit(
        &mut *tx,
        "profit_loss_snapshots",
        Some(snapshot.id),
        "compute",
        &actor,
        Some(&format!("{} / {}", payload.start_date, payload.end_date)),
    )
    .await?;

    tx.commit().await?;
    Ok(Json(snapshot))
}

pub async fn get_profit_loss_snapshots(
    State(state): State<AppState>,
) -> SeraResult<Json<Vec<ProfitLossSnapshot>>> {
    let snapshots = sqlx::query_as::<_, ProfitLossSnapshot>(
        "SELECT * FROM profit_loss_snapshots ORDER BY computed_at DESC LIMIT 50",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(snapshots))
}
