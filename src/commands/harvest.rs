use axum::extract::{Json, Path, State};
use axum::Extension;
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::{record_audit, Actor};
use crate::db::{HarvestRecord, HarvesterStats, PlantingStatus, StockCategory};
use crate::error::{SeraError, SeraResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use crate::stock::{deduct_stock_batch, StockDeduction};

pub async fn get_harvests(State(state): State<AppState>) -> SeraResult<Json<Vec<HarvestRecord>>> {
    let harvests = sqlx::query_as::<_, HarvestRecord>(
        "SELECT h.*, p.greenhouse_name, p.crop_name FROM harvests h LEFT JOIN planting_batches p ON h.batch_id = p.id ORDER BY h.harvest_date DESC, h.id DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(harvests))
}

#[derive(Debug, Deserialize)]
pub struct HarvestInput {
    pub id: Option<i32>,
    pub batch_id: Option<i32>,
    pub harvest_date: NaiveDate,
    pub plot: String,
    pub quantity: Decimal,
    pub harvested_by: String,
    pub delivered_to: Option<String>,
    pub box_count: Option<Decimal>,
    pub pallet_count: Option<Decimal>,
    pub notes: Option<String>,
    /// Marks the batch "Hasat Edildi" along with the save.
    pub close_batch: Option<bool>,
}

/// New harvests consume packaging stock: box_count from "Kasa" and
/// pallet_count from "Palet", deducted in that order inside one transaction.
/// The batch stops at the first insufficient category and the whole
/// transaction is rolled back, so a failed save leaves no harvest row and no
/// stock change. Edits do not deduct again.
pub async fn save_harvest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<HarvestInput>,
) -> SeraResult<Json<Value>> {
    if payload.plot.trim().is_empty() || payload.harvested_by.trim().is_empty() {
        return Err(SeraError::Validation(
            "Hasat tarihi, parsel/alan ve hasat eden kişi zorunludur.".to_string(),
        ));
    }
    if payload.quantity <= Decimal::ZERO {
        return Err(SeraError::Validation(
            "Hasat miktarı pozitif bir sayı olmalıdır.".to_string(),
        ));
    }
    for value in [payload.box_count, payload.pallet_count]
        .into_iter()
        .flatten()
    {
        if value < Decimal::ZERO {
            return Err(SeraError::Validation(
                "Kasa ve palet sayıları negatif olamaz.".to_string(),
            ));
        }
    }

    let actor = Actor::from(&claims);

    if let Some(id) = payload.id {
        sqlx::query(
            "UPDATE harvests SET batch_id = $1, harvest_date = $2, plot = $3, quantity = $4, harvested_by = $5, delivered_to = $6, box_count = $7, pallet_count = $8, notes = $9, updated_by = $10, updated_at = CURRENT_TIMESTAMP WHERE id = $11",
        )
        .bind(payload.batch_id)
        .bind(payload.harvest_date)
        .bind(payload.plot.trim())
        .bind(payload.quantity)
        .bind(payload.harvested_by.trim())
        .bind(&payload.delivered_to)
        .bind(payload.box_count.unwrap_or(Decimal::ZERO))
        .bind(payload.pallet_count.unwrap_or(Decimal::ZERO))
        .bind(&payload.notes)
        .bind(actor.name())
        .bind(id)
        .execute(&state.pool)
        .await?;

        record_audit(&state.pool, "harvests", Some(id), "update", &actor, None).await?;
        return Ok(Json(json!({ "success": true, "id": id })));
    }

    let box_count = payload.box_count.unwrap_or(Decimal::ZERO);
    let pallet_count = payload.pallet_count.unwrap_or(Decimal::ZERO);
    let label = format!("Hasat: {} ({})", payload.plot.trim(), payload.harvest_date);
    let deductions = [
        StockDeduction {
            category: StockCategory::Kasa,
            quantity: box_count,
            description: label.clone(),
        },
        StockDeduction {
            category: StockCategory::Palet,
            quantity: pallet_count,
            description: label,
        },
    ];

    let mut tx = state.pool.begin().await?;

    let report = deduct_stock_batch(&mut *tx, &deductions, &actor).await?;
    if let Some(failure) = report.failure {
        tx.rollback().await?;
        return Err(SeraError::Stock(failure.message));
    }

    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO harvests (batch_id, harvest_date, plot, quantity, harvested_by, delivered_to, box_count, pallet_count, notes, created_by) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
    )
    .bind(payload.batch_id)
    .bind(payload.harvest_date)
    .bind(payload.plot.trim())
    .bind(payload.quantity)
    .bind(payload.harvested_by.trim())
    .bind(&payload.delivered_to)
    .bind(box_count)
    .bind(pallet_count)
    .bind(&payload.notes)
    .bind(actor.name())
    .fetch_one(&mut *tx)
    .await?;

    if payload.close_batch.unwrap_or(false) {
        if let Some(batch_id) = payload.batch_id {
            sqlx::query(
                "UPDATE planting_batches SET status = $1, harvest_date = $2, updated_by = $3, updated_at = CURRENT_TIMESTAMP WHERE id = $4",
            )
            .bind(PlantingStatus::HasatEdildi)
            .bind(payload.harvest_date)
            .bind(actor.name())
            .bind(batch_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    record_audit(&mut *tx, "harvests", Some(id), "create", &actor, None).await?;
    tx.commit().await?;

    let messages: Vec<String> = report.applied.into_iter().map(|a| a.message).collect();
    Ok(Json(json!({
        "success": true,
        "id": id,
        "stock_messages": messages,
    })))
}

pub async fn delete_harvest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> SeraResult<Json<Value>> {
    let dependents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE harvest_id = $1")
        .bind(id)
        .fetch_one(&state.pool)
        .await?;
    if dependents > 0 {
        return Err(SeraError::Validation(
            "Bu hasada bağlı fatura kayıtları var, önce onları silin.".to_string(),
        ));
    }

    let actor = Actor::from(&claims);
    sqlx::query("DELETE FROM harvests WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    record_audit(&state.pool, "harvests", Some(id), "delete", &actor, None).await?;
    Ok(Json(json!({ "success": true })))
}

/// Current-month harvest total and the five busiest harvesters.
pub async fn get_harvest_stats(State(state): State<AppState>) -> SeraResult<Json<Value>> {
    let today = Local::now().date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    let month_total: Option<Decimal> = sqlx::query_scalar(
        "SELECT SUM(quantity) FROM harvests WHERE harvest_date >= $1",
    )
    .bind(month_start)
    .fetch_one(&state.pool)
    .await?;

    let top_harvesters = sqlx::query_as::<_, HarvesterStats>(
        "SELECT harvested_by, COUNT(*) AS harvest_count, SUM(quantity) AS total_quantity \
         FROM harvests WHERE harvest_date >= $1 \
         GROUP BY harvested_by ORDER BY total_quantity DESC LIMIT 5",
    )
    .bind(month_start)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({
        "month_total": month_total.unwrap_or(Decimal::ZERO),
        "top_harvesters": top_harvesters,
    })))
}
