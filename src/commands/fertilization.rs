use axum::extract::{Json, Path, State};
use axum::Extension;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::{record_audit, Actor};
use crate::db::{FertilizationEvent, StockCategory};
use crate::error::{SeraError, SeraResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use crate::stock::{deduct_stock, DeductionOutcome};

pub async fn get_fertilization_events(
    State(state): State<AppState>,
) -> SeraResult<Json<Vec<FertilizationEvent>>> {
    let events = sqlx::query_as::<_, FertilizationEvent>(
        "SELECT * FROM fertilization_events ORDER BY event_date DESC, id DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(events))
}

#[derive(Debug, Deserialize)]
pub struct FertilizationInput {
    pub id: Option<i32>,
    pub batch_id: Option<i32>,
    pub event_date: NaiveDate,
    pub fertilizer_name: String,
    pub amount: Decimal,
    pub method: Option<String>,
    pub notes: Option<String>,
}

/// New fertilization entries draw the amount down from "Gübre" stock in the
/// same transaction; insufficient stock aborts the whole save. Edits do not
/// deduct again.
pub async fn save_fertilization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<FertilizationInput>,
) -> SeraResult<Json<Value>> {
    if payload.fertilizer_name.trim().is_empty() {
        return Err(SeraError::Validation(
            "Gübre adı ve uygulama tarihi zorunludur.".to_string(),
        ));
    }
    if payload.amount <= Decimal::ZERO {
        return Err(SeraError::Validation(
            "Gübre miktarı pozitif bir sayı olmalıdır.".to_string(),
        ));
    }

    let actor = Actor::from(&claims);

    if let Some(id) = payload.id {
        sqlx::query(
            "UPDATE fertilization_events SET batch_id = $1, event_date = $2, fertilizer_name = $3, amount = $4, method = $5, notes = $6, updated_by = $7, updated_at = CURRENT_TIMESTAMP WHERE id = $8",
        )
        .bind(payload.batch_id)
        .bind(payload.event_date)
        .bind(payload.fertilizer_name.trim())
        .bind(payload.amount)
        .bind(&payload.method)
        .bind(&payload.notes)
        .bind(actor.name())
        .bind(id)
        .execute(&state.pool)
        .await?;

        record_audit(&state.pool, "fertilization_events", Some(id), "update", &actor, None)
            .await?;
        return Ok(Json(json!({ "success": true, "id": id })));
    }

    let mut tx = state.pool.begin().await?;

    let description = format!(
        "Gübreleme: {} ({})",
        payload.fertilizer_name.trim(),
        payload.event_date
    );
    let deduction_message = match deduct_stock(
        &mut *tx,
        StockCategory::Gubre,
        payload.amount,
        &description,
        &actor,
    )
    .await?
    {
        DeductionOutcome::Applied(applied) => Some(applied.message),
        DeductionOutcome::Skipped => None,
        DeductionOutcome::Insufficient(failure) => {
            tx.rollback().await?;
            return Err(SeraError::Stock(failure.message));
        }
    };

    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO fertilization_events (batch_id, event_date, fertilizer_name, amount, method, notes, created_by) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
    )
    .bind(payload.batch_id)
    .bind(payload.event_date)
    .bind(payload.fertilizer_name.trim())
    .bind(payload.amount)
    .bind(&payload.method)
    .bind(&payload.notes)
    .bind(actor.name())
    .fetch_one(&mut *tx)
    .await?;

    record_audit(&mut *tx, "fertilization_events", Some(id), "create", &actor, None).await?;
    tx.commit().await?;

    Ok(Json(json!({
        "success": true,
        "id": id,
        "stock_message": deduction_message,
    })))
}

pub async fn delete_fertilization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> SeraResult<Json<Value>> {
    let actor = Actor::from(&claims);
    sqlx::query("DELETE FROM fertilization_events WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    record_audit(&state.pool, "fertilization_events", Some(id), "delete", &actor, None).await?;
    Ok(Json(json!({ "success": true })))
}
