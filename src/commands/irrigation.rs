use axum::extract::{Json, Path, State};
use axum::Extension;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::{record_audit, Actor};
use crate::db::{IrrigationEvent, IrrigationKind, StockCategory};
use crate::error::{SeraError, SeraResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use crate::stock::{deduct_stock, DeductionOutcome};

pub async fn get_irrigation_events(
    State(state): State<AppState>,
) -> SeraResult<Json<Vec<IrrigationEvent>>> {
    let events = sqlx::query_as::<_, IrrigationEvent>(
        "SELECT * FROM irrigation_events ORDER BY event_date DESC, id DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(events))
}

#[derive(Debug, Deserialize)]
pub struct IrrigationInput {
    pub id: Option<i32>,
    pub batch_id: Option<i32>,
    pub greenhouse_name: String,
    pub event_date: NaiveDate,
    pub kind: IrrigationKind,
    pub water_amount: Option<Decimal>,
    pub fertilizer_name: Option<String>,
    pub fertilizer_amount: Option<Decimal>,
    pub notes: Option<String>,
}

/// Creating a "Gübreli" event consumes fertilizer stock in the same
/// transaction as the insert: if the deduction fails, no irrigation record is
/// created and no stock changes. Edits to an existing event do not deduct
/// again.
pub async fn save_irrigation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<IrrigationInput>,
) -> SeraResult<Json<Value>> {
    if payload.greenhouse_name.trim().is_empty() {
        return Err(SeraError::Validation(
            "Sera adı ve sulama tarihi zorunludur.".to_string(),
        ));
    }
    for value in [payload.water_amount, payload.fertilizer_amount]
        .into_iter()
        .flatten()
    {
        if value < Decimal::ZERO {
            return Err(SeraError::Validation(
                "Su ve gübre miktarları negatif olamaz.".to_string(),
            ));
        }
    }

    let actor = Actor::from(&claims);

    if let Some(id) = payload.id {
        sqlx::query(
            "UPDATE irrigation_events SET batch_id = $1, greenhouse_name = $2, event_date = $3, kind = $4, water_amount = $5, fertilizer_name = $6, fertilizer_amount = $7, notes = $8, updated_by = $9, updated_at = CURRENT_TIMESTAMP WHERE id = $10",
        )
        .bind(payload.batch_id)
        .bind(payload.greenhouse_name.trim())
        .bind(payload.event_date)
        .bind(payload.kind)
        .bind(payload.water_amount)
        .bind(&payload.fertilizer_name)
        .bind(payload.fertilizer_amount)
        .bind(&payload.notes)
        .bind(actor.name())
        .bind(id)
        .execute(&state.pool)
        .await?;

        record_audit(&state.pool, "irrigation_events", Some(id), "update", &actor, None).await?;
        return Ok(Json(json!({ "success": true, "id": id })));
    }

    let mut tx = state.pool.begin().await?;
    let mut deduction_message: Option<String> = None;

    match payload.kind {
        IrrigationKind::Gubreli => {
            let amount = payload.fertilizer_amount.unwrap_or(Decimal::ZERO);
            let description = format!(
                "Gübreli sulama: {} ({})",
                payload.greenhouse_name.trim(),
                payload.event_date
            );
            match deduct_stock(&mut *tx, StockCategory::Gubre, amount, &description, &actor).await? {
                DeductionOutcome::Applied(applied) => {
                    deduction_message = Some(applied.message);
                }
                DeductionOutcome::Skipped => {}
                DeductionOutcome::Insufficient(failure) => {
                    tx.rollback().await?;
                    return Err(SeraError::Stock(failure.message));
                }
            }
        }
        IrrigationKind::Normal => {}
    }

    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO irrigation_events (batch_id, greenhouse_name, event_date, kind, water_amount, fertilizer_name, fertilizer_amount, notes, created_by) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(payload.batch_id)
    .bind(payload.greenhouse_name.trim())
    .bind(payload.event_date)
    .bind(payload.kind)
    .bind(payload.water_amount)
    .bind(&payload.fertilizer_name)
    .bind(payload.fertilizer_amount)
    .bind(&payload.notes)
    .bind(actor.name())
    .fetch_one(&mut *tx)
    .await?;

    record_audit(&mut *tx, "irrigation_events", Some(id), "create", &actor, None).await?;
    tx.commit().await?;

    Ok(Json(json!({
        "success": true,
        "id": id,
        "stock_message": deduction_message,
    })))
}

pub async fn delete_irrigation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> SeraResult<Json<Value>> {
    let actor = Actor::from(&claims);
    sqlx::query("DELETE FROM irrigation_events WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    record_audit(&state.pool, "irrigation_events", Some(id), "delete", &actor, None).await?;
    Ok(Json(json!({ "success": true })))
}
