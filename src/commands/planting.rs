use axum::extract::{Json, Path, State};
use axum::Extension;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::{record_audit, Actor};
use crate::db::{PlantingBatch, PlantingStatus};
use crate::error::{SeraError, SeraResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub async fn get_planting_batches(
    State(state): State<AppState>,
) -> SeraResult<Json<Vec<PlantingBatch>>> {
    let batches = sqlx::query_as::<_, PlantingBatch>(
        "SELECT * FROM planting_batches ORDER BY sow_date DESC, id DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(batches))
}

/// Batches still in the greenhouse, offered on the harvest entry form.
pub async fn get_active_batches(
    State(state): State<AppState>,
) -> SeraResult<Json<Vec<PlantingBatch>>> {
    let batches = sqlx::query_as::<_, PlantingBatch>(
        "SELECT * FROM planting_batches WHERE status != $1 ORDER BY greenhouse_name, crop_name",
    )
    .bind(PlantingStatus::HasatEdildi)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(batches))
}

#[derive(Debug, Deserialize)]
pub struct PlantingInput {
    pub id: Option<i32>,
    pub greenhouse_name: String,
    pub crop_name: String,
    pub sow_date: NaiveDate,
    pub harvest_date: Option<NaiveDate>,
    pub status: Option<PlantingStatus>,
    pub area: Option<Decimal>,
    pub expected_yield: Option<Decimal>,
    pub actual_yield: Option<Decimal>,
    pub notes: Option<String>,
}

fn validate_planting(input: &PlantingInput) -> SeraResult<()> {
    if input.greenhouse_name.trim().is_empty() || input.crop_name.trim().is_empty() {
        return Err(SeraError::Validation(
            "Sera adı, ürün adı ve ekim tarihi zorunludur.".to_string(),
        ));
    }
    for value in [input.area, input.expected_yield, input.actual_yield]
        .into_iter()
        .flatten()
    {
        if value < Decimal::ZERO {
            return Err(SeraError::Validation(
                "Alan ve verim değerleri negatif olamaz.".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn save_planting_batch(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PlantingInput>,
) -> SeraResult<Json<Value>> {
    validate_planting(&payload)?;
    let actor = Actor::from(&claims);
    let status = payload.status.unwrap_or(PlantingStatus::EkimYapildi);

    if let Some(id) = payload.id {
        sqlx::query(
            "UPDATE planting_batches SET greenhouse_name = $1, crop_name = $2, sow_date = $3, harvest_date = $4, status = $5, area = $6, expected_yield = $7, actual_yield = $8, notes = $9, updated_by = $10, updated_at = CURRENT_TIMESTAMP WHERE id = $11",
        )
        .bind(payload.greenhouse_name.trim())
        .bind(payload.crop_name.trim())
        .bind(payload.sow_date)
        .bind(payload.harvest_date)
        .bind(status)
        .bind(payload.area)
        .bind(payload.expected_yield)
        .bind(payload.actual_yield)
        .bind(&payload.notes)
        .bind(actor.name())
        .bind(id)
        .execute(&state.pool)
        .await?;

        record_audit(&state.pool, "planting_batches", Some(id), "update", &actor, None).await?;
        Ok(Json(json!({ "success": true, "id": id })))
    } else {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO planting_batches (greenhouse_name, crop_name, sow_date, harvest_date, status, area, expected_yield, actual_yield, notes, created_by) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
        )
        .bind(payload.greenhouse_name.trim())
        .bind(payload.crop_name.trim())
        .bind(payload.sow_date)
        .bind(payload.harvest_date)
        .bind(status)
        .bind(payload.area)
        .bind(payload.expected_yield)
        .bind(payload.actual_yield)
        .bind(&payload.notes)
        .bind(actor.name())
        .fetch_one(&state.pool)
        .await?;

        record_audit(&state.pool, "planting_batches", Some(id), "create", &actor, None).await?;
        Ok(Json(json!({ "success": true, "id": id })))
    }
}

#[derive(Debug, Deserialize)]
pub struct PlantingStatusInput {
    pub id: i32,
    pub status: PlantingStatus,
    pub actual_yield: Option<Decimal>,
    pub notes: Option<String>,
}

pub async fn update_planting_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PlantingStatusInput>,
) -> SeraResult<Json<Value>> {
    if let Some(actual) = payload.actual_yield {
        if actual < Decimal::ZERO {
            return Err(SeraError::Validation(
                "Gerçek verim negatif olamaz.".to_string(),
            ));
        }
    }

    let actor = Actor::from(&claims);
    sqlx::query(
        "UPDATE planting_batches SET status = $1, actual_yield = COALESCE($2, actual_yield), notes = COALESCE($3, notes), updated_by = $4, updated_at = CURRENT_TIMESTAMP WHERE id = $5",
    )
    .bind(payload.status)
    .bind(payload.actual_yield)
    .bind(&payload.notes)
    .bind(actor.name())
    .bind(payload.id)
    .execute(&state.pool)
    .await?;

    record_audit(
        &state.pool,
        "planting_batches",
        Some(payload.id),
        "status",
        &actor,
        Some(payload.status.as_str()),
    )
    .await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn delete_planting_batch(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> SeraResult<Json<Value>> {
    let dependents: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM harvests WHERE batch_id = $1) \
               + (SELECT COUNT(*) FROM irrigation_events WHERE batch_id = $1) \
               + (SELECT COUNT(*) FROM fertilization_events WHERE batch_id = $1)",
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    if dependents > 0 {
        return Err(SeraError::Validation(
            "Bu üretim kaydına bağlı hasat/sulama/gübreleme kayıtları var, önce onları silin."
                .to_string(),
        ));
    }

    let actor = Actor::from(&claims);
    sqlx::query("DELETE FROM planting_batches WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    record_audit(&state.pool, "planting_batches", Some(id), "delete", &actor, None).await?;
    Ok(Json(json!({ "success": true })))
}
