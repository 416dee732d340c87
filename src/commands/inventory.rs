use axum::extract::{Json, Path, State};
use axum::Extension;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::{record_audit, Actor};
use crate::db::{InventoryItem, StockCategory};
use crate::error::{SeraError, SeraResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub async fn get_inventory(State(state): State<AppState>) -> SeraResult<Json<Vec<InventoryItem>>> {
    let items = sqlx::query_as::<_, InventoryItem>(
        "SELECT * FROM inventory_items ORDER BY item_name, record_date",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(items))
}

pub async fn get_low_stock(State(state): State<AppState>) -> SeraResult<Json<Vec<InventoryItem>>> {
    let items = sqlx::query_as::<_, InventoryItem>(
        "SELECT * FROM inventory_items WHERE quantity <= min_quantity AND min_quantity > 0 ORDER BY item_name",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(items))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum StockOp {
    #[serde(rename = "ekle")]
    Ekle,
    #[serde(rename = "cikar")]
    Cikar,
}

#[derive(Debug, Deserialize)]
pub struct InventoryInput {
    pub item_name: String,
    pub category: Option<StockCategory>,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub record_date: Option<NaiveDate>,
    pub warehouse: Option<String>,
    pub min_quantity: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub operation: Option<StockOp>,
}

/// Mirrors the stock entry form: adding to an existing item tops the row up,
/// withdrawing subtracts (refusing to go negative), and an unknown
/// item/warehouse pair opens a new row.
pub async fn save_inventory(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<InventoryInput>,
) -> SeraResult<Json<Value>> {
    let item_name = payload.item_name.trim().to_string();
    if item_name.is_empty() {
        return Err(SeraError::Validation("Malzeme adı zorunludur.".to_string()));
    }
    if payload.quantity <= Decimal::ZERO {
        return Err(SeraError::Validation(
            "Miktar pozitif bir sayı olmalıdır.".to_string(),
        ));
    }

    let actor = Actor::from(&claims);
    let operation = payload.operation.unwrap_or(StockOp::Ekle);

    let existing: Option<(i32, Decimal)> = sqlx::query_as(
        "SELECT id, quantity FROM inventory_items WHERE item_name = $1 AND warehouse IS NOT DISTINCT FROM $2",
    )
    .bind(&item_name)
    .bind(&payload.warehouse)
    .fetch_optional(&state.pool)
    .await?;

    match (existing, operation) {
        (Some((id, current)), StockOp::Cikar) => {
            if current < payload.quantity {
                return Err(SeraError::Stock(format!(
                    "{} için mevcut miktar {}, istenen {}",
                    item_name, current, payload.quantity
                )));
            }
            sqlx::query(
                "UPDATE inventory_items SET quantity = quantity - $1, updated_by = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $3 AND quantity >= $1",
            )
            .bind(payload.quantity)
            .bind(actor.name())
            .bind(id)
            .execute(&state.pool)
            .await?;

            record_audit(
                &state.pool,
                "inventory_items",
                Some(id),
                "withdraw",
                &actor,
                Some(&format!("-{}", payload.quantity)),
            )
            .await?;
            Ok(Json(json!({ "success": true, "id": id })))
        }
        (Some((id, _)), StockOp::Ekle) => {
            sqlx::query(
                "UPDATE inventory_items SET quantity = quantity + $1, unit_cost = COALESCE($2, unit_cost), min_quantity = COALESCE($3, min_quantity), notes = COALESCE($4, notes), updated_by = $5, updated_at = CURRENT_TIMESTAMP WHERE id = $6",
            )
            .bind(payload.quantity)
            .bind(payload.unit_cost)
            .bind(payload.min_quantity)
            .bind(&payload.notes)
            .bind(actor.name())
            .bind(id)
            .execute(&state.pool)
            .await?;

            record_audit(
                &state.pool,
                "inventory_items",
                Some(id),
                "add",
                &actor,
                Some(&format!("+{}", payload.quantity)),
            )
            .await?;
            Ok(Json(json!({ "success": true, "id": id })))
        }
        (None, StockOp::Cikar) => Err(SeraError::Stock(format!(
            "{} için kayıtlı stok bulunamadı",
            item_name
        ))),
        (None, StockOp::Ekle) => {
            let record_date = payload
                .record_date
                .unwrap_or_else(|| Local::now().date_naive());
            let (id,): (i32,) = sqlx::query_as(
                "INSERT INTO inventory_items (item_name, category, quantity, unit, record_date, warehouse, min_quantity, unit_cost, notes, created_by) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
            )
            .bind(&item_name)
            .bind(payload.category.unwrap_or(StockCategory::Diger))
            .bind(payload.quantity)
            .bind(&payload.unit)
            .bind(record_date)
            .bind(&payload.warehouse)
            .bind(payload.min_quantity.unwrap_or(Decimal::ZERO))
            .bind(payload.unit_cost.unwrap_or(Decimal::ZERO))
            .bind(&payload.notes)
            .bind(actor.name())
            .fetch_one(&state.pool)
            .await?;

            record_audit(&state.pool, "inventory_items", Some(id), "create", &actor, None).await?;
            Ok(Json(json!({ "success": true, "id": id })))
        }
    }
}

pub async fn delete_inventory_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> SeraResult<Json<Value>> {
    let actor = Actor::from(&claims);
    sqlx::query("DELETE FROM inventory_items WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    record_audit(&state.pool, "inventory_items", Some(id), "delete", &actor, None).await?;
    Ok(Json(json!({ "success": true })))
}
