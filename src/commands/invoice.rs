use axum::extract::{Json, Path, State};
use axum::Extension;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::{record_audit, Actor};
use crate::db::{Invoice, InvoiceStatus};
use crate::error::{SeraError, SeraResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub async fn get_invoices(State(state): State<AppState>) -> SeraResult<Json<Vec<Invoice>>> {
    let invoices = sqlx::query_as::<_, Invoice>(
        "SELECT * FROM invoices ORDER BY invoice_date DESC, id DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(invoices))
}

/// Invoice totals must line up with their line values.
pub fn invoice_total_matches(quantity: Decimal, unit_price: Decimal, total: Decimal) -> bool {
    quantity * unit_price == total
}

#[derive(Debug, Deserialize)]
pub struct InvoiceInput {
    pub id: Option<i32>,
    pub invoice_no: Option<String>,
    pub harvest_id: Option<i32>,
    pub customer_name: String,
    pub invoice_date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
}

pub async fn save_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<InvoiceInput>,
) -> SeraResult<Json<Value>> {
    if payload.customer_name.trim().is_empty() {
        return Err(SeraError::Validation(
            "Müşteri adı ve fatura tarihi zorunludur.".to_string(),
        ));
    }
    if payload.quantity <= Decimal::ZERO || payload.unit_price < Decimal::ZERO {
        return Err(SeraError::Validation(
            "Miktar ve birim fiyat pozitif olmalıdır.".to_string(),
        ));
    }
    if !invoice_total_matches(payload.quantity, payload.unit_price, payload.total_amount) {
        return Err(SeraError::Validation(
            "Fatura tutarı miktar ile birim fiyatın çarpımına eşit olmalıdır.".to_string(),
        ));
    }

    let actor = Actor::from(&claims);
    let status = payload.status.unwrap_or(InvoiceStatus::Beklemede);

    if let Some(id) = payload.id {
        sqlx::query(
            "UPDATE invoices SET harvest_id = $1, customer_name = $2, invoice_date = $3, quantity = $4, unit_price = $5, total_amount = $6, status = $7, notes = $8, updated_by = $9, updated_at = CURRENT_TIMESTAMP WHERE id = $10",
        )
        .bind(payload.harvest_id)
        .bind(payload.customer_name.trim())
        .bind(payload.invoice_date)
        .bind(payload.quantity)
        .bind(payload.unit_price)
        .bind(payload.total_amount)
        .bind(status)
        .bind(&payload.notes)
        .bind(actor.name())
        .bind(id)
        .execute(&state.pool)
        .await?;

        record_audit(&state.pool, "invoices", Some(id), "update", &actor, None).await?;
        Ok(Json(json!({ "success": true, "id": id })))
    } else {
        let invoice_no = match payload.invoice_no {
            Some(no) if !no.trim().is_empty() => no.trim().to_string(),
            _ => format!(
                "F-{}",
                uuid::Uuid::new_v4().to_string()[..8].to_uppercase()
            ),
        };

        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO invoices (invoice_no, harvest_id, customer_name, invoice_date, quantity, unit_price, total_amount, status, notes, created_by) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
        )
        .bind(&invoice_no)
        .bind(payload.harvest_id)
        .bind(payload.customer_name.trim())
        .bind(payload.invoice_date)
        .bind(payload.quantity)
        .bind(payload.unit_price)
        .bind(payload.total_amount)
        .bind(status)
        .bind(&payload.notes)
        .bind(actor.name())
        .fetch_one(&state.pool)
        .await?;

        record_audit(
            &state.pool,
            "invoices",
            Some(id),
            "create",
            &actor,
            Some(&invoice_no),
        )
        .await?;
        Ok(Json(json!({ "success": true, "id": id, "invoice_no": invoice_no })))
    }
}

pub async fn mark_invoice_paid(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> SeraResult<Json<Value>> {
    let actor = Actor::from(&claims);
    sqlx::query(
        "UPDATE invoices SET status = $1, updated_by = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $3",
    )
    .bind(InvoiceStatus::Odendi)
    .bind(actor.name())
    .bind(id)
    .execute(&state.pool)
    .await?;

    record_audit(&state.pool, "invoices", Some(id), "paid", &actor, None).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> SeraResult<Json<Value>> {
    let actor = Actor::from(&claims);
    sqlx::query("DELETE FROM invoices WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    record_audit(&state.pool, "invoices", Some(id), "delete", &actor, None).await?;
    Ok(Json(json!({ "success": true })))
}
