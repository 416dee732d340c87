//! Stock deduction: the one operation in the system that can fail for a
//! business reason (insufficient stock) rather than input validation.
//!
//! Selection is first-in-first-out by `record_date` among rows of the
//! requested category that can cover the full amount on their own.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use crate::audit::Actor;
use crate::db::StockCategory;
use crate::error::SeraResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDeduction {
    pub category: StockCategory,
    pub quantity: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppliedDeduction {
    pub item_id: i32,
    pub item_name: String,
    pub category: StockCategory,
    pub deducted: Decimal,
    pub remaining: Decimal,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsufficientStock {
    pub category: StockCategory,
    pub requested: Decimal,
    pub best_available: Decimal,
    pub message: String,
}

impl InsufficientStock {
    pub(crate) fn new(category: StockCategory, requested: Decimal, best_available: Decimal) -> Self {
        let shortfall = requested - best_available;
        let message = format!(
            "{} kategorisinde {} gerekli, tek kalemde en fazla {} mevcut ({} eksik)",
            category, requested, best_available, shortfall
        );
        InsufficientStock {
            category,
            requested,
            best_available,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub enum DeductionOutcome {
    Applied(AppliedDeduction),
    /// Requested quantity was zero or negative; nothing to do.
    Skipped,
    Insufficient(InsufficientStock),
}

/// Deducts `requested` from the oldest inventory row of `category` that can
/// cover it in full. On success the row's notes gain a line describing the
/// consuming operation and its audit columns are stamped with `actor`. On
/// failure nothing is mutated.
pub async fn deduct_stock(
    conn: &mut PgConnection,
    category: StockCategory,
    requested: Decimal,
    description: &str,
    actor: &Actor,
) -> SeraResult<DeductionOutcome> {
    if requested <= Decimal::ZERO {
        return Ok(DeductionOutcome::Skipped);
    }

    let row: Option<(i32, String, Decimal)> = sqlx::query_as(
        "SELECT id, item_name, quantity FROM inventory_items \
         WHERE category = $1 AND quantity >= $2 \
         ORDER BY record_date ASC, id ASC LIMIT 1",
    )
    .bind(category)
    .bind(requested)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((item_id, item_name, available)) = row else {
        let best: Option<Decimal> =
            sqlx::query_scalar("SELECT MAX(quantity) FROM inventory_items WHERE category = $1")
                .bind(category)
                .fetch_one(&mut *conn)
                .await?;
        return Ok(DeductionOutcome::Insufficient(InsufficientStock::new(
            category,
            requested,
            best.unwrap_or(Decimal::ZERO),
        )));
    };

    // The quantity guard repeats in the WHERE clause: a concurrent writer may
    // have shrunk the row since the read, and the quantity must never go
    // negative.
    let result = sqlx::query(
        "UPDATE inventory_items \
         SET quantity = quantity - $1, \
             notes = CASE WHEN notes IS NULL OR notes = '' THEN $2 ELSE notes || E'\\n' || $2 END, \
             updated_by = $3, updated_at = CURRENT_TIMESTAMP \
         WHERE id = $4 AND quantity >= $1",
    )
    .bind(requested)
    .bind(description)
    .bind(actor.name())
    .bind(item_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let best: Option<Decimal> =
            sqlx::query_scalar("SELECT MAX(quantity) FROM inventory_items WHERE category = $1")
                .bind(category)
                .fetch_one(&mut *conn)
                .await?;
        return Ok(DeductionOutcome::Insufficient(InsufficientStock::new(
            category,
            requested,
            best.unwrap_or(Decimal::ZERO),
        )));
    }

    let remaining = available - requested;
    let message = format!(
        "{} stoğundan {} düşüldü: {} (kalan {})",
        category, requested, item_name, remaining
    );
    Ok(DeductionOutcome::Applied(AppliedDeduction {
        item_id,
        item_name,
        category,
        deducted: requested,
        remaining,
        message,
    }))
}

#[derive(Debug, Serialize)]
pub struct BatchDeductionReport {
    pub applied: Vec<AppliedDeduction>,
    pub skipped: usize,
    pub failure: Option<InsufficientStock>,
}

impl BatchDeductionReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Applies deductions in order against the caller's connection, stopping at
/// the first insufficient-stock failure. Already-applied entries are NOT
/// compensated here: callers wrap the batch in a transaction and abort the
/// whole transaction when `failure` is set. Within one transaction a later
/// deduction sees the writes of earlier ones.
pub async fn deduct_stock_batch(
    conn: &mut PgConnection,
    deductions: &[StockDeduction],
    actor: &Actor,
) -> SeraResult<BatchDeductionReport> {
    let mut report = BatchDeductionReport {
        applied: Vec::new(),
        skipped: 0,
        failure: None,
    };

    for deduction in deductions {
        match deduct_stock(
            conn,
            deduction.category,
            deduction.quantity,
            &deduction.description,
            actor,
        )
        .await?
        {
            DeductionOutcome::Applied(applied) => report.applied.push(applied),
            DeductionOutcome::Skipped => report.skipped += 1,
            DeductionOutcome::Insufficient(failure) => {
                report.failure = Some(failure);
                break;
            }
        }
    }

    Ok(report)
}
