use axum::extract::{Json, State};

use crate::db::{MonthlyProductionRow, StaffCostTrendRow, StockValueRow};
use crate::error::SeraResult;
use crate::state::AppState;

/// Sowings, completed harvests and summed yield per month over the last year.
pub async fn get_monthly_production(
    State(state): State<AppState>,
) -> SeraResult<Json<Vec<MonthlyProductionRow>>> {
    let rows = sqlx::query_as::<_, MonthlyProductionRow>(
        "SELECT to_char(sow_date, 'YYYY-MM') AS month, \
                COUNT(*) AS sowings, \
                COUNT(*) FILTER (WHERE status = 'Hasat Edildi') AS harvested, \
                COALESCE(SUM(actual_yield), 0) AS total_yield \
         FROM planting_batches \
         WHERE sow_date >= CURRENT_DATE - INTERVAL '12 months' \
         GROUP BY to_char(sow_date, 'YYYY-MM') \
         ORDER BY month DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}

/// Inventory value per category (quantity × unit cost).
pub async fn get_stock_value_report(
    State(state): State<AppState>,
) -> SeraResult<Json<Vec<StockValueRow>>> {
    let rows = sqlx::query_as::<_, StockValueRow>(
        "SELECT category, COUNT(*) AS item_count, COALESCE(SUM(quantity * unit_cost), 0) AS total_value \
         FROM inventory_items \
         GROUP BY category \
         ORDER BY total_value DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}

/// Active headcount and salary total projected over the last 12 months.
pub async fn get_staff_cost_trend(
    State(state): State<AppState>,
) -> SeraResult<Json<Vec<StaffCostTrendRow>>> {
    let rows = sqlx::query_as::<_, StaffCostTrendRow>(
        "SELECT to_char(date_trunc('month', CURRENT_DATE) - (n || ' months')::interval, 'YYYY-MM') AS month, \
                (SELECT COUNT(*) FROM staff WHERE active = TRUE) AS staff_count, \
                (SELECT COALESCE(SUM(monthly_salary), 0) FROM staff WHERE active = TRUE) AS total_cost \
         FROM generate_series(0, 11) AS n \
         ORDER BY month DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}
