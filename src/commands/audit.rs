use axum::extract::{Json, Query, State};
use serde::Deserialize;

use crate::db::AuditEntry;
use crate::error::SeraResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
    pub entity: Option<String>,
}

pub async fn get_audit_trail(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> SeraResult<Json<Vec<AuditEntry>>> {
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let entries = match query.entity {
        Some(entity) => {
            sqlx::query_as::<_, AuditEntry>(
                "SELECT * FROM audit_log WHERE entity = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
            )
            .bind(entity)
            .bind(limit)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, AuditEntry>(
                "SELECT * FROM audit_log ORDER BY created_at DESC, id DESC LIMIT $1",
            )
            .bind(limit)
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(Json(entries))
}
