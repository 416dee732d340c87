use sqlx::Postgres;

use crate::error::SeraResult;
use crate::middleware::auth::Claims;

/// Identity performing a write. Derived from the request's JWT claims and
/// passed explicitly into every write operation.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Option<i32>,
    pub username: String,
}

impl Actor {
    pub fn name(&self) -> &str {
        &self.username
    }

    /// Actor for startup tasks that run outside any request.
    pub fn system() -> Self {
        Actor {
            user_id: None,
            username: "sistem".to_string(),
        }
    }
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Actor {
            user_id: claims.user_id,
            username: claims
                .username
                .clone()
                .unwrap_or_else(|| claims.sub.clone()),
        }
    }
}

/// Appends one row to the audit trail. Runs on whatever executor the caller
/// is writing with, so trail entries commit or roll back with the write they
/// describe.
pub async fn record_audit<'e, E>(
    executor: E,
    entity: &str,
    entity_id: Option<i32>,
    action: &str,
    actor: &Actor,
    detail: Option<&str>,
) -> SeraResult<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "INSERT INTO audit_log (entity, entity_id, action, actor, detail) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(entity)
    .bind(entity_id)
    .bind(action)
    .bind(actor.name())
    .bind(detail)
    .execute(executor)
    .await?;
    Ok(())
}
