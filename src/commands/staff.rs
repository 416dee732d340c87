use axum::extract::{Json, Path, State};
use axum::Extension;
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::{record_audit, Actor};
use crate::db::{StaffMember, StaffTaskSummary, TaskRecord, TaskStatus};
use crate::error::{SeraError, SeraResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub async fn get_staff(State(state): State<AppState>) -> SeraResult<Json<Vec<StaffMember>>> {
    let staff = sqlx::query_as::<_, StaffMember>(
        "SELECT * FROM staff ORDER BY active DESC, full_name",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(staff))
}

#[derive(Debug, Deserialize)]
pub struct StaffInput {
    pub id: Option<i32>,
    pub full_name: String,
    pub position: Option<String>,
    pub monthly_salary: Option<Decimal>,
    pub hire_date: Option<NaiveDate>,
    pub active: Option<bool>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

pub async fn save_staff(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StaffInput>,
) -> SeraResult<Json<Value>> {
    let full_name = payload.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(SeraError::Validation("Personel adı zorunludur.".to_string()));
    }
    let salary = payload.monthly_salary.unwrap_or(Decimal::ZERO);
    if salary < Decimal::ZERO {
        return Err(SeraError::Validation(
            "Aylık maaş negatif olamaz.".to_string(),
        ));
    }

    let actor = Actor::from(&claims);

    if let Some(id) = payload.id {
        sqlx::query(
            "UPDATE staff SET full_name = $1, position = $2, monthly_salary = $3, hire_date = $4, active = $5, phone = $6, notes = $7, updated_by = $8, updated_at = CURRENT_TIMESTAMP WHERE id = $9",
        )
        .bind(&full_name)
        .bind(&payload.position)
        .bind(salary)
        .bind(payload.hire_date)
        .bind(payload.active.unwrap_or(true))
        .bind(&payload.phone)
        .bind(&payload.notes)
        .bind(actor.name())
        .bind(id)
        .execute(&state.pool)
        .await?;

        record_audit(&state.pool, "staff", Some(id), "update", &actor, None).await?;
        Ok(Json(json!({ "success": true, "id": id })))
    } else {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO staff (full_name, position, monthly_salary, hire_date, active, phone, notes, created_by) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&full_name)
        .bind(&payload.position)
        .bind(salary)
        .bind(payload.hire_date)
        .bind(payload.active.unwrap_or(true))
        .bind(&payload.phone)
        .bind(&payload.notes)
        .bind(actor.name())
        .fetch_one(&state.pool)
        .await?;

        record_audit(&state.pool, "staff", Some(id), "create", &actor, None).await?;
        Ok(Json(json!({ "success": true, "id": id })))
    }
}

/// Staff rows are referenced by attendance and tasks, so removal is a
/// soft-deactivate.
pub async fn deactivate_staff(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> SeraResult<Json<Value>> {
    let actor = Actor::from(&claims);
    sqlx::query(
        "UPDATE staff SET active = FALSE, updated_by = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
    )
    .bind(actor.name())
    .bind(id)
    .execute(&state.pool)
    .await?;

    record_audit(&state.pool, "staff", Some(id), "deactivate", &actor, None).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn get_tasks(State(state): State<AppState>) -> SeraResult<Json<Vec<TaskRecord>>> {
    let tasks = sqlx::query_as::<_, TaskRecord>(
        "SELECT t.*, s.full_name AS staff_name FROM tasks t LEFT JOIN staff s ON t.staff_id = s.id ORDER BY t.task_date DESC, t.id DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(tasks))
}

#[derive(Debug, Deserialize)]
pub struct TaskInput {
    pub id: Option<i32>,
    pub staff_id: i32,
    pub task: String,
    pub task_date: NaiveDate,
    pub greenhouse_name: Option<String>,
    pub status: Option<TaskStatus>,
    pub notes: Option<String>,
}

pub async fn save_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<TaskInput>,
) -> SeraResult<Json<Value>> {
    if payload.task.trim().is_empty() {
        return Err(SeraError::Validation(
            "Personel, görev ve tarih zorunludur.".to_string(),
        ));
    }

    let actor = Actor::from(&claims);
    let status = payload.status.unwrap_or(TaskStatus::Tamamlandi);

    if let Some(id) = payload.id {
        sqlx::query(
            "UPDATE tasks SET staff_id = $1, task = $2, task_date = $3, greenhouse_name = $4, status = $5, notes = $6, updated_by = $7, updated_at = CURRENT_TIMESTAMP WHERE id = $8",
        )
        .bind(payload.staff_id)
        .bind(payload.task.trim())
        .bind(payload.task_date)
        .bind(&payload.greenhouse_name)
        .bind(status)
        .bind(&payload.notes)
        .bind(actor.name())
        .bind(id)
        .execute(&state.pool)
        .await?;

        record_audit(&state.pool, "tasks", Some(id), "update", &actor, None).await?;
        Ok(Json(json!({ "success": true, "id": id })))
    } else {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO tasks (staff_id, task, task_date, greenhouse_name, status, notes, created_by) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(payload.staff_id)
        .bind(payload.task.trim())
        .bind(payload.task_date)
        .bind(&payload.greenhouse_name)
        .bind(status)
        .bind(&payload.notes)
        .bind(actor.name())
        .fetch_one(&state.pool)
        .await?;

        record_audit(&state.pool, "tasks", Some(id), "create", &actor, None).await?;
        Ok(Json(json!({ "success": true, "id": id })))
    }
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> SeraResult<Json<Value>> {
    let actor = Actor::from(&claims);
    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    record_audit(&state.pool, "tasks", Some(id), "delete", &actor, None).await?;
    Ok(Json(json!({ "success": true })))
}

/// Per-person task counts for the current month, active staff only.
pub async fn get_staff_summary(
    State(state): State<AppState>,
) -> SeraResult<Json<Vec<StaffTaskSummary>>> {
    let today = Local::now().date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    let summary = sqlx::query_as::<_, StaffTaskSummary>(
        "SELECT s.id AS staff_id, s.full_name, s.monthly_salary, COUNT(t.id) AS task_count \
         FROM staff s \
         LEFT JOIN tasks t ON s.id = t.staff_id AND t.task_date >= $1 \
         WHERE s.active = TRUE \
         GROUP BY s.id, s.full_name, s.monthly_salary \
         ORDER BY s.full_name",
    )
    .bind(month_start)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(summary))
}

pub async fn get_monthly_salary_total(State(state): State<AppState>) -> SeraResult<Json<Value>> {
    let total: Option<Decimal> = sqlx::query_scalar(
        "SELECT SUM(monthly_salary) FROM staff WHERE active = TRUE",
    )
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(json!({ "total": total.unwrap_or(Decimal::ZERO) })))
}
