use axum::extract::{Json, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use chrono::{Local, NaiveDate};
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use crate::audit::{record_audit, Actor};
use crate::db::{AttendanceDayStats, AttendanceRecord, AttendanceStatus};
use crate::error::{SeraError, SeraResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AttendanceEntry {
    pub staff_id: i32,
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceSaveRequest {
    pub work_date: NaiveDate,
    pub entries: Vec<AttendanceEntry>,
}

/// One submit per day: a row per staff member, upserted on
/// (staff_id, work_date).
pub async fn save_attendance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AttendanceSaveRequest>,
) -> SeraResult<Json<Value>> {
    if payload.entries.is_empty() {
        return Err(SeraError::Validation(
            "Kaydedilecek devam girişi yok.".to_string(),
        ));
    }

    let actor = Actor::from(&claims);
    let mut tx = state.pool.begin().await?;

    for entry in &payload.entries {
        sqlx::query(
            "INSERT INTO attendance (staff_id, work_date, status, check_in, check_out, notes, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (staff_id, work_date) DO UPDATE SET \
                 status = EXCLUDED.status, check_in = EXCLUDED.check_in, \
                 check_out = EXCLUDED.check_out, notes = EXCLUDED.notes, \
                 updated_by = $7, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(entry.staff_id)
        .bind(payload.work_date)
        .bind(entry.status)
        .bind(&entry.check_in)
        .bind(&entry.check_out)
        .bind(&entry.notes)
        .bind(actor.name())
        .execute(&mut *tx)
        .await?;
    }

    record_audit(
        &mut *tx,
        "attendance",
        None,
        "bulk-save",
        &actor,
        Some(&payload.work_date.to_string()),
    )
    .await?;

    tx.commit().await?;
    Ok(Json(json!({ "success": true, "saved": payload.entries.len() })))
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<NaiveDate>,
}

pub async fn get_day_attendance(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> SeraResult<Json<Vec<AttendanceRecord>>> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let records = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT a.*, s.full_name AS staff_name FROM attendance a LEFT JOIN staff s ON a.staff_id = s.id WHERE a.work_date = $1 ORDER BY s.full_name",
    )
    .bind(date)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(records))
}

pub async fn get_week_stats(
    State(state): State<AppState>,
) -> SeraResult<Json<Vec<AttendanceDayStats>>> {
    let stats = sqlx::query_as::<_, AttendanceDayStats>(
        "SELECT work_date, \
                COUNT(*) AS total_staff, \
                COUNT(*) FILTER (WHERE status = $1) AS came, \
                COUNT(*) FILTER (WHERE status = $2) AS absent, \
                COUNT(*) FILTER (WHERE status = $3) AS on_leave, \
                COUNT(*) FILTER (WHERE status = $4) AS on_report \
         FROM attendance \
         WHERE work_date >= CURRENT_DATE - INTERVAL '7 days' \
         GROUP BY work_date \
         ORDER BY work_date DESC",
    )
    .bind(AttendanceStatus::Geldi)
    .bind(AttendanceStatus::Gelmedi)
    .bind(AttendanceStatus::Izinli)
    .bind(AttendanceStatus::Rapor)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(stats))
}

// --- Spreadsheet export ---

#[derive(Debug, FromRow)]
pub struct AttendanceExportRow {
    pub work_date: NaiveDate,
    pub staff_name: String,
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct StaffAttendanceSummary {
    pub staff_name: String,
    pub came: u32,
    pub absent: u32,
    pub on_leave: u32,
    pub on_report: u32,
    pub total: u32,
}

/// Per-staff status counts over the exported range, in first-seen name order.
pub fn summarize_attendance(rows: &[AttendanceExportRow]) -> Vec<StaffAttendanceSummary> {
    let mut summaries: Vec<StaffAttendanceSummary> = Vec::new();

    for row in rows {
        let idx = match summaries.iter().position(|s| s.staff_name == row.staff_name) {
            Some(idx) => idx,
            None => {
                summaries.push(StaffAttendanceSummary {
                    staff_name: row.staff_name.clone(),
                    came: 0,
                    absent: 0,
                    on_leave: 0,
                    on_report: 0,
                    total: 0,
                });
                summaries.len() - 1
            }
        };
        let summary = &mut summaries[idx];
        match row.status {
            AttendanceStatus::Geldi => summary.came += 1,
            AttendanceStatus::Gelmedi => summary.absent += 1,
            AttendanceStatus::Izinli => summary.on_leave += 1,
            AttendanceStatus::Rapor => summary.on_report += 1,
        }
        summary.total += 1;
    }

    summaries
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub start: String,
    pub end: String,
}

/// Downloadable .xlsx for a date range: sheet 1 holds the daily rows, sheet 2
/// the per-staff summary.
pub async fn export_attendance(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> SeraResult<Response> {
    let start = NaiveDate::parse_from_str(&query.start, "%Y-%m-%d")
        .map_err(|_| SeraError::Validation("Başlangıç tarihi geçersiz.".to_string()))?;
    let end = NaiveDate::parse_from_str(&query.end, "%Y-%m-%d")
        .map_err(|_| SeraError::Validation("Bitiş tarihi geçersiz.".to_string()))?;
    if end < start {
        return Err(SeraError::Validation(
            "Bitiş tarihi başlangıçtan önce olamaz.".to_string(),
        ));
    }

    let rows = sqlx::query_as::<_, AttendanceExportRow>(
        "SELECT a.work_date, COALESCE(s.full_name, '-') AS staff_name, a.status, a.check_in, a.check_out, a.notes \
         FROM attendance a LEFT JOIN staff s ON a.staff_id = s.id \
         WHERE a.work_date BETWEEN $1 AND $2 \
         ORDER BY a.work_date, s.full_name",
    )
    .bind(start)
    .bind(end)
    .fetch_all(&state.pool)
    .await?;

    let mut workbook = Workbook::new();

    let daily = workbook.add_worksheet();
    daily.set_name("Günlük Devam")?;
    for (col, title) in ["Tarih", "Personel", "Durum", "Giriş", "Çıkış", "Notlar"]
        .iter()
        .enumerate()
    {
        daily.write_string(0, col as u16, *title)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        daily.write_string(r, 0, row.work_date.to_string())?;
        daily.write_string(r, 1, &row.staff_name)?;
        daily.write_string(r, 2, row.status.as_str())?;
        daily.write_string(r, 3, row.check_in.as_deref().unwrap_or(""))?;
        daily.write_string(r, 4, row.check_out.as_deref().unwrap_or(""))?;
        daily.write_string(r, 5, row.notes.as_deref().unwrap_or(""))?;
    }

    let summaries = summarize_attendance(&rows);
    let summary_sheet = workbook.add_worksheet();
    summary_sheet.set_name("Personel Özeti")?;
    for (col, title) in ["Personel", "Geldi", "Gelmedi", "İzinli", "Rapor", "Toplam"]
        .iter()
        .enumerate()
    {
        summary_sheet.write_string(0, col as u16, *title)?;
    }
    for (i, summary) in summaries.iter().enumerate() {
        let r = (i + 1) as u32;
        summary_sheet.write_string(r, 0, &summary.staff_name)?;
        summary_sheet.write_number(r, 1, summary.came as f64)?;
        summary_sheet.write_number(r, 2, summary.absent as f64)?;
        summary_sheet.write_number(r, 3, summary.on_leave as f64)?;
        summary_sheet.write_number(r, 4, summary.on_report as f64)?;
        summary_sheet.write_number(r, 5, summary.total as f64)?;
    }

    let buffer = workbook.save_to_buffer()?;
    let filename = format!("devam_{}_{}.xlsx", start, end);

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        buffer,
    )
        .into_response())
}
