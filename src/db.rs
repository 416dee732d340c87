#![allow(dead_code)]
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{FromRow, Pool, Postgres};
use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::{SeraError, SeraResult};

pub type DbPool = Pool<Postgres>;

pub async fn init_pool_with_options(opts: PgConnectOptions) -> SeraResult<DbPool> {
    // connect_lazy_with returns the pool immediately. It does not validate connection.
    Ok(PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(120))
        .max_lifetime(std::time::Duration::from_secs(300))
        .connect_lazy_with(opts))
}

pub async fn init_pool(database_url: &str) -> SeraResult<DbPool> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| SeraError::Internal(format!("Invalid DB URL: {}", e)))?
        .ssl_mode(PgSslMode::Disable);

    init_pool_with_options(opts).await
}

pub async fn init_database(pool: &DbPool, config: &Config) -> SeraResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    ensure_seeds(pool, config).await?;
    tracing::info!("Database ready");
    Ok(())
}

/// Provisions the default administrative account on first startup.
async fn ensure_seeds(pool: &DbPool, config: &Config) -> SeraResult<()> {
    let admin_exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&config.admin_user)
        .fetch_one(pool)
        .await
        .unwrap_or((0,));

    if admin_exists.0 == 0 {
        let hash = bcrypt::hash(&config.admin_password, bcrypt::DEFAULT_COST)?;
        sqlx::query(
            "INSERT INTO users (username, password_hash, role, full_name) VALUES ($1, $2, 'admin', 'Sistem Yöneticisi') ON CONFLICT DO NOTHING",
        )
        .bind(&config.admin_user)
        .bind(hash)
        .execute(pool)
        .await?;
        tracing::info!("Seeded default admin account '{}'", config.admin_user);
    }

    Ok(())
}

// --- Status / category enumerations ---
//
// Stored as their Turkish display labels in TEXT columns.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum PlantingStatus {
    #[serde(rename = "Ekim Yapıldı")]
    #[sqlx(rename = "Ekim Yapıldı")]
    EkimYapildi,
    #[serde(rename = "Büyüme Döneminde")]
    #[sqlx(rename = "Büyüme Döneminde")]
    BuyumeDoneminde,
    #[serde(rename = "Çiçeklenme")]
    #[sqlx(rename = "Çiçeklenme")]
    Ciceklenme,
    #[serde(rename = "Hasat Edildi")]
    #[sqlx(rename = "Hasat Edildi")]
    HasatEdildi,
}

impl PlantingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantingStatus::EkimYapildi => "Ekim Yapıldı",
            PlantingStatus::BuyumeDoneminde => "Büyüme Döneminde",
            PlantingStatus::Ciceklenme => "Çiçeklenme",
            PlantingStatus::HasatEdildi => "Hasat Edildi",
        }
    }

    /// Whether the batch still occupies a greenhouse.
    pub fn is_active(&self) -> bool {
        match self {
            PlantingStatus::EkimYapildi
            | PlantingStatus::BuyumeDoneminde
            | PlantingStatus::Ciceklenme => true,
            PlantingStatus::HasatEdildi => false,
        }
    }
}

impl fmt::Display for PlantingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum AttendanceStatus {
    #[serde(rename = "Geldi")]
    #[sqlx(rename = "Geldi")]
    Geldi,
    #[serde(rename = "Gelmedi")]
    #[sqlx(rename = "Gelmedi")]
    Gelmedi,
    #[serde(rename = "İzinli")]
    #[sqlx(rename = "İzinli")]
    Izinli,
    #[serde(rename = "Rapor")]
    #[sqlx(rename = "Rapor")]
    Rapor,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Geldi => "Geldi",
            AttendanceStatus::Gelmedi => "Gelmedi",
            AttendanceStatus::Izinli => "İzinli",
            AttendanceStatus::Rapor => "Rapor",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum TaskStatus {
    #[serde(rename = "Beklemede")]
    #[sqlx(rename = "Beklemede")]
    Beklemede,
    #[serde(rename = "Tamamlandı")]
    #[sqlx(rename = "Tamamlandı")]
    Tamamlandi,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Beklemede => "Beklemede",
            TaskStatus::Tamamlandi => "Tamamlandı",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum StockCategory {
    #[serde(rename = "Gübre")]
    #[sqlx(rename = "Gübre")]
    Gubre,
    #[serde(rename = "İlaç")]
    #[sqlx(rename = "İlaç")]
    Ilac,
    #[serde(rename = "Tohum")]
    #[sqlx(rename = "Tohum")]
    Tohum,
    #[serde(rename = "Kasa")]
    #[sqlx(rename = "Kasa")]
    Kasa,
    #[serde(rename = "Palet")]
    #[sqlx(rename = "Palet")]
    Palet,
    #[serde(rename = "Diğer")]
    #[sqlx(rename = "Diğer")]
    Diger,
}

impl StockCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockCategory::Gubre => "Gübre",
            StockCategory::Ilac => "İlaç",
            StockCategory::Tohum => "Tohum",
            StockCategory::Kasa => "Kasa",
            StockCategory::Palet => "Palet",
            StockCategory::Diger => "Diğer",
        }
    }
}

impl fmt::Display for StockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum IrrigationKind {
    #[serde(rename = "Normal")]
    #[sqlx(rename = "Normal")]
    Normal,
    #[serde(rename = "Gübreli")]
    #[sqlx(rename = "Gübreli")]
    Gubreli,
}

impl IrrigationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IrrigationKind::Normal => "Normal",
            IrrigationKind::Gubreli => "Gübreli",
        }
    }
}

impl fmt::Display for IrrigationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum InvoiceStatus {
    #[serde(rename = "Beklemede")]
    #[sqlx(rename = "Beklemede")]
    Beklemede,
    #[serde(rename = "Ödendi")]
    #[sqlx(rename = "Ödendi")]
    Odendi,
    #[serde(rename = "İptal")]
    #[sqlx(rename = "İptal")]
    Iptal,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Beklemede => "Beklemede",
            InvoiceStatus::Odendi => "Ödendi",
            InvoiceStatus::Iptal => "İptal",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum CostCategory {
    #[serde(rename = "Personel")]
    #[sqlx(rename = "Personel")]
    Personel,
    #[serde(rename = "Gübre")]
    #[sqlx(rename = "Gübre")]
    Gubre,
    #[serde(rename = "İlaç")]
    #[sqlx(rename = "İlaç")]
    Ilac,
    #[serde(rename = "Enerji")]
    #[sqlx(rename = "Enerji")]
    Enerji,
    #[serde(rename = "Su")]
    #[sqlx(rename = "Su")]
    Su,
    #[serde(rename = "Bakım")]
    #[sqlx(rename = "Bakım")]
    Bakim,
    #[serde(rename = "Diğer")]
    #[sqlx(rename = "Diğer")]
    Diger,
}

impl CostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostCategory::Personel => "Personel",
            CostCategory::Gubre => "Gübre",
            CostCategory::Ilac => "İlaç",
            CostCategory::Enerji => "Enerji",
            CostCategory::Su => "Su",
            CostCategory::Bakim => "Bakım",
            CostCategory::Diger => "Diğer",
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Row models ---

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub role: String,
    pub active: bool,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct LoginAttempt {
    pub id: i32,
    pub username: String,
    pub ip_address: Option<String>,
    pub success: bool,
    pub attempted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PlantingBatch {
    pub id: i32,
    pub greenhouse_name: String,
    pub crop_name: String,
    pub sow_date: NaiveDate,
    pub harvest_date: Option<NaiveDate>,
    pub status: PlantingStatus,
    pub area: Option<Decimal>,
    pub expected_yield: Option<Decimal>,
    pub actual_yield: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: i32,
    pub item_name: String,
    pub category: StockCategory,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub record_date: NaiveDate,
    pub warehouse: Option<String>,
    pub min_quantity: Decimal,
    pub unit_cost: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StaffMember {
    pub id: i32,
    pub full_name: String,
    pub position: Option<String>,
    pub monthly_salary: Decimal,
    pub hire_date: Option<NaiveDate>,
    pub active: bool,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub id: i32,
    pub staff_id: i32,
    #[sqlx(default)]
    pub staff_name: Option<String>,
    pub work_date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TaskRecord {
    pub id: i32,
    pub staff_id: i32,
    #[sqlx(default)]
    pub staff_name: Option<String>,
    pub task: String,
    pub task_date: NaiveDate,
    pub greenhouse_name: Option<String>,
    pub status: TaskStatus,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct IrrigationEvent {
    pub id: i32,
    pub batch_id: Option<i32>,
    pub greenhouse_name: String,
    pub event_date: NaiveDate,
    pub kind: IrrigationKind,
    pub water_amount: Option<Decimal>,
    pub fertilizer_name: Option<String>,
    pub fertilizer_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct FertilizationEvent {
    pub id: i32,
    pub batch_id: Option<i32>,
    pub event_date: NaiveDate,
    pub fertilizer_name: String,
    pub amount: Decimal,
    pub method: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct HarvestRecord {
    pub id: i32,
    pub batch_id: Option<i32>,
    #[sqlx(default)]
    pub greenhouse_name: Option<String>,
    #[sqlx(default)]
    pub crop_name: Option<String>,
    pub harvest_date: NaiveDate,
    pub plot: String,
    pub quantity: Decimal,
    pub harvested_by: String,
    pub delivered_to: Option<String>,
    pub box_count: Decimal,
    pub pallet_count: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i32,
    pub invoice_no: String,
    pub harvest_id: Option<i32>,
    pub customer_name: String,
    pub invoice_date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CostEntry {
    pub id: i32,
    pub cost_date: NaiveDate,
    pub category: CostCategory,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ProfitLossSnapshot {
    pub id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub revenue: Decimal,
    pub total_cost: Decimal,
    pub net: Decimal,
    pub computed_by: Option<String>,
    pub computed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AuditEntry {
    pub id: i32,
    pub entity: String,
    pub entity_id: Option<i32>,
    pub action: String,
    pub actor: String,
    pub detail: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

// --- Aggregate rows ---

#[derive(Debug, Serialize, Deserialize, FromRow, Default)]
pub struct DashboardStats {
    pub active_planting_count: Option<i64>,
    pub low_stock_count: Option<i64>,
    pub monthly_staff_cost: Option<Decimal>,
    pub greenhouse_count: Option<i64>,
    pub month_harvest_total: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AttendanceDayStats {
    pub work_date: NaiveDate,
    pub total_staff: i64,
    pub came: i64,
    pub absent: i64,
    pub on_leave: i64,
    pub on_report: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StaffTaskSummary {
    pub staff_id: i32,
    pub full_name: String,
    pub monthly_salary: Decimal,
    pub task_count: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct HarvesterStats {
    pub harvested_by: String,
    pub harvest_count: i64,
    pub total_quantity: Decimal,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct MonthlyProductionRow {
    pub month: String,
    pub sowings: i64,
    pub harvested: i64,
    pub total_yield: Decimal,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StockValueRow {
    pub category: StockCategory,
    pub item_count: i64,
    pub total_value: Decimal,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StaffCostTrendRow {
    pub month: String,
    pub staff_count: i64,
    pub total_cost: Decimal,
}
