#[cfg(test)]
mod tests {
    use axum::extract::{Json, State};
    use axum::Extension;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::audit::Actor;
    use crate::commands::attendance::{
        save_attendance, AttendanceEntry, AttendanceSaveRequest,
    };
    use crate::commands::finance::{compute_profit_loss, ProfitLossRequest};
    use crate::commands::irrigation::{save_irrigation, IrrigationInput};
    use crate::config::Config;
    use crate::db::{self, AttendanceStatus, DbPool, IrrigationKind, StockCategory};
    use crate::error::SeraError;
    use crate::middleware::auth::Claims;
    use crate::state::AppState;
    use crate::stock::{deduct_stock, deduct_stock_batch, DeductionOutcome, StockDeduction};

    async fn setup_test_db() -> DbPool {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        db::init_pool(&database_url)
            .await
            .expect("Failed to create pool")
    }

    fn test_state(pool: DbPool) -> AppState {
        AppState {
            pool,
            config: Config::from_env(),
        }
    }

    fn test_claims() -> Claims {
        Claims {
            sub: "test".to_string(),
            user_id: None,
            username: Some("test".to_string()),
            role: Some("admin".to_string()),
            exp: 4102444800, // 2100-01-01
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn seed_stock_row(
        conn: &mut sqlx::PgConnection,
        name: &str,
        category: StockCategory,
        quantity: i64,
        record_date: &str,
    ) -> i32 {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO inventory_items (item_name, category, quantity, record_date) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(name)
        .bind(category)
        .bind(Decimal::from(quantity))
        .bind(date(record_date))
        .fetch_one(conn)
        .await
        .unwrap();
        id
    }

    /// The worked example: rows {50 @ 2024-01-01, 30 @ 2024-02-01}. Deducting
    /// 40 picks the older row (FIFO by record date) leaving {10, 30}; a second
    /// 40 fails because no single row covers it, and nothing changes.
    #[tokio::test]
    async fn test_fifo_deduction_and_shortfall() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();

        sqlx::query("DELETE FROM inventory_items WHERE category = $1")
            .bind(StockCategory::Gubre)
            .execute(&mut *tx)
            .await
            .unwrap();

        let old_id =
            seed_stock_row(&mut tx, "Test Gübre A", StockCategory::Gubre, 50, "2024-01-01").await;
        let new_id =
            seed_stock_row(&mut tx, "Test Gübre B", StockCategory::Gubre, 30, "2024-02-01").await;

        let actor = Actor::system();
        let outcome = deduct_stock(
            &mut tx,
            StockCategory::Gubre,
            Decimal::from(40),
            "Gübreli sulama: Sera-1 (2024-03-01)",
            &actor,
        )
        .await
        .unwrap();

        match outcome {
            DeductionOutcome::Applied(applied) => {
                assert_eq!(applied.item_id, old_id, "FIFO must pick the older row");
                assert_eq!(applied.remaining, Decimal::from(10));
            }
            other => panic!("expected Applied, got {:?}", other),
        }

        let quantities: Vec<(i32, Decimal)> = sqlx::query_as(
            "SELECT id, quantity FROM inventory_items WHERE category = $1 ORDER BY record_date",
        )
        .bind(StockCategory::Gubre)
        .fetch_all(&mut *tx)
        .await
        .unwrap();
        assert_eq!(quantities, vec![(old_id, Decimal::from(10)), (new_id, Decimal::from(30))]);

        let total: Option<Decimal> =
            sqlx::query_scalar("SELECT SUM(quantity) FROM inventory_items WHERE category = $1")
                .bind(StockCategory::Gubre)
                .fetch_one(&mut *tx)
                .await
                .unwrap();
        assert_eq!(total, Some(Decimal::from(40)), "total dropped by exactly 40");

        // Notes carry the consuming operation.
        let notes: Option<String> =
            sqlx::query_scalar("SELECT notes FROM inventory_items WHERE id = $1")
                .bind(old_id)
                .fetch_one(&mut *tx)
                .await
                .unwrap();
        assert!(notes.unwrap_or_default().contains("Gübreli sulama"));

        // No remaining single row covers another 40.
        let outcome = deduct_stock(
            &mut tx,
            StockCategory::Gubre,
            Decimal::from(40),
            "ikinci deneme",
            &actor,
        )
        .await
        .unwrap();
        match outcome {
            DeductionOutcome::Insufficient(failure) => {
                assert_eq!(failure.best_available, Decimal::from(30));
                assert!(failure.message.contains("Gübre"));
            }
            other => panic!("expected Insufficient, got {:?}", other),
        }

        let total_after: Option<Decimal> =
            sqlx::query_scalar("SELECT SUM(quantity) FROM inventory_items WHERE category = $1")
                .bind(StockCategory::Gubre)
                .fetch_one(&mut *tx)
                .await
                .unwrap();
        assert_eq!(total_after, Some(Decimal::from(40)), "failure must not mutate");

        // Test data never lands in the table.
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_deduction_skips_nonpositive() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();

        let actor = Actor::system();
        for amount in [Decimal::ZERO, Decimal::from(-5)] {
            let outcome = deduct_stock(&mut tx, StockCategory::Kasa, amount, "no-op", &actor)
                .await
                .unwrap();
            assert!(matches!(outcome, DeductionOutcome::Skipped));
        }

        tx.rollback().await.unwrap();
    }

    /// Helper-level contract: the batch stops at the first failing entry and
    /// leaves earlier entries applied. Caller-level contract: rolling the
    /// wrapping transaction back undoes everything.
    #[tokio::test]
    async fn test_batch_stops_at_first_failure() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();

        sqlx::query("DELETE FROM inventory_items WHERE category IN ($1, $2)")
            .bind(StockCategory::Kasa)
            .bind(StockCategory::Palet)
            .execute(&mut *tx)
            .await
            .unwrap();

        let kasa_id =
            seed_stock_row(&mut tx, "Test Kasa", StockCategory::Kasa, 10, "2024-01-05").await;
        seed_stock_row(&mut tx, "Test Palet", StockCategory::Palet, 1, "2024-01-05").await;

        let deductions = [
            StockDeduction {
                category: StockCategory::Kasa,
                quantity: Decimal::from(5),
                description: "Hasat: A-1 (2024-03-10)".to_string(),
            },
            StockDeduction {
                category: StockCategory::Palet,
                quantity: Decimal::from(5),
                description: "Hasat: A-1 (2024-03-10)".to_string(),
            },
            StockDeduction {
                category: StockCategory::Kasa,
                quantity: Decimal::from(2),
                description: "asla değerlendirilmemeli".to_string(),
            },
        ];

        let actor = Actor::system();
        let report = deduct_stock_batch(&mut tx, &deductions, &actor).await.unwrap();

        assert!(!report.is_success());
        assert_eq!(report.applied.len(), 1, "stops before the third entry");
        assert_eq!(report.applied[0].category, StockCategory::Kasa);
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.category, StockCategory::Palet);

        // The first entry's effect is visible inside the open transaction.
        let kasa_qty: Decimal =
            sqlx::query_scalar("SELECT quantity FROM inventory_items WHERE id = $1")
                .bind(kasa_id)
                .fetch_one(&mut *tx)
                .await
                .unwrap();
        assert_eq!(kasa_qty, Decimal::from(5));

        // Caller aborts the whole transaction; nothing survives.
        tx.rollback().await.unwrap();
        let leftover: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM inventory_items WHERE item_name IN ('Test Kasa', 'Test Palet')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(leftover, 0);
    }

    /// Two deductions of the same category in one batch run sequentially:
    /// the second reads the first one's write.
    #[tokio::test]
    async fn test_same_category_sequential_reads() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();

        sqlx::query("DELETE FROM inventory_items WHERE category = $1")
            .bind(StockCategory::Kasa)
            .execute(&mut *tx)
            .await
            .unwrap();
        seed_stock_row(&mut tx, "Test Kasa Tek", StockCategory::Kasa, 10, "2024-01-05").await;

        let deductions = [
            StockDeduction {
                category: StockCategory::Kasa,
                quantity: Decimal::from(6),
                description: "ilk".to_string(),
            },
            StockDeduction {
                category: StockCategory::Kasa,
                quantity: Decimal::from(6),
                description: "ikinci".to_string(),
            },
        ];

        let actor = Actor::system();
        let report = deduct_stock_batch(&mut tx, &deductions, &actor).await.unwrap();

        assert_eq!(report.applied.len(), 1);
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(
            failure.best_available,
            Decimal::from(4),
            "second deduction must see the first one's write"
        );

        tx.rollback().await.unwrap();
    }

    /// A "Gübreli" irrigation whose fertilizer amount exceeds the stock must
    /// create no irrigation record and alter no stock.
    #[tokio::test]
    async fn test_gubreli_irrigation_rejected_without_stock() {
        let pool = setup_test_db().await;
        let state = test_state(pool.clone());

        let best: Option<Decimal> =
            sqlx::query_scalar("SELECT MAX(quantity) FROM inventory_items WHERE category = $1")
                .bind(StockCategory::Gubre)
                .fetch_one(&pool)
                .await
                .unwrap();
        let impossible = best.unwrap_or(Decimal::ZERO) + Decimal::from(1000);

        let events_before: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM irrigation_events")
            .fetch_one(&pool)
            .await
            .unwrap();
        let stock_before: Option<Decimal> =
            sqlx::query_scalar("SELECT SUM(quantity) FROM inventory_items WHERE category = $1")
                .bind(StockCategory::Gubre)
                .fetch_one(&pool)
                .await
                .unwrap();

        let result = save_irrigation(
            State(state),
            Extension(test_claims()),
            Json(IrrigationInput {
                id: None,
                batch_id: None,
                greenhouse_name: "Test Sera".to_string(),
                event_date: date("2024-03-01"),
                kind: IrrigationKind::Gubreli,
                water_amount: Some(Decimal::from(100)),
                fertilizer_name: Some("Test Gübre".to_string()),
                fertilizer_amount: Some(impossible),
                notes: None,
            }),
        )
        .await;

        match result {
            Err(SeraError::Stock(message)) => assert!(message.contains("Gübre")),
            other => panic!("expected stock rejection, got {:?}", other.map(|_| ())),
        }

        let events_after: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM irrigation_events")
            .fetch_one(&pool)
            .await
            .unwrap();
        let stock_after: Option<Decimal> =
            sqlx::query_scalar("SELECT SUM(quantity) FROM inventory_items WHERE category = $1")
                .bind(StockCategory::Gubre)
                .fetch_one(&pool)
                .await
                .unwrap();

        assert_eq!(events_before, events_after, "no irrigation record created");
        assert_eq!(stock_before, stock_after, "no stock altered");
    }

    /// One attendance row per staff member and date; a second submit for the
    /// same date updates in place.
    #[tokio::test]
    async fn test_attendance_upsert_single_row() {
        let pool = setup_test_db().await;
        let state = test_state(pool.clone());

        let (staff_id,): (i32,) = sqlx::query_as(
            "INSERT INTO staff (full_name, monthly_salary) VALUES ('Devam Test Personeli', 0) RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let work_date = date("1999-01-01");
        for status in [AttendanceStatus::Geldi, AttendanceStatus::Gelmedi] {
            save_attendance(
                State(state.clone()),
                Extension(test_claims()),
                Json(AttendanceSaveRequest {
                    work_date,
                    entries: vec![AttendanceEntry {
                        staff_id,
                        status,
                        check_in: Some("08:00".to_string()),
                        check_out: None,
                        notes: None,
                    }],
                }),
            )
            .await
            .unwrap();
        }

        let rows: Vec<(AttendanceStatus,)> = sqlx::query_as(
            "SELECT status FROM attendance WHERE staff_id = $1 AND work_date = $2",
        )
        .bind(staff_id)
        .bind(work_date)
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(rows.len(), 1, "upsert must not duplicate the day");
        assert_eq!(rows[0].0, AttendanceStatus::Gelmedi);

        let _ = sqlx::query("DELETE FROM attendance WHERE staff_id = $1")
            .bind(staff_id)
            .execute(&pool)
            .await;
        let _ = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(staff_id)
            .execute(&pool)
            .await;
    }

    #[tokio::test]
    async fn test_profit_loss_snapshot_persisted() {
        let pool = setup_test_db().await;
        let state = test_state(pool.clone());

        // A range far in the past keeps real data out of the computation.
        let (invoice_id,): (i32,) = sqlx::query_as(
            "INSERT INTO invoices (invoice_no, customer_name, invoice_date, quantity, unit_price, total_amount) \
             VALUES ('F-TEST0001', 'Test Müşteri', '1999-06-01', 10, 5, 50) RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let (cost_id,): (i32,) = sqlx::query_as(
            "INSERT INTO cost_entries (cost_date, category, amount) VALUES ('1999-06-02', 'Enerji', 20) RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let Json(snapshot) = compute_profit_loss(
            State(state),
            Extension(test_claims()),
            Json(ProfitLossRequest {
                start_date: date("1999-06-01"),
                end_date: date("1999-06-30"),
            }),
        )
        .await
        .unwrap();

        assert_eq!(snapshot.revenue, Decimal::from(50));
        assert_eq!(snapshot.total_cost, Decimal::from(20));
        assert_eq!(snapshot.net, Decimal::from(30));

        let persisted: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM profit_loss_snapshots WHERE id = $1")
                .bind(snapshot.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(persisted, 1);

        let _ = sqlx::query("DELETE FROM profit_loss_snapshots WHERE id = $1")
            .bind(snapshot.id)
            .execute(&pool)
            .await;
        let _ = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .execute(&pool)
            .await;
        let _ = sqlx::query("DELETE FROM cost_entries WHERE id = $1")
            .bind(cost_id)
            .execute(&pool)
            .await;
    }
}
