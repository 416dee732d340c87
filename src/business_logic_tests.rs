#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::commands::attendance::{summarize_attendance, AttendanceExportRow};
    use crate::commands::invoice::invoice_total_matches;
    use crate::db::{AttendanceStatus, PlantingStatus, StockCategory};
    use crate::stock::InsufficientStock;

    /// Statuses travel as their Turkish labels in both JSON and the database.
    #[test]
    fn test_status_labels_round_trip() {
        assert_eq!(
            serde_json::to_value(StockCategory::Gubre).unwrap(),
            json!("Gübre")
        );
        assert_eq!(
            serde_json::from_value::<StockCategory>(json!("Gübre")).unwrap(),
            StockCategory::Gubre
        );
        assert_eq!(
            serde_json::to_value(AttendanceStatus::Izinli).unwrap(),
            json!("İzinli")
        );
        assert_eq!(
            serde_json::from_value::<PlantingStatus>(json!("Hasat Edildi")).unwrap(),
            PlantingStatus::HasatEdildi
        );
        assert_eq!(PlantingStatus::BuyumeDoneminde.as_str(), "Büyüme Döneminde");
    }

    #[test]
    fn test_active_planting_statuses() {
        assert!(PlantingStatus::EkimYapildi.is_active());
        assert!(PlantingStatus::BuyumeDoneminde.is_active());
        assert!(PlantingStatus::Ciceklenme.is_active());
        assert!(!PlantingStatus::HasatEdildi.is_active());
    }

    /// The rejection message names the category and the shortfall.
    #[test]
    fn test_insufficient_stock_message() {
        let failure =
            InsufficientStock::new(StockCategory::Gubre, Decimal::from(40), Decimal::from(30));
        assert_eq!(failure.requested, Decimal::from(40));
        assert_eq!(failure.best_available, Decimal::from(30));
        assert!(failure.message.contains("Gübre"));
        assert!(failure.message.contains("40"));
        assert!(failure.message.contains("10 eksik"));
    }

    #[test]
    fn test_invoice_total_rule() {
        assert!(invoice_total_matches(
            Decimal::from(10),
            Decimal::new(2550, 2), // 25.50
            Decimal::new(25500, 2) // 255.00
        ));
        assert!(!invoice_total_matches(
            Decimal::from(10),
            Decimal::from(25),
            Decimal::from(200)
        ));
    }

    fn export_row(date: &str, name: &str, status: AttendanceStatus) -> AttendanceExportRow {
        AttendanceExportRow {
            work_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            staff_name: name.to_string(),
            status,
            check_in: None,
            check_out: None,
            notes: None,
        }
    }

    /// Sheet-two counts: one row per staff member, statuses tallied over the
    /// exported range, first-seen order preserved.
    #[test]
    fn test_attendance_summary_counts() {
        let rows = vec![
            export_row("2024-03-01", "Ayşe Demir", AttendanceStatus::Geldi),
            export_row("2024-03-01", "Mehmet Kaya", AttendanceStatus::Izinli),
            export_row("2024-03-02", "Ayşe Demir", AttendanceStatus::Geldi),
            export_row("2024-03-02", "Mehmet Kaya", AttendanceStatus::Gelmedi),
            export_row("2024-03-03", "Ayşe Demir", AttendanceStatus::Rapor),
        ];

        let summary = summarize_attendance(&rows);
        assert_eq!(summary.len(), 2);

        assert_eq!(summary[0].staff_name, "Ayşe Demir");
        assert_eq!(summary[0].came, 2);
        assert_eq!(summary[0].on_report, 1);
        assert_eq!(summary[0].total, 3);

        assert_eq!(summary[1].staff_name, "Mehmet Kaya");
        assert_eq!(summary[1].on_leave, 1);
        assert_eq!(summary[1].absent, 1);
        assert_eq!(summary[1].total, 2);
    }

    #[test]
    fn test_attendance_summary_empty() {
        assert!(summarize_attendance(&[]).is_empty());
    }
}
