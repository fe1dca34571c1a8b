#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use std::collections::HashMap;
    use stitchlog::libs::aggregator::{Aggregator, Dimension};
    use stitchlog::libs::export::{ExportFormat, Exporter};
    use stitchlog::libs::log_record::NewLogRecord;
    use stitchlog::libs::modes::ModeTaxonomy;
    use stitchlog::libs::report::{build_report, ProductivityReport, ReportRequest, Selector};
    use stitchlog::libs::shift::ShiftConfig;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ExportTestContext {
        temp_dir: TempDir,
        report: ProductivityReport,
    }

    impl TestContext for ExportTestContext {
        fn setup() -> Self {
            let taxonomy = ModeTaxonomy::standard();
            let shift = ShiftConfig::default();
            let now: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(9, 0, 0).unwrap();

            let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
            let records: Vec<_> = [(1, 1, 9, 10, 1), (1, 2, 9, 11, 1), (2, 1, 13, 14, 4)]
                .iter()
                .enumerate()
                .map(|(index, (machine, d, start, end, mode))| {
                    let date = NaiveDate::from_ymd_opt(2024, 3, *d).unwrap();
                    NewLogRecord::new(*machine, date, t(*start), t(*end), *mode).into_record(index as i64 + 1, now)
                })
                .collect();

            let aggregator = Aggregator::new(&taxonomy, &shift, now);
            let request = ReportRequest::new(Dimension::Machine, Selector::All);
            let report = build_report(&records, &request, &HashMap::new(), &aggregator, now);

            ExportTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
                report,
            }
        }
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_csv(ctx: &mut ExportTestContext) {
        let output_path = ctx.temp_dir.path().join("report.csv");
        let exporter = Exporter::new(ExportFormat::Csv, Some(output_path.clone()));
        exporter.export(&ctx.report).unwrap();

        assert!(output_path.exists());
        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.starts_with("SUMMARY"));
        assert!(content.contains("DAILY"));
        assert!(content.contains("Machine 2"));
        assert!(content.contains("All 2 groups"));
        assert!(content.contains("2024-03-02"));
        assert!(content.contains("Meeting: 1.00"));
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_json(ctx: &mut ExportTestContext) {
        let output_path = ctx.temp_dir.path().join("report.json");
        let exporter = Exporter::new(ExportFormat::Json, Some(output_path.clone()));
        exporter.export(&ctx.report).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["groups"].as_array().unwrap().len(), 2);
        assert_eq!(value["groups"][0]["tableData"].as_array().unwrap().len(), 2);
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_excel(ctx: &mut ExportTestContext) {
        let output_path = ctx.temp_dir.path().join("report.xlsx");
        let exporter = Exporter::new(ExportFormat::Excel, Some(output_path.clone()));
        exporter.export(&ctx.report).unwrap();

        assert!(output_path.exists());
        let metadata = std::fs::metadata(&output_path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_default_output_path() {
        let exporter = Exporter::new(ExportFormat::Excel, None);
        let name = exporter.output_path().to_string_lossy().to_string();
        assert!(name.starts_with("stitchlog_report_"));
        assert!(name.ends_with(".xlsx"));
    }
}
