#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use stitchlog::db::db::Db;
    use stitchlog::db::logs::MachineLogs;
    use stitchlog::db::operators::Operators;
    use stitchlog::libs::aggregator::{Dimension, GroupKey};
    use stitchlog::libs::error::ReportError;
    use stitchlog::libs::log_record::NewLogRecord;
    use stitchlog::libs::modes::ModeTaxonomy;
    use stitchlog::libs::report::{
        load_report, lookup_range, parse_query_date, round2, ProductivityReport, ReportRequest, Selector,
    };
    use stitchlog::libs::shift::ShiftConfig;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ReportContext {
        _temp_dir: TempDir,
        logs: MachineLogs,
        operators: Operators,
        shift: ShiftConfig,
        taxonomy: ModeTaxonomy,
        now: NaiveDateTime,
    }

    impl TestContext for ReportContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let conn = Db::open(temp_dir.path().join("report.db")).unwrap().into_shared();
            let logs = MachineLogs::with_connection(conn.clone());
            let operators = Operators::with_connection(conn);

            operators.insert("0012", "Amal Perera", None).unwrap();

            let mut sewing = record(1, 1, "0012", (9, 0), (10, 0), 1);
            sewing.reserve = Some("100".to_string());
            sewing.stitch_count = 640;
            logs.insert(&sewing).unwrap();
            // nobody badged in while the machine sat idle
            logs.insert(&record(1, 1, "0", (11, 0), (12, 0), 2)).unwrap();
            logs.insert(&record(2, 2, "0012", (9, 0), (11, 0), 9)).unwrap();

            ReportContext {
                _temp_dir: temp_dir,
                logs,
                operators,
                shift: ShiftConfig::default(),
                taxonomy: ModeTaxonomy::standard(),
                now: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            }
        }
    }

    impl ReportContext {
        fn report(&self, request: &ReportRequest) -> anyhow::Result<ProductivityReport> {
            load_report(&self.logs, &self.operators, request, &self.shift, &self.taxonomy, self.now)
        }
    }

    fn record(machine_id: i64, line: i64, operator: &str, start: (u32, u32), end: (u32, u32), mode: i32) -> NewLogRecord {
        let mut record = NewLogRecord::new(
            machine_id,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            mode,
        );
        record.line_number = line;
        record.operator_id = operator.to_string();
        record
    }

    #[test_context(ReportContext)]
    #[test]
    fn test_report_by_all_machines(ctx: &mut ReportContext) {
        let request = ReportRequest::new(Dimension::Machine, Selector::All);
        let report = ctx.report(&request).unwrap();

        assert_eq!(report.groups.len(), 2);
        let first = &report.groups[0];
        assert_eq!(first.group, "Machine 1");
        assert_eq!(first.metrics.total_available_hours, 10.17);
        assert_eq!(first.metrics.total_hours, 2.0);
        assert_eq!(first.metrics.total_productive_time.hours, 1.0);
        assert_eq!(first.metrics.total_non_productive_time.hours, 9.17);
        assert_eq!(first.metrics.total_non_productive_time.breakdown.get("Idle"), Some(&9.17));
        assert_eq!(first.metrics.total_stitch_count, 640);
        assert_eq!(first.metrics.average_sewing_speed, 100.0);
        assert_eq!(first.metrics.total_working_days, 1);
        assert_eq!(first.table_data.len(), 1);

        let summary = report.summary.as_ref().unwrap();
        assert_eq!(summary.total_groups, 2);
        assert_eq!(summary.metrics.total_available_hours, round2(2.0 * 36600.0 / 3600.0));
        assert_eq!(summary.metrics.total_productive_time.hours, 1.0);
    }

    #[test_context(ReportContext)]
    #[test]
    fn test_unknown_mode_in_breakdown(ctx: &mut ReportContext) {
        let request = ReportRequest::new(Dimension::Machine, Selector::Value("2".to_string()));
        let report = ctx.report(&request).unwrap();

        assert_eq!(report.groups.len(), 1);
        assert!(report.summary.is_none());
        let breakdown = &report.groups[0].metrics.total_non_productive_time.breakdown;
        assert_eq!(breakdown.get("Mode 9"), Some(&2.0));
        assert_eq!(breakdown.get("Idle"), Some(&8.17));
        assert_eq!(report.groups[0].metrics.total_productive_time.percentage, 0.0);
    }

    #[test_context(ReportContext)]
    #[test]
    fn test_report_by_line(ctx: &mut ReportContext) {
        let request = ReportRequest::new(Dimension::Line, Selector::Value("1".to_string()));
        let report = ctx.report(&request).unwrap();

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].key, GroupKey::Line(1));
        assert_eq!(report.groups[0].group, "Line 1");
    }

    #[test_context(ReportContext)]
    #[test]
    fn test_report_by_operator_name(ctx: &mut ReportContext) {
        let request = ReportRequest::new(Dimension::Operator, Selector::Value("Amal Perera".to_string()));
        let report = ctx.report(&request).unwrap();

        assert_eq!(report.groups.len(), 1);
        let group = &report.groups[0];
        assert_eq!(group.key, GroupKey::Operator("0012".to_string()));
        assert_eq!(group.group, "Amal Perera");
        assert_eq!(group.operator_name.as_deref(), Some("Amal Perera"));
        assert_eq!(group.metrics.total_hours, 3.0);
    }

    #[test_context(ReportContext)]
    #[test]
    fn test_unattended_idle_excluded_from_operators(ctx: &mut ReportContext) {
        let request = ReportRequest::new(Dimension::Operator, Selector::All);
        let report = ctx.report(&request).unwrap();

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].key, GroupKey::Operator("0012".to_string()));
        assert_eq!(report.summary.as_ref().unwrap().total_groups, 1);
    }

    #[test_context(ReportContext)]
    #[test]
    fn test_unknown_operator_gives_empty_report(ctx: &mut ReportContext) {
        let request = ReportRequest::new(Dimension::Operator, Selector::Value("Nobody".to_string()));
        let report = ctx.report(&request).unwrap();

        assert!(report.is_empty());
        assert!(report.summary.is_none());
        assert_eq!(report.taxonomy, "standard");
    }

    #[test_context(ReportContext)]
    #[test]
    fn test_report_over_everything(ctx: &mut ReportContext) {
        let request = ReportRequest::new(Dimension::All, Selector::All);
        let report = ctx.report(&request).unwrap();

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].group, "All");
        assert_eq!(report.groups[0].metrics.total_hours, 4.0);
        assert!(report.summary.is_none());
    }

    #[test_context(ReportContext)]
    #[test]
    fn test_date_range_outside_data(ctx: &mut ReportContext) {
        let from = NaiveDate::from_ymd_opt(2024, 3, 2);
        let request = ReportRequest::new(Dimension::Machine, Selector::All).between(from, from);
        let report = ctx.report(&request).unwrap();

        assert!(report.is_empty());
        assert!(report.summary.is_none());
    }

    #[test_context(ReportContext)]
    #[test]
    fn test_invalid_selector(ctx: &mut ReportContext) {
        let request = ReportRequest::new(Dimension::Line, Selector::Value("abc".to_string()));
        let err = ctx.report(&request).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::InvalidSelector { dimension: "line", .. })
        ));

        let request = ReportRequest::new(Dimension::All, Selector::Value("5".to_string()));
        assert!(matches!(request.filter(), Err(ReportError::InvalidSelector { .. })));
    }

    #[test_context(ReportContext)]
    #[test]
    fn test_report_json_shape(ctx: &mut ReportContext) {
        let request = ReportRequest::new(Dimension::Machine, Selector::All);
        let value = serde_json::to_value(ctx.report(&request).unwrap()).unwrap();

        let group = &value["groups"][0];
        assert_eq!(group["totalAvailableHours"], 10.17);
        assert_eq!(group["totalProductiveTime"]["hours"], 1.0);
        assert!(group["totalNonProductiveTime"]["breakdown"].is_object());
        assert_eq!(group["tableData"][0]["date"], "2024-03-01");
        assert_eq!(group["tableData"][0]["totalWorkingDays"], 1);
        assert_eq!(value["summary"]["totalGroups"], 2);
        assert_eq!(value["dimension"], "machine");
        assert_eq!(group["group"], "Machine 1");
        assert_eq!(group["key"], serde_json::json!({ "machine": 1 }));

        let request = ReportRequest::new(Dimension::All, Selector::All);
        let value = serde_json::to_value(ctx.report(&request).unwrap()).unwrap();
        assert_eq!(value["groups"][0]["key"], "all");
    }

    #[test]
    fn test_group_keys_stay_distinct_in_json() {
        let machine = serde_json::to_value(GroupKey::Machine(3)).unwrap();
        let line = serde_json::to_value(GroupKey::Line(3)).unwrap();
        assert_ne!(machine, line);
        assert_eq!(line, serde_json::json!({ "line": 3 }));
        assert_eq!(
            serde_json::to_value(GroupKey::Operator("0012".to_string())).unwrap(),
            serde_json::json!({ "operator": "0012" })
        );
        assert!(!serde_json::to_value(GroupKey::All).unwrap().is_null());
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(Selector::parse(None), Selector::All);
        assert_eq!(Selector::parse(Some("ALL")), Selector::All);
        assert_eq!(Selector::parse(Some(" 4 ")), Selector::Value("4".to_string()));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let request = ReportRequest::new(Dimension::Machine, Selector::All)
            .between(NaiveDate::from_ymd_opt(2024, 3, 5), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(matches!(request.filter(), Err(ReportError::InvertedRange { .. })));
    }

    #[test]
    fn test_lookup_range() {
        assert_eq!(lookup_range(None, None).unwrap(), None);
        assert!(matches!(lookup_range(Some("2024-03-01"), None), Err(ReportError::BothDatesRequired)));
        assert!(matches!(lookup_range(None, Some("2024-03-01")), Err(ReportError::BothDatesRequired)));
        assert!(matches!(
            lookup_range(Some("2024-03-05"), Some("2024-03-01")),
            Err(ReportError::InvertedRange { .. })
        ));

        let (from, to) = lookup_range(Some("2024-03-01"), Some("2024-03-01")).unwrap().unwrap();
        assert_eq!(from, to);
        assert!(matches!(
            parse_query_date("from_date", "01/03/2024"),
            Err(ReportError::InvalidDate { field: "from_date", .. })
        ));
    }
}
