#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use std::collections::HashMap;
    use stitchlog::libs::log_record::{LogRecord, NewLogRecord};
    use stitchlog::libs::modes::ModeTaxonomy;
    use stitchlog::libs::shift::ShiftConfig;
    use stitchlog::libs::stats::{describe_logs, line_efficiency, operation_metrics, within_shift};

    fn record(id: i64, machine_id: i64, line: i64, operator: &str, start: u32, mode: i32) -> LogRecord {
        let created_at: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let mut new = NewLogRecord::new(
            machine_id,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(start, 45, 0).unwrap(),
            mode,
        );
        new.line_number = line;
        new.operator_id = operator.to_string();
        new.into_record(id, created_at)
    }

    fn operators() -> HashMap<String, String> {
        HashMap::from([("0012".to_string(), "Amal Perera".to_string())])
    }

    #[test]
    fn test_line_efficiency() {
        let mut a = record(1, 1, 1, "0012", 9, 1);
        a.needle_runtime = 300.0;
        a.needle_stoptime = 100.0;
        let mut b = record(2, 2, 1, "0012", 10, 1);
        b.needle_runtime = 100.0;
        b.needle_stoptime = 300.0;
        let idle = record(3, 3, 2, "0", 9, 2);

        let lines = line_efficiency(&[a, b, idle]);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[0].machines, 2);
        assert_eq!(lines[0].needle_runtime, 400.0);
        assert_eq!(lines[0].efficiency, 50.0);
        // no needle time at all
        assert_eq!(lines[1].efficiency, 0.0);
    }

    #[test]
    fn test_operation_metrics_with_rework() {
        let taxonomy = ModeTaxonomy::afl();
        let shift = ShiftConfig::default();

        let mut sewing = record(1, 1, 1, "0012", 9, 1);
        sewing.stitch_count = 500;
        sewing.needle_runtime = 1200.0;
        let mut rework = record(2, 1, 1, "0012", 11, 3);
        rework.stitch_count = 80;
        rework.needle_runtime = 240.0;
        let mut unregistered = record(3, 1, 1, "0099", 12, 1);
        unregistered.stitch_count = 1000;
        let mut before_shift = record(4, 1, 1, "0012", 6, 1);
        before_shift.stitch_count = 70;
        let mut other_machine = record(5, 4, 1, "0012", 9, 1);
        other_machine.stitch_count = 10;

        let metrics = operation_metrics(
            &[sewing, rework, unregistered, before_shift, other_machine],
            &shift,
            &taxonomy,
            &operators(),
        );

        assert_eq!(metrics.len(), 2);
        let first = &metrics[0];
        assert_eq!(first.machine_id, 1);
        assert_eq!(first.counts.sewing_stitch_count, 500);
        assert_eq!(first.counts.sewing_needle_runtime, 1200.0);
        assert_eq!(first.counts.rework_stitch_count, 80);
        assert_eq!(first.counts.rework_needle_runtime, 240.0);
        assert_eq!(first.total_stitch_count, 580);
        assert_eq!(first.total_needle_runtime, 1440.0);
        assert_eq!(metrics[1].counts.sewing_stitch_count, 10);
    }

    #[test]
    fn test_operation_metrics_skip_records_straddling_the_shift() {
        let shift = ShiftConfig::default();
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

        // 08:00-09:00 starts before the 08:25 shift start
        let mut early = record(1, 1, 1, "0012", 8, 1);
        early.end_time = at(9, 0);
        early.stitch_count = 500;
        // 19:00-20:00 runs past the 19:35 shift end
        let mut late = record(2, 1, 1, "0012", 19, 1);
        late.end_time = at(20, 0);
        late.stitch_count = 300;
        // wholly inside the 10:30-10:40 break
        let mut on_break = record(3, 1, 1, "0012", 10, 1);
        on_break.start_time = at(10, 31);
        on_break.end_time = at(10, 39);
        on_break.stitch_count = 40;
        // overlapping a break only partly still counts
        let mut across_break = record(4, 1, 1, "0012", 10, 1);
        across_break.start_time = at(10, 20);
        across_break.end_time = at(10, 50);
        across_break.stitch_count = 7;

        assert!(!within_shift(&early, &shift));
        assert!(!within_shift(&on_break, &shift));
        assert!(within_shift(&across_break, &shift));

        let metrics = operation_metrics(
            &[early, late, on_break, across_break],
            &shift,
            &ModeTaxonomy::afl(),
            &operators(),
        );

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].counts.sewing_stitch_count, 7);
    }

    #[test]
    fn test_operation_metrics_daily_rows() {
        let mut day_one = record(1, 1, 1, "0012", 9, 1);
        day_one.stitch_count = 100;
        let mut day_two = record(2, 1, 1, "0012", 9, 3);
        day_two.date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        day_two.stitch_count = 20;
        let mut day_two_sewing = record(3, 1, 1, "0012", 11, 1);
        day_two_sewing.date = day_two.date;
        day_two_sewing.stitch_count = 60;

        let metrics = operation_metrics(
            &[day_one, day_two, day_two_sewing],
            &ShiftConfig::default(),
            &ModeTaxonomy::afl(),
            &operators(),
        );

        let days = &metrics[0].table_data;
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(days[0].counts.sewing_stitch_count, 100);
        assert_eq!(days[1].counts.sewing_stitch_count, 60);
        assert_eq!(days[1].counts.rework_stitch_count, 20);
        assert_eq!(metrics[0].total_stitch_count, 180);

        let value = serde_json::to_value(&metrics[0]).unwrap();
        assert_eq!(value["machineId"], 1);
        assert_eq!(value["sewingStitchCount"], 160);
        assert_eq!(value["tableData"][1]["date"], "2024-03-02");
        assert_eq!(value["tableData"][1]["reworkStitchCount"], 20);
    }

    #[test]
    fn test_operation_metrics_without_rework_mode() {
        let mut no_feeding = record(1, 1, 1, "0012", 9, 3);
        no_feeding.stitch_count = 80;

        let metrics = operation_metrics(&[no_feeding], &ShiftConfig::default(), &ModeTaxonomy::standard(), &operators());

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].counts.rework_stitch_count, 0);
        assert_eq!(metrics[0].counts.sewing_stitch_count, 0);
    }

    #[test]
    fn test_describe_logs() {
        let entries = describe_logs(
            vec![record(1, 1, 1, "0012", 9, 1), record(2, 1, 1, "0", 10, 9)],
            &ModeTaxonomy::standard(),
            &operators(),
        );

        assert_eq!(entries[0].mode_description, "Sewing");
        assert_eq!(entries[0].operator_name.as_deref(), Some("Amal Perera"));
        assert_eq!(entries[1].mode_description, "Mode 9");
        assert!(entries[1].operator_name.is_none());

        let value = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(value["machine_id"], 1);
        assert_eq!(value["mode_description"], "Sewing");
    }
}
