#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use stitchlog::libs::aggregator::{percentages, Aggregator, Dimension, GroupKey};
    use stitchlog::libs::interval::normalize_all;
    use stitchlog::libs::log_record::{LogRecord, NewLogRecord};
    use stitchlog::libs::modes::ModeTaxonomy;
    use stitchlog::libs::shift::ShiftConfig;
    use test_context::{test_context, TestContext};

    struct AggregatorContext {
        taxonomy: ModeTaxonomy,
        shift: ShiftConfig,
        now: NaiveDateTime,
        next_id: i64,
    }

    impl TestContext for AggregatorContext {
        fn setup() -> Self {
            AggregatorContext {
                taxonomy: ModeTaxonomy::standard(),
                shift: ShiftConfig::default(),
                now: day(10).and_hms_opt(9, 0, 0).unwrap(),
                next_id: 0,
            }
        }
    }

    impl AggregatorContext {
        fn aggregator(&self) -> Aggregator<'_> {
            Aggregator::new(&self.taxonomy, &self.shift, self.now)
        }

        fn record(&mut self, machine_id: i64, d: u32, start: (u32, u32), end: (u32, u32), mode: i32) -> LogRecord {
            self.next_id += 1;
            let mut new = NewLogRecord::new(machine_id, day(d), t(start.0, start.1), t(end.0, end.1), mode);
            new.line_number = machine_id % 2;
            new.into_record(self.next_id, self.now)
        }
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test_context(AggregatorContext)]
    #[test]
    fn test_available_hours_over_three_days(ctx: &mut AggregatorContext) {
        let records = vec![
            ctx.record(1, 1, (9, 0), (10, 0), 1),
            ctx.record(1, 2, (9, 0), (10, 0), 1),
            ctx.record(1, 3, (9, 0), (10, 0), 1),
        ];
        let intervals = normalize_all(&records, &ctx.shift);
        let totals = ctx.aggregator().reduce(&intervals);

        assert!(close(totals.available_hours, 30.5));
        assert_eq!(totals.working_days, 3);
        assert!(close(totals.productive_hours, 3.0));
        assert!(close(totals.untracked_idle_hours, 27.5));
        assert!(close(totals.idle_hours, 27.5));
        assert!(close(totals.nonproductive_hours, 27.5));
        assert!(close(totals.productive_percentage, 3.0 / 30.5 * 100.0));
        assert!(close(totals.productive_percentage + totals.npt_percentage, 100.0));
    }

    #[test_context(AggregatorContext)]
    #[test]
    fn test_availability_ignores_record_count(ctx: &mut AggregatorContext) {
        let sparse = vec![ctx.record(1, 1, (9, 0), (9, 10), 1)];
        let dense = vec![
            ctx.record(1, 1, (9, 0), (10, 0), 1),
            ctx.record(1, 1, (11, 0), (12, 0), 2),
            ctx.record(1, 1, (14, 0), (15, 0), 4),
        ];
        let aggregator = ctx.aggregator();
        let a = aggregator.reduce(&normalize_all(&sparse, &ctx.shift));
        let b = aggregator.reduce(&normalize_all(&dense, &ctx.shift));
        assert_eq!(a.available_hours, b.available_hours);
    }

    #[test_context(AggregatorContext)]
    #[test]
    fn test_productive_percentage_saturates(ctx: &mut AggregatorContext) {
        // two overlapping full-shift records on one day
        let records = vec![
            ctx.record(1, 1, (8, 25), (19, 35), 1),
            ctx.record(1, 1, (8, 25), (19, 35), 1),
            ctx.record(1, 1, (9, 0), (10, 0), 2),
        ];
        let totals = ctx.aggregator().reduce(&normalize_all(&records, &ctx.shift));

        assert!(totals.productive_hours > totals.available_hours);
        assert_eq!(totals.productive_percentage, 100.0);
        assert_eq!(totals.npt_percentage, 0.0);
        assert_eq!(totals.untracked_idle_hours, 0.0);
    }

    #[test]
    fn test_percentages_guard_zero_and_bounds() {
        assert_eq!(percentages(1.0, 1.0, 0.0), (0.0, 0.0));
        assert_eq!(percentages(12.0, 3.0, 10.0), (100.0, 0.0));
        let (pt, npt) = percentages(6.0, 6.0, 10.0);
        assert_eq!(pt, 60.0);
        assert!(close(npt, 40.0));
    }

    #[test_context(AggregatorContext)]
    #[test]
    fn test_unknown_mode_counts_as_nonproductive(ctx: &mut AggregatorContext) {
        let records = vec![ctx.record(1, 1, (9, 0), (10, 0), 9), ctx.record(1, 1, (10, 0), (10, 30), 1)];
        let totals = ctx.aggregator().reduce(&normalize_all(&records, &ctx.shift));

        assert_eq!(totals.mode_hours.get(&9), Some(&1.0));
        assert!(close(totals.tracked_nonproductive_hours, 1.0));
        assert!(close(totals.logged_hours(), 1.5));
    }

    #[test_context(AggregatorContext)]
    #[test]
    fn test_speed_and_needle_runtime(ctx: &mut AggregatorContext) {
        let mut fast = ctx.record(1, 1, (9, 0), (10, 0), 1);
        fast.reserve = Some("120".to_string());
        fast.needle_runtime = 2400.0;
        fast.stitch_count = 500;
        let mut slow = ctx.record(1, 1, (11, 0), (12, 0), 1);
        slow.reserve = Some("80".to_string());
        slow.needle_runtime = 1200.0;
        slow.stitch_count = 300;
        let mut text = ctx.record(1, 1, (12, 0), (12, 30), 1);
        text.reserve = Some("n/a".to_string());
        let mut idle = ctx.record(1, 1, (15, 0), (16, 0), 2);
        idle.reserve = Some("900".to_string());
        idle.needle_runtime = 3600.0;
        idle.stitch_count = 7;

        let records = vec![fast, slow, text, idle];
        let totals = ctx.aggregator().reduce(&normalize_all(&records, &ctx.shift));

        assert_eq!(totals.sewing_speed, 100.0);
        assert!(close(totals.needle_runtime_hours, 1.0));
        assert!(close(totals.needle_runtime_percentage, 1.0 / 2.5 * 100.0));
        assert_eq!(totals.stitch_count, 807);
    }

    #[test_context(AggregatorContext)]
    #[test]
    fn test_no_productive_time_yields_zero_rates(ctx: &mut AggregatorContext) {
        let records = vec![ctx.record(1, 1, (9, 0), (10, 0), 5)];
        let totals = ctx.aggregator().reduce(&normalize_all(&records, &ctx.shift));
        assert_eq!(totals.sewing_speed, 0.0);
        assert_eq!(totals.needle_runtime_percentage, 0.0);
        assert_eq!(totals.productive_percentage, 0.0);
    }

    #[test_context(AggregatorContext)]
    #[test]
    fn test_group_by_machine_and_weighted_summary(ctx: &mut AggregatorContext) {
        let mut one = ctx.record(1, 1, (9, 0), (10, 0), 1);
        one.reserve = Some("100".to_string());
        one.needle_runtime = 3600.0;
        let mut two = ctx.record(2, 1, (9, 0), (12, 0), 1);
        two.reserve = Some("200".to_string());
        two.needle_runtime = 5400.0;

        let records = vec![one, two];
        let intervals = normalize_all(&records, &ctx.shift);
        let aggregator = ctx.aggregator();
        let groups = aggregator.group_by(&intervals, Dimension::Machine);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, GroupKey::Machine(1));
        assert_eq!(groups[1].key, GroupKey::Machine(2));
        assert_eq!(groups[1].totals.productive_hours, 3.0);

        let summary = aggregator.summarize(&groups);
        // 1h at 100 and 3h at 200, weighted by productive hours
        assert!(close(summary.sewing_speed, 175.0));
        // 100% and 50%
        assert!(close(summary.needle_runtime_percentage, (100.0 * 1.0 + 50.0 * 3.0) / 4.0));
        // availability counted per machine-day
        assert!(close(summary.available_hours, 2.0 * 36600.0 / 3600.0));
        assert!(close(summary.productive_hours, 4.0));
    }

    #[test_context(AggregatorContext)]
    #[test]
    fn test_group_with_custom_key(ctx: &mut AggregatorContext) {
        let records = vec![
            ctx.record(1, 1, (9, 0), (10, 0), 1),
            ctx.record(2, 1, (9, 0), (10, 0), 1),
            ctx.record(3, 1, (9, 0), (10, 0), 1),
        ];
        let intervals = normalize_all(&records, &ctx.shift);
        let groups = ctx.aggregator().group(&intervals, |record| GroupKey::Line(record.line_number));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, GroupKey::Line(0));
        assert_eq!(groups[1].key, GroupKey::Line(1));
        assert_eq!(groups[1].intervals.len(), 2);
    }

    #[test_context(AggregatorContext)]
    #[test]
    fn test_daily_rows(ctx: &mut AggregatorContext) {
        let records = vec![
            ctx.record(1, 1, (9, 0), (10, 0), 1),
            ctx.record(1, 2, (9, 0), (11, 0), 1),
            ctx.record(1, 2, (11, 0), (11, 30), 3),
        ];
        let intervals = normalize_all(&records, &ctx.shift);
        let daily = ctx.aggregator().daily(&intervals);

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].0, day(1));
        assert_eq!(daily[1].1.productive_hours, 2.0);
        assert_eq!(daily[1].1.working_days, 1);
        assert!(close(daily[1].1.available_hours, 36600.0 / 3600.0));
    }

    #[test_context(AggregatorContext)]
    #[test]
    fn test_today_uses_elapsed_availability(ctx: &mut AggregatorContext) {
        // now is 09:00 on day 10
        let records = vec![ctx.record(1, 10, (8, 25), (9, 0), 1)];
        let totals = ctx.aggregator().reduce(&normalize_all(&records, &ctx.shift));
        assert!(close(totals.available_hours, 35.0 / 60.0));
        assert_eq!(totals.productive_percentage, 100.0);
    }
}
