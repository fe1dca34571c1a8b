#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use std::fs;
    use std::path::PathBuf;
    use stitchlog::libs::config::{Config, CONFIG_FILE_NAME, DEFAULT_TAXONOMY};
    use stitchlog::libs::data_storage::DataStorage;
    use stitchlog::libs::error::{ConfigError, ReportError};
    use stitchlog::libs::modes::{ModeCategory, ModeDefinition, ModeTaxonomy, NonProductiveKind};
    use stitchlog::libs::shift::ShiftConfig;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        _temp_dir: TempDir,
        config_path: PathBuf,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let config_path = DataStorage::at(temp_dir.path().join("nested"))
                .get_path(CONFIG_FILE_NAME)
                .unwrap();
            ConfigTestContext {
                _temp_dir: temp_dir,
                config_path,
            }
        }
    }

    fn press_taxonomy() -> ModeTaxonomy {
        ModeTaxonomy::new(
            "press",
            vec![
                ModeDefinition::new(10, "Pressing", ModeCategory::Productive),
                ModeDefinition::new(11, "Waiting", ModeCategory::NonProductive(NonProductiveKind::Idle)),
            ],
        )
        .unwrap()
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_gives_defaults(ctx: &mut ConfigTestContext) {
        assert!(ctx.config_path.parent().unwrap().exists());
        let config = Config::read_from(&ctx.config_path).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.taxonomy, DEFAULT_TAXONOMY);
        assert_eq!(config.ingest.str_log_offset, 1000);
        assert!(config.ingest.record_duplicates);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_back(ctx: &mut ConfigTestContext) {
        let mut config = Config::default();
        config.shift = ShiftConfig::legacy();
        config.taxonomies.push(press_taxonomy());
        config.taxonomy = "press".to_string();
        config.ingest.record_duplicates = false;

        config.save_to(&ctx.config_path).unwrap();
        let loaded = Config::read_from(&ctx.config_path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.taxonomy(None).unwrap().productive_code(), 10);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_file_fills_defaults(ctx: &mut ConfigTestContext) {
        fs::write(&ctx.config_path, r#"{ "taxonomy": "afl" }"#).unwrap();
        let config = Config::read_from(&ctx.config_path).unwrap();

        assert_eq!(config.taxonomy, "afl");
        assert_eq!(config.shift, ShiftConfig::default());
        assert_eq!(config.ingest.str_log_offset, 1000);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_unknown_default_taxonomy_rejected(ctx: &mut ConfigTestContext) {
        fs::write(&ctx.config_path, r#"{ "taxonomy": "knitting" }"#).unwrap();
        let err = Config::read_from(&ctx.config_path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ReportError>(),
            Some(&ReportError::UnknownTaxonomy("knitting".to_string()))
        );
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_invalid_shift_not_saved(ctx: &mut ConfigTestContext) {
        let mut config = Config::default();
        config.shift.end = NaiveTime::from_hms_opt(7, 0, 0).unwrap();

        let err = config.save_to(&ctx.config_path).unwrap_err();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::InvertedShift { .. })));
        assert!(!ctx.config_path.exists());
    }

    #[test]
    fn test_taxonomy_lookup() {
        let config = Config::default();
        assert_eq!(config.taxonomy(None).unwrap().name, "standard");
        assert_eq!(config.taxonomy(Some("AFL")).unwrap().name, "afl");
        assert!(config.taxonomy(Some("press")).is_err());
        assert_eq!(config.available_taxonomies().unwrap().names(), vec!["standard", "afl", "extended"]);
    }

    #[test]
    fn test_custom_taxonomy_replaces_builtin() {
        let mut custom = press_taxonomy();
        custom.name = "standard".to_string();
        let mut config = Config::default();
        config.taxonomies.push(custom);

        let standard = config.taxonomy(None).unwrap();
        assert_eq!(standard.label_of(10), "Pressing");
        assert_eq!(standard.label_of(1), "Mode 1");
        assert_eq!(config.available_taxonomies().unwrap().names().len(), 3);
    }

    #[test]
    fn test_broken_custom_taxonomy_rejected() {
        let mut config = Config::default();
        config.taxonomies.push(ModeTaxonomy {
            name: "broken".to_string(),
            modes: vec![ModeDefinition::new(2, "Idle", ModeCategory::NonProductive(NonProductiveKind::Idle))],
        });
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ProductiveModeCount { found: 0, .. })
        ));
    }
}
