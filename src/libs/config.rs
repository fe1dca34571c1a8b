//! Configuration for stitchlog.
//!
//! Settings live in `config.json` inside the data directory (see
//! [`DataStorage`]). A missing file is not an error: every section falls back
//! to its default, so a fresh install reports against the standard shift and
//! the `standard` mode taxonomy.
//!
//! ```json
//! {
//!   "shift": {
//!     "start": "08:25:00",
//!     "end": "19:35:00",
//!     "breaks": [{ "start": "10:30:00", "end": "10:40:00" }]
//!   },
//!   "taxonomy": "afl",
//!   "taxonomies": [],
//!   "ingest": { "str_log_offset": 1000, "record_duplicates": true }
//! }
//! ```
//!
//! `stitchlog init` edits the file through an interactive wizard.

use super::data_storage::DataStorage;
use crate::libs::error::ReportError;
use crate::libs::log_record::parse_log_time;
use crate::libs::messages::Message;
use crate::libs::modes::{ModeTaxonomy, Taxonomies};
use crate::libs::shift::{ShiftConfig, TimeWindow};
use crate::msg_print;
use anyhow::Result;
use chrono::NaiveTime;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_TAXONOMY: &str = "standard";

/// A section of the configuration offered by the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Ingestion gate settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// Marker added to `Str_LOGID` by devices retransmitting an event.
    pub str_log_offset: i64,
    /// Keep the payload of every absorbed duplicate in `duplicate_logs`.
    pub record_duplicates: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            str_log_offset: 1000,
            record_duplicates: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub shift: ShiftConfig,

    /// Taxonomy used when a command does not name one.
    pub taxonomy: String,

    /// Custom taxonomies; an entry named like a built-in replaces it.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub taxonomies: Vec<ModeTaxonomy>,

    pub ingest: IngestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shift: ShiftConfig::default(),
            taxonomy: DEFAULT_TAXONOMY.to_string(),
            taxonomies: Vec::new(),
            ingest: IngestConfig::default(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        DataStorage::new().get_path(CONFIG_FILE_NAME)
    }

    /// Loads the configuration, or the defaults when no file exists yet.
    pub fn read() -> Result<Config> {
        Self::read_from(&Self::path()?)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the configuration file. Returns false if there was none.
    pub fn delete() -> Result<bool> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    /// Rejects an unusable shift, broken taxonomies or an unknown default.
    pub fn validate(&self) -> Result<()> {
        self.shift.validate()?;
        let taxonomies = Taxonomies::with_custom(&self.taxonomies)?;
        if taxonomies.get(&self.taxonomy).is_none() {
            return Err(ReportError::UnknownTaxonomy(self.taxonomy.clone()).into());
        }
        Ok(())
    }

    pub fn available_taxonomies(&self) -> Result<Taxonomies> {
        Ok(Taxonomies::with_custom(&self.taxonomies)?)
    }

    /// The taxonomy named by `name`, or the configured default.
    pub fn taxonomy(&self, name: Option<&str>) -> Result<ModeTaxonomy> {
        let name = name.unwrap_or(&self.taxonomy);
        self.available_taxonomies()?
            .get(name)
            .cloned()
            .ok_or_else(|| ReportError::UnknownTaxonomy(name.to_string()).into())
    }

    /// Interactive setup, starting from the current file.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "shift".to_string(),
                name: Message::ConfigModuleShift.to_string(),
            },
            ConfigModule {
                key: "taxonomy".to_string(),
                name: Message::ConfigModuleTaxonomy.to_string(),
            },
            ConfigModule {
                key: "ingest".to_string(),
                name: Message::ConfigModuleIngest.to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "shift" => {
                    msg_print!(Message::ConfigModuleShift);
                    config.shift = Self::init_shift(&config.shift)?;
                }
                "taxonomy" => {
                    msg_print!(Message::ConfigModuleTaxonomy);
                    let taxonomies = config.available_taxonomies()?;
                    let names = taxonomies.names();
                    let current = names.iter().position(|n| *n == config.taxonomy).unwrap_or(0);
                    let choice = Select::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptDefaultTaxonomy.to_string())
                        .items(&names)
                        .default(current)
                        .interact()?;
                    config.taxonomy = names[choice].to_string();
                }
                "ingest" => {
                    msg_print!(Message::ConfigModuleIngest);
                    config.ingest = IngestConfig {
                        str_log_offset: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptStrLogOffset.to_string())
                            .default(config.ingest.str_log_offset)
                            .interact_text()?,
                        record_duplicates: Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptRecordDuplicates.to_string())
                            .default(config.ingest.record_duplicates)
                            .interact()?,
                    };
                }
                _ => {}
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn init_shift(current: &ShiftConfig) -> Result<ShiftConfig> {
        let start = prompt_time(Message::PromptShiftStart, current.start)?;
        let end = prompt_time(Message::PromptShiftEnd, current.end)?;

        let count: usize = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptBreakCount.to_string())
            .default(current.breaks.len())
            .interact_text()?;

        let mut breaks = Vec::with_capacity(count);
        for index in 0..count {
            let default = current.breaks.get(index).copied().unwrap_or(TimeWindow::new(start, start));
            let brk_start = prompt_time(Message::PromptBreakStart(index + 1), default.start)?;
            let brk_end = prompt_time(Message::PromptBreakEnd(index + 1), default.end)?;
            breaks.push(TimeWindow::new(brk_start, brk_end));
        }

        let shift = ShiftConfig { start, end, breaks };
        shift.validate()?;
        Ok(shift)
    }
}

fn prompt_time(prompt: Message, default: NaiveTime) -> Result<NaiveTime> {
    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt.to_string())
        .default(default.format("%H:%M:%S").to_string())
        .validate_with(|value: &String| -> std::result::Result<(), String> {
            parse_log_time(value)
                .map(|_| ())
                .ok_or_else(|| Message::InvalidTimeInput(value.clone()).to_string())
        })
        .interact_text()?;
    Ok(parse_log_time(&input).unwrap_or(default))
}
