//! Mode ledger: what each integer mode code on a log interval means.
//!
//! A [`ModeTaxonomy`] maps codes to a category and a label. Different device
//! populations use incompatible code spaces (code 3 is "No feeding" for the
//! standard fleet and "Rework" for the AFL fleet), so the taxonomy is always
//! passed in explicitly and never looked up from a global table.
//!
//! ## Built-in taxonomies
//!
//! | name       | 1      | 2    | 3          | 4            | 5           | 6      | 7            |
//! |------------|--------|------|------------|--------------|-------------|--------|--------------|
//! | `standard` | Sewing | Idle | No feeding | Meeting      | Maintenance |        |              |
//! | `afl`      | Sewing | Idle | Rework     | Needle break | Maintenance |        |              |
//! | `extended` | Sewing | Idle | No feeding | Meeting      | Maintenance | Rework | Needle break |
//!
//! Unknown codes never fail: they are labelled `"Mode {code}"` and classified
//! as untracked non-productive time.

use crate::libs::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The code conventionally used for productive (sewing) time.
pub const PRODUCTIVE_CODE: i32 = 1;

/// Sub-classification of non-productive time.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NonProductiveKind {
    Idle,
    Meeting,
    NoFeeding,
    Maintenance,
    Rework,
    NeedleBreak,
    Other,
    /// Assigned to codes the taxonomy does not define.
    Untracked,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModeCategory {
    Productive,
    NonProductive(NonProductiveKind),
}

impl ModeCategory {
    pub fn is_productive(&self) -> bool {
        matches!(self, ModeCategory::Productive)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModeDefinition {
    pub code: i32,
    pub label: String,
    pub category: ModeCategory,
}

impl ModeDefinition {
    pub fn new(code: i32, label: &str, category: ModeCategory) -> Self {
        Self {
            code,
            label: label.to_string(),
            category,
        }
    }
}

/// A named mapping from mode code to category and label.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModeTaxonomy {
    pub name: String,
    pub modes: Vec<ModeDefinition>,
}

impl ModeTaxonomy {
    /// Builds a taxonomy, rejecting duplicate codes and anything other than
    /// exactly one productive mode.
    pub fn new(name: &str, modes: Vec<ModeDefinition>) -> Result<Self, ConfigError> {
        let taxonomy = Self {
            name: name.to_string(),
            modes,
        };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for mode in &self.modes {
            if !seen.insert(mode.code) {
                return Err(ConfigError::DuplicateModeCode {
                    name: self.name.clone(),
                    code: mode.code,
                });
            }
        }
        let productive = self.modes.iter().filter(|m| m.category.is_productive()).count();
        if productive != 1 {
            return Err(ConfigError::ProductiveModeCount {
                name: self.name.clone(),
                found: productive,
            });
        }
        Ok(())
    }

    pub fn standard() -> Self {
        use NonProductiveKind::*;
        Self {
            name: "standard".to_string(),
            modes: vec![
                ModeDefinition::new(1, "Sewing", ModeCategory::Productive),
                ModeDefinition::new(2, "Idle", ModeCategory::NonProductive(Idle)),
                ModeDefinition::new(3, "No feeding", ModeCategory::NonProductive(NoFeeding)),
                ModeDefinition::new(4, "Meeting", ModeCategory::NonProductive(Meeting)),
                ModeDefinition::new(5, "Maintenance", ModeCategory::NonProductive(Maintenance)),
            ],
        }
    }

    pub fn afl() -> Self {
        use NonProductiveKind::*;
        Self {
            name: "afl".to_string(),
            modes: vec![
                ModeDefinition::new(1, "Sewing", ModeCategory::Productive),
                ModeDefinition::new(2, "Idle", ModeCategory::NonProductive(Idle)),
                ModeDefinition::new(3, "Rework", ModeCategory::NonProductive(Rework)),
                ModeDefinition::new(4, "Needle break", ModeCategory::NonProductive(NeedleBreak)),
                ModeDefinition::new(5, "Maintenance", ModeCategory::NonProductive(Maintenance)),
            ],
        }
    }

    pub fn extended() -> Self {
        use NonProductiveKind::*;
        let mut taxonomy = Self::standard();
        taxonomy.name = "extended".to_string();
        taxonomy.modes.push(ModeDefinition::new(6, "Rework", ModeCategory::NonProductive(Rework)));
        taxonomy
            .modes
            .push(ModeDefinition::new(7, "Needle break", ModeCategory::NonProductive(NeedleBreak)));
        taxonomy
    }

    pub fn builtins() -> Vec<Self> {
        vec![Self::standard(), Self::afl(), Self::extended()]
    }

    pub fn get(&self, code: i32) -> Option<&ModeDefinition> {
        self.modes.iter().find(|m| m.code == code)
    }

    pub fn is_known(&self, code: i32) -> bool {
        self.get(code).is_some()
    }

    pub fn category_of(&self, code: i32) -> ModeCategory {
        self.get(code)
            .map(|m| m.category)
            .unwrap_or(ModeCategory::NonProductive(NonProductiveKind::Untracked))
    }

    pub fn label_of(&self, code: i32) -> String {
        self.get(code)
            .map(|m| m.label.clone())
            .unwrap_or_else(|| format!("Mode {}", code))
    }

    pub fn productive_code(&self) -> i32 {
        self.modes
            .iter()
            .find(|m| m.category.is_productive())
            .map(|m| m.code)
            .unwrap_or(PRODUCTIVE_CODE)
    }

    /// First code classified as the given non-productive kind.
    pub fn code_of(&self, kind: NonProductiveKind) -> Option<i32> {
        self.modes
            .iter()
            .find(|m| m.category == ModeCategory::NonProductive(kind))
            .map(|m| m.code)
    }

    pub fn idle_code(&self) -> Option<i32> {
        self.code_of(NonProductiveKind::Idle)
    }

    pub fn codes(&self) -> Vec<i32> {
        self.modes.iter().map(|m| m.code).collect()
    }
}

/// The set of taxonomies a deployment can choose from.
#[derive(Clone, Debug)]
pub struct Taxonomies {
    entries: Vec<ModeTaxonomy>,
}

impl Taxonomies {
    /// Built-ins overlaid with custom taxonomies; a custom entry replaces a
    /// built-in of the same name.
    pub fn with_custom(custom: &[ModeTaxonomy]) -> Result<Self, ConfigError> {
        let mut entries = ModeTaxonomy::builtins();
        for taxonomy in custom {
            taxonomy.validate()?;
            match entries.iter_mut().find(|t| t.name == taxonomy.name) {
                Some(existing) => *existing = taxonomy.clone(),
                None => entries.push(taxonomy.clone()),
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&ModeTaxonomy> {
        self.entries.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|t| t.name.as_str()).collect()
    }
}

impl Default for Taxonomies {
    fn default() -> Self {
        Self {
            entries: ModeTaxonomy::builtins(),
        }
    }
}
