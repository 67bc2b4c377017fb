//! Run configuration.
//!
//! Everything has a default so a config file is optional; command-line flags
//! are applied on top of whatever the file provides.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do with an attendance cell that matches neither encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnrecognizedIndicator {
    /// Count the meeting as missed.
    #[default]
    Absent,
    /// Leave the meeting out of both attended and absent.
    Ignore,
}

/// Two-valued encoding of per-meeting attendance cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorPolicy {
    pub present: Vec<String>,
    pub absent: Vec<String>,
    pub unrecognized: UnrecognizedIndicator,
    /// Trim cells and ignore case when matching. Off by default, so only
    /// the exact literals count.
    pub case_insensitive: bool,
}

impl Default for IndicatorPolicy {
    fn default() -> Self {
        Self {
            present: vec!["Yes".to_string()],
            absent: vec!["No".to_string()],
            unrecognized: UnrecognizedIndicator::Absent,
            case_insensitive: false,
        }
    }
}

impl IndicatorPolicy {
    /// `Some(true)` attended, `Some(false)` absent, `None` not counted.
    pub fn classify(&self, value: Option<&str>) -> Option<bool> {
        let value = value.unwrap_or("");
        let matches = |list: &[String]| {
            list.iter().any(|v| {
                if self.case_insensitive {
                    v.trim().eq_ignore_ascii_case(value.trim())
                } else {
                    v == value
                }
            })
        };
        if !value.is_empty() && matches(&self.present) {
            Some(true)
        } else if !value.is_empty() && matches(&self.absent) {
            Some(false)
        } else {
            match self.unrecognized {
                UnrecognizedIndicator::Absent => Some(false),
                UnrecognizedIndicator::Ignore => None,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub indicators: IndicatorPolicy,
    /// Sheets whose name starts with this prefix are quarters.
    pub quarter_prefix: String,
    pub roster_sheet: String,
    pub roster_column: String,
    /// Title rows above the roster header.
    pub roster_skip_rows: usize,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorPolicy::default(),
            quarter_prefix: "Q".to_string(),
            roster_sheet: "Employee Master Sheet".to_string(),
            roster_column: "List of Teams".to_string(),
            roster_skip_rows: 3,
            output_dir: PathBuf::from("reports"),
            preview_rows: 5,
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
