//! Configuration file (.robotr.conf) parsing and handling
//!
//! The .robotr.conf file uses INI format with a [DEFAULT] section. Every key
//! is optional; a missing file means the defaults.

use crate::error::{Error, Result};
use crate::trend::DEFAULT_LABEL_FORMAT;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the configuration file in the repository base directory
pub const CONFIG_FILE: &str = ".robotr.conf";

/// Configuration loaded from .robotr.conf
#[derive(Debug, Clone, PartialEq)]
pub struct RobotrConfig {
    /// Directory scanned for report files, relative to the base directory
    pub output_path: PathBuf,

    /// Comma-separated glob mask selecting report files
    pub output_file_mask: String,

    /// Format of build labels in trends
    pub x_axis_label_format: String,

    /// Number of builds shown in trends, 0 for all
    pub builds_to_show: usize,

    /// Report percentages for critical tests only
    pub only_critical: bool,

    /// Count skipped tests in pass percentages
    pub count_skipped_tests: bool,
}

impl Default for RobotrConfig {
    fn default() -> Self {
        RobotrConfig {
            output_path: PathBuf::from("."),
            output_file_mask: "output.xml".to_string(),
            x_axis_label_format: DEFAULT_LABEL_FORMAT.to_string(),
            builds_to_show: 0,
            only_critical: false,
            count_skipped_tests: false,
        }
    }
}

impl RobotrConfig {
    /// Load `.robotr.conf` from `base`, or the defaults if there is none.
    pub fn load(base: &Path) -> Result<Self> {
        let path = base.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }

    /// Load configuration from a .robotr.conf file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read .robotr.conf: {}", e)))?;

        Self::parse(&contents)
    }

    /// Parse configuration from a string
    pub fn parse(contents: &str) -> Result<Self> {
        let ini: HashMap<String, HashMap<String, String>> = serde_ini::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse .robotr.conf: {}", e)))?;

        let mut config = RobotrConfig::default();
        let Some(section) = ini.get("DEFAULT") else {
            return Ok(config);
        };

        if let Some(path) = section.get("output_path") {
            config.output_path = PathBuf::from(path.trim());
        }
        if let Some(mask) = section.get("output_file_mask") {
            if mask.split(',').all(|p| p.trim().is_empty()) {
                return Err(Error::Config("output_file_mask cannot be empty".to_string()));
            }
            config.output_file_mask = mask.trim().to_string();
        }
        if let Some(format) = section.get("x_axis_label_format") {
            config.x_axis_label_format = format.clone();
        }
        if let Some(value) = section.get("builds_to_show") {
            config.builds_to_show = parse_value("builds_to_show", value)?;
        }
        if let Some(value) = section.get("only_critical") {
            config.only_critical = parse_flag("only_critical", value)?;
        }
        if let Some(value) = section.get("count_skipped_tests") {
            config.count_skipped_tests = parse_flag("count_skipped_tests", value)?;
        }

        Ok(config)
    }

    /// Directory the report mask is applied to
    pub fn report_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.output_path)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("Invalid value for {}: {}", key, value))),
    }
}
