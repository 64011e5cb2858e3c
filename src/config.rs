//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::color::{parse_hex, GenderPalette};
use crate::data::gender::Gender;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PUBMED_LENS_CONFIG";
/// Config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "pubmed-lens.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Reading config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Global configuration for the dashboard
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub filters: FiltersConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub topic_path: PathBuf,
    pub baseline_path: PathBuf,
    /// Human-readable name of the baseline topic.
    pub baseline_label: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            topic_path: PathBuf::from("data/cleaned_female_data.csv"),
            baseline_path: PathBuf::from("data/cleaned_neutral_data.csv"),
            baseline_label: "Cardiac Arrest".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    /// Topics offered in the selector; the first is selected at start.
    pub topics: Vec<String>,
    pub default_country: String,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            topics: [
                "Endometriosis",
                "Dysmenorrhea",
                "Polycystic Ovary Syndrome",
                "Postpartum Hemorrhage",
            ]
            .map(String::from)
            .to_vec(),
            default_country: "United States".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub preview_rows: usize,
    pub colors: ColorsConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            colors: ColorsConfig::default(),
        }
    }
}

/// Hex colors per gender category.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub female: String,
    pub male: String,
    pub andy: String,
    pub unknown: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            female: "#f5918b".to_string(),
            male: "#0068c9".to_string(),
            andy: "#d2ccc5".to_string(),
            unknown: "#f4f1ee".to_string(),
        }
    }
}

impl ColorsConfig {
    fn hex(&self, gender: Gender) -> &str {
        match gender {
            Gender::Female => &self.female,
            Gender::Male => &self.male,
            Gender::Andy => &self.andy,
            Gender::Unknown => &self.unknown,
        }
    }

    /// Parse every entry into a palette.
    pub fn palette(&self) -> Result<GenderPalette, ConfigError> {
        let mut colors = Vec::with_capacity(Gender::ALL.len());
        for gender in Gender::ALL {
            let hex = self.hex(gender);
            let color = parse_hex(hex).ok_or_else(|| ConfigError::InvalidValue {
                field: format!("display.colors.{gender}"),
                reason: format!("{hex:?} is not a #rrggbb color"),
            })?;
            colors.push((gender, color));
        }
        Ok(GenderPalette::new(colors))
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. `$PUBMED_LENS_CONFIG`
    /// 2. `./pubmed-lens.toml` (current directory)
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load and validate configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filters.topics.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "filters.topics".to_string(),
                reason: "at least one topic is required".to_string(),
            });
        }
        if self.display.preview_rows == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display.preview_rows".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        self.display.colors.palette()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn defaults_match_bundled_data() {
        let config = Config::default();
        assert_eq!(
            config.data.topic_path,
            PathBuf::from("data/cleaned_female_data.csv")
        );
        assert_eq!(config.filters.topics[0], "Endometriosis");
        assert_eq!(config.filters.topics.len(), 4);
        assert_eq!(config.filters.default_country, "United States");
        assert_eq!(config.display.preview_rows, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r##"
            [data]
            baseline_label = "Stroke"

            [display.colors]
            male = "#112233"
            "##,
        )
        .unwrap();
        assert_eq!(config.data.baseline_label, "Stroke");
        assert_eq!(
            config.data.baseline_path,
            PathBuf::from("data/cleaned_neutral_data.csv")
        );
        assert_eq!(config.display.colors.male, "#112233");
        assert_eq!(config.display.colors.female, "#f5918b");
    }

    #[test]
    fn empty_topic_list_is_rejected() {
        let config = Config::from_toml("[filters]\ntopics = []\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "filters.topics"
        ));
    }

    #[test]
    fn bad_color_is_rejected() {
        let config = Config::from_toml("[display.colors]\nandy = \"grey\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "display.colors.andy"
        ));
    }

    #[test]
    fn from_file_reads_and_validates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[display]\npreview_rows = 10").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.display.preview_rows, 10);

        let mut bad = NamedTempFile::new().unwrap();
        writeln!(bad, "[display]\npreview_rows = 0").unwrap();
        assert!(Config::from_file(bad.path()).is_err());
    }

    #[test]
    fn unparsable_file_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[data\n").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
