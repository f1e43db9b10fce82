use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierError;

/// Default cap on the number of distinct features taken from one document.
pub const DEFAULT_MAX_FEATURES: usize = 500;

/// Default minimum score for the Fisher decision rule, for both polarities.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Which scoring strategy a classifier uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    Bayesian,
    Fisher,
}

/// Minimum scores used by the Fisher decision rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub yes_min: f64,
    pub no_min: f64,
}

impl Thresholds {
    pub fn new(yes_min: f64, no_min: f64) -> Self {
        Self { yes_min, no_min }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_THRESHOLD)
    }
}

/// Tunable settings of a classifier.
///
/// Every field has a default, so a configuration file only needs to list
/// what it changes:
///
/// ```
/// use tagsift::{ClassifierConfig, ScorerKind};
///
/// let config: ClassifierConfig = serde_json::from_str(
///     r#"{ "scorer": "fisher", "thresholds": { "spam": { "yes_min": 0.8, "no_min": 0.5 } } }"#,
/// ).unwrap();
///
/// assert_eq!(config.scorer, ScorerKind::Fisher);
/// assert_eq!(config.max_features, 500);
/// assert_eq!(config.thresholds_for("spam").yes_min, 0.8);
/// assert_eq!(config.thresholds_for("news").yes_min, 0.6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Maximum distinct features per document; 0 means unbounded.
    pub max_features: usize,
    pub scorer: ScorerKind,
    pub default_thresholds: Thresholds,
    /// Per tag name overrides of `default_thresholds`.
    pub thresholds: BTreeMap<String, Thresholds>,
    /// Weight given to the assumed probability when smoothing.
    pub smoothing_weight: f64,
    /// Probability assumed for a feature before any observation.
    pub assumed_probability: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            scorer: ScorerKind::default(),
            default_thresholds: Thresholds::default(),
            thresholds: BTreeMap::new(),
            smoothing_weight: 1.0,
            assumed_probability: 0.5,
        }
    }
}

impl ClassifierConfig {
    /// Reads a JSON configuration file and validates it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| ClassifierError::ConfigError(format!("Failed to read {:?}: {}", path, e)))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| ClassifierError::ConfigError(format!("Failed to parse {:?}: {}", path, e)))?;
        config.validate()?;
        log::info!("Loaded classifier configuration from {:?}", path);
        Ok(config)
    }

    /// Returns the thresholds configured for `tag`, falling back to the defaults.
    pub fn thresholds_for(&self, tag: &str) -> Thresholds {
        self.thresholds
            .get(tag)
            .copied()
            .unwrap_or(self.default_thresholds)
    }

    pub fn validate(&self) -> Result<(), ClassifierError> {
        validate_thresholds("default", &self.default_thresholds)?;
        for (tag, thresholds) in &self.thresholds {
            if tag.is_empty() {
                return Err(ClassifierError::ValidationError("Threshold tag name cannot be empty".into()));
            }
            validate_thresholds(tag, thresholds)?;
        }
        if !(self.smoothing_weight.is_finite() && self.smoothing_weight > 0.0) {
            return Err(ClassifierError::ValidationError(format!(
                "Smoothing weight must be positive, got {}",
                self.smoothing_weight
            )));
        }
        if !(0.0..=1.0).contains(&self.assumed_probability) {
            return Err(ClassifierError::ValidationError(format!(
                "Assumed probability must be within [0, 1], got {}",
                self.assumed_probability
            )));
        }
        Ok(())
    }
}

fn validate_thresholds(tag: &str, thresholds: &Thresholds) -> Result<(), ClassifierError> {
    for (polarity, value) in [("yes", thresholds.yes_min), ("no", thresholds.no_min)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ClassifierError::ValidationError(format!(
                "{} threshold for '{}' must be within [0, 1], got {}",
                polarity, tag, value
            )));
        }
    }
    Ok(())
}

/// Returns the default data directory
pub fn default_data_dir() -> PathBuf {
    // 1. Check environment variable
    if let Ok(path) = env::var("TAGSIFT_HOME") {
        return PathBuf::from(path);
    }

    // 2. Use platform-specific data directory
    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("tagsift");
    }

    // 3. Fallback to user's home directory
    if let Some(home_dir) = dirs::home_dir() {
        return home_dir.join(".local").join("share").join("tagsift");
    }

    // 4. If all else fails, use system temp directory
    env::temp_dir().join("tagsift")
}

/// Returns the path of the default store file.
pub fn default_store_path() -> PathBuf {
    default_data_dir().join("store.json")
}
