//! Configuration management for the triage tools.
//!
//! The CLI reads a single JSON file, by default `~/.triage/config.json`.
//! Every section is optional; anything left out falls back to defaults that
//! match the study's file names and scoring constants.
//!
//! # Configuration Priority
//!
//! 1. Command-line flags (applied by the CLI)
//! 2. Environment variables (TRIAGE_* prefix)
//! 3. Explicit config file values
//! 4. Default values
//!
//! # Environment Variable Mapping
//!
//! - `TRIAGE_DATA_DIR` → paths.data_dir
//! - `TRIAGE_LOG_LEVEL` → observability.log_level
//! - `TRIAGE_LOG_FORMAT` → observability.log_format

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".triage"),
        |dirs| dirs.home_dir().join(".triage"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// File Locations
// ============================================================================

/// Where every stage reads and writes its files.
///
/// Relative paths are resolved against `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory for all relative paths. `~` is expanded.
    pub data_dir: String,
    /// Raw post export
    pub raw_posts: PathBuf,
    /// Raw comment export
    pub raw_comments: PathBuf,
    /// Sanitizer output for posts
    pub sanitized_posts: PathBuf,
    /// Sanitizer output for comments
    pub sanitized_comments: PathBuf,
    /// Topical vocabulary
    pub topical_lexicon: PathBuf,
    /// Affect vocabulary
    pub affect_lexicon: PathBuf,
    /// Medication names used by the mention scan
    pub medication_names: PathBuf,
    /// Ranked snapshot written by `rank`
    pub ranked: PathBuf,
    /// Working pool consumed and rewritten by `annotate`
    pub pool: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: ".".into(),
            raw_posts: "posts.csv".into(),
            raw_comments: "comments.csv".into(),
            sanitized_posts: "sanitised_posts.csv".into(),
            sanitized_comments: "sanitised_comments.csv".into(),
            topical_lexicon: "mentalhealth_lexicon.csv".into(),
            affect_lexicon: "emotion_lexicon.csv".into(),
            medication_names: "medication_names.csv".into(),
            ranked: "ranked.csv".into(),
            pool: "pool.csv".into(),
        }
    }
}

impl PathsConfig {
    /// The data directory with `~` and environment variables expanded.
    pub fn data_dir(&self) -> PathBuf {
        let expanded = shellexpand::full(&self.data_dir)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| self.data_dir.clone());
        PathBuf::from(expanded)
    }

    /// Resolve a configured path against the data directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}

// ============================================================================
// Stage Configuration
// ============================================================================

/// Sanitizer thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Records with fewer word tokens are dropped.
    pub min_words: usize,
    /// Bodies exactly equal to one of these are platform/author removals.
    pub removed_markers: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            min_words: 3,
            removed_markers: vec!["[removed]".into(), "[deleted]".into()],
        }
    }
}

/// Relevance scoring weights.
///
/// The defaults are the study's working formula. They are not a validated
/// metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Texts with fewer tokens score 0.
    pub min_tokens: usize,
    /// Weight per topical lexicon hit
    pub topical_weight: f64,
    /// Weight per affect lexicon hit
    pub affect_weight: f64,
    /// Weight per first-person pronoun, only added once something matched
    pub pronoun_weight: f64,
    /// First-person self-reference tokens
    pub pronouns: Vec<String>,
    /// Token count at which the length bonus saturates
    pub length_saturation: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            min_tokens: 5,
            topical_weight: 2.0,
            affect_weight: 1.0,
            pronoun_weight: 1.0,
            pronouns: ["i", "me", "myself", "mine"]
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            length_saturation: 100,
        }
    }
}

/// One annotation category and the bucket file it appends to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Label shown in the operator menu
    pub name: String,
    /// Bucket file, relative to `paths.data_dir` unless absolute
    pub file: PathBuf,
}

impl CategoryConfig {
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
        }
    }
}

/// Annotation session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Ordered categories; the operator selects them by 1-based index.
    pub categories: Vec<CategoryConfig>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryConfig::new("explicit mental-health disclosure", "mh_disclosure.csv"),
                CategoryConfig::new("low mood disclosure", "low_mood_disclosure.csv"),
                CategoryConfig::new("incorrect or ambiguous", "incorrect.csv"),
            ],
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// trace, debug, info, warn, error
    pub log_level: String,
    /// "pretty" or "json"
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            log_format: "pretty".into(),
        }
    }
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration for every triage stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub sanitizer: SanitizerConfig,

    #[serde(default)]
    pub scorer: ScorerConfig,

    #[serde(default)]
    pub annotation: AnnotationConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load from an explicit path if given, else from the default location,
    /// then apply environment overrides.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("TRIAGE_DATA_DIR") {
            self.paths.data_dir = dir;
        }
        if let Ok(level) = std::env::var("TRIAGE_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("TRIAGE_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }

    /// Save configuration to the given path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create config directory {}", dir.display())
                })?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Resolved location of a category's bucket file.
    pub fn bucket_path(&self, category: &CategoryConfig) -> PathBuf {
        self.paths.resolve(&category.file)
    }
}
