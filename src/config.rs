//! jsfinger configuration
//!
//! Optional TOML file controlling extraction and matching. Every section and
//! key has a default, so an empty file (or no file) is a valid configuration.
//!
//! ```toml
//! [extract]
//! mode = "skip-declarations"
//!
//! [matching]
//! strategy = "literals-coverage"
//! top_n = 20
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::{RankOptions, DEFAULT_TOP_N};
use crate::error::{FingerprintError, Result};
use crate::signature::ExtractOptions;
use crate::similarity::Strategy;
use crate::tokenizer::{TokenMode, DEFAULT_MAX_EXPRESSION_DEPTH};

/// Log levels accepted by `[logging] level`
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DetectConfig {
    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Signature extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub mode: TokenMode,

    /// Statements and expressions nested deeper than this degrade to a fallback token
    #[serde(default = "default_max_expression_depth")]
    pub max_expression_depth: usize,
}

fn default_max_expression_depth() -> usize {
    DEFAULT_MAX_EXPRESSION_DEPTH
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            mode: TokenMode::default(),
            max_expression_depth: default_max_expression_depth(),
        }
    }
}

/// Corpus matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub strategy: Strategy,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_true")]
    pub use_candidate_filter: bool,

    #[serde(default = "default_true")]
    pub fallback_to_full_corpus: bool,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_true() -> bool {
    true
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            top_n: default_top_n(),
            use_candidate_filter: true,
            fallback_to_full_corpus: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl DetectConfig {
    /// Load configuration from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| FingerprintError::Config {
            message: format!("Failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FingerprintError::Config {
            message: format!("Failed to serialize config: {}", e),
        })
    }

    fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(FingerprintError::Config {
                message: format!(
                    "Invalid log level: {}. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        if self.matching.top_n == 0 {
            return Err(FingerprintError::Config {
                message: "matching.top_n must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            mode: self.extract.mode,
            max_expression_depth: self.extract.max_expression_depth,
        }
    }

    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            top_n: self.matching.top_n,
            use_candidate_filter: self.matching.use_candidate_filter,
            fallback_to_full_corpus: self.matching.fallback_to_full_corpus,
        }
    }
}
