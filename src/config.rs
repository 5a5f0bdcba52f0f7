//! # Pipeline Configuration Module
//!
//! This module defines configuration structures for recipe normalization,
//! including name sanitizing bounds, the oracle acceptance gate, instruction
//! rewriting, and the settings of the HTTP disambiguation oracle.
//!
//! Every structure has a `Default` built from the constants below and a
//! `from_env` constructor that applies environment overrides. Values that
//! fail to parse are ignored with a warning.

use log::warn;
use std::env;
use std::str::FromStr;

use crate::errors::PipelineError;

// Constants for pipeline configuration
pub const DEFAULT_FUZZY_MATCH_THRESHOLD: f64 = 85.0;
pub const DEFAULT_MAX_NAME_WORDS: usize = 4;
pub const DEFAULT_ORACLE_CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_SERVINGS: u32 = 2;

// Constants for oracle configuration
pub const DEFAULT_ORACLE_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_ORACLE_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ORACLE_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 60;

/// Configuration of the deterministic pipeline and its escalation gate
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Minimum similarity (0-100) for snapping a name onto the vocabulary
    pub fuzzy_match_threshold: f64,
    /// Longest accepted ingredient name, in words
    pub max_name_words: usize,
    /// Oracle answers are accepted only strictly above this confidence
    pub oracle_confidence_threshold: f64,
    /// Rewrite embedded measurements in instructions as words
    pub rewrite_measurements: bool,
    /// Servings reported when the recipe does not say
    pub default_servings: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fuzzy_match_threshold: DEFAULT_FUZZY_MATCH_THRESHOLD,
            max_name_words: DEFAULT_MAX_NAME_WORDS,
            oracle_confidence_threshold: DEFAULT_ORACLE_CONFIDENCE_THRESHOLD,
            rewrite_measurements: false,
            default_servings: DEFAULT_SERVINGS,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `RECIPE_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fuzzy_match_threshold: env_or("RECIPE_FUZZY_THRESHOLD", defaults.fuzzy_match_threshold),
            max_name_words: env_or("RECIPE_MAX_NAME_WORDS", defaults.max_name_words),
            oracle_confidence_threshold: env_or(
                "RECIPE_ORACLE_THRESHOLD",
                defaults.oracle_confidence_threshold,
            ),
            rewrite_measurements: env_or(
                "RECIPE_REWRITE_MEASUREMENTS",
                defaults.rewrite_measurements,
            ),
            default_servings: env_or("RECIPE_DEFAULT_SERVINGS", defaults.default_servings),
        }
    }

    /// Reject settings outside their meaningful ranges
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(0.0..=100.0).contains(&self.fuzzy_match_threshold) {
            return Err(PipelineError::Config(format!(
                "fuzzy_match_threshold must be within 0-100, got {}",
                self.fuzzy_match_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.oracle_confidence_threshold) {
            return Err(PipelineError::Config(format!(
                "oracle_confidence_threshold must be within 0-1, got {}",
                self.oracle_confidence_threshold
            )));
        }
        if self.max_name_words == 0 {
            return Err(PipelineError::Config(
                "max_name_words must be at least 1".to_string(),
            ));
        }
        if self.default_servings == 0 {
            return Err(PipelineError::Config(
                "default_servings must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Failure isolation settings for the oracle client
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryConfig {
    /// Consecutive failures before the circuit opens
    pub circuit_breaker_threshold: u32,
    /// Seconds before an open circuit lets a call through again
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

/// Configuration of the HTTP disambiguation oracle
#[derive(Debug, Clone, PartialEq)]
pub struct OracleConfig {
    /// OpenAI-compatible chat completions URL
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub recovery: RecoveryConfig,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ORACLE_ENDPOINT.to_string(),
            model: DEFAULT_ORACLE_MODEL.to_string(),
            api_key_env: DEFAULT_ORACLE_API_KEY_ENV.to_string(),
            timeout_secs: DEFAULT_ORACLE_TIMEOUT_SECS,
            recovery: RecoveryConfig::default(),
        }
    }
}

impl OracleConfig {
    /// Defaults overridden by `ORACLE_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: env::var("ORACLE_ENDPOINT").unwrap_or(defaults.endpoint),
            model: env::var("ORACLE_MODEL").unwrap_or(defaults.model),
            api_key_env: env::var("ORACLE_API_KEY_ENV").unwrap_or(defaults.api_key_env),
            timeout_secs: env_or("ORACLE_TIMEOUT_SECS", defaults.timeout_secs),
            recovery: RecoveryConfig {
                circuit_breaker_threshold: env_or(
                    "ORACLE_CIRCUIT_THRESHOLD",
                    defaults.recovery.circuit_breaker_threshold,
                ),
                circuit_breaker_reset_secs: env_or(
                    "ORACLE_CIRCUIT_RESET_SECS",
                    defaults.recovery.circuit_breaker_reset_secs,
                ),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(key: &str, raw: &str, default: T) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!("Ignoring unparsable value for {}: '{}'", key, raw);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.fuzzy_match_threshold, 85.0);
        assert_eq!(config.max_name_words, 4);
        assert_eq!(config.oracle_confidence_threshold, 0.7);
        assert!(!config.rewrite_measurements);
        assert_eq!(config.default_servings, 2);
    }

    #[test]
    fn test_validate() {
        assert!(PipelineConfig::default().validate().is_ok());

        let config = PipelineConfig {
            oracle_confidence_threshold: 1.5,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));

        let config = PipelineConfig {
            max_name_words: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oracle_defaults() {
        let config = OracleConfig::default();
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.recovery.circuit_breaker_threshold, 5);
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_parse_or_falls_back() {
        assert_eq!(parse_or("X", "12", 4usize), 12);
        assert_eq!(parse_or("X", "twelve", 4usize), 4);
        assert!(parse_or("X", " true ", false));
        assert_eq!(parse_or("X", "0.9", 0.7f64), 0.9);
    }
}
