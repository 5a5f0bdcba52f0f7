//! # Error Types Module
//!
//! This module defines the error types of the recipe normalizer. Almost every
//! failure inside the pipeline is recovered locally; only a recipe that is
//! not a mapping at all surfaces as a [`PipelineError`]. Oracle failures are
//! reported as [`OracleError`] and always treated as "no usable answer" by
//! the escalation layer.

/// Errors returned to the caller of the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The recipe record is not a JSON object
    InputShape(String),
    /// Invalid configuration
    Config(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::InputShape(msg) => write!(f, "Input shape error: {msg}"),
            PipelineError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Failures of the disambiguation oracle capability
#[derive(Debug)]
pub enum OracleError {
    /// No oracle is configured, or its credentials are missing
    Unavailable(String),
    /// Network or timeout failure
    Transport(reqwest::Error),
    /// Non-success HTTP status
    Status { code: u16, body: String },
    /// Unparsable response, or one without a confidence score
    MalformedResponse(String),
    /// Too many recent failures; the call was not attempted
    CircuitOpen,
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleError::Unavailable(msg) => write!(f, "Oracle unavailable: {msg}"),
            OracleError::Transport(err) => write!(f, "Oracle transport error: {err}"),
            OracleError::Status { code, body } => {
                write!(f, "Oracle returned status {code}: {body}")
            }
            OracleError::MalformedResponse(msg) => write!(f, "Malformed oracle response: {msg}"),
            OracleError::CircuitOpen => {
                write!(f, "Oracle circuit breaker is open, call skipped")
            }
        }
    }
}

impl std::error::Error for OracleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OracleError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Transport(err)
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(err: serde_json::Error) -> Self {
        OracleError::MalformedResponse(err.to_string())
    }
}
