//! # Disambiguation Oracle Module
//!
//! The oracle is an external capability consulted only for uncertain
//! ingredients: it suggests a specific name for a generic one ("masala" in a
//! chicken curry) or a quantity for an ingredient listed without one.
//!
//! - [`DisambiguationOracle`]: the capability interface
//! - [`NullOracle`]: always answers with zero confidence, so the
//!   deterministic pipeline runs and tests without any live dependency
//! - [`HttpOracle`]: an OpenAI-compatible chat completions client with a
//!   bounded timeout and a circuit breaker
//!
//! Any error, or an answer without a confidence score, means "no usable
//! answer" to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::OracleConfig;
use crate::errors::OracleError;

/// Suggested specific name for an ambiguous term
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub suggestion: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

/// Suggested quantity for an ingredient listed without one
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityFill {
    pub quantity: Option<f64>,
    /// Unit token such as "tsp", "g" or "cup"
    pub unit: Option<String>,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

/// External disambiguation capability
pub trait DisambiguationOracle {
    /// Suggest a specific ingredient for a generic term
    fn resolve(&self, term: &str, context: &str) -> Result<Resolution, OracleError>;

    /// Suggest a quantity and unit for an ingredient
    fn fill(&self, term: &str, context: &str) -> Result<QuantityFill, OracleError>;
}

impl<T: DisambiguationOracle + ?Sized> DisambiguationOracle for Box<T> {
    fn resolve(&self, term: &str, context: &str) -> Result<Resolution, OracleError> {
        (**self).resolve(term, context)
    }

    fn fill(&self, term: &str, context: &str) -> Result<QuantityFill, OracleError> {
        (**self).fill(term, context)
    }
}

/// Oracle that never knows anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOracle;

impl DisambiguationOracle for NullOracle {
    fn resolve(&self, term: &str, _context: &str) -> Result<Resolution, OracleError> {
        Ok(Resolution {
            suggestion: term.to_string(),
            confidence: 0.0,
        })
    }

    fn fill(&self, _term: &str, _context: &str) -> Result<QuantityFill, OracleError> {
        Ok(QuantityFill {
            quantity: None,
            unit: None,
            confidence: 0.0,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatCompletionChoice>,
}

const SYSTEM_PROMPT: &str =
    "You normalize recipe ingredients. Answer with a single JSON object and nothing else.";

/// Chat-completions oracle over blocking HTTP
#[derive(Debug)]
pub struct HttpOracle {
    config: OracleConfig,
    client: reqwest::blocking::Client,
    api_key: String,
    breaker: CircuitBreaker,
}

impl HttpOracle {
    /// Build a client; the API key is read from the configured variable
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let api_key = env::var(&config.api_key_env).map_err(|_| {
            OracleError::Unavailable(format!(
                "API key not found in environment: {}",
                config.api_key_env
            ))
        })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            breaker: CircuitBreaker::new(config.recovery.clone()),
            config,
            client,
            api_key,
        })
    }

    fn complete(&self, prompt: String) -> Result<String, OracleError> {
        if !self.breaker.try_acquire() {
            return Err(OracleError::CircuitOpen);
        }

        match self.send(prompt) {
            Ok(content) => {
                self.breaker.record_success();
                Ok(content)
            }
            Err(e) => {
                self.breaker.record_failure();
                warn!(
                    error = %e,
                    breaker = ?self.breaker.state(),
                    "Oracle call failed"
                );
                Err(e)
            }
        }
    }

    fn send(&self, prompt: String) -> Result<String, OracleError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
            temperature: Some(0.0),
        };

        debug!(endpoint = %self.config.endpoint, model = %self.config.model, "Calling oracle");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(OracleError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json()?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| OracleError::MalformedResponse("no choices returned".to_string()))
    }
}

impl DisambiguationOracle for HttpOracle {
    fn resolve(&self, term: &str, context: &str) -> Result<Resolution, OracleError> {
        let prompt = format!(
            "Context: {context}\n\
             The ingredient listed is simply \"{term}\".\n\
             Based on the context, what specific ingredient is most likely intended?\n\
             Return ONLY JSON: {{\"suggestion\": \"specific noun\", \"confidence\": 0.0-1.0}}"
        );
        parse_resolution(&self.complete(prompt)?)
    }

    fn fill(&self, term: &str, context: &str) -> Result<QuantityFill, OracleError> {
        let prompt = format!(
            "Context: {context}\n\
             The ingredient \"{term}\" is listed without a usable quantity.\n\
             Estimate the quantity for this recipe using one of the units \
             tsp, tbsp, cup, g, kg, ml, l, pinch, or no unit for a count.\n\
             Return ONLY JSON: {{\"quantity\": number, \"unit\": \"unit or null\", \"confidence\": 0.0-1.0}}"
        );
        parse_fill(&self.complete(prompt)?)
    }
}

/// Remove a surrounding Markdown code fence, if any
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::oracle::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
/// ```
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_object(content: &str) -> Result<serde_json::Map<String, Value>, OracleError> {
    match serde_json::from_str::<Value>(strip_code_fences(content))? {
        Value::Object(map) => Ok(map),
        other => Err(OracleError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn confidence(map: &serde_json::Map<String, Value>) -> Result<f64, OracleError> {
    let value = map
        .get("confidence")
        .or_else(|| map.get("confidence_score"))
        .and_then(number)
        .ok_or_else(|| OracleError::MalformedResponse("missing confidence".to_string()))?;

    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(OracleError::MalformedResponse(format!(
            "confidence out of range: {}",
            value
        )))
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a `{suggestion, confidence}` answer
pub fn parse_resolution(content: &str) -> Result<Resolution, OracleError> {
    let map = parse_object(content)?;
    let confidence = confidence(&map)?;
    let suggestion = map
        .get("suggestion")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| OracleError::MalformedResponse("missing suggestion".to_string()))?;

    Ok(Resolution {
        suggestion,
        confidence,
    })
}

/// Parse a `{quantity, unit, confidence}` answer
pub fn parse_fill(content: &str) -> Result<QuantityFill, OracleError> {
    let map = parse_object(content)?;
    let confidence = confidence(&map)?;

    Ok(QuantityFill {
        quantity: map.get("quantity").and_then(number),
        unit: map
            .get("unit")
            .and_then(Value::as_str)
            .map(|u| u.trim().to_lowercase())
            .filter(|u| !u.is_empty() && u != "null"),
        confidence,
    })
}
