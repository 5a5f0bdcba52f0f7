//! # Recipe Metadata Module
//!
//! Derives the metadata block of a structured recipe: times in minutes,
//! servings, a difficulty level, keyword tags, provenance of AI-assisted
//! values and processing counters.

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::escalation::EscalationStats;
use crate::ingredient_model::{ParsedIngredient, INFO_AI_FILLED, INFO_AI_REFINED};
use crate::ingredient_parser::LineRejection;
use crate::recipe_input::{RecipeInput, SourceFormat};

pub const PREP_TIME_KEYS: &[&str] = &["prep_time_min", "prep_time", "preptime"];
pub const COOK_TIME_KEYS: &[&str] = &["cook_time_min", "cook_time", "cooktime"];
pub const TOTAL_TIME_KEYS: &[&str] = &["total_time_min", "total_time", "totaltime"];
pub const SERVINGS_KEYS: &[&str] = &["servings", "serves", "yield"];

/// More raw ingredient entries than this make a recipe hard
pub const HARD_INGREDIENT_COUNT: usize = 12;
/// More raw ingredient entries than this make a recipe medium
pub const MEDIUM_INGREDIENT_COUNT: usize = 6;

/// Tag and the keywords that trigger it in the name or description
const TAG_KEYWORDS: &[(&str, &[&str])] = &[
    ("spicy", &["spicy", "chili", "pepper", "hot"]),
    ("vegan", &["vegan"]),
    ("vegetarian", &["veg", "vegetarian", "paneer", "dal"]),
    ("indian", &["indian", "masala", "curry"]),
    ("healthy", &["healthy", "salad", "protein"]),
];

lazy_static! {
    static ref HOURS: Regex =
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:hours|hour|hrs|hr|h)\b").expect("valid hours pattern");
    static ref MINUTES: Regex = Regex::new(r"(\d+(?:\.\d+)?)\s*(?:minutes|minute|mins|min|m)\b")
        .expect("valid minutes pattern");
    static ref INTEGER: Regex = Regex::new(r"\d+").expect("valid integer pattern");
    static ref SERVINGS_MENTION: Regex =
        Regex::new(r"(\d+)\s*servings?\b").expect("valid servings pattern");
}

/// Difficulty inferred from the length of the ingredient list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn from_ingredient_count(count: usize) -> Self {
        if count > HARD_INGREDIENT_COUNT {
            Difficulty::Hard
        } else if count > MEDIUM_INGREDIENT_COUNT {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Prep, cook and total time in whole minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecipeTimes {
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub total_time_minutes: Option<u32>,
}

/// Per-recipe processing counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingStats {
    pub raw_entries: usize,
    pub accepted: usize,
    pub rejected_malformed: usize,
    pub rejected_noise: usize,
    pub rejected_instruction: usize,
    pub rejected_name: usize,
    pub escalated: usize,
    pub ai_refined: usize,
    pub ai_filled: usize,
    pub oracle_failures: usize,
    pub merged: usize,
    pub dropped_duplicates: usize,
}

impl ProcessingStats {
    pub fn record_rejection(&mut self, rejection: &LineRejection) {
        match rejection {
            LineRejection::Empty => self.rejected_malformed += 1,
            LineRejection::Noise => self.rejected_noise += 1,
            LineRejection::Instruction => self.rejected_instruction += 1,
            LineRejection::Name(_) => self.rejected_name += 1,
        }
    }

    pub fn record_escalation(&mut self, stats: &EscalationStats) {
        self.escalated += stats.escalated;
        self.ai_refined += stats.ai_refined;
        self.ai_filled += stats.ai_filled;
        self.oracle_failures += stats.oracle_failures;
    }

    pub fn rejected(&self) -> usize {
        self.rejected_malformed + self.rejected_noise + self.rejected_instruction + self.rejected_name
    }
}

/// Metadata block of a structured recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeMetadata {
    #[serde(flatten)]
    pub times: RecipeTimes,
    pub servings: u32,
    pub difficulty_level: Difficulty,
    pub tags: Vec<String>,
    pub ai_assisted: bool,
    pub source_format: SourceFormat,
    pub stats: ProcessingStats,
}

impl RecipeMetadata {
    pub fn build(
        input: &RecipeInput,
        ingredients: &[ParsedIngredient],
        stats: ProcessingStats,
        default_servings: u32,
    ) -> Self {
        let metadata = Self {
            times: normalize_times(&input.fields),
            servings: extract_servings(input, default_servings),
            difficulty_level: Difficulty::from_ingredient_count(stats.raw_entries),
            tags: infer_tags(&input.recipe_name, input.description.as_deref()),
            ai_assisted: is_ai_assisted(ingredients),
            source_format: input.source_format(),
            stats,
        };
        debug!(
            "Metadata for '{}': {} servings, {}, tags {:?}",
            input.recipe_name, metadata.servings, metadata.difficulty_level, metadata.tags
        );
        metadata
    }
}

/// Minutes in a free-form duration ("90", "1 hour", "45 mins", "1h 30m")
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::metadata::extract_minutes;
///
/// assert_eq!(extract_minutes("90"), Some(90));
/// assert_eq!(extract_minutes("1h 30m"), Some(90));
/// assert_eq!(extract_minutes("2 hrs"), Some(120));
/// assert_eq!(extract_minutes("overnight"), None);
/// ```
pub fn extract_minutes(text: &str) -> Option<u32> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse().ok();
    }

    let hours = HOURS
        .captures(&text)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    let minutes = MINUTES
        .captures(&text)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    if hours.is_none() && minutes.is_none() {
        trace!("No duration found in '{}'", text);
        return None;
    }

    let total = hours.map_or(0.0, |h| (h * 60.0).trunc()) + minutes.map_or(0.0, f64::trunc);
    Some(total as u32)
}

/// Prep, cook and total times; total is derived when both parts are known
pub fn normalize_times(fields: &Map<String, Value>) -> RecipeTimes {
    let prep = first_minutes(fields, PREP_TIME_KEYS);
    let cook = first_minutes(fields, COOK_TIME_KEYS);
    let total = first_minutes(fields, TOTAL_TIME_KEYS).or(match (prep, cook) {
        (Some(prep), Some(cook)) => prep.checked_add(cook),
        _ => None,
    });

    RecipeTimes {
        prep_time_minutes: prep,
        cook_time_minutes: cook,
        total_time_minutes: total,
    }
}

fn first_minutes(fields: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::Number(number) => number.as_f64().filter(|n| *n >= 0.0).map(|n| n as u32),
        Value::String(text) => extract_minutes(text),
        _ => None,
    })
}

/// Servings from the servings fields, then from "N servings" in the name or
/// description, then the configured default
pub fn extract_servings(input: &RecipeInput, default_servings: u32) -> u32 {
    let from_fields = SERVINGS_KEYS
        .iter()
        .find_map(|key| match input.fields.get(*key)? {
            Value::Number(number) => number.as_f64().filter(|n| *n >= 1.0).map(|n| n as u32),
            Value::String(text) => INTEGER
                .find(text)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .filter(|n| *n > 0),
            _ => None,
        });

    from_fields
        .or_else(|| {
            let text = format!(
                "{} {}",
                input.recipe_name.to_lowercase(),
                input.description.as_deref().unwrap_or("").to_lowercase()
            );
            SERVINGS_MENTION
                .captures(&text)
                .and_then(|caps| caps[1].parse::<u32>().ok())
                .filter(|n| *n > 0)
        })
        .unwrap_or(default_servings)
}

/// Keyword tags from the recipe name and description
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::metadata::infer_tags;
///
/// assert_eq!(infer_tags("Paneer Butter Masala", None), vec!["vegetarian", "indian"]);
/// assert!(infer_tags("Plain Rice", Some("Steamed rice")).is_empty());
/// ```
pub fn infer_tags(name: &str, description: Option<&str>) -> Vec<String> {
    let name = name.to_lowercase();
    let description = description.unwrap_or("").to_lowercase();

    TAG_KEYWORDS
        .iter()
        .filter(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| name.contains(keyword) || description.contains(keyword))
        })
        .map(|(tag, _)| tag.to_string())
        .collect()
}

/// Whether any ingredient carries an adopted oracle answer
pub fn is_ai_assisted(ingredients: &[ParsedIngredient]) -> bool {
    ingredients
        .iter()
        .any(|i| i.has_flag(INFO_AI_REFINED) || i.has_flag(INFO_AI_FILLED))
}
