//! # Ingredient and Quantity Data Model
//!
//! This module defines the records that flow through the normalization
//! pipeline: the measurement units recognized in raw text, the canonical
//! units every accepted ingredient ends up in, and the per-ingredient
//! transient state used while normalizing and escalating.
//!
//! ## Core Concepts
//!
//! - **ParsedIngredient**: one normalized ingredient mention (name, canonical
//!   quantity/unit, optionality flag, free-form info)
//! - **Unit**: a measurement unit found in raw text (cups, tablespoons, grams, ...)
//! - **CanonicalUnit**: the normalized target unit, grams or milliliters
//! - **NormalizationContext**: what the parser learned about one ingredient
//! - **EscalationCase**: an uncertain ingredient queued for the oracle
//!
//! ## Usage
//!
//! ```rust
//! use recipe_normalizer::ingredient_model::{CanonicalUnit, InfoValue, ParsedIngredient};
//!
//! let onion = ParsedIngredient::new("onion")
//!     .with_quantity(Some(150.0), Some(CanonicalUnit::Grams))
//!     .with_info("preparation", InfoValue::List(vec!["chopped".to_string()]));
//!
//! assert_eq!(onion.to_string(), "150 g onion");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const INFO_NOTES: &str = "notes";
pub const INFO_PREPARATION: &str = "preparation";
pub const INFO_CONVERSION: &str = "conversion_note";
pub const INFO_AI_REFINED: &str = "ai_refined";
pub const INFO_AI_FILLED: &str = "ai_filled";
pub const INFO_AI_CONFIDENCE: &str = "ai_confidence";
pub const INFO_ORIGINAL_NAME: &str = "original_name";
pub const INFO_DEFAULT_QUANTITY: &str = "default_quantity_assigned";
pub const INFO_MERGED_MENTIONS: &str = "merged_mentions";

/// Measurement units recognized in raw ingredient text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    // Volume units
    /// Teaspoons
    Teaspoon,
    /// Tablespoons
    Tablespoon,
    /// Cups
    Cup,
    /// Milliliters
    Milliliter,
    /// Liters
    Liter,

    // Weight units
    /// Grams
    Gram,
    /// Kilograms
    Kilogram,
    /// Pounds
    Pound,
    /// Ounces
    Ounce,
    /// Pinches (very small amounts, weighed)
    Pinch,
}

impl Unit {
    /// Resolve a canonical abbreviation or a common spelling into a unit
    pub fn from_token(token: &str) -> Option<Unit> {
        match token.trim().trim_end_matches('.').to_lowercase().as_str() {
            "tsp" | "teaspoon" | "teaspoons" => Some(Unit::Teaspoon),
            "tbsp" | "tbs" | "tablespoon" | "tablespoons" => Some(Unit::Tablespoon),
            "cup" | "cups" => Some(Unit::Cup),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Some(Unit::Milliliter)
            }
            "l" | "liter" | "liters" | "litre" | "litres" => Some(Unit::Liter),
            "g" | "gm" | "gms" | "gram" | "grams" => Some(Unit::Gram),
            "kg" | "kilogram" | "kilograms" => Some(Unit::Kilogram),
            "lb" | "lbs" | "pound" | "pounds" => Some(Unit::Pound),
            "oz" | "ounce" | "ounces" => Some(Unit::Ounce),
            "pinch" | "pinches" => Some(Unit::Pinch),
            _ => None,
        }
    }

    /// Canonical abbreviation of the unit
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Unit::Teaspoon => "tsp",
            Unit::Tablespoon => "tbsp",
            Unit::Cup => "cup",
            Unit::Milliliter => "ml",
            Unit::Liter => "l",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Pound => "lb",
            Unit::Ounce => "oz",
            Unit::Pinch => "pinch",
        }
    }

    /// Check if this is a volume unit
    pub fn is_volume(&self) -> bool {
        matches!(
            self,
            Unit::Teaspoon | Unit::Tablespoon | Unit::Cup | Unit::Milliliter | Unit::Liter
        )
    }

    /// Check if this is a weight unit
    pub fn is_weight(&self) -> bool {
        !self.is_volume()
    }

    /// Multiplier into the base unit of the unit's own table:
    /// milliliters for volume units, grams for weight units.
    pub fn base_factor(&self) -> f64 {
        match self {
            Unit::Teaspoon => 5.0,
            Unit::Tablespoon => 15.0,
            Unit::Cup => 240.0,
            Unit::Milliliter => 1.0,
            Unit::Liter => 1000.0,
            Unit::Gram => 1.0,
            Unit::Kilogram => 1000.0,
            Unit::Pound => 453.6,
            Unit::Ounce => 28.35,
            Unit::Pinch => 0.5,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Canonical unit after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalUnit {
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "ml")]
    Milliliters,
}

impl CanonicalUnit {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            CanonicalUnit::Grams => "g",
            CanonicalUnit::Milliliters => "ml",
        }
    }

    /// The same unit seen as an input measurement unit
    pub fn as_unit(&self) -> Unit {
        match self {
            CanonicalUnit::Grams => Unit::Gram,
            CanonicalUnit::Milliliters => Unit::Milliliter,
        }
    }
}

impl fmt::Display for CanonicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Physical category inferred from the ingredient name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Liquid,
    Solid,
}

impl Category {
    /// Grams for solids, milliliters for liquids
    pub fn canonical_unit(&self) -> CanonicalUnit {
        match self {
            Category::Liquid => CanonicalUnit::Milliliters,
            Category::Solid => CanonicalUnit::Grams,
        }
    }
}

/// Value stored in the open `info` mapping of an ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

/// One normalized ingredient mention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    /// Canonical lowercase noun phrase (e.g., "onion", "garam masala")
    pub name: String,

    /// Quantity in the canonical unit
    pub quantity: Option<f64>,

    /// Canonical unit; null only together with a null quantity
    pub unit: Option<CanonicalUnit>,

    /// Whether the source text marked the ingredient as optional
    pub is_optional: bool,

    /// Preparation notes, conversion trace and provenance flags
    #[serde(default)]
    pub info: BTreeMap<String, InfoValue>,
}

impl ParsedIngredient {
    /// Create a new ingredient with just a name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            quantity: None,
            unit: None,
            is_optional: false,
            info: BTreeMap::new(),
        }
    }

    /// Set quantity and unit together
    pub fn with_quantity(mut self, quantity: Option<f64>, unit: Option<CanonicalUnit>) -> Self {
        self.quantity = quantity;
        self.unit = unit;
        self
    }

    /// Mark this ingredient as optional
    pub fn optional(mut self, is_optional: bool) -> Self {
        self.is_optional = is_optional;
        self
    }

    /// Add an info entry
    pub fn with_info(mut self, key: &str, value: InfoValue) -> Self {
        self.info.insert(key.to_string(), value);
        self
    }

    pub fn set_info(&mut self, key: &str, value: InfoValue) {
        self.info.insert(key.to_string(), value);
    }

    pub fn set_flag(&mut self, key: &str) {
        self.info.insert(key.to_string(), InfoValue::Flag(true));
    }

    /// Check whether a provenance flag is set
    pub fn has_flag(&self, key: &str) -> bool {
        matches!(self.info.get(key), Some(InfoValue::Flag(true)))
    }

    pub fn info_text(&self, key: &str) -> Option<&str> {
        match self.info.get(key) {
            Some(InfoValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Quantity and unit are both present
    pub fn has_quantity(&self) -> bool {
        self.quantity.is_some() && self.unit.is_some()
    }
}

impl fmt::Display for ParsedIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.quantity, self.unit) {
            (Some(quantity), Some(unit)) => {
                write!(f, "{} {} {}", format_amount(quantity), unit, self.name)?
            }
            (Some(quantity), None) => write!(f, "{} {}", format_amount(quantity), self.name)?,
            _ => write!(f, "{}", self.name)?,
        }

        if self.is_optional {
            write!(f, " (optional)")?;
        }

        Ok(())
    }
}

/// Format a quantity without a trailing ".0" for whole numbers
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

/// Transient state for one ingredient during a single parse call
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationContext {
    /// The raw line the ingredient came from
    pub raw_text: String,
    pub category: Category,
    /// Name matched the common-pantry set
    pub is_common_pantry: bool,
    /// Name matched the "to taste" exemption set
    pub is_exempt: bool,
    /// The quantity was invented by the default-quantity fallback
    pub quantity_defaulted: bool,
}

/// Why an ingredient was routed to the disambiguation oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintyReason {
    AmbiguousName,
    MissingQuantity,
}

impl fmt::Display for UncertaintyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UncertaintyReason::AmbiguousName => write!(f, "ambiguous_name"),
            UncertaintyReason::MissingQuantity => write!(f, "missing_quantity"),
        }
    }
}

/// An uncertain ingredient waiting for the oracle
#[derive(Debug, Clone)]
pub struct EscalationCase {
    pub ingredient: ParsedIngredient,
    pub context: NormalizationContext,
    pub reasons: Vec<UncertaintyReason>,
}

impl EscalationCase {
    pub fn has_reason(&self, reason: UncertaintyReason) -> bool {
        self.reasons.contains(&reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_creation() {
        let ingredient = ParsedIngredient::new("flour")
            .with_quantity(Some(240.0), Some(CanonicalUnit::Grams))
            .with_info("notes", InfoValue::Text("all-purpose".to_string()))
            .optional(true);

        assert_eq!(ingredient.name, "flour");
        assert!(ingredient.has_quantity());
        assert!(ingredient.is_optional);
        assert_eq!(ingredient.info_text("notes"), Some("all-purpose"));
    }

    #[test]
    fn test_unit_properties() {
        assert!(Unit::Cup.is_volume());
        assert!(!Unit::Cup.is_weight());

        assert!(Unit::Pound.is_weight());
        assert!(!Unit::Pound.is_volume());

        assert!(Unit::Pinch.is_weight());
        assert_eq!(Unit::Tablespoon.base_factor(), 15.0);
    }

    #[test]
    fn test_unit_from_token() {
        assert_eq!(Unit::from_token("cups"), Some(Unit::Cup));
        assert_eq!(Unit::from_token("Tbsp."), Some(Unit::Tablespoon));
        assert_eq!(Unit::from_token("g"), Some(Unit::Gram));
        assert_eq!(Unit::from_token("handful"), None);
    }

    #[test]
    fn test_canonical_unit_serialization() {
        let json = serde_json::to_string(&CanonicalUnit::Milliliters).unwrap();
        assert_eq!(json, "\"ml\"");
        assert_eq!(Category::Solid.canonical_unit(), CanonicalUnit::Grams);
    }

    #[test]
    fn test_info_value_serialization() {
        let ingredient = ParsedIngredient::new("masala")
            .with_info(INFO_AI_REFINED, InfoValue::Flag(true))
            .with_info(INFO_PREPARATION, InfoValue::List(vec!["roasted".to_string()]));

        let value = serde_json::to_value(&ingredient).unwrap();
        assert_eq!(value["info"]["ai_refined"], serde_json::json!(true));
        assert_eq!(value["info"]["preparation"], serde_json::json!(["roasted"]));
        assert!(ingredient.has_flag(INFO_AI_REFINED));
    }

    #[test]
    fn test_display_formatting() {
        let ingredient = ParsedIngredient::new("milk")
            .with_quantity(Some(120.5), Some(CanonicalUnit::Milliliters))
            .optional(true);

        assert_eq!(format!("{}", ingredient), "120.5 ml milk (optional)");
        assert_eq!(format!("{}", ParsedIngredient::new("saffron")), "saffron");
    }
}
