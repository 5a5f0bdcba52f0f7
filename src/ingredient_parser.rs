//! # Ingredient Parser
//!
//! This module turns one raw ingredient entry into a [`ParsedIngredient`]
//! together with the [`NormalizationContext`] the escalation step needs.
//!
//! ## Pipeline per entry
//!
//! 1. Lexical normalization (lowercase, fraction glyphs, bullets)
//! 2. Noise and instruction screening
//! 3. Quantity and unit extraction
//! 4. Name sanitizing, with notes and preparation split out
//! 5. Category inference and conversion to grams or milliliters
//!
//! ## Usage
//!
//! ```rust
//! use recipe_normalizer::ingredient_parser::parse_ingredient_list;
//!
//! let text = "2 potatoes\n1/2 cup milk\nAdd the potatoes and mix well";
//! let parsed = parse_ingredient_list(text);
//!
//! assert_eq!(parsed.len(), 2);
//! for ingredient in &parsed {
//!     println!("{}", ingredient);
//! }
//! ```

use log::{debug, trace};
use std::fmt;

use crate::classifier::{is_noise, looks_like_instruction, starts_with_cooking_verb};
use crate::config::PipelineConfig;
use crate::ingredient_model::{
    InfoValue, NormalizationContext, ParsedIngredient, INFO_CONVERSION, INFO_DEFAULT_QUANTITY,
    INFO_NOTES, INFO_PREPARATION,
};
use crate::recipe_input::IngredientEntry;
use crate::sanitizer::{NameRejection, NameSanitizer};
use crate::text_processing::{detect_optional, extract_measurement, normalize_text};
use crate::unit_normalizer::{infer_category, is_common_pantry, is_unit_exempt, normalize};

/// Why an entry did not become an ingredient
#[derive(Debug, Clone, PartialEq)]
pub enum LineRejection {
    /// Nothing left after normalization
    Empty,
    /// Social-media, advertising or note text
    Noise,
    /// A cooking instruction in the ingredient list
    Instruction,
    /// The cleaned name failed the sanitizer's rejection rule
    Name(NameRejection),
}

impl fmt::Display for LineRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineRejection::Empty => write!(f, "empty line"),
            LineRejection::Noise => write!(f, "noise line"),
            LineRejection::Instruction => write!(f, "instruction line"),
            LineRejection::Name(reason) => write!(f, "rejected name: {}", reason),
        }
    }
}

impl std::error::Error for LineRejection {}

/// An accepted ingredient and what the parser learned about it
#[derive(Debug, Clone)]
pub struct ParsedLine {
    pub ingredient: ParsedIngredient,
    pub context: NormalizationContext,
}

/// Deterministic per-entry parser
#[derive(Debug, Clone, Default)]
pub struct IngredientParser {
    sanitizer: NameSanitizer,
}

impl IngredientParser {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            sanitizer: NameSanitizer::new(config.fuzzy_match_threshold, config.max_name_words),
        }
    }

    pub fn sanitizer(&self) -> &NameSanitizer {
        &self.sanitizer
    }

    /// Parse a free-text ingredient line
    pub fn parse_line(&self, line: &str) -> Result<ParsedLine, LineRejection> {
        self.parse_entry(&IngredientEntry::Line(line.to_string()))
    }

    /// Parse one ingredient entry of either shape
    pub fn parse_entry(&self, entry: &IngredientEntry) -> Result<ParsedLine, LineRejection> {
        let raw_text = entry.combined_text();
        let normalized = normalize_text(&raw_text);
        if normalized.is_empty() {
            return Err(LineRejection::Empty);
        }

        if is_noise(&normalized) {
            debug!("Dropping noise entry: '{}'", raw_text);
            return Err(LineRejection::Noise);
        }

        let name_is_instruction = entry.name().is_some_and(|name| {
            let name = normalize_text(name);
            is_noise(&name) || starts_with_cooking_verb(&name)
        });
        if name_is_instruction || looks_like_instruction(&normalized) {
            debug!("Dropping instruction in ingredient list: '{}'", raw_text);
            return Err(LineRejection::Instruction);
        }

        let measurement = entry
            .quantity_text()
            .map(|quantity| extract_measurement(&normalize_text(&quantity)))
            .filter(|m| m.quantity.is_some())
            .unwrap_or_else(|| extract_measurement(&normalized));

        let sanitized = self.sanitizer.sanitize(&normalized).map_err(|reason| {
            debug!("Rejected ingredient candidate '{}': {}", raw_text, reason);
            LineRejection::Name(reason)
        })?;

        let name = sanitized.name;
        let category = infer_category(&name);
        let normalized_quantity = normalize(measurement.quantity, measurement.unit, &name);

        let mut ingredient = ParsedIngredient::new(&name)
            .with_quantity(normalized_quantity.quantity, normalized_quantity.unit)
            .optional(detect_optional(&normalized))
            .with_info(INFO_CONVERSION, InfoValue::Text(normalized_quantity.note));

        if !sanitized.notes.is_empty() {
            ingredient.set_info(INFO_NOTES, InfoValue::Text(sanitized.notes.join("; ")));
        }
        if !sanitized.preparation.is_empty() {
            ingredient.set_info(INFO_PREPARATION, InfoValue::List(sanitized.preparation));
        }
        if normalized_quantity.defaulted {
            ingredient.set_flag(INFO_DEFAULT_QUANTITY);
        }

        let context = NormalizationContext {
            raw_text,
            category,
            is_common_pantry: is_common_pantry(&name),
            is_exempt: is_unit_exempt(&name),
            quantity_defaulted: normalized_quantity.defaulted,
        };

        trace!("Parsed ingredient: {} ({:?})", ingredient, context.category);

        Ok(ParsedLine {
            ingredient,
            context,
        })
    }
}

/// Parse newline-separated ingredient text with default settings,
/// keeping only accepted ingredients in their original order
pub fn parse_ingredient_list(text: &str) -> Vec<ParsedIngredient> {
    let parser = IngredientParser::default();
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parser.parse_line(line).ok())
        .map(|parsed| parsed.ingredient)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient_model::{CanonicalUnit, Category};

    fn parse(line: &str) -> Result<ParsedLine, LineRejection> {
        IngredientParser::default().parse_line(line)
    }

    #[test]
    fn test_parse_simple_ingredient() {
        let parsed = parse("2 cups milk").unwrap();
        assert_eq!(parsed.ingredient.name, "milk");
        assert_eq!(parsed.ingredient.quantity, Some(480.0));
        assert_eq!(parsed.ingredient.unit, Some(CanonicalUnit::Milliliters));
        assert_eq!(parsed.context.category, Category::Liquid);
    }

    #[test]
    fn test_parse_fraction_ingredient() {
        let parsed = parse("1/2 cup tomato").unwrap();
        assert_eq!(parsed.ingredient.name, "tomato");
        assert_eq!(parsed.ingredient.quantity, Some(120.0));
        assert_eq!(parsed.ingredient.unit, Some(CanonicalUnit::Grams));
        assert_eq!(
            parsed.ingredient.info_text(INFO_CONVERSION),
            Some("0.5 cup → 120 g (approx)")
        );
    }

    #[test]
    fn test_parse_divided_quantity() {
        let parsed = parse("tbsp oil (divided 1+2)").unwrap();
        assert_eq!(parsed.ingredient.name, "oil");
        assert_eq!(parsed.ingredient.quantity, Some(45.0));
        assert_eq!(parsed.ingredient.unit, Some(CanonicalUnit::Milliliters));
    }

    #[test]
    fn test_parse_unit_less_count() {
        let parsed = parse("▢ 2 Potatoes").unwrap();
        assert_eq!(parsed.ingredient.name, "potato");
        assert_eq!(parsed.ingredient.quantity, Some(300.0));
        assert!(!parsed.context.quantity_defaulted);
    }

    #[test]
    fn test_parse_optional_and_notes() {
        let parsed = parse("cashews (optional)").unwrap();
        assert_eq!(parsed.ingredient.name, "cashew");
        assert!(parsed.ingredient.is_optional);
        assert!(parsed.context.quantity_defaulted);
        assert!(parsed.ingredient.has_flag(INFO_DEFAULT_QUANTITY));

        let parsed = parse("a pinch of salt").unwrap();
        assert_eq!(parsed.ingredient.name, "salt");
        assert_eq!(parsed.ingredient.quantity, Some(0.5));
        assert_eq!(parsed.ingredient.info_text(INFO_NOTES), Some("a pinch"));
        assert!(parsed.context.is_common_pantry);
    }

    #[test]
    fn test_parse_exempt_ingredient() {
        let parsed = parse("few strands saffron").unwrap();
        assert_eq!(parsed.ingredient.name, "saffron");
        assert_eq!(parsed.ingredient.quantity, None);
        assert_eq!(parsed.ingredient.unit, None);
        assert!(parsed.context.is_exempt);
    }

    #[test]
    fn test_structured_entry() {
        let entry = IngredientEntry::Structured {
            name: "Onions, finely chopped".to_string(),
            quantity: Some("2".to_string()),
            unit: None,
        };
        let parsed = IngredientParser::default().parse_entry(&entry).unwrap();
        assert_eq!(parsed.ingredient.name, "onion");
        assert_eq!(parsed.ingredient.quantity, Some(200.0));
        assert_eq!(
            parsed.ingredient.info.get(INFO_PREPARATION),
            Some(&InfoValue::List(vec!["finely chopped".to_string()]))
        );

        let entry = IngredientEntry::Structured {
            name: "Add salt and stir".to_string(),
            quantity: Some("1 tsp".to_string()),
            unit: None,
        };
        assert_eq!(
            IngredientParser::default().parse_entry(&entry).unwrap_err(),
            LineRejection::Instruction
        );
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            parse("Add the potatoes and mix well").unwrap_err(),
            LineRejection::Instruction
        );
        assert_eq!(parse("Follow us on Pinterest").unwrap_err(), LineRejection::Noise);
        assert_eq!(parse("  ▢ ").unwrap_err(), LineRejection::Empty);
        assert!(matches!(
            parse("1 tsp add salt").unwrap_err(),
            LineRejection::Name(NameRejection::InstructionVerb(_))
        ));
    }

    #[test]
    fn test_parse_ingredient_list() {
        let parsed = parse_ingredient_list("2 potatoes\n\n1 tsp salt\nStir well until combined");
        let names: Vec<&str> = parsed.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["potato", "salt"]);
    }
}
