//! # Text Processing Module
//!
//! This module provides the lexical layer of the recipe normalizer: cleaning
//! raw scraped text and pulling a numeric quantity and a measurement unit out
//! of an ingredient line.
//!
//! ## Features
//!
//! - Lowercasing, trimming and whitespace collapsing
//! - Unicode fraction glyph expansion (`½` → `0.5`, `1½` → `1.5`)
//! - Removal of decorative bullet and checkbox glyphs
//! - Quantity extraction with "divided" notation, additive `1+2`, mixed
//!   numbers and simple fractions
//! - Whole-word unit detection against a fixed synonym table

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

use crate::ingredient_model::{format_amount, Unit};
use crate::vocabulary::{BULLET_GLYPHS, OPTIONAL_KEYWORDS, UNICODE_FRACTIONS, UNIT_SYNONYMS};

lazy_static! {
    static ref PARENTHESIZED: Regex = Regex::new(r"\(([^)]*)\)").expect("valid paren pattern");
    static ref NUMBER: Regex = Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern");
    static ref MIXED_NUMBER: Regex =
        Regex::new(r"(\d+)\s+(\d+)\s*/\s*(\d+)").expect("valid mixed number pattern");
    static ref FRACTION: Regex = Regex::new(r"(\d+)\s*/\s*(\d+)").expect("valid fraction pattern");
    static ref GLUED_GLYPH: Regex =
        Regex::new(r"(\d+)\s*([½¼¾⅓⅔⅛])").expect("valid glued glyph pattern");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid whitespace pattern");
    static ref INFORMAL_PINCH: Regex =
        Regex::new(r"^(?:a\s+)?pinch(?:es)?\b").expect("valid pinch pattern");

    /// Unit synonym patterns in table order. A unit may follow a digit
    /// directly ("500g") but never sits inside a longer word ("cupboard").
    pub static ref UNIT_PATTERNS: Vec<(Regex, Unit)> = UNIT_SYNONYMS
        .iter()
        .filter_map(|(raw, canonical)| {
            let pattern = format!(r"(?:^|[^a-z]){}(?:$|[^a-z])", regex::escape(raw));
            let unit = Unit::from_token(canonical)?;
            Regex::new(&pattern).ok().map(|regex| (regex, unit))
        })
        .collect();
}

/// Quantity and unit pulled from one ingredient line, before normalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
}

/// Lowercase, trim, expand fraction glyphs and drop bullet glyphs
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::text_processing::normalize_text;
///
/// assert_eq!(normalize_text("▢ ½ Cup  Onions"), "0.5 cup onions");
/// assert_eq!(normalize_text("1½ cups rice"), "1.5 cups rice");
/// assert_eq!(normalize_text(""), "");
/// ```
pub fn normalize_text(raw: &str) -> String {
    let mut text = raw.to_lowercase().replace('⁄', "/");

    text = GLUED_GLYPH
        .replace_all(&text, |caps: &regex::Captures| {
            let whole: f64 = caps[1].parse().unwrap_or(0.0);
            let fraction = caps[2]
                .chars()
                .next()
                .and_then(glyph_value)
                .unwrap_or(0.0);
            format_amount(whole + fraction)
        })
        .into_owned();

    for (glyph, value) in UNICODE_FRACTIONS {
        text = text.replace(*glyph, value);
    }

    let text = strip_bullets(&text);
    let collapsed = WHITESPACE.replace_all(&text, " ");
    trace!("Normalized text: '{}' -> '{}'", raw, collapsed.trim());
    collapsed.trim().to_string()
}

fn glyph_value(glyph: char) -> Option<f64> {
    UNICODE_FRACTIONS
        .iter()
        .find(|(g, _)| *g == glyph)
        .and_then(|(_, value)| value.parse().ok())
}

/// Remove decorative bullet and checkbox glyphs anywhere in the text
pub fn strip_bullets(text: &str) -> String {
    text.chars().filter(|c| !BULLET_GLYPHS.contains(c)).collect()
}

/// Extract the primary numeric quantity from normalized text
///
/// Precedence:
/// 1. a parenthesized fragment mentioning "divided" sums its numbers
/// 2. any other parenthesized number makes the quantity unknown
/// 3. a `+` sums every number in the text
/// 4. a mixed number (`1 1/2`) or a simple fraction (`1/2`)
/// 5. the first decimal or integer literal
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::text_processing::extract_quantity;
///
/// assert_eq!(extract_quantity("oil (divided 1+2)"), Some(3.0));
/// assert_eq!(extract_quantity("500 g (1.1 lbs) chicken"), None);
/// assert_eq!(extract_quantity("1/2 cup tomato"), Some(0.5));
/// assert_eq!(extract_quantity("salt"), None);
/// ```
pub fn extract_quantity(text: &str) -> Option<f64> {
    let fragments: Vec<&str> = PARENTHESIZED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    for fragment in &fragments {
        if fragment.contains("divided") && fragment.chars().any(|c| c.is_ascii_digit()) {
            let total = sum_numbers(fragment);
            if total.is_some() {
                debug!("Divided quantity in '{}': {:?}", text, total);
                return total;
            }
        }
    }

    if fragments
        .iter()
        .any(|fragment| fragment.chars().any(|c| c.is_ascii_digit()))
    {
        debug!("Numeric aside in parentheses, quantity unknown: '{}'", text);
        return None;
    }

    if text.contains('+') {
        if let Some(total) = sum_numbers(text) {
            return Some(total);
        }
    }

    if let Some(caps) = MIXED_NUMBER.captures(text) {
        let whole: f64 = caps[1].parse().ok()?;
        return parse_fraction(&caps[2], &caps[3]).map(|fraction| whole + fraction);
    }

    if let Some(caps) = FRACTION.captures(text) {
        return parse_fraction(&caps[1], &caps[2]);
    }

    NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn sum_numbers(text: &str) -> Option<f64> {
    let numbers: Vec<f64> = NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();

    if numbers.is_empty() {
        None
    } else {
        Some(numbers.iter().sum())
    }
}

fn parse_fraction(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Find the first unit synonym present as a whole word
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::ingredient_model::Unit;
/// use recipe_normalizer::text_processing::extract_unit;
///
/// assert_eq!(extract_unit("2 tablespoons oil"), Some(Unit::Tablespoon));
/// assert_eq!(extract_unit("500g butter"), Some(Unit::Gram));
/// assert_eq!(extract_unit("2 eggs"), None);
/// ```
pub fn extract_unit(text: &str) -> Option<Unit> {
    UNIT_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, unit)| *unit)
}

/// Extract quantity and unit together; a unit without a number is dropped
pub fn extract_measurement(text: &str) -> Measurement {
    let mut quantity = extract_quantity(text);
    let mut unit = extract_unit(text);

    if quantity.is_none() && INFORMAL_PINCH.is_match(text) {
        quantity = Some(1.0);
        unit = Some(Unit::Pinch);
    }

    if quantity.is_none() {
        unit = None;
    }

    Measurement { quantity, unit }
}

/// Whether the text carries optionality phrasing
pub fn detect_optional(text: &str) -> bool {
    OPTIONAL_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Collapse runs of whitespace and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_expands_glyphs() {
        assert_eq!(normalize_text("¼ tsp Turmeric"), "0.25 tsp turmeric");
        assert_eq!(normalize_text("⅛ tsp hing"), "0.125 tsp hing");
        assert_eq!(normalize_text("2¾ cups flour"), "2.75 cups flour");
    }

    #[test]
    fn test_normalize_strips_bullets() {
        assert_eq!(normalize_text("▢  2 Potatoes "), "2 potatoes");
        assert_eq!(normalize_text("• ✓ salt"), "salt");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_divided_quantity() {
        assert_eq!(extract_quantity("tablespoons oil (divided 1+2)"), Some(3.0));
        assert_eq!(extract_quantity("butter (divided 2 + 0.5)"), Some(2.5));
    }

    #[test]
    fn test_parenthesized_conversion_is_unknown() {
        assert_eq!(extract_quantity("grams (1.1 lbs.) chicken"), None);
        assert_eq!(extract_quantity("chicken (bone-in or boneless)"), None);
    }

    #[test]
    fn test_additive_quantity() {
        assert_eq!(extract_quantity("1+2 cups water"), Some(3.0));
    }

    #[test]
    fn test_fractions() {
        assert_eq!(extract_quantity("1/2 cup sugar"), Some(0.5));
        assert_eq!(extract_quantity("3 / 4 cup sugar"), Some(0.75));
        assert_eq!(extract_quantity("1 1/2 cups rice"), Some(1.5));
        assert_eq!(extract_quantity("1/0 cup rice"), None);
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(extract_quantity("2 potatoes"), Some(2.0));
        assert_eq!(extract_quantity("0.5 kg paneer"), Some(0.5));
        assert_eq!(extract_quantity("2-3 green chillies"), Some(2.0));
    }

    #[test]
    fn test_unit_detection() {
        assert_eq!(extract_unit("1 tsp salt"), Some(Unit::Teaspoon));
        assert_eq!(extract_unit("2 cups flour"), Some(Unit::Cup));
        assert_eq!(extract_unit("1 kg tomatoes"), Some(Unit::Kilogram));
        assert_eq!(extract_unit("250 ml milk"), Some(Unit::Milliliter));
        assert_eq!(extract_unit("1 lb beef"), Some(Unit::Pound));
        assert_eq!(extract_unit("cupboard"), None);
        assert_eq!(extract_unit("garlic"), None);
    }

    #[test]
    fn test_unit_without_quantity_is_dropped() {
        let measurement = extract_measurement("cup of flour");
        assert_eq!(measurement.quantity, None);
        assert_eq!(measurement.unit, None);
    }

    #[test]
    fn test_informal_pinch() {
        let measurement = extract_measurement("a pinch salt");
        assert_eq!(measurement.quantity, Some(1.0));
        assert_eq!(measurement.unit, Some(Unit::Pinch));
    }

    #[test]
    fn test_detect_optional() {
        assert!(detect_optional("salt to taste"));
        assert!(detect_optional("cashews (optional)"));
        assert!(!detect_optional("2 cups rice"));
    }
}
