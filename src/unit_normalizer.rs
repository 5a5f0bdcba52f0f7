//! # Category & Unit Normalizer Module
//!
//! Converts an extracted quantity into the canonical unit of its category:
//! grams for solids, milliliters for liquids.
//!
//! ## Conversion Rules
//!
//! - Units of the category's own table convert exactly (1 cup = 240 ml)
//! - Units of the other table convert approximately (1 ml ≈ 1 g) and the
//!   note is marked `(approx)`
//! - Unit-less counts of known solids use an average single-item weight
//!   (2 potatoes ≈ 300 g)
//! - A missing quantity gets a default of 1 in the canonical unit, except
//!   for "to taste" ingredients such as saffron which keep no quantity
//!
//! Every call returns a note; results are rounded to two decimals.

use log::trace;

use crate::ingredient_model::{format_amount, CanonicalUnit, Category, Unit};
use crate::vocabulary::{AVERAGE_WEIGHTS, COMMON_PANTRY, LIQUID_KEYWORDS, UNIT_EXEMPT};

pub const DEFAULT_QUANTITY: f64 = 1.0;
pub const NOTE_TO_TASTE: &str = "Adjusted to taste / standard requirement";
pub const NOTE_AS_PER_RECIPE: &str = "Quantity as per recipe requirement / instructions";

/// Outcome of normalizing one quantity
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedQuantity {
    pub quantity: Option<f64>,
    pub unit: Option<CanonicalUnit>,
    /// Human-readable conversion trace
    pub note: String,
    /// The quantity was invented by the default fallback
    pub defaulted: bool,
}

/// Liquid iff the name contains a liquid keyword
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::ingredient_model::Category;
/// use recipe_normalizer::unit_normalizer::infer_category;
///
/// assert_eq!(infer_category("coconut milk"), Category::Liquid);
/// assert_eq!(infer_category("tomato"), Category::Solid);
/// ```
pub fn infer_category(name: &str) -> Category {
    let name = name.to_lowercase();
    if LIQUID_KEYWORDS.iter().any(|keyword| name.contains(keyword)) {
        Category::Liquid
    } else {
        Category::Solid
    }
}

/// Whether the name mentions a common pantry staple
pub fn is_common_pantry(name: &str) -> bool {
    let name = name.to_lowercase();
    COMMON_PANTRY.iter().any(|item| name.contains(item))
}

/// Whether a missing quantity is legitimate ("to taste") for this name
pub fn is_unit_exempt(name: &str) -> bool {
    let name = name.to_lowercase();
    UNIT_EXEMPT.iter().any(|item| name.contains(item))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Normalize a quantity and unit for the named ingredient
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::ingredient_model::{CanonicalUnit, Unit};
/// use recipe_normalizer::unit_normalizer::normalize;
///
/// let milk = normalize(Some(1.5), Some(Unit::Cup), "milk");
/// assert_eq!(milk.quantity, Some(360.0));
/// assert_eq!(milk.unit, Some(CanonicalUnit::Milliliters));
///
/// let potatoes = normalize(Some(2.0), None, "potato");
/// assert_eq!(potatoes.quantity, Some(300.0));
/// assert_eq!(potatoes.unit, Some(CanonicalUnit::Grams));
///
/// let saffron = normalize(None, None, "saffron");
/// assert_eq!(saffron.quantity, None);
/// assert_eq!(saffron.unit, None);
/// ```
pub fn normalize(quantity: Option<f64>, unit: Option<Unit>, name: &str) -> NormalizedQuantity {
    let name = name.trim().to_lowercase();
    let category = infer_category(&name);
    let target = category.canonical_unit();

    if let Some(quantity) = quantity {
        if let Some(unit) = unit {
            let converted = round2(quantity * unit.base_factor());
            let same_table = match category {
                Category::Solid => unit.is_weight(),
                Category::Liquid => unit.is_volume(),
            };
            let mut note = format!(
                "{} {} → {} {}",
                format_amount(quantity),
                unit,
                format_amount(converted),
                target
            );
            if !same_table {
                note.push_str(" (approx)");
            }
            trace!("Converted '{}': {}", name, note);
            return NormalizedQuantity {
                quantity: Some(converted),
                unit: Some(target),
                note,
                defaulted: false,
            };
        }

        if category == Category::Solid {
            if let Some(average) = AVERAGE_WEIGHTS.get(name.as_str()) {
                let grams = round2(quantity * average);
                return NormalizedQuantity {
                    quantity: Some(grams),
                    unit: Some(CanonicalUnit::Grams),
                    note: format!(
                        "{} x {} (~{}g) → {} g",
                        format_amount(quantity),
                        name,
                        format_amount(*average),
                        format_amount(grams)
                    ),
                    defaulted: false,
                };
            }
        }
    }

    fallback(quantity.map(round2), &name, target)
}

fn fallback(quantity: Option<f64>, name: &str, target: CanonicalUnit) -> NormalizedQuantity {
    if is_unit_exempt(name) {
        let note = if is_common_pantry(name) {
            NOTE_TO_TASTE
        } else {
            NOTE_AS_PER_RECIPE
        };
        return NormalizedQuantity {
            quantity,
            unit: quantity.map(|_| target),
            note: note.to_string(),
            defaulted: false,
        };
    }

    let defaulted = quantity.is_none();
    let quantity = quantity.unwrap_or(DEFAULT_QUANTITY);
    NormalizedQuantity {
        quantity: Some(quantity),
        unit: Some(target),
        note: format!(
            "Default quantity assigned: {} {}",
            format_amount(quantity),
            target
        ),
        defaulted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_weight_conversion() {
        let result = normalize(Some(0.5), Some(Unit::Kilogram), "paneer");
        assert_eq!(result.quantity, Some(500.0));
        assert_eq!(result.unit, Some(CanonicalUnit::Grams));
        assert_eq!(result.note, "0.5 kg → 500 g");
    }

    #[test]
    fn test_cross_category_is_approximate() {
        let result = normalize(Some(0.5), Some(Unit::Cup), "tomato");
        assert_eq!(result.quantity, Some(120.0));
        assert_eq!(result.unit, Some(CanonicalUnit::Grams));
        assert!(result.note.ends_with("(approx)"));

        let result = normalize(Some(100.0), Some(Unit::Gram), "curd");
        assert_eq!(result.unit, Some(CanonicalUnit::Milliliters));
        assert!(result.note.ends_with("(approx)"));
    }

    #[test]
    fn test_average_weights() {
        let result = normalize(Some(3.0), None, "onion");
        assert_eq!(result.quantity, Some(300.0));
        assert_eq!(result.note, "3 x onion (~100g) → 300 g");

        let result = normalize(Some(4.0), None, "clove");
        assert_eq!(result.quantity, Some(0.4));
    }

    #[test]
    fn test_default_quantity() {
        let result = normalize(None, None, "salt");
        assert_eq!(result.quantity, Some(1.0));
        assert_eq!(result.unit, Some(CanonicalUnit::Grams));
        assert!(result.defaulted);
        assert_eq!(result.note, "Default quantity assigned: 1 g");

        let result = normalize(None, None, "water");
        assert_eq!(result.unit, Some(CanonicalUnit::Milliliters));
    }

    #[test]
    fn test_unit_less_unknown_item_keeps_count() {
        let result = normalize(Some(2.0), None, "bay leaf");
        assert_eq!(result.quantity, Some(2.0));
        assert_eq!(result.unit, Some(CanonicalUnit::Grams));
        assert!(!result.defaulted);
    }

    #[test]
    fn test_exempt_ingredients() {
        let result = normalize(None, None, "saffron");
        assert_eq!(result.quantity, None);
        assert_eq!(result.unit, None);
        assert_eq!(result.note, NOTE_TO_TASTE);
        assert!(!result.defaulted);

        let result = normalize(Some(1.0), None, "hing");
        assert_eq!(result.quantity, Some(1.0));
        assert_eq!(result.unit, Some(CanonicalUnit::Grams));
    }

    #[test]
    fn test_idempotent_on_canonical_units() {
        for (name, quantity, unit) in [
            ("onion", 150.0, CanonicalUnit::Grams),
            ("milk", 360.0, CanonicalUnit::Milliliters),
            ("tomato", 120.0, CanonicalUnit::Grams),
        ] {
            let first = normalize(Some(quantity), Some(unit.as_unit()), name);
            let second = normalize(first.quantity, first.unit.map(|u| u.as_unit()), name);
            assert_eq!(first.quantity, Some(quantity));
            assert_eq!(first.unit, Some(unit));
            assert_eq!(second.quantity, first.quantity);
            assert_eq!(second.unit, first.unit);
        }
    }

    #[test]
    fn test_rounding() {
        let result = normalize(Some(1.0 / 3.0), Some(Unit::Cup), "milk");
        assert_eq!(result.quantity, Some(80.0));
        let result = normalize(Some(0.33), Some(Unit::Tablespoon), "vinegar");
        assert_eq!(result.quantity, Some(4.95));
    }
}
