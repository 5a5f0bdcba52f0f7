//! # Deduplication / Merge Module
//!
//! Folds repeated mentions of the same canonical ingredient within one recipe
//! into a single record. Merging is a single stable pass: the first mention
//! keeps its position, later mentions are folded in or dropped.
//!
//! - "onion 100 g" + "onion 50 g" = "onion 150 g"
//! - "onion" (no unit) + "onion 50 g" = "onion 50 g" (more specific data wins)
//! - "saffron 1 g" + "saffron" (no unit) = "saffron 1 g" (second mention dropped)

use log::debug;
use std::collections::HashMap;

use crate::ingredient_model::{InfoValue, ParsedIngredient, INFO_MERGED_MENTIONS};

/// Result of merging one recipe's ingredients
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub ingredients: Vec<ParsedIngredient>,
    /// Mentions folded into an earlier record
    pub merged: usize,
    /// Mentions dropped because their unit conflicted or was missing
    pub dropped: usize,
}

/// Merge same-name ingredients in original order
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::ingredient_model::{CanonicalUnit, ParsedIngredient};
/// use recipe_normalizer::merge::merge_ingredients;
///
/// let outcome = merge_ingredients(vec![
///     ParsedIngredient::new("onion").with_quantity(Some(100.0), Some(CanonicalUnit::Grams)),
///     ParsedIngredient::new("onion").with_quantity(Some(50.0), Some(CanonicalUnit::Grams)),
/// ]);
///
/// assert_eq!(outcome.ingredients.len(), 1);
/// assert_eq!(outcome.ingredients[0].quantity, Some(150.0));
/// ```
pub fn merge_ingredients(ingredients: Vec<ParsedIngredient>) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut mentions: Vec<usize> = Vec::new();

    for ingredient in ingredients {
        let Some(&index) = positions.get(&ingredient.name) else {
            positions.insert(ingredient.name.clone(), outcome.ingredients.len());
            outcome.ingredients.push(ingredient);
            mentions.push(1);
            continue;
        };

        let existing = &mut outcome.ingredients[index];
        if existing.unit == ingredient.unit {
            existing.quantity = sum_quantities(existing.quantity, ingredient.quantity);
        } else if existing.unit.is_none() {
            existing.quantity = ingredient.quantity;
            existing.unit = ingredient.unit;
            for (key, value) in ingredient.info.iter() {
                existing.info.insert(key.clone(), value.clone());
            }
        } else {
            debug!(
                "Dropping repeated '{}' with incompatible unit {:?} (kept {:?})",
                ingredient.name, ingredient.unit, existing.unit
            );
            outcome.dropped += 1;
            continue;
        }

        existing.is_optional = existing.is_optional && ingredient.is_optional;
        for (key, value) in ingredient.info {
            existing.info.entry(key).or_insert(value);
        }

        mentions[index] += 1;
        existing.set_info(
            INFO_MERGED_MENTIONS,
            InfoValue::Text(mentions[index].to_string()),
        );
        outcome.merged += 1;
        debug!("Merged repeated mention of '{}'", existing.name);
    }

    outcome
}

/// Null-safe sum; null only when both sides are null
fn sum_quantities(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => {
            let total = a.unwrap_or(0.0) + b.unwrap_or(0.0);
            Some((total * 100.0).round() / 100.0)
        }
    }
}
