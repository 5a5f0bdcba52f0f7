//! # Hybrid Escalation Module
//!
//! After deterministic normalization, an ingredient is uncertain when its
//! name is a generic term ("masala", "spices", "mix") or its quantity is
//! missing, non-positive, or was invented by the default fallback. Only
//! uncertain ingredients are sent to the [`DisambiguationOracle`], at most
//! once per question, and an answer is adopted only when its confidence is
//! strictly above the configured threshold.
//!
//! An adopted answer is re-normalized into grams or milliliters and the
//! name is re-validated; a record that fails validation goes back to its
//! deterministic values. Oracle errors never drop data: the ingredient is
//! kept exactly as the deterministic pipeline produced it.

use tracing::{debug, info, warn};

use crate::ingredient_model::{
    EscalationCase, InfoValue, ParsedIngredient, UncertaintyReason, Unit, INFO_AI_CONFIDENCE,
    INFO_AI_FILLED, INFO_AI_REFINED, INFO_CONVERSION, INFO_DEFAULT_QUANTITY, INFO_ORIGINAL_NAME,
};
use crate::ingredient_parser::ParsedLine;
use crate::oracle::DisambiguationOracle;
use crate::sanitizer::NameSanitizer;
use crate::unit_normalizer::{is_common_pantry, is_unit_exempt, normalize};
use crate::vocabulary::AMBIGUOUS_TERMS;

/// Counters for one recipe's escalation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct EscalationStats {
    pub escalated: usize,
    pub ai_refined: usize,
    pub ai_filled: usize,
    pub oracle_failures: usize,
    /// Accepted answers undone because the result failed validation
    pub reverted: usize,
}

/// Why, if at all, an ingredient should be escalated
pub fn uncertainty_reasons(line: &ParsedLine) -> Vec<UncertaintyReason> {
    let mut reasons = Vec::new();

    if AMBIGUOUS_TERMS.contains(&line.ingredient.name.as_str()) {
        reasons.push(UncertaintyReason::AmbiguousName);
    }

    let missing = match line.ingredient.quantity {
        None => !line.context.is_exempt,
        Some(quantity) => quantity <= 0.0 || line.context.quantity_defaulted,
    };
    if missing {
        reasons.push(UncertaintyReason::MissingQuantity);
    }

    reasons
}

/// Short context handed to the oracle: the title and the settled ingredients
pub fn build_context(title: &str, accepted_names: &[&str]) -> String {
    if accepted_names.is_empty() {
        format!("Recipe: {}", title)
    } else {
        format!(
            "Recipe: {}. Other ingredients: {}",
            title,
            accepted_names.join(", ")
        )
    }
}

/// Routes uncertain ingredients to an oracle behind a confidence gate
pub struct Escalator<'a> {
    oracle: &'a dyn DisambiguationOracle,
    sanitizer: &'a NameSanitizer,
    threshold: f64,
}

impl<'a> Escalator<'a> {
    pub fn new(
        oracle: &'a dyn DisambiguationOracle,
        sanitizer: &'a NameSanitizer,
        threshold: f64,
    ) -> Self {
        Self {
            oracle,
            sanitizer,
            threshold,
        }
    }

    /// Escalate the uncertain ingredients of one recipe, keeping input order
    pub fn escalate(
        &self,
        title: &str,
        lines: Vec<ParsedLine>,
    ) -> (Vec<ParsedIngredient>, EscalationStats) {
        let mut stats = EscalationStats::default();
        let mut slots: Vec<Option<ParsedIngredient>> = Vec::with_capacity(lines.len());
        let mut queue: Vec<(usize, EscalationCase)> = Vec::new();

        for line in lines {
            let reasons = uncertainty_reasons(&line);
            if reasons.is_empty() {
                slots.push(Some(line.ingredient));
            } else {
                queue.push((
                    slots.len(),
                    EscalationCase {
                        ingredient: line.ingredient,
                        context: line.context,
                        reasons,
                    },
                ));
                slots.push(None);
            }
        }

        if queue.is_empty() {
            return (slots.into_iter().flatten().collect(), stats);
        }

        let accepted_names: Vec<&str> = slots
            .iter()
            .flatten()
            .map(|ingredient| ingredient.name.as_str())
            .collect();
        let context = build_context(title, &accepted_names);
        debug!(recipe = title, queued = queue.len(), "Escalating uncertain ingredients");

        let mut resolved = Vec::with_capacity(queue.len());
        for (slot, case) in queue {
            stats.escalated += 1;
            resolved.push((slot, self.resolve_case(case, &context, &mut stats)));
        }
        for (slot, ingredient) in resolved {
            slots[slot] = Some(ingredient);
        }

        (slots.into_iter().flatten().collect(), stats)
    }

    fn resolve_case(
        &self,
        case: EscalationCase,
        context: &str,
        stats: &mut EscalationStats,
    ) -> ParsedIngredient {
        let snapshot = case.ingredient.clone();
        let mut ingredient = case.ingredient;
        let mut refined = false;
        let mut fill: Option<(f64, Option<Unit>)> = None;
        let mut oracle_down = false;

        if case.reasons.contains(&UncertaintyReason::AmbiguousName) {
            match self.oracle.resolve(&ingredient.name, context) {
                Ok(answer) if answer.confidence > self.threshold => {
                    if answer.suggestion != ingredient.name {
                        info!(
                            from = %ingredient.name,
                            to = %answer.suggestion,
                            confidence = answer.confidence,
                            "Oracle refined ambiguous ingredient"
                        );
                        ingredient.set_info(
                            INFO_ORIGINAL_NAME,
                            InfoValue::Text(ingredient.name.clone()),
                        );
                        ingredient.name = answer.suggestion;
                        ingredient.set_flag(INFO_AI_REFINED);
                        ingredient.set_info(
                            INFO_AI_CONFIDENCE,
                            InfoValue::Text(format!("{:.2}", answer.confidence)),
                        );
                        refined = true;
                    }
                }
                Ok(answer) => debug!(
                    term = %ingredient.name,
                    confidence = answer.confidence,
                    "Oracle suggestion below threshold, keeping deterministic name"
                ),
                Err(e) => {
                    stats.oracle_failures += 1;
                    oracle_down = true;
                    warn!(term = %ingredient.name, error = %e, "Oracle resolve failed, keeping deterministic name");
                }
            }
        }

        // One failed call per ingredient is enough to fall back
        if !oracle_down && case.reasons.contains(&UncertaintyReason::MissingQuantity) {
            match self.oracle.fill(&ingredient.name, context) {
                Ok(answer) if answer.confidence > self.threshold => {
                    match answer.quantity.filter(|q| *q > 0.0) {
                        Some(quantity) => {
                            let unit = answer.unit.as_deref().and_then(Unit::from_token);
                            info!(
                                term = %ingredient.name,
                                quantity,
                                unit = ?unit,
                                confidence = answer.confidence,
                                "Oracle filled missing quantity"
                            );
                            fill = Some((quantity, unit));
                        }
                        None => debug!(term = %ingredient.name, "Oracle fill carried no usable quantity"),
                    }
                }
                Ok(answer) => debug!(
                    term = %ingredient.name,
                    confidence = answer.confidence,
                    "Oracle fill below threshold, keeping deterministic quantity"
                ),
                Err(e) => {
                    stats.oracle_failures += 1;
                    warn!(term = %ingredient.name, error = %e, "Oracle fill failed, keeping deterministic quantity");
                }
            }
        }

        if !refined && fill.is_none() {
            return snapshot;
        }

        let renormalized = match fill {
            Some((quantity, unit)) => normalize(Some(quantity), unit, &ingredient.name),
            None if case.context.quantity_defaulted => normalize(None, None, &ingredient.name),
            None => normalize(
                ingredient.quantity,
                ingredient.unit.map(|unit| unit.as_unit()),
                &ingredient.name,
            ),
        };

        ingredient.quantity = renormalized.quantity;
        ingredient.unit = renormalized.unit;
        ingredient.set_info(INFO_CONVERSION, InfoValue::Text(renormalized.note));
        if renormalized.defaulted {
            ingredient.set_flag(INFO_DEFAULT_QUANTITY);
        } else {
            ingredient.info.remove(INFO_DEFAULT_QUANTITY);
        }
        if fill.is_some() {
            ingredient.set_flag(INFO_AI_FILLED);
        }

        let quantity_ok = ingredient.quantity.is_some() == ingredient.unit.is_some()
            || is_unit_exempt(&ingredient.name);
        if let Err(reason) = self.sanitizer.validate_name(&ingredient.name) {
            warn!(
                term = %ingredient.name,
                reason = %reason,
                "Oracle answer failed validation, reverting to deterministic values"
            );
            stats.reverted += 1;
            return snapshot;
        }
        if !quantity_ok {
            stats.reverted += 1;
            return snapshot;
        }

        if refined {
            stats.ai_refined += 1;
        }
        if fill.is_some() {
            stats.ai_filled += 1;
        }
        debug!(
            ingredient = %ingredient,
            pantry = is_common_pantry(&ingredient.name),
            "Escalated ingredient accepted"
        );
        ingredient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OracleError;
    use crate::ingredient_model::CanonicalUnit;
    use crate::ingredient_parser::IngredientParser;
    use crate::oracle::{NullOracle, QuantityFill, Resolution};
    use std::cell::Cell;

    struct FixedOracle {
        suggestion: &'static str,
        quantity: Option<f64>,
        unit: Option<&'static str>,
        confidence: f64,
    }

    impl DisambiguationOracle for FixedOracle {
        fn resolve(&self, _term: &str, _context: &str) -> Result<Resolution, OracleError> {
            Ok(Resolution {
                suggestion: self.suggestion.to_string(),
                confidence: self.confidence,
            })
        }

        fn fill(&self, _term: &str, _context: &str) -> Result<QuantityFill, OracleError> {
            Ok(QuantityFill {
                quantity: self.quantity,
                unit: self.unit.map(str::to_string),
                confidence: self.confidence,
            })
        }
    }

    struct DownOracle {
        calls: Cell<usize>,
    }

    impl DisambiguationOracle for DownOracle {
        fn resolve(&self, _term: &str, _context: &str) -> Result<Resolution, OracleError> {
            self.calls.set(self.calls.get() + 1);
            Err(OracleError::Unavailable("offline".to_string()))
        }

        fn fill(&self, _term: &str, _context: &str) -> Result<QuantityFill, OracleError> {
            self.calls.set(self.calls.get() + 1);
            Err(OracleError::Unavailable("offline".to_string()))
        }
    }

    fn lines(texts: &[&str]) -> Vec<ParsedLine> {
        let parser = IngredientParser::default();
        texts.iter().filter_map(|t| parser.parse_line(t).ok()).collect()
    }

    #[test]
    fn test_reasons() {
        let parsed = lines(&["1 tsp masala", "salt", "saffron", "2 potatoes"]);
        assert_eq!(uncertainty_reasons(&parsed[0]), vec![UncertaintyReason::AmbiguousName]);
        assert_eq!(uncertainty_reasons(&parsed[1]), vec![UncertaintyReason::MissingQuantity]);
        assert!(uncertainty_reasons(&parsed[2]).is_empty());
        assert!(uncertainty_reasons(&parsed[3]).is_empty());
    }

    #[test]
    fn test_context_string() {
        assert_eq!(
            build_context("Chicken Curry", &["chicken", "onion"]),
            "Recipe: Chicken Curry. Other ingredients: chicken, onion"
        );
        assert_eq!(build_context("Tea", &[]), "Recipe: Tea");
    }

    #[test]
    fn test_null_oracle_keeps_everything() {
        let sanitizer = NameSanitizer::default();
        let escalator = Escalator::new(&NullOracle, &sanitizer, 0.7);
        let (ingredients, stats) = escalator.escalate("Curry", lines(&["1 tsp masala", "salt"]));

        assert_eq!(ingredients[0].name, "masala");
        assert_eq!(ingredients[1].quantity, Some(1.0));
        assert_eq!(stats.escalated, 2);
        assert_eq!(stats.ai_refined + stats.ai_filled, 0);
    }

    #[test]
    fn test_confident_fill_is_renormalized() {
        let oracle = FixedOracle {
            suggestion: "salt",
            quantity: Some(1.0),
            unit: Some("tsp"),
            confidence: 0.9,
        };
        let sanitizer = NameSanitizer::default();
        let escalator = Escalator::new(&oracle, &sanitizer, 0.7);
        let (ingredients, stats) = escalator.escalate("Dal", lines(&["salt"]));

        assert_eq!(ingredients[0].quantity, Some(5.0));
        assert_eq!(ingredients[0].unit, Some(CanonicalUnit::Grams));
        assert!(ingredients[0].has_flag(INFO_AI_FILLED));
        assert!(!ingredients[0].has_flag(INFO_DEFAULT_QUANTITY));
        assert_eq!(stats.ai_filled, 1);
    }

    #[test]
    fn test_invalid_suggestion_is_reverted() {
        let oracle = FixedOracle {
            suggestion: "add garam masala",
            quantity: None,
            unit: None,
            confidence: 0.95,
        };
        let sanitizer = NameSanitizer::default();
        let escalator = Escalator::new(&oracle, &sanitizer, 0.7);
        let (ingredients, stats) = escalator.escalate("Curry", lines(&["1 tsp masala"]));

        assert_eq!(ingredients[0].name, "masala");
        assert!(!ingredients[0].has_flag(INFO_AI_REFINED));
        assert_eq!(stats.reverted, 1);
    }

    #[test]
    fn test_failed_oracle_is_asked_once_per_ingredient() {
        let parsed = lines(&["spices", "salt"]);
        assert_eq!(
            uncertainty_reasons(&parsed[0]),
            vec![
                UncertaintyReason::AmbiguousName,
                UncertaintyReason::MissingQuantity
            ]
        );

        let oracle = DownOracle { calls: Cell::new(0) };
        let sanitizer = NameSanitizer::default();
        let escalator = Escalator::new(&oracle, &sanitizer, 0.7);
        let (ingredients, stats) = escalator.escalate("Curry", parsed);

        assert_eq!(oracle.calls.get(), 2);
        assert_eq!(stats.oracle_failures, 2);
        assert_eq!(ingredients[0].name, "spices");
    }
}
