//! # Instruction Cleaner Module
//!
//! Cleans preparation and cooking step lists scraped alongside a recipe and
//! synthesizes the narrative summary stored with the structured record.
//!
//! A step survives cleaning only when it reads as a cooking action: web
//! noise and ingredient listings that leaked into the step list are dropped.
//!
//! ```rust
//! use recipe_normalizer::instruction_cleaner::clean_steps;
//!
//! let steps = vec![
//!     "1. Heat oil in a pan".to_string(),
//!     "2 potatoes".to_string(),
//!     "Follow us on Instagram".to_string(),
//! ];
//! assert_eq!(clean_steps(&steps, false), vec!["Heat oil in a pan"]);
//! ```

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use crate::classifier::{is_noise, looks_like_instruction};
use crate::measurement_words::rewrite_measurements;
use crate::text_processing::{collapse_whitespace, strip_bullets};

lazy_static! {
    static ref STEP_NUMBERING: Regex =
        Regex::new(r"(?i)^(?:step\s*\d+\s*[:.)-]?|\d+\s*(?:[):-]|\.(?:\s|$)))\s*")
            .expect("valid step numbering pattern");
}

/// Cleaned instructions of one recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstructionSet {
    pub prep_steps: Vec<String>,
    pub cook_steps: Vec<String>,
    /// "Preparation:" and "Cooking:" sections, one bullet per step
    pub summary: String,
}

impl InstructionSet {
    pub fn is_empty(&self) -> bool {
        self.prep_steps.is_empty() && self.cook_steps.is_empty()
    }
}

/// Clean one step list, preserving order and dropping exact duplicates
pub fn clean_steps(steps: &[String], rewrite: bool) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();

    for step in steps {
        let Some(text) = clean_step(step) else {
            continue;
        };

        if is_noise(&text) {
            debug!("Dropping noise step: '{}'", text);
            continue;
        }
        if !looks_like_instruction(&text) {
            debug!("Dropping non-instruction step: '{}'", text);
            continue;
        }

        let text = if rewrite {
            rewrite_measurements(&text)
        } else {
            text
        };

        if seen.insert(text.clone()) {
            cleaned.push(text);
        } else {
            trace!("Dropping duplicate step: '{}'", text);
        }
    }

    cleaned
}

/// Trim one step and strip its bullet and leading numbering
fn clean_step(step: &str) -> Option<String> {
    let text = collapse_whitespace(&strip_bullets(step));
    let text = STEP_NUMBERING.replace(text.trim(), "");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Clean every step list of a recipe and build the summary
///
/// Quick steps are a condensed variant some sources carry; they join the
/// cooking steps unless the same text is already there.
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::instruction_cleaner::synthesize;
///
/// let set = synthesize(
///     &["Wash the rice".to_string()],
///     &["Boil the rice until soft".to_string()],
///     &[],
///     false,
/// );
/// assert_eq!(
///     set.summary,
///     "Preparation:\n- Wash the rice\n\nCooking:\n- Boil the rice until soft"
/// );
/// ```
pub fn synthesize(
    prep: &[String],
    cook: &[String],
    quick: &[String],
    rewrite: bool,
) -> InstructionSet {
    let prep_steps = clean_steps(prep, rewrite);
    let mut cook_steps = clean_steps(cook, rewrite);

    for step in clean_steps(quick, rewrite) {
        if !cook_steps.contains(&step) {
            cook_steps.push(step);
        }
    }

    let summary = summarize(&prep_steps, &cook_steps);
    InstructionSet {
        prep_steps,
        cook_steps,
        summary,
    }
}

fn summarize(prep_steps: &[String], cook_steps: &[String]) -> String {
    let sections: Vec<String> = [("Preparation", prep_steps), ("Cooking", cook_steps)]
        .iter()
        .filter(|(_, steps)| !steps.is_empty())
        .map(|(title, steps)| {
            let bullets: Vec<String> = steps.iter().map(|step| format!("- {}", step)).collect();
            format!("{}:\n{}", title, bullets.join("\n"))
        })
        .collect();
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strips_numbering_and_bullets() {
        let steps = strings(&[
            "Step 1: Wash the dal",
            "2) Soak for an hour",
            "▢ Drain the water",
            "3. Add 1.5 cups water",
        ]);
        assert_eq!(
            clean_steps(&steps, false),
            vec![
                "Wash the dal",
                "Soak for an hour",
                "Drain the water",
                "Add 1.5 cups water"
            ]
        );
    }

    #[test]
    fn test_drops_noise_ingredients_and_duplicates() {
        let steps = strings(&[
            "Heat oil in a pan",
            "1 cup rice",
            "Subscribe to our newsletter",
            "",
            "   ",
            "Heat oil in a pan",
            "salt",
        ]);
        assert_eq!(clean_steps(&steps, false), vec!["Heat oil in a pan"]);
    }

    #[test]
    fn test_rewrite_measurements_in_steps() {
        let steps = strings(&["Add 2 cups water and stir"]);
        assert_eq!(clean_steps(&steps, true), vec!["Add two cups water and stir"]);
        assert_eq!(clean_steps(&steps, false), vec!["Add 2 cups water and stir"]);
    }

    #[test]
    fn test_quick_steps_join_cooking() {
        let set = synthesize(
            &[],
            &strings(&["Fry the onions"]),
            &strings(&["Fry the onions", "Serve hot"]),
            false,
        );
        assert!(set.prep_steps.is_empty());
        assert_eq!(set.cook_steps, vec!["Fry the onions", "Serve hot"]);
        assert_eq!(set.summary, "Cooking:\n- Fry the onions\n- Serve hot");
    }

    #[test]
    fn test_empty_set() {
        let set = synthesize(&[], &[], &[], false);
        assert!(set.is_empty());
        assert_eq!(set.summary, "");
    }
}
