//! # Line Classifier Module
//!
//! Decides whether a raw recipe line is an ingredient listing, a cooking
//! instruction, or web noise. The ingredient check always runs first, so a
//! line is never classified as both an ingredient and an instruction.

use log::trace;
use std::fmt;

use crate::text_processing::strip_bullets;
use crate::vocabulary::{
    CONNECTOR_WORDS, COOKING_VERB_SET, INSTRUCTION_OPENERS, NOISE_KEYWORDS, QUANTITY_WORDS,
    UNICODE_FRACTIONS,
};

/// Lines longer than this read as sentences, not ingredient noun phrases.
pub const MAX_INGREDIENT_LINE_WORDS: usize = 5;

/// Kind of a recipe line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Ingredient,
    Instruction,
    Noise,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineKind::Ingredient => write!(f, "ingredient"),
            LineKind::Instruction => write!(f, "instruction"),
            LineKind::Noise => write!(f, "noise"),
        }
    }
}

/// Classify one line; anything that is neither noise nor an instruction
/// goes down the ingredient path.
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::classifier::{classify, LineKind};
///
/// assert_eq!(classify("2 potatoes"), LineKind::Ingredient);
/// assert_eq!(classify("Add the potatoes and mix well"), LineKind::Instruction);
/// assert_eq!(classify("Follow us on Instagram"), LineKind::Noise);
/// ```
pub fn classify(text: &str) -> LineKind {
    let kind = if is_noise(text) {
        LineKind::Noise
    } else if looks_like_instruction(text) {
        LineKind::Instruction
    } else {
        LineKind::Ingredient
    };
    trace!("Classified '{}' as {}", text, kind);
    kind
}

/// Whether the line opens with a number, a fraction glyph, or a quantity word
pub fn looks_like_ingredient(text: &str) -> bool {
    let cleaned = strip_bullets(&text.to_lowercase());
    let cleaned = cleaned.trim_start();

    let Some(first_char) = cleaned.chars().next() else {
        return false;
    };

    if first_char.is_ascii_digit() || UNICODE_FRACTIONS.iter().any(|(g, _)| *g == first_char) {
        return true;
    }

    let mut words = cleaned.split_whitespace();
    let first = match words.next() {
        Some("a") | Some("an") => words.next(),
        other => other,
    };

    first
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .is_some_and(|word| QUANTITY_WORDS.contains(&word))
}

/// Whether the line reads as a cooking instruction
///
/// Ingredient-looking lines are never instructions. Otherwise a line is an
/// instruction when it opens with an imperative verb or an instruction
/// opener, uses a clause connector, or runs longer than a noun phrase.
pub fn looks_like_instruction(text: &str) -> bool {
    if looks_like_ingredient(text) {
        return false;
    }

    let cleaned = strip_bullets(&text.to_lowercase());
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .collect();

    let Some(first) = words.first() else {
        return false;
    };

    if is_cooking_verb(first) || INSTRUCTION_OPENERS.contains(first) {
        return true;
    }

    if words.iter().any(|word| CONNECTOR_WORDS.contains(word)) {
        return true;
    }

    words.len() > MAX_INGREDIENT_LINE_WORDS
}

/// Whether the line carries social-media, advertising or note noise
pub fn is_noise(text: &str) -> bool {
    let lowered = text.to_lowercase();
    NOISE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Whether the first word of a text is an imperative cooking verb
pub fn starts_with_cooking_verb(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .is_some_and(|word| is_cooking_verb(&word))
}

/// Recognize a cooking verb, including its gerund ("adding", "stirring", "making")
pub fn is_cooking_verb(word: &str) -> bool {
    if COOKING_VERB_SET.contains(word) {
        return true;
    }

    let Some(stem) = word.strip_suffix("ing") else {
        return false;
    };
    if stem.len() < 2 {
        return false;
    }

    if COOKING_VERB_SET.contains(stem) {
        return true;
    }

    let mut chars = stem.chars().rev();
    if let (Some(last), Some(before)) = (chars.next(), chars.next()) {
        if last == before && COOKING_VERB_SET.contains(&stem[..stem.len() - last.len_utf8()]) {
            return true;
        }
    }

    COOKING_VERB_SET.contains(format!("{}e", stem).as_str())
}
