//! # Ingredient Name Sanitizer Module
//!
//! Turns the text left around a quantity into a canonical ingredient noun
//! phrase. Informal measures, bracketed asides, serving purposes and
//! alternatives are moved into notes; preparation adjectives are kept as a
//! separate list; everything else that is not part of the ingredient's
//! identity is stripped.
//!
//! The rejection rule here is the authoritative boundary that keeps
//! instruction sentences out of ingredient records: a candidate that is too
//! long, carries a cooking verb, or is a bare noise token never becomes an
//! ingredient.
//!
//! Accepted names are finally snapped onto [`STANDARD_INGREDIENTS`] when the
//! normalized Damerau-Levenshtein similarity reaches the configured threshold.
//!
//! [`STANDARD_INGREDIENTS`]: crate::vocabulary::STANDARD_INGREDIENTS

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

use crate::config::{DEFAULT_FUZZY_MATCH_THRESHOLD, DEFAULT_MAX_NAME_WORDS};
use crate::text_processing::{collapse_whitespace, detect_optional};
use crate::vocabulary::{
    DESCRIPTOR_WORDS, LEADING_FILLERS, NAME_LEADING_VERBS, NAME_REJECT_VERBS, NOISE_NAMES, PREPARATION_WORDS,
    PROTECTED_PLURALS, SIZE_WORDS, SPELLING_FIX_MAP, TASTE_PHRASES, UNIT_SYNONYMS,
    VOCABULARY_BY_LENGTH,
};

lazy_static! {
    static ref PAREN_FRAGMENT: Regex = Regex::new(r"\(([^)]*)\)").expect("valid paren pattern");
    static ref NUMBER_TOKEN: Regex =
        Regex::new(r"\d+(?:\.\d+)?(?:\s*/\s*\d+)?").expect("valid number token pattern");
    static ref INFORMAL_MEASURE: Regex = Regex::new(
        r"^(a\s+few\s+strands|few\s+strands|a\s+handful|handful|a\s+pinch|pinch|a\s+dash|dash|a\s+few|few|\d*\s*inch\s+piece)\b(?:\s*,?\s*(grated|crushed|chopped))?\s*(?:of\s+)?"
    )
    .expect("valid informal measure pattern");
    static ref LEADING_SYMBOLS: Regex =
        Regex::new(r"^[\s,/\-–—+]+").expect("valid leading symbol pattern");
    static ref FOR_PURPOSE: Regex =
        Regex::new(r"^for\s+(topping|serving|garnishing|garnish|tempering)\s*(.*)$")
            .expect("valid purpose pattern");
    static ref TRAILING_PURPOSE: Regex = Regex::new(
        r"^(.+?)\s+for\s+((?:deep\s+|shallow\s+)?frying|greasing|brushing|dusting|topping|serving|garnishing|garnish|tempering)$"
    )
    .expect("valid trailing purpose pattern");
    static ref OMIT: Regex = Regex::new(r"^omit\s+([a-z\s]+)").expect("valid omit pattern");
    static ref PUNCTUATION: Regex =
        Regex::new(r#"[/,\-–—.;:!?*"'&+()\[\]]"#).expect("valid punctuation pattern");
    static ref UNIT_WORDS: Regex = {
        let alternatives: Vec<String> = UNIT_SYNONYMS
            .iter()
            .map(|(raw, _)| regex::escape(raw))
            .collect();
        Regex::new(&format!(r"\b(?:{})\b\.?", alternatives.join("|")))
            .expect("valid unit word pattern")
    };
    static ref TASTE_PATTERN: Regex = phrase_pattern(
        &TASTE_PHRASES
            .iter()
            .chain(["optional", "if desired"].iter())
            .copied()
            .collect::<Vec<_>>()
    );
    static ref STRIP_WORDS: Regex = phrase_pattern(
        &SIZE_WORDS
            .iter()
            .chain(DESCRIPTOR_WORDS.iter())
            .copied()
            .collect::<Vec<_>>()
    );
    static ref PREPARATION_PATTERNS: Vec<(&'static str, Regex)> = PREPARATION_WORDS
        .iter()
        .map(|phrase| (*phrase, phrase_pattern(&[*phrase])))
        .collect();
}

fn phrase_pattern(phrases: &[&str]) -> Regex {
    let alternatives: Vec<String> = phrases.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))).expect("valid phrase pattern")
}

/// Why a candidate name was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRejection {
    /// Nothing left after cleaning
    Empty,
    /// More words than an ingredient noun phrase carries
    TooLong(usize),
    /// Opens with or contains a cooking verb
    InstructionVerb(String),
    /// The whole name is a generic noise token
    NoiseName(String),
}

impl fmt::Display for NameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameRejection::Empty => write!(f, "empty name"),
            NameRejection::TooLong(words) => write!(f, "name too long ({} words)", words),
            NameRejection::InstructionVerb(verb) => write!(f, "contains cooking verb '{}'", verb),
            NameRejection::NoiseName(name) => write!(f, "noise name '{}'", name),
        }
    }
}

impl std::error::Error for NameRejection {}

/// Result of sanitizing one ingredient line
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedName {
    pub name: String,
    /// Informal measures, asides and alternatives moved out of the name
    pub notes: Vec<String>,
    /// Preparation adjectives in order of appearance
    pub preparation: Vec<String>,
    /// Cleaned name before it was snapped onto the vocabulary
    pub snapped_from: Option<String>,
}

/// Sanitizer configured with a fuzzy threshold and a name length bound
#[derive(Debug, Clone)]
pub struct NameSanitizer {
    fuzzy_threshold: f64,
    max_name_words: usize,
}

impl Default for NameSanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_MATCH_THRESHOLD, DEFAULT_MAX_NAME_WORDS)
    }
}

impl NameSanitizer {
    pub fn new(fuzzy_threshold: f64, max_name_words: usize) -> Self {
        Self {
            fuzzy_threshold,
            max_name_words,
        }
    }

    /// Clean a normalized ingredient line into a canonical name
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recipe_normalizer::sanitizer::NameSanitizer;
    ///
    /// let sanitizer = NameSanitizer::default();
    /// let cleaned = sanitizer.sanitize("2 medium onions, finely chopped").unwrap();
    /// assert_eq!(cleaned.name, "onion");
    /// assert_eq!(cleaned.preparation, vec!["finely chopped".to_string()]);
    ///
    /// assert!(sanitizer.sanitize("add salt").is_err());
    /// ```
    pub fn sanitize(&self, text: &str) -> Result<SanitizedName, NameRejection> {
        let mut notes = Vec::new();
        let mut preparation = Vec::new();

        let mut working = self.extract_bracket_notes(text.trim(), &mut notes);

        if let Some(caps) = INFORMAL_MEASURE.captures(&working) {
            notes.push(collapse_whitespace(&caps[1]));
            if let Some(prep) = caps.get(2) {
                preparation.push(prep.as_str().to_string());
            }
            let end = caps.get(0).map_or(0, |m| m.end());
            working = working[end..].to_string();
        }

        working = NUMBER_TOKEN.replace_all(&working, " ").into_owned();
        working = UNIT_WORDS.replace_all(&working, " ").into_owned();
        working = collapse_whitespace(&working);
        working = LEADING_SYMBOLS.replace(&working, "").into_owned();
        working = strip_leading_fillers(&working);

        working = self.split_notes(&working, &mut notes);

        working = TASTE_PATTERN.replace_all(&working, " ").into_owned();

        for (phrase, pattern) in PREPARATION_PATTERNS.iter() {
            if pattern.is_match(&working) {
                preparation.push(phrase.to_string());
                working = pattern.replace_all(&working, " ").into_owned();
            }
        }

        working = PUNCTUATION.replace_all(&working, " ").into_owned();
        working = STRIP_WORDS.replace_all(&working, " ").into_owned();

        let name = canonical_tokens(&working).join(" ");
        self.validate_name(&name)?;

        let (name, snapped_from) = match self.snap_to_vocabulary(&name) {
            Some(term) if term != name => {
                debug!("Snapped '{}' onto vocabulary term '{}'", name, term);
                (term.to_string(), Some(name))
            }
            _ => (name, None),
        };

        trace!(
            "Sanitized '{}' -> '{}' (notes: {:?}, preparation: {:?})",
            text,
            name,
            notes,
            preparation
        );

        Ok(SanitizedName {
            name,
            notes,
            preparation,
            snapped_from,
        })
    }

    /// Apply the rejection rule to an already-cleaned name
    pub fn validate_name(&self, name: &str) -> Result<(), NameRejection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NameRejection::Empty);
        }

        if NOISE_NAMES.contains(&name) {
            return Err(NameRejection::NoiseName(name.to_string()));
        }

        let tokens: Vec<&str> = name.split_whitespace().collect();
        if tokens.len() > self.max_name_words {
            return Err(NameRejection::TooLong(tokens.len()));
        }

        if let Some(verb) = tokens.iter().copied().find(|t| NAME_REJECT_VERBS.contains(t)) {
            return Err(NameRejection::InstructionVerb(verb.to_string()));
        }

        if tokens.len() >= 2 && NAME_LEADING_VERBS.contains(&tokens[0]) {
            return Err(NameRejection::InstructionVerb(tokens[0].to_string()));
        }

        Ok(())
    }

    /// Best vocabulary term at or above the threshold; the first of equally
    /// good terms wins, and the vocabulary is ordered longest term first.
    pub fn snap_to_vocabulary(&self, name: &str) -> Option<&'static str> {
        let mut best: Option<(&'static str, f64)> = None;

        for term in VOCABULARY_BY_LENGTH.iter() {
            let score = strsim::normalized_damerau_levenshtein(name, term) * 100.0;
            if score < self.fuzzy_threshold {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((*term, score)),
            }
        }

        best.map(|(term, _)| term)
    }

    fn extract_bracket_notes(&self, text: &str, notes: &mut Vec<String>) -> String {
        for caps in PAREN_FRAGMENT.captures_iter(text) {
            push_aside(&caps[1], notes);
        }

        let mut working = PAREN_FRAGMENT.replace_all(text, " ").into_owned();

        if let Some(open) = working.find('(') {
            push_aside(&working[open + 1..], notes);
            working.truncate(open);
        }

        working.replace(')', " ")
    }

    fn split_notes(&self, text: &str, notes: &mut Vec<String>) -> String {
        let mut working = text.to_string();

        if let Some(caps) = FOR_PURPOSE.captures(&working) {
            notes.push(format!("for {}", &caps[1]));
            working = caps[2].trim().to_string();
        } else if let Some(caps) = TRAILING_PURPOSE.captures(&working) {
            notes.push(format!("for {}", collapse_whitespace(&caps[2])));
            working = caps[1].trim().to_string();
        }

        if let Some((left, right)) = working.split_once(':') {
            let right = right.trim();
            if !right.is_empty() {
                notes.push(right.to_string());
            }
            working = left.trim().to_string();
        }

        if let Some(caps) = OMIT.captures(&working) {
            notes.push(working.clone());
            working = caps[1].trim().to_string();
        }

        if working.contains(" or ") {
            let parts: Vec<String> = working
                .split(" or ")
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect();
            if let Some((first, rest)) = parts.split_first() {
                if !rest.is_empty() {
                    notes.push(format!("or {}", rest.join(" ")));
                }
                working = first.clone();
            }
        }

        working
    }
}

fn push_aside(fragment: &str, notes: &mut Vec<String>) {
    let fragment = collapse_whitespace(fragment.trim_end_matches(')'));
    if fragment.is_empty() || fragment.chars().any(|c| c.is_ascii_digit()) {
        return;
    }
    if detect_optional(&fragment) && fragment.split_whitespace().count() <= 2 {
        return;
    }
    notes.push(fragment);
}

fn strip_leading_fillers(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let start = tokens
        .iter()
        .position(|t| !LEADING_FILLERS.contains(t))
        .unwrap_or(tokens.len());
    tokens[start..].join(" ")
}

/// Drop fillers at both ends, fix spellings, dedupe and singularize the head
fn canonical_tokens(text: &str) -> Vec<String> {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();

    while tokens.first().is_some_and(|t| LEADING_FILLERS.contains(t)) {
        tokens.remove(0);
    }
    while tokens.last().is_some_and(|t| LEADING_FILLERS.contains(t)) {
        tokens.pop();
    }

    let mut seen = HashSet::new();
    let mut canonical: Vec<String> = tokens
        .into_iter()
        .map(|t| SPELLING_FIX_MAP.get(t).copied().unwrap_or(t))
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect();

    if let Some(last) = canonical.last_mut() {
        *last = singularize(last);
    }

    canonical
}

/// Conservative English singularizer for the head noun of a name
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::sanitizer::singularize;
///
/// assert_eq!(singularize("onions"), "onion");
/// assert_eq!(singularize("mangoes"), "mango");
/// assert_eq!(singularize("berries"), "berry");
/// assert_eq!(singularize("leaves"), "leaves");
/// assert_eq!(singularize("hummus"), "hummus");
/// ```
pub fn singularize(word: &str) -> String {
    if word.len() <= 3 || PROTECTED_PLURALS.contains(&word) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("oes") {
        return format!("{}o", stem);
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{}y", stem);
        }
        return word.to_string();
    }

    for suffix in ["ches", "shes", "xes", "sses"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }

    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }

    word.strip_suffix('s').unwrap_or(word).to_string()
}
