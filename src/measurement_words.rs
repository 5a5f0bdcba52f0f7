//! # Measurement Words Module
//!
//! Renders quantities as English words ("1.5 cup" → "one and one-half cup")
//! and rewrites measurements embedded in instruction text.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::vocabulary::UNIT_SYNONYMS;

const UNITS: [&str; 10] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];
const TEENS: [&str; 10] = [
    "ten", "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
    "eighteen", "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Largest whole number rendered as words
pub const MAX_WORDED_NUMBER: u64 = 999_999;

const COMMON_FRACTIONS: &[(f64, &str)] = &[
    (0.5, "one-half"),
    (0.25, "one-quarter"),
    (0.75, "three-quarters"),
    (1.0 / 3.0, "one-third"),
    (2.0 / 3.0, "two-thirds"),
    (0.125, "one-eighth"),
];

lazy_static! {
    static ref EMBEDDED_MEASUREMENT: Regex = {
        let units: Vec<String> = UNIT_SYNONYMS
            .iter()
            .map(|(raw, _)| regex::escape(raw))
            .collect();
        Regex::new(&format!(
            r"(?i)\b(\d+\s*/\s*\d+|\d+(?:\.\d+)?)\s*({})\b",
            units.join("|")
        ))
        .expect("valid embedded measurement pattern")
    };
}

/// English words for a whole number up to 999 999; larger numbers stay digits
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::measurement_words::number_to_words;
///
/// assert_eq!(number_to_words(0), "zero");
/// assert_eq!(number_to_words(15), "fifteen");
/// assert_eq!(number_to_words(250), "two hundred and fifty");
/// assert_eq!(number_to_words(1500), "one thousand five hundred");
/// assert_eq!(number_to_words(2_000_000), "2000000");
/// ```
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "zero".to_string();
    }
    if n > MAX_WORDED_NUMBER {
        return n.to_string();
    }

    let mut words = Vec::new();
    let mut rest = n;

    if rest >= 1000 {
        words.extend(below_thousand(rest / 1000));
        words.push("thousand");
        rest %= 1000;
    }
    if rest > 0 {
        words.extend(below_thousand(rest));
    }

    words.join(" ")
}

fn below_thousand(n: u64) -> Vec<&'static str> {
    let mut words = Vec::new();
    let mut rest = (n % 1000) as usize;

    if rest >= 100 {
        words.push(UNITS[rest / 100]);
        words.push("hundred");
        rest %= 100;
        if rest > 0 {
            words.push("and");
        }
    }

    if (10..20).contains(&rest) {
        words.push(TEENS[rest - 10]);
    } else {
        if rest >= 20 {
            words.push(TENS[rest / 10]);
            rest %= 10;
        }
        if rest > 0 {
            words.push(UNITS[rest]);
        }
    }

    words
}

/// Name of a common fraction, if the value is close to one
pub fn fraction_to_words(fraction: f64) -> Option<&'static str> {
    COMMON_FRACTIONS
        .iter()
        .find(|(value, _)| (fraction - value).abs() < 0.01)
        .map(|(_, words)| *words)
}

/// Render a quantity and an optional unit as words
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::measurement_words::format_measurement_as_text;
///
/// assert_eq!(format_measurement_as_text(1.5, Some("cup")), "one and one-half cup");
/// assert_eq!(format_measurement_as_text(500.0, Some("g")), "five hundred g");
/// assert_eq!(format_measurement_as_text(0.25, None), "one-quarter");
/// ```
pub fn format_measurement_as_text(quantity: f64, unit: Option<&str>) -> String {
    let quantity = (quantity.max(0.0) * 100.0).round() / 100.0;
    let whole = quantity.trunc() as u64;
    let fraction = quantity - quantity.trunc();

    let mut parts = Vec::new();
    if whole > 0 {
        parts.push(number_to_words(whole));
    }
    if fraction > 0.005 {
        if whole > 0 {
            parts.push("and".to_string());
        }
        match fraction_to_words(fraction) {
            Some(words) => parts.push(words.to_string()),
            None => parts.push(
                format!("{:.2}", fraction)
                    .trim_end_matches('0')
                    .trim_end_matches('.')
                    .to_string(),
            ),
        }
    }
    if parts.is_empty() {
        parts.push(number_to_words(0));
    }

    let mut text = parts.join(" ");
    if let Some(unit) = unit {
        text.push(' ');
        text.push_str(unit);
    }
    text
}

/// Rewrite every `<number> <unit>` span of an instruction as words
///
/// # Examples
///
/// ```rust
/// use recipe_normalizer::measurement_words::rewrite_measurements;
///
/// assert_eq!(
///     rewrite_measurements("Add 2 cups water and 1/2 tsp salt"),
///     "Add two cups water and one-half tsp salt"
/// );
/// ```
pub fn rewrite_measurements(text: &str) -> String {
    EMBEDDED_MEASUREMENT
        .replace_all(text, |caps: &Captures| match parse_amount(&caps[1]) {
            Some(amount) if amount < (MAX_WORDED_NUMBER + 1) as f64 => {
                format_measurement_as_text(amount, Some(&caps[2]))
            }
            _ => caps[0].to_string(),
        })
        .into_owned()
}

fn parse_amount(text: &str) -> Option<f64> {
    match text.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.trim().parse().ok()?;
            let denominator: f64 = denominator.trim().parse().ok()?;
            (denominator != 0.0).then(|| numerator / denominator)
        }
        None => text.trim().parse().ok(),
    }
}
