//! # Recipe Normalizer
//!
//! Converts loosely structured scraped recipe records into a canonical form:
//! ingredients with a normalized name, a quantity in grams or milliliters,
//! an optionality flag and free-form notes, plus cleaned instruction text.
//!
//! Parsing is deterministic. Only the residue that stays ambiguous (generic
//! names, missing quantities) is routed to an optional disambiguation
//! oracle, and its answers are adopted only above a confidence threshold.

pub mod circuit_breaker;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod escalation;
pub mod ingredient_model;
pub mod ingredient_parser;
pub mod instruction_cleaner;
pub mod measurement_words;
pub mod merge;
pub mod metadata;
pub mod oracle;
pub mod pipeline;
pub mod recipe_input;
pub mod sanitizer;
pub mod text_processing;
pub mod unit_normalizer;
pub mod vocabulary;

pub use config::PipelineConfig;
pub use ingredient_model::ParsedIngredient;
pub use pipeline::{RecipeBatch, RecipeNormalizer, StructuredRecipe};
