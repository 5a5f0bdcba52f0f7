//! # Recipe Pipeline Module
//!
//! Runs one recipe record through the whole normalizer: input resolution,
//! per-entry parsing, escalation of uncertain ingredients, merging of
//! repeated mentions, instruction cleaning and metadata.
//!
//! Recipes are processed one at a time and own all of their intermediate
//! state. The only state shared across recipes is the seen-name set of a
//! [`RecipeBatch`].
//!
//! ```rust
//! use recipe_normalizer::pipeline::RecipeNormalizer;
//! use serde_json::json;
//!
//! let normalizer = RecipeNormalizer::default();
//! let recipe = normalizer
//!     .process_recipe(&json!({
//!         "recipe_name": "Aloo Sabzi",
//!         "ingredients": ["2 potatoes", "1 tsp salt", "Add the potatoes and mix well"],
//!         "cook_steps": ["Boil the potatoes until soft"]
//!     }))
//!     .unwrap();
//!
//! assert_eq!(recipe.ingredients.len(), 2);
//! assert_eq!(recipe.cook_steps, vec!["Boil the potatoes until soft"]);
//! ```

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, info_span, warn};

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::escalation::Escalator;
use crate::ingredient_model::ParsedIngredient;
use crate::ingredient_parser::IngredientParser;
use crate::instruction_cleaner::synthesize;
use crate::merge::merge_ingredients;
use crate::metadata::{ProcessingStats, RecipeMetadata};
use crate::oracle::{DisambiguationOracle, NullOracle};
use crate::recipe_input::RecipeInput;

/// Canonical record handed to the storage layer
#[derive(Debug, Clone, Serialize)]
pub struct StructuredRecipe {
    pub recipe_name: String,
    pub ingredients: Vec<ParsedIngredient>,
    /// Narrative summary of the cleaned steps
    pub instructions: String,
    pub prep_steps: Vec<String>,
    pub cook_steps: Vec<String>,
    pub metadata: RecipeMetadata,
}

/// Per-recipe orchestrator
pub struct RecipeNormalizer {
    config: PipelineConfig,
    parser: IngredientParser,
    oracle: Box<dyn DisambiguationOracle>,
}

impl Default for RecipeNormalizer {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl RecipeNormalizer {
    /// Deterministic normalizer; the oracle never answers
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            parser: IngredientParser::new(&config),
            config,
            oracle: Box::new(NullOracle),
        }
    }

    /// Consult the given oracle for uncertain ingredients
    pub fn with_oracle(mut self, oracle: Box<dyn DisambiguationOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Normalize one raw recipe record
    ///
    /// Only a record that is not a JSON object is an error; everything else
    /// degrades to a partially populated recipe.
    pub fn process_recipe(&self, record: &Value) -> Result<StructuredRecipe, PipelineError> {
        let input = RecipeInput::from_value(record)?;
        Ok(self.process_input(&input))
    }

    /// Normalize an already resolved recipe
    pub fn process_input(&self, input: &RecipeInput) -> StructuredRecipe {
        let span = info_span!("recipe", name = %input.recipe_name);
        let _guard = span.enter();

        let mut stats = ProcessingStats {
            raw_entries: input.ingredients.len() + input.malformed_entries,
            rejected_malformed: input.malformed_entries,
            ..ProcessingStats::default()
        };

        let mut lines = Vec::with_capacity(input.ingredients.len());
        for entry in &input.ingredients {
            match self.parser.parse_entry(entry) {
                Ok(line) => lines.push(line),
                Err(rejection) => {
                    debug!(entry = %entry.combined_text(), reason = %rejection, "Entry rejected");
                    stats.record_rejection(&rejection);
                }
            }
        }

        let escalator = Escalator::new(
            &*self.oracle,
            self.parser.sanitizer(),
            self.config.oracle_confidence_threshold,
        );
        let (ingredients, escalation) = escalator.escalate(&input.recipe_name, lines);
        stats.record_escalation(&escalation);

        let merged = merge_ingredients(ingredients);
        stats.merged = merged.merged;
        stats.dropped_duplicates = merged.dropped;
        stats.accepted = merged.ingredients.len();

        let instructions = synthesize(
            &input.prep_steps,
            &input.cook_steps,
            &input.quick_steps,
            self.config.rewrite_measurements,
        );

        let metadata = RecipeMetadata::build(
            input,
            &merged.ingredients,
            stats,
            self.config.default_servings,
        );

        info!(
            ingredients = merged.ingredients.len(),
            rejected = metadata.stats.rejected(),
            escalated = metadata.stats.escalated,
            steps = instructions.prep_steps.len() + instructions.cook_steps.len(),
            "Recipe normalized"
        );

        StructuredRecipe {
            recipe_name: input.recipe_name.clone(),
            ingredients: merged.ingredients,
            instructions: instructions.summary,
            prep_steps: instructions.prep_steps,
            cook_steps: instructions.cook_steps,
            metadata,
        }
    }
}

/// Why a batch skipped a record
#[derive(Debug)]
pub enum BatchSkip {
    MissingName,
    DuplicateName(String),
    InputShape(PipelineError),
}

impl fmt::Display for BatchSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchSkip::MissingName => write!(f, "recipe has no name"),
            BatchSkip::DuplicateName(name) => write!(f, "recipe '{}' already processed", name),
            BatchSkip::InputShape(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BatchSkip {}

/// Recipes of a batch and how many records were skipped
#[derive(Debug, Default)]
pub struct BatchReport {
    pub recipes: Vec<StructuredRecipe>,
    pub skipped: usize,
}

/// Processes a stream of records, skipping unnamed and repeated recipes
pub struct RecipeBatch {
    normalizer: RecipeNormalizer,
    seen_names: HashSet<String>,
}

impl RecipeBatch {
    pub fn new(normalizer: RecipeNormalizer) -> Self {
        Self {
            normalizer,
            seen_names: HashSet::new(),
        }
    }

    /// Process one record unless its name is missing or already seen
    pub fn process(&mut self, record: &Value) -> Result<StructuredRecipe, BatchSkip> {
        let input = RecipeInput::from_value(record).map_err(BatchSkip::InputShape)?;

        if input.recipe_name.is_empty() {
            return Err(BatchSkip::MissingName);
        }
        if !self.seen_names.insert(input.recipe_name.to_lowercase()) {
            return Err(BatchSkip::DuplicateName(input.recipe_name));
        }

        Ok(self.normalizer.process_input(&input))
    }

    /// Process every record in order
    pub fn process_all(&mut self, records: &[Value]) -> BatchReport {
        let mut report = BatchReport::default();
        for record in records {
            match self.process(record) {
                Ok(recipe) => report.recipes.push(recipe),
                Err(skip) => {
                    warn!(reason = %skip, "Skipping recipe record");
                    report.skipped += 1;
                }
            }
        }
        info!(
            processed = report.recipes.len(),
            skipped = report.skipped,
            "Batch complete"
        );
        report
    }

    pub fn seen_count(&self) -> usize {
        self.seen_names.len()
    }
}

/// Serialized batch result
#[derive(Debug, Serialize)]
pub struct BatchOutput {
    /// RFC 3339 timestamp of the run
    pub generated_at: String,
    pub recipes: Vec<StructuredRecipe>,
}

impl BatchOutput {
    pub fn new(recipes: Vec<StructuredRecipe>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            recipes,
        }
    }
}

/// Load recipe records from a JSON array or an object with a `recipes` array
pub fn load_recipes(path: &Path) -> Result<Vec<Value>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipes from {}", path.display()))?;
    let document: Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    match document {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("recipes") {
            Some(Value::Array(records)) => Ok(records),
            _ => bail!("{} has no 'recipes' array", path.display()),
        },
        _ => bail!("{} must hold a JSON array of recipes", path.display()),
    }
}

/// Write a batch result as pretty-printed JSON
pub fn write_output(path: &Path, output: &BatchOutput) -> Result<()> {
    let json = serde_json::to_string_pretty(output).context("Failed to serialize recipes")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
