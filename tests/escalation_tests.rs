use recipe_normalizer::config::{OracleConfig, PipelineConfig, RecoveryConfig};
use recipe_normalizer::errors::OracleError;
use recipe_normalizer::ingredient_model::{
    CanonicalUnit, InfoValue, ParsedIngredient, INFO_AI_FILLED, INFO_AI_REFINED,
    INFO_DEFAULT_QUANTITY, INFO_ORIGINAL_NAME,
};
use recipe_normalizer::oracle::{DisambiguationOracle, HttpOracle, QuantityFill, Resolution};
use recipe_normalizer::{RecipeNormalizer, StructuredRecipe};
use serde_json::{json, Value};

/// Oracle answering every question with the same scripted values
struct ScriptedOracle {
    suggestion: &'static str,
    quantity: Option<f64>,
    unit: Option<&'static str>,
    confidence: f64,
}

impl ScriptedOracle {
    fn new(suggestion: &'static str, quantity: f64, unit: &'static str, confidence: f64) -> Self {
        Self {
            suggestion,
            quantity: Some(quantity),
            unit: Some(unit),
            confidence,
        }
    }
}

impl DisambiguationOracle for ScriptedOracle {
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

/// Oracle that is always down
struct FailingOracle;

impl DisambiguationOracle for FailingOracle {
    fn resolve(&self, _term: &str, _context: &str) -> Result<Resolution, OracleError> {
        Err(OracleError::Unavailable("offline".to_string()))
    }

    fn fill(&self, _term: &str, _context: &str) -> Result<QuantityFill, OracleError> {
        Err(OracleError::MalformedResponse("missing confidence".to_string()))
    }
}

fn curry() -> Value {
    json!({
        "recipe_name": "Chicken Curry",
        "ingredients": ["500 g chicken", "1 tsp masala", "cashews", "2 onions"],
        "cook_steps": ["Cook the chicken until tender"]
    })
}

fn run(oracle: Box<dyn DisambiguationOracle>) -> StructuredRecipe {
    RecipeNormalizer::new(PipelineConfig::default())
        .with_oracle(oracle)
        .process_recipe(&curry())
        .unwrap()
}

fn find<'a>(recipe: &'a StructuredRecipe, name: &str) -> &'a ParsedIngredient {
    recipe
        .ingredients
        .iter()
        .find(|i| i.name == name)
        .unwrap_or_else(|| panic!("missing ingredient {name}"))
}

#[test]
fn test_low_confidence_never_overwrites() {
    let baseline = RecipeNormalizer::default().process_recipe(&curry()).unwrap();
    let recipe = run(Box::new(ScriptedOracle::new("garam masala", 50.0, "g", 0.5)));

    assert_eq!(recipe.ingredients, baseline.ingredients);
    assert!(!recipe.metadata.ai_assisted);
    assert_eq!(recipe.metadata.stats.escalated, 2);
    assert_eq!(recipe.metadata.stats.ai_refined, 0);
    assert_eq!(recipe.metadata.stats.ai_filled, 0);
}

#[test]
fn test_threshold_is_strict() {
    let baseline = RecipeNormalizer::default().process_recipe(&curry()).unwrap();
    let recipe = run(Box::new(ScriptedOracle::new("garam masala", 50.0, "g", 0.7)));
    assert_eq!(recipe.ingredients, baseline.ingredients);
}

#[test]
fn test_high_confidence_refines_name() {
    let recipe = run(Box::new(ScriptedOracle::new("garam masala", 50.0, "g", 0.9)));

    let spice = find(&recipe, "garam masala");
    assert!(spice.has_flag(INFO_AI_REFINED));
    assert_eq!(
        spice.info.get(INFO_ORIGINAL_NAME),
        Some(&InfoValue::Text("masala".to_string()))
    );
    assert_eq!(spice.unit, Some(CanonicalUnit::Grams));
    assert!(recipe.ingredients.iter().all(|i| i.name != "masala"));
    assert!(recipe.metadata.ai_assisted);
}

#[test]
fn test_high_confidence_fills_quantity() {
    let recipe = run(Box::new(ScriptedOracle::new("garam masala", 50.0, "g", 0.9)));

    let cashew = find(&recipe, "cashew");
    assert_eq!(cashew.quantity, Some(50.0));
    assert_eq!(cashew.unit, Some(CanonicalUnit::Grams));
    assert!(cashew.has_flag(INFO_AI_FILLED));
    assert!(!cashew.has_flag(INFO_DEFAULT_QUANTITY));
    assert_eq!(recipe.metadata.stats.ai_filled, 1);
}

#[test]
fn test_certain_ingredients_are_not_escalated() {
    let oracle = ScriptedOracle::new("anything", 1.0, "g", 0.9);
    let normalizer = RecipeNormalizer::default();
    let record = json!({
        "recipe_name": "Aloo",
        "ingredients": ["2 potatoes", "1 tsp salt", "few strands saffron"]
    });

    let recipe = RecipeNormalizer::default()
        .with_oracle(Box::new(oracle))
        .process_recipe(&record)
        .unwrap();
    let baseline = normalizer.process_recipe(&record).unwrap();

    assert_eq!(recipe.ingredients, baseline.ingredients);
    assert_eq!(recipe.metadata.stats.escalated, 0);
}

#[test]
fn test_oracle_failure_fails_open() {
    let baseline = RecipeNormalizer::default().process_recipe(&curry()).unwrap();
    let recipe = run(Box::new(FailingOracle));

    assert_eq!(recipe.ingredients, baseline.ingredients);
    assert_eq!(recipe.ingredients.len(), 4);
    assert_eq!(recipe.metadata.stats.oracle_failures, 2);
}

#[test]
fn test_http_oracle_requires_api_key() {
    let config = OracleConfig {
        api_key_env: "RECIPE_NORMALIZER_TEST_UNSET_KEY".to_string(),
        ..OracleConfig::default()
    };
    assert!(matches!(
        HttpOracle::new(config),
        Err(OracleError::Unavailable(_))
    ));
}

#[test]
fn test_http_oracle_circuit_opens_after_failures() {
    std::env::set_var("RECIPE_NORMALIZER_TEST_KEY", "test-key");
    let config = OracleConfig {
        endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        api_key_env: "RECIPE_NORMALIZER_TEST_KEY".to_string(),
        timeout_secs: 2,
        recovery: RecoveryConfig {
            circuit_breaker_threshold: 1,
            circuit_breaker_reset_secs: 300,
        },
        ..OracleConfig::default()
    };
    let oracle = HttpOracle::new(config).unwrap();

    assert!(matches!(
        oracle.resolve("masala", "Recipe: Curry"),
        Err(OracleError::Transport(_))
    ));
    assert!(matches!(
        oracle.fill("salt", "Recipe: Curry"),
        Err(OracleError::CircuitOpen)
    ));
}
