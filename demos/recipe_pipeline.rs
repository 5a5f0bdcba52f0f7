//! # Recipe Pipeline Example
//!
//! Runs a scraped-looking recipe through the normalizer and prints the
//! structured result. Pass `--oracle` to consult the HTTP disambiguation
//! oracle (needs `OPENAI_API_KEY` or the variable named by
//! `ORACLE_API_KEY_ENV`).

use recipe_normalizer::config::{OracleConfig, PipelineConfig};
use recipe_normalizer::ingredient_parser::parse_ingredient_list;
use recipe_normalizer::oracle::HttpOracle;
use recipe_normalizer::RecipeNormalizer;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    println!("🍳 Recipe Normalizer Example");
    println!("============================\n");

    // Example 1: plain ingredient text
    println!("📖 Example 1: Ingredient lines");
    println!("------------------------------");

    let text = "▢ 2 Potatoes\n½ cup milk\n1 tsp salt\nAdd the potatoes and mix well\nFollow us on Instagram";
    for ingredient in parse_ingredient_list(text) {
        println!("  • {}", ingredient);
    }
    println!();

    // Example 2: a full recipe record
    println!("📖 Example 2: Full recipe record");
    println!("--------------------------------");

    let record = json!({
        "recipe_name": "Paneer Butter Masala",
        "description": "Rich and creamy curry. Serves 4.",
        "ingredients_json": "[{\"name\": \"paneer, cubed\", \"quantity\": \"250 g\"}, {\"name\": \"butter\", \"quantity\": \"2 tbsp\"}, {\"name\": \"tomatoes\", \"quantity\": \"3\"}, {\"name\": \"cream (optional)\", \"quantity\": \"\"}, {\"name\": \"masala\", \"quantity\": \"1 tsp\"}, {\"name\": \"salt to taste\", \"quantity\": \"\"}]",
        "prep_steps": "[\"Cube the paneer\", \"Puree the tomatoes\"]",
        "cook_steps": "[\"Step 1: Melt butter in a pan\", \"Add 1/2 cup tomato puree and simmer for 10 minutes\", \"Stir in the paneer and cream\"]",
        "prep_time": "15 mins",
        "cook_time": "25 mins"
    });

    let config = PipelineConfig {
        rewrite_measurements: true,
        ..PipelineConfig::from_env()
    };
    let mut normalizer = RecipeNormalizer::new(config);

    if std::env::args().any(|arg| arg == "--oracle") {
        match HttpOracle::new(OracleConfig::from_env()) {
            Ok(oracle) => {
                println!("🤖 Using HTTP oracle for uncertain ingredients\n");
                normalizer = normalizer.with_oracle(Box::new(oracle));
            }
            Err(e) => println!("⚠️  {}; running deterministic only\n", e),
        }
    }

    let recipe = normalizer.process_recipe(&record)?;

    println!("Ingredients of '{}':", recipe.recipe_name);
    for ingredient in &recipe.ingredients {
        println!("  • {}", ingredient);
    }

    println!("\nInstructions:\n{}", recipe.instructions);
    println!(
        "\nDifficulty: {}, servings: {}, tags: {:?}",
        recipe.metadata.difficulty_level, recipe.metadata.servings, recipe.metadata.tags
    );

    println!("\n📄 JSON output:");
    println!("{}", serde_json::to_string_pretty(&recipe)?);

    Ok(())
}
