//! # Recipe Input Module
//!
//! Resolves the loosely shaped recipe record into explicit types at the
//! boundary, so the rest of the pipeline never inspects JSON shapes.
//!
//! Ingredient and step fields arrive either as JSON-encoded text or as
//! already-parsed arrays ([`FieldSource`]); ingredient entries are either
//! free-text lines or `{name, quantity}` objects ([`IngredientEntry`]).
//! Malformed JSON degrades to an empty list; malformed entries are counted
//! and skipped.

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::errors::PipelineError;

/// Keys probed for the ingredient list, in order
pub const INGREDIENT_KEYS: &[&str] = &["ingredients_json", "raw_ingredients", "ingredients"];
pub const PREP_STEP_KEYS: &[&str] = &["prep_steps", "preparation_steps"];
pub const COOK_STEP_KEYS: &[&str] = &["cook_steps", "cooking_steps", "instructions"];
pub const QUICK_STEP_KEYS: &[&str] = &["quick_steps"];

/// Where a list-valued field came from
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource<'a> {
    /// JSON-encoded text that still needs decoding
    JsonText(&'a str),
    /// An already-parsed array
    Parsed(&'a [Value]),
    /// Missing or null
    Absent,
    /// Present but neither text nor array
    Unsupported,
}

impl<'a> FieldSource<'a> {
    /// Resolve the first present key of a record
    pub fn lookup(record: &'a Map<String, Value>, keys: &[&str]) -> Self {
        for key in keys {
            match record.get(*key) {
                None | Some(Value::Null) => continue,
                Some(Value::String(text)) => return FieldSource::JsonText(text),
                Some(Value::Array(items)) => return FieldSource::Parsed(items),
                Some(_) => return FieldSource::Unsupported,
            }
        }
        FieldSource::Absent
    }

    /// Decode into a list; anything undecodable is an empty list
    pub fn into_values(self) -> Vec<Value> {
        match self {
            FieldSource::Parsed(items) => items.to_vec(),
            FieldSource::JsonText(text) if text.trim().is_empty() => Vec::new(),
            FieldSource::JsonText(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Array(items)) => items,
                Ok(other) => {
                    debug!("Encoded field is not an array: {}", other);
                    Vec::new()
                }
                Err(e) => {
                    debug!("Malformed JSON field treated as empty: {}", e);
                    Vec::new()
                }
            },
            FieldSource::Absent | FieldSource::Unsupported => Vec::new(),
        }
    }
}

/// One raw ingredient entry
#[derive(Debug, Clone, PartialEq)]
pub enum IngredientEntry {
    /// A free-text line such as "2 cups rice"
    Line(String),
    /// A structured object with a separate quantity text
    Structured {
        name: String,
        quantity: Option<String>,
        unit: Option<String>,
    },
}

impl IngredientEntry {
    /// Interpret one JSON value; `None` for malformed entries
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(line) if !line.trim().is_empty() => {
                Some(IngredientEntry::Line(line.clone()))
            }
            Value::Object(fields) => {
                let name = first_text(fields, &["name", "ingredient", "item"])?;
                if name.trim().is_empty() {
                    return None;
                }
                Some(IngredientEntry::Structured {
                    name,
                    quantity: first_text(fields, &["quantity", "qty", "amount"])
                        .filter(|q| !q.trim().is_empty()),
                    unit: first_text(fields, &["unit"]).filter(|u| !u.trim().is_empty()),
                })
            }
            _ => None,
        }
    }

    /// Full text of the entry: quantity, unit and name joined
    pub fn combined_text(&self) -> String {
        match self {
            IngredientEntry::Line(line) => line.clone(),
            IngredientEntry::Structured {
                name,
                quantity,
                unit,
            } => [quantity.as_deref(), unit.as_deref(), Some(name.as_str())]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Quantity text of a structured entry, with its unit
    pub fn quantity_text(&self) -> Option<String> {
        match self {
            IngredientEntry::Structured {
                quantity: Some(quantity),
                unit,
                ..
            } => Some(match unit {
                Some(unit) => format!("{} {}", quantity, unit),
                None => quantity.clone(),
            }),
            _ => None,
        }
    }

    /// The separately supplied name of a structured entry
    pub fn name(&self) -> Option<&str> {
        match self {
            IngredientEntry::Structured { name, .. } => Some(name),
            IngredientEntry::Line(_) => None,
        }
    }
}

fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key) {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Shape of the ingredient entries of one recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Structured,
    TextLines,
    Mixed,
    Empty,
}

/// A recipe record resolved into explicit shapes
#[derive(Debug, Clone)]
pub struct RecipeInput {
    pub recipe_name: String,
    pub description: Option<String>,
    pub ingredients: Vec<IngredientEntry>,
    /// Entries skipped because they were neither text nor objects with a name
    pub malformed_entries: usize,
    pub prep_steps: Vec<String>,
    pub cook_steps: Vec<String>,
    pub quick_steps: Vec<String>,
    /// The original record, kept for metadata fields
    pub fields: Map<String, Value>,
}

impl RecipeInput {
    /// Resolve a record; only a non-object record is an error
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recipe_normalizer::recipe_input::{IngredientEntry, RecipeInput};
    /// use serde_json::json;
    ///
    /// let record = json!({
    ///     "recipe_name": "Aloo Sabzi",
    ///     "ingredients_json": "[{\"name\": \"potatoes\", \"quantity\": \"2\"}]",
    ///     "prep_steps": "not json"
    /// });
    /// let input = RecipeInput::from_value(&record).unwrap();
    /// assert_eq!(input.ingredients.len(), 1);
    /// assert!(input.prep_steps.is_empty());
    ///
    /// assert!(RecipeInput::from_value(&json!(["not", "a", "mapping"])).is_err());
    /// ```
    pub fn from_value(value: &Value) -> Result<Self, PipelineError> {
        let fields = value.as_object().ok_or_else(|| {
            PipelineError::InputShape(format!("recipe must be a JSON object, got {}", kind(value)))
        })?;

        let recipe_name = first_text(fields, &["recipe_name", "name", "title"])
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        let description = first_text(fields, &["description"]);

        let raw_entries = FieldSource::lookup(fields, INGREDIENT_KEYS).into_values();
        let mut ingredients = Vec::with_capacity(raw_entries.len());
        let mut malformed_entries = 0;
        for entry in &raw_entries {
            match IngredientEntry::from_value(entry) {
                Some(parsed) => ingredients.push(parsed),
                None => {
                    malformed_entries += 1;
                    warn!("Skipping malformed ingredient entry in '{}': {}", recipe_name, entry);
                }
            }
        }

        Ok(Self {
            recipe_name,
            description,
            ingredients,
            malformed_entries,
            prep_steps: step_list(fields, PREP_STEP_KEYS),
            cook_steps: step_list(fields, COOK_STEP_KEYS),
            quick_steps: step_list(fields, QUICK_STEP_KEYS),
            fields: fields.clone(),
        })
    }

    /// Which entry shapes this recipe used
    pub fn source_format(&self) -> SourceFormat {
        let structured = self
            .ingredients
            .iter()
            .filter(|entry| matches!(entry, IngredientEntry::Structured { .. }))
            .count();

        match (structured, self.ingredients.len() - structured) {
            (0, 0) => SourceFormat::Empty,
            (_, 0) => SourceFormat::Structured,
            (0, _) => SourceFormat::TextLines,
            _ => SourceFormat::Mixed,
        }
    }
}

fn step_list(fields: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    FieldSource::lookup(fields, keys)
        .into_values()
        .into_iter()
        .filter_map(|step| match step {
            Value::String(text) => Some(text),
            Value::Object(map) => first_text(&map, &["text", "step", "instruction"]),
            _ => None,
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encoded_and_parsed_arrays() {
        let encoded = json!({
            "recipe_name": "Dal",
            "ingredients_json": "[\"1 cup toor dal\", \"salt to taste\"]"
        });
        let parsed = json!({
            "recipe_name": "Dal",
            "ingredients": ["1 cup toor dal", "salt to taste"]
        });

        let a = RecipeInput::from_value(&encoded).unwrap();
        let b = RecipeInput::from_value(&parsed).unwrap();
        assert_eq!(a.ingredients, b.ingredients);
        assert_eq!(a.source_format(), SourceFormat::TextLines);
    }

    #[test]
    fn test_malformed_json_is_empty() {
        let record = json!({
            "recipe_name": "Broken",
            "ingredients_json": "[{\"name\": ",
            "cook_steps": "[\"Heat oil\""
        });
        let input = RecipeInput::from_value(&record).unwrap();
        assert!(input.ingredients.is_empty());
        assert!(input.cook_steps.is_empty());
        assert_eq!(input.source_format(), SourceFormat::Empty);
    }

    #[test]
    fn test_malformed_entries_are_counted() {
        let record = json!({
            "recipe_name": "Mixed",
            "ingredients": [
                {"name": "onion", "quantity": 2},
                "1 tsp salt",
                42,
                {"quantity": "1 cup"},
                {"name": "  "}
            ]
        });
        let input = RecipeInput::from_value(&record).unwrap();
        assert_eq!(input.ingredients.len(), 2);
        assert_eq!(input.malformed_entries, 3);
        assert_eq!(input.source_format(), SourceFormat::Mixed);
        assert_eq!(input.ingredients[0].combined_text(), "2 onion");
    }

    #[test]
    fn test_structured_entry_text() {
        let entry = IngredientEntry::from_value(&json!({
            "name": "milk",
            "quantity": "1.5",
            "unit": "cups"
        }))
        .unwrap();
        assert_eq!(entry.combined_text(), "1.5 cups milk");
        assert_eq!(entry.quantity_text().as_deref(), Some("1.5 cups"));
        assert_eq!(entry.name(), Some("milk"));
    }

    #[test]
    fn test_step_objects() {
        let record = json!({
            "recipe_name": "Tea",
            "cook_steps": [{"text": "Boil water"}, "Add tea leaves", 7]
        });
        let input = RecipeInput::from_value(&record).unwrap();
        assert_eq!(input.cook_steps, vec!["Boil water", "Add tea leaves"]);
    }

    #[test]
    fn test_non_object_is_input_shape_error() {
        let err = RecipeInput::from_value(&json!("just text")).unwrap_err();
        assert!(matches!(err, PipelineError::InputShape(_)));
    }
}
