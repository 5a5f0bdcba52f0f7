//! # Vocabulary Module
//!
//! Process-wide keyword tables used by every stage of the normalization
//! pipeline. Everything here is immutable and initialized once; the tables are
//! shared read-only by all recipe-processing calls.

use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// Unicode fraction glyphs and the decimal text they expand to.
pub const UNICODE_FRACTIONS: &[(char, &str)] = &[
    ('½', "0.5"),
    ('¼', "0.25"),
    ('¾', "0.75"),
    ('⅓', "0.33"),
    ('⅔', "0.66"),
    ('⅛', "0.125"),
];

/// Decorative glyphs scraped recipe sites put in front of list items.
pub const BULLET_GLYPHS: &[char] = &[
    '▢', '☐', '□', '■', '▪', '•', '◦', '●', '✓', '✔', '➤', '►', '▸', '·',
];

/// Unit synonyms in match order. The right-hand side is the canonical
/// abbreviation understood by [`crate::ingredient_model::Unit::from_token`].
pub const UNIT_SYNONYMS: &[(&str, &str)] = &[
    ("tablespoons", "tbsp"),
    ("tablespoon", "tbsp"),
    ("tbsp", "tbsp"),
    ("tbs", "tbsp"),
    ("teaspoons", "tsp"),
    ("teaspoon", "tsp"),
    ("tsp", "tsp"),
    ("cups", "cup"),
    ("cup", "cup"),
    ("grams", "g"),
    ("gram", "g"),
    ("gms", "g"),
    ("gm", "g"),
    ("g", "g"),
    ("kilograms", "kg"),
    ("kilogram", "kg"),
    ("kg", "kg"),
    ("pounds", "lb"),
    ("pound", "lb"),
    ("lbs", "lb"),
    ("lb", "lb"),
    ("ounces", "oz"),
    ("ounce", "oz"),
    ("oz", "oz"),
    ("milliliters", "ml"),
    ("millilitres", "ml"),
    ("milliliter", "ml"),
    ("millilitre", "ml"),
    ("ml", "ml"),
    ("liters", "l"),
    ("litres", "l"),
    ("liter", "l"),
    ("litre", "l"),
    ("l", "l"),
    ("pinches", "pinch"),
    ("pinch", "pinch"),
];

/// Words that may open an ingredient line in place of a number.
pub const QUANTITY_WORDS: &[&str] = &[
    "small", "medium", "large", "pinch", "handful", "cup", "cups", "tsp", "tbsp", "gram",
    "grams", "ml",
];

/// Imperative verbs that open cooking instructions.
pub const COOKING_VERBS: &[&str] = &[
    "add", "mix", "stir", "cook", "boil", "fry", "pour", "serve", "heat", "place", "put",
    "cover", "garnish", "transfer", "make", "wash", "clean", "rinse", "soak", "chop", "cut",
    "slice", "dice", "peel", "grate", "knead", "roll", "bake", "roast", "grill", "saute",
    "sauté", "simmer", "blend", "grind", "whisk", "beat", "marinate", "drain", "remove",
    "keep", "let", "allow", "season", "sprinkle", "preheat", "combine", "fold", "spread",
    "squeeze", "strain", "mash", "sieve", "temper", "apply", "take", "set", "bring", "reduce",
    "turn", "switch", "check", "adjust", "toss", "melt", "fill", "shape", "divide", "steam",
    "pressure", "deep", "shallow", "pat", "crush", "splutter",
];

/// Non-verb words that open instruction sentences.
pub const INSTRUCTION_OPENERS: &[&str] = &[
    "once", "now", "then", "finally", "meanwhile", "using", "when", "after", "before", "in",
    "on", "to",
];

/// Words that glue instruction clauses together and almost never appear in
/// an ingredient listing.
pub const CONNECTOR_WORDS: &[&str] = &[
    "until", "before", "after", "when", "while", "then", "well", "carefully", "slowly",
    "immediately",
];

/// Lines containing any of these are web noise, not recipe content.
pub const NOISE_KEYWORDS: &[&str] = &[
    "instagram",
    "facebook",
    "pinterest",
    "youtube",
    "twitter",
    "tiktok",
    "subscribe",
    "follow us",
    "follow me",
    "tag us",
    "share this",
    "click here",
    "newsletter",
    "advertisement",
    "sponsored",
    "jump to recipe",
    "print recipe",
    "rate this",
    "leave a comment",
    "http://",
    "https://",
    "www.",
    "note:",
    "notes:",
    "tip:",
    "tips:",
    "optional:",
];

/// Verbs that disqualify a sanitized name when they occur anywhere in it.
/// Gerunds that name ingredients ("cooking oil", "frying pan") stay out.
pub const NAME_REJECT_VERBS: &[&str] = &[
    "add", "adding", "pour", "serve", "make", "making", "cook", "boil", "fry", "stir",
    "stirring", "knead", "cover", "heat", "heating", "sprinkle", "garnish", "place", "put",
    "adjust", "blend", "blending", "increase", "decrease", "remember", "check", "taste", "now",
    "then",
];

/// Words that disqualify a multi-word name when they open it.
pub const NAME_LEADING_VERBS: &[&str] = &[
    "add", "adding", "pour", "serve", "make", "making", "now", "then", "to", "mix", "mixing",
    "stir", "stirring", "cook", "boil", "fry", "heat", "heating", "place", "placing", "put",
    "putting", "adjust", "adjusting", "garnish", "garnishing", "sprinkle", "sprinkling",
    "knead", "kneading", "cover", "covering", "transfer", "remove", "take", "keep", "let",
];

/// Whole names that carry no ingredient identity on their own.
pub const NOISE_NAMES: &[&str] = &[
    "powder", "leaves", "leaf", "nut", "nuts", "piece", "pieces", "ingredient", "ingredients",
    "other", "etc", "water or", "for", "and", "or",
];

/// Generic names routed to the disambiguation oracle.
pub const AMBIGUOUS_TERMS: &[&str] = &[
    "masala", "spices", "spice", "mix", "spice mix", "seasoning", "herbs", "greens",
    "vegetables",
];

pub const TASTE_PHRASES: &[&str] = &["to taste", "as needed", "as required", "if needed"];

pub const OPTIONAL_KEYWORDS: &[&str] = &[
    "optional",
    "if needed",
    "to taste",
    "as required",
    "if desired",
];

pub const SIZE_WORDS: &[&str] = &["small", "medium", "large", "big", "jumbo"];

/// Preparation phrases, longest first so "finely chopped" wins over "chopped".
pub const PREPARATION_WORDS: &[&str] = &[
    "thinly sliced",
    "finely chopped",
    "roughly chopped",
    "coarsely chopped",
    "finely sliced",
    "finely grated",
    "chopped",
    "sliced",
    "minced",
    "diced",
    "grated",
    "crushed",
    "roasted",
    "cubed",
    "shredded",
    "julienned",
    "peeled",
    "deseeded",
    "halved",
    "beaten",
    "melted",
    "softened",
    "boiled",
    "soaked",
    "toasted",
    "juiced",
    "mashed",
];

/// Descriptors stripped from names without being kept as notes.
pub const DESCRIPTOR_WORDS: &[&str] = &[
    "roughly", "finely", "coarsely", "thinly", "fresh", "freshly", "raw", "optional", "whole",
    "broken", "boiling",
];

/// Leading articles and connectors stripped from names.
pub const LEADING_FILLERS: &[&str] = &["a", "an", "the", "of", "to", "and", "with", "some"];

pub const LIQUID_KEYWORDS: &[&str] = &[
    "water", "milk", "oil", "juice", "curd", "yogurt", "broth", "stock", "cream", "vinegar",
    "syrup", "ghee", "soy", "sauce",
];

pub const COMMON_PANTRY: &[&str] = &[
    "salt",
    "oil",
    "asafoetida",
    "hing",
    "curry leaves",
    "water",
    "mustard seeds",
    "cumin seeds",
    "jeera",
    "pepper",
    "black pepper",
    "saffron",
    "soy",
    "butter",
    "ghee",
    "sugar",
    "turmeric",
];

/// Ingredients for which a missing quantity means "to taste".
pub const UNIT_EXEMPT: &[&str] = &["saffron", "hing", "asafoetida"];

/// Canonical ingredient nouns for approximate matching.
pub const STANDARD_INGREDIENTS: &[&str] = &[
    "chicken", "onion", "tomato", "garlic", "ginger", "potato", "carrot", "capsicum", "chili",
    "green chili", "red chili", "turmeric", "cumin", "coriander", "salt", "sugar", "oil",
    "ghee", "butter", "milk", "curd", "yogurt", "cream", "paneer", "rice", "flour", "wheat",
    "dal", "moong dal", "urad dal", "chana dal", "toor dal", "lentil", "mustard", "fenugreek",
    "cardamom", "clove", "cinnamon", "pepper", "black pepper", "saffron", "cashew", "almond",
    "raisin", "coconut", "lemon", "lime", "water", "egg", "fish", "mutton", "spinach", "pea",
    "green peas", "bean", "cauliflower", "cabbage", "brinjal", "okra", "mushroom", "corn",
    "cheese", "bread", "mayonnaise", "ketchup", "sauce", "vinegar", "soy", "noodles", "pasta",
    "tea", "coffee", "chocolate", "vanilla", "baking", "yeast", "curry leaves", "mint",
    "cilantro",
];

/// Whole-token spelling corrections applied before approximate matching.
pub const SPELLING_FIXES: &[(&str, &str)] = &[
    ("tomatoe", "tomato"),
    ("tomatoes", "tomato"),
    ("potatoe", "potato"),
    ("potatoes", "potato"),
    ("chilie", "chili"),
    ("chillie", "chili"),
    ("chilli", "chili"),
    ("chillies", "chili"),
    ("chilies", "chili"),
    ("chilly", "chili"),
    ("leave", "leaves"),
];

/// Plurals the singularizer must leave alone.
pub const PROTECTED_PLURALS: &[&str] = &[
    "leaves", "peas", "noodles", "oats", "greens", "herbs", "spices", "molasses", "hummus",
    "couscous", "asparagus", "swiss", "brussels", "grass",
];

lazy_static! {
    /// Average weight in grams of one unit-less item.
    pub static ref AVERAGE_WEIGHTS: HashMap<&'static str, f64> = [
        ("potato", 150.0),
        ("onion", 100.0),
        ("tomato", 100.0),
        ("carrot", 100.0),
        ("capsicum", 100.0),
        ("egg", 50.0),
        ("apple", 150.0),
        ("banana", 120.0),
        ("chili", 5.0),
        ("green chili", 5.0),
        ("red chili", 2.0),
        ("clove", 0.1),
        ("cardamom", 0.2),
        ("almond", 1.2),
        ("cashew", 1.5),
        ("lemon", 50.0),
    ]
    .into_iter()
    .collect();

    /// Vocabulary ordered longest term first; ties keep declaration order.
    pub static ref VOCABULARY_BY_LENGTH: Vec<&'static str> = {
        let mut terms = STANDARD_INGREDIENTS.to_vec();
        terms.sort_by(|a, b| b.len().cmp(&a.len()));
        terms
    };

    pub static ref COOKING_VERB_SET: HashSet<&'static str> =
        COOKING_VERBS.iter().copied().collect();

    pub static ref SPELLING_FIX_MAP: HashMap<&'static str, &'static str> =
        SPELLING_FIXES.iter().copied().collect();
}
