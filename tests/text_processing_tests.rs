#[cfg(test)]
mod tests {
    use recipe_normalizer::classifier::{classify, LineKind};
    use recipe_normalizer::ingredient_model::Unit;
    use recipe_normalizer::measurement_words::{format_measurement_as_text, rewrite_measurements};
    use recipe_normalizer::sanitizer::{NameRejection, NameSanitizer};
    use recipe_normalizer::text_processing::{
        extract_measurement, extract_quantity, extract_unit, normalize_text,
    };

    #[test]
    fn test_lexical_normalization() {
        assert_eq!(normalize_text("▢ ½ Cup Onions"), "0.5 cup onions");
        assert_eq!(normalize_text("  ¾ TSP   Salt  "), "0.75 tsp salt");
        assert_eq!(normalize_text("1½ cups rice"), "1.5 cups rice");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_quantity_precedence() {
        // divided beats every other rule
        assert_eq!(extract_quantity("oil (divided 1+2)"), Some(3.0));
        // any other numeric aside makes the quantity unknown
        assert_eq!(extract_quantity("500g chicken (1.1 lbs)"), None);
        assert_eq!(extract_quantity("1 + 2 tbsp oil"), Some(3.0));
        assert_eq!(extract_quantity("1/2 cup tomato"), Some(0.5));
        assert_eq!(extract_quantity("2 potatoes"), Some(2.0));
        assert_eq!(extract_quantity("salt"), None);
    }

    #[test]
    fn test_units_are_whole_words() {
        assert_eq!(extract_unit("0.5 cup tomato"), Some(Unit::Cup));
        assert_eq!(extract_unit("2 tablespoons ghee"), Some(Unit::Tablespoon));
        assert_eq!(extract_unit("250ml milk"), Some(Unit::Milliliter));
        assert_eq!(extract_unit("2 large onions"), None);
        assert_eq!(extract_unit("cupboard"), None);
    }

    #[test]
    fn test_measurement_from_normalized_line() {
        let measurement = extract_measurement(&normalize_text("▢ ½ cup tomato puree"));
        assert_eq!(measurement.quantity, Some(0.5));
        assert_eq!(measurement.unit, Some(Unit::Cup));

        let measurement = extract_measurement("a pinch of salt");
        assert_eq!(measurement.quantity, Some(1.0));
        assert_eq!(measurement.unit, Some(Unit::Pinch));
    }

    #[test]
    fn test_classifier_boundary() {
        assert_eq!(classify("2 potatoes"), LineKind::Ingredient);
        assert_eq!(classify("Add the potatoes and mix well"), LineKind::Instruction);
        assert_eq!(classify("Subscribe to our YouTube channel"), LineKind::Noise);
        assert_eq!(classify("salt to taste"), LineKind::Ingredient);
    }

    #[test]
    fn test_sanitizer_rejects_cooking_verbs() {
        let sanitizer = NameSanitizer::default();
        assert!(matches!(
            sanitizer.sanitize("add salt"),
            Err(NameRejection::InstructionVerb(_))
        ));
        assert_eq!(sanitizer.sanitize("2 cups basmati rice").unwrap().name, "basmati rice");
    }

    #[test]
    fn test_measurement_words() {
        assert_eq!(format_measurement_as_text(1.5, Some("cup")), "one and one-half cup");
        assert_eq!(
            rewrite_measurements("Pour 1/4 cup cream and cook for 5 minutes"),
            "Pour one-quarter cup cream and cook for 5 minutes"
        );
    }
}
