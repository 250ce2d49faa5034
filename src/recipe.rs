//! Pure pieces of the recipe pipeline: cache-key derivation, recovery of a
//! JSON object from noisy model output, shallow schema validation, and the
//! prompt texts that define the model contract.

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Fields a generated recipe must carry, checked in this order.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "title",
    "desc",
    "used",
    "needs",
    "instr",
    "tags",
    "search_keys",
];

/// Instruction sent with every vision call.
pub const VISION_PROMPT: &str = "List all edible ingredients and foodstuffs in this image. \
    Respond ONLY with a comma-separated list without any titles or other explanations. \
    Example: Milk, Tomato, Cheese, Bread.";

/// Derives the cache key for an ingredient set.
///
/// Sorts a copy of the list (codepoint order, case-sensitive, no locale
/// folding or trimming) and joins with `,`, so permutations of the same
/// elements share a key. Case or whitespace variants of "the same"
/// ingredient produce different keys; that is a known limitation, not
/// corrected here. Callers must reject empty input first.
pub fn canonical_key(ingredients: &[String]) -> String {
    let mut sorted = ingredients.to_vec();
    sorted.sort();
    sorted.join(",")
}

/// Extracts the outermost `{ ... }` substring from a noisy text blob.
///
/// Tolerates prose and code fences around the object but does not check
/// brace balance; a malformed but bracket-bounded string is passed through
/// for the JSON parser to reject.
pub fn recover_json(raw: &str) -> Result<&str, ApiError> {
    let start = raw.find('{').ok_or(ApiError::NoJsonFound)?;
    let end = raw.rfind('}').ok_or(ApiError::NoJsonFound)?;
    if end <= start {
        return Err(ApiError::NoJsonFound);
    }
    Ok(&raw[start..=end])
}

/// Checks that every required field is present, failing fast on the first
/// missing one. Presence only: value shapes are left to consumers, which
/// must tolerate mismatches.
pub fn validate_recipe(doc: &Map<String, Value>) -> Result<(), ApiError> {
    for field in REQUIRED_FIELDS {
        if !doc.contains_key(field) {
            return Err(ApiError::IncompleteRecipe { field });
        }
    }
    Ok(())
}

/// Builds the generation prompt. The ingredient list is embedded in the
/// order the caller gave it, not in the sorted cache-key order.
pub fn recipe_prompt(ingredients: &[String]) -> String {
    format!(
        "You are an experienced and warm-hearted Finnish chef-grandfather, mentored by the \
great Jacques Pépin. You share your wisdom with passion and approachability. Your goal is to \
inspire and guide, creating delicious, practical recipes that respect the ingredients.

Your task is to create a recipe from the following ingredients: {}.

Respond ONLY in a valid JSON format, with no other text, comments, or markdown. The JSON \
object must contain:
- \"title\": A catchy, Finnish name for the recipe.
- \"desc\": A short, appealing description of the recipe (max 2-3 sentences).
- \"used\": An array of the provided ingredients that you used.
- \"needs\": An array of other essential ingredients needed for the recipe.
- \"instr\": An array of clear, numbered preparation steps.
- \"tags\": An object with the following fields: \"cuisine\" (e.g., Italian, Scandinavian), \
\"meal\" (e.g., Breakfast, Dinner), \"diet\" (e.g., Vegetarian, Vegan, Gluten-free), \
\"time\" (e.g., \"<30min\", \"30-60min\", \">60min\").
- \"search_keys\": An array of all ingredients used in the recipe (\"used\" and \"needs\") \
in a simple, singular, lowercase format (e.g., \"tomato\", \"onion\", \"beef\").",
        ingredients.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn permutations_share_a_key() {
        let a = canonical_key(&list(&["Tomato", "Cheese", "Bread"]));
        let b = canonical_key(&list(&["Bread", "Tomato", "Cheese"]));
        let c = canonical_key(&list(&["Cheese", "Bread", "Tomato"]));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a, "Bread,Cheese,Tomato");
    }

    #[test]
    fn sort_is_case_sensitive_byte_order() {
        // Uppercase sorts before lowercase; no folding is applied.
        assert_eq!(
            canonical_key(&list(&["tomato", "Cheese"])),
            "Cheese,tomato"
        );
        assert_ne!(
            canonical_key(&list(&["Tomato", "Cheese"])),
            canonical_key(&list(&["tomato", "cheese"]))
        );
    }

    #[test]
    fn whitespace_variants_get_different_keys() {
        assert_ne!(
            canonical_key(&list(&["Tomato ", "Cheese"])),
            canonical_key(&list(&["Tomato", "Cheese"]))
        );
    }

    #[test]
    fn duplicates_are_kept() {
        assert_eq!(
            canonical_key(&list(&["Egg", "Egg", "Butter"])),
            "Butter,Egg,Egg"
        );
    }

    #[test]
    fn caller_list_is_not_mutated() {
        let original = list(&["Tomato", "Cheese"]);
        let _ = canonical_key(&original);
        assert_eq!(original, list(&["Tomato", "Cheese"]));
    }

    #[test]
    fn recovers_object_from_fenced_prose() {
        let raw = "Here is your recipe: ```json\n{\"title\":\"X\"}\n``` Enjoy!";
        assert_eq!(recover_json(raw).unwrap(), "{\"title\":\"X\"}");
    }

    #[test]
    fn bare_object_passes_through() {
        assert_eq!(recover_json("{\"a\":1}").unwrap(), "{\"a\":1}");
    }

    #[test]
    fn no_braces_is_no_json_found() {
        assert!(matches!(
            recover_json("no braces here"),
            Err(ApiError::NoJsonFound)
        ));
        assert!(matches!(recover_json("only { open"), Err(ApiError::NoJsonFound)));
        assert!(matches!(recover_json("only } close"), Err(ApiError::NoJsonFound)));
    }

    #[test]
    fn close_before_open_is_no_json_found() {
        assert!(matches!(recover_json("} then {"), Err(ApiError::NoJsonFound)));
    }

    #[test]
    fn recovery_does_not_check_brace_balance() {
        // Bracket-bounded but malformed: passed through for the parser to
        // reject.
        let raw = "x {\"a\": {\"b\": 1} y";
        assert_eq!(recover_json(raw).unwrap(), "{\"a\": {\"b\": 1}");
    }

    #[test]
    fn complete_recipe_validates() {
        let doc = json!({
            "title": "A", "desc": "B", "used": [], "needs": [],
            "instr": [], "tags": {}, "search_keys": []
        });
        assert!(validate_recipe(doc.as_object().unwrap()).is_ok());
    }

    #[test]
    fn first_missing_field_in_fixed_order_is_reported() {
        let doc = json!({
            "title": "A", "desc": "B", "used": [], "needs": [], "instr": []
        });
        match validate_recipe(doc.as_object().unwrap()) {
            Err(ApiError::IncompleteRecipe { field }) => assert_eq!(field, "tags"),
            other => panic!("expected IncompleteRecipe, got {other:?}"),
        }
    }

    #[test]
    fn validation_is_presence_only() {
        // Wrong value shapes are accepted; consumers must tolerate them.
        let doc = json!({
            "title": 7, "desc": null, "used": "not-an-array", "needs": [],
            "instr": {}, "tags": "dinner", "search_keys": 1
        });
        assert!(validate_recipe(doc.as_object().unwrap()).is_ok());
    }

    #[test]
    fn prompt_embeds_ingredients_in_original_order() {
        let prompt = recipe_prompt(&list(&["Tomato", "Cheese"]));
        assert!(prompt.contains("ingredients: Tomato, Cheese."));
        assert!(!prompt.contains("Cheese, Tomato"));
    }
}
