use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize, Clone)]
pub struct ImageRequest {
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IngredientsResponse {
    pub ingredients: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecipeRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
}

/// A generated recipe document, stored and returned as-is.
///
/// The model's output is validated for field presence only, so the document
/// stays a raw JSON map rather than a rigidly typed struct: consumers must
/// tolerate value-shape mismatches inside individual fields. Generated
/// fields: `title`, `desc`, `used`, `needs`, `instr`, `tags`, `search_keys`.
/// System-added before first persist: `key`, `added`, `createdAt`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct Recipe(pub Map<String, Value>);

impl Recipe {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Canonical ingredient key this recipe is stored under, if attached.
    pub fn key(&self) -> Option<&str> {
        self.0.get("key").and_then(Value::as_str)
    }

    pub fn insert(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }
}
