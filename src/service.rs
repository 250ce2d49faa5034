use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::error::ApiError;
use crate::gemini::{extract_text, GeminiClient};
use crate::models::Recipe;
use crate::recipe::{canonical_key, recipe_prompt, recover_json, validate_recipe, VISION_PROMPT};
use crate::store::RecipeStore;

/// Orchestrates the two operations behind the callable surface: ingredient
/// extraction from a photo, and cached recipe generation.
///
/// Holds the injected collaborators; per-request state lives on the stack.
/// No retries, timeouts, or cancellation here: a failed model call or
/// unusable response is terminal for the request, and any retry is the
/// caller's decision.
pub struct RecipeService {
    gemini: GeminiClient,
    store: Arc<dyn RecipeStore>,
}

impl RecipeService {
    pub fn new(gemini: GeminiClient, store: Arc<dyn RecipeStore>) -> Self {
        Self { gemini, store }
    }

    /// Extracts an ingredient listing from a base64-encoded JPEG.
    ///
    /// Returns the model's text as a single unsplit string; splitting and
    /// trimming into a list is the caller's responsibility. Not cached: no
    /// canonical key concept applies to an image.
    pub async fn ingredients_from_image(&self, image_b64: &str) -> Result<String, ApiError> {
        if image_b64.is_empty() {
            return Err(ApiError::InvalidArgument(
                "an \"image\" field containing a base64 encoded image is required".into(),
            ));
        }

        let response = self.gemini.generate_vision(VISION_PROMPT, image_b64).await?;
        extract_text(&response)
    }

    /// Looks up a recipe by the canonical key of `ingredients`, generating
    /// and persisting one on a miss.
    ///
    /// Once a recipe is stored under a key it is never regenerated: the
    /// cache is permanent, with no TTL or prompt versioning. The
    /// check-then-write sequence is not locked across requests; two
    /// concurrent misses for one key both generate and the last write wins.
    /// Nothing is persisted unless the generated document validated.
    pub async fn get_or_generate(&self, ingredients: &[String]) -> Result<Recipe, ApiError> {
        if ingredients.is_empty() {
            return Err(ApiError::InvalidArgument(
                "an \"ingredients\" array containing at least one item is required".into(),
            ));
        }

        let key = canonical_key(ingredients);

        if let Some(recipe) = self.store.get(&key).await? {
            info!(%key, "found existing recipe");
            return Ok(recipe);
        }
        info!(%key, "no existing recipe found, generating a new one");

        // The prompt keeps the caller's ingredient order; only the key is
        // sorted.
        let prompt = recipe_prompt(ingredients);
        let response = self.gemini.generate_text(&prompt).await?;
        let raw = extract_text(&response)?;

        let json_str = match recover_json(&raw) {
            Ok(s) => s,
            Err(err) => {
                error!(raw = %raw, "no JSON object in model response");
                return Err(err);
            }
        };

        let doc: Map<String, Value> = serde_json::from_str(json_str).map_err(|e| {
            error!(error = %e, raw = %json_str, "generated recipe failed to parse");
            ApiError::MalformedJson {
                body: json_str.to_string(),
            }
        })?;
        validate_recipe(&doc)?;

        let mut recipe = Recipe(doc);
        let now = Utc::now().to_rfc3339();
        recipe.insert("key", Value::String(key.clone()));
        recipe.insert("added", Value::String(now.clone()));
        // The in-memory store has no server clock of its own; the write
        // timestamp comes from the process clock.
        recipe.insert("createdAt", Value::String(now));

        self.store.set(&key, recipe.clone()).await?;
        info!(%key, "new recipe saved");

        Ok(recipe)
    }
}
