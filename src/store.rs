use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use crate::models::Recipe;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Document store keyed by canonical ingredient keys.
///
/// `set` is a blind overwrite-or-create write, not compare-and-swap: two
/// concurrent misses for the same key race last-writer-wins. Both writers
/// generated a valid recipe for the same ingredient set, so the surviving
/// document is still correct for the key.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Recipe>, StoreError>;
    async fn set(&self, key: &str, recipe: Recipe) -> Result<(), StoreError>;
}

/// In-process store backed by a locked map. Stands in for the document
/// database in single-node deployments and in tests.
#[derive(Default)]
pub struct MemoryStore {
    recipes: RwLock<HashMap<String, Recipe>>,
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Recipe>, StoreError> {
        Ok(self.recipes.read().get(key).cloned())
    }

    async fn set(&self, key: &str, recipe: Recipe) -> Result<(), StoreError> {
        self.recipes.write().insert(key.to_string(), recipe);
        Ok(())
    }
}
