pub mod error;
pub mod gemini;
pub mod models;
pub mod recipe;
pub mod routes;
pub mod service;
pub mod store;

pub use error::ApiError;
pub use gemini::GeminiClient;
pub use models::Recipe;
pub use service::RecipeService;
pub use store::{MemoryStore, RecipeStore};
