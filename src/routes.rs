use std::sync::Arc;

use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::models::{ImageRequest, IngredientsResponse, Recipe, RecipeRequest};
use crate::service::RecipeService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecipeService>,
}

pub async fn ingredients_from_image(
    State(state): State<AppState>,
    Json(body): Json<ImageRequest>,
) -> Result<Json<IngredientsResponse>, ApiError> {
    let ingredients = state.service.ingredients_from_image(&body.image).await?;
    Ok(Json(IngredientsResponse { ingredients }))
}

pub async fn generate_recipe(
    State(state): State<AppState>,
    Json(body): Json<RecipeRequest>,
) -> Result<Json<Recipe>, ApiError> {
    let recipe = state.service.get_or_generate(&body.ingredients).await?;
    Ok(Json(recipe))
}
