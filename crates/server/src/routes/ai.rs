//! Recipe ideas and product recommendations.
//!
//! These routes answer even without a configured model, using static
//! recipes or a slice of the catalogue instead.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::services::gemini::{self, GeneratedRecipe, RecipeSuggestions};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecipeSuggestionRequest {
    /// Product names in the customer's cart.
    pub cart_items: Option<Vec<String>>,
}

/// POST /api/ai/recipe-suggestions
///
/// # Errors
///
/// Returns 400 when `cart_items` is absent.
pub async fn recipe_suggestions(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RecipeSuggestionRequest>,
) -> Result<Json<RecipeSuggestions>> {
    let cart_items = req
        .cart_items
        .ok_or_else(|| AppError::BadRequest("Cart items required".into()))?;

    Ok(Json(
        gemini::recipe_suggestions(state.gemini(), &cart_items).await,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationRequest {
    /// Products the customer bought before.
    #[serde(default)]
    pub user_preferences: Vec<String>,
    #[serde(default)]
    pub available_products: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Recommendations {
    pub recommendations: Vec<String>,
    pub message: &'static str,
}

/// POST /api/ai/product-recommendations
///
/// # Errors
///
/// Returns 400 for a malformed body.
pub async fn product_recommendations(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RecommendationRequest>,
) -> Result<Json<Recommendations>> {
    if req.available_products.is_empty() {
        return Ok(Json(Recommendations {
            recommendations: Vec::new(),
            message: "No products available",
        }));
    }

    let recommendations = gemini::product_recommendations(
        state.gemini(),
        &req.user_preferences,
        &req.available_products,
    )
    .await;

    Ok(Json(Recommendations {
        recommendations,
        message: "Based on your preferences",
    }))
}

#[derive(Debug, Deserialize)]
pub struct GenerateRecipeRequest {
    pub ingredients: Option<Vec<String>>,
    pub dietary: Option<String>,
}

/// Write a full recipe from a list of ingredients.
///
/// POST /api/ai/generate-recipe
///
/// # Errors
///
/// Returns 400 without ingredients, 503 when no model is configured and 502
/// if the model's answer is unusable.
pub async fn generate_recipe(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GenerateRecipeRequest>,
) -> Result<Json<GeneratedRecipe>> {
    let ingredients = req
        .ingredients
        .filter(|i| !i.is_empty())
        .ok_or_else(|| AppError::BadRequest("Ingredients required".into()))?;
    let client = state
        .gemini()
        .ok_or_else(|| AppError::Unavailable("AI service not configured".into()))?;

    let recipe = gemini::generate_recipe(
        client,
        &ingredients,
        req.dietary.as_deref().unwrap_or("none"),
    )
    .await?;

    Ok(Json(recipe))
}
