//! Recipe ideas and product recommendations from a hosted language model.
//!
//! Every feature here degrades instead of failing: without a client, or when
//! the model answers with something unusable, callers get static suggestions
//! or a slice of the catalogue.

mod client;
mod error;

pub use client::{GeminiClient, strip_code_fence};
pub use error::GeminiError;

use serde::{Deserialize, Serialize};

/// Products recommended when there is nothing to personalise on.
const FALLBACK_COUNT: usize = 3;
/// Upper bound on recommendations from the model.
const MAX_RECOMMENDATIONS: usize = 5;

/// A recipe that pairs with bakery items in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSuggestion {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pairing_reason: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub ingredients_needed: Vec<String>,
    #[serde(default)]
    pub serving_suggestion: String,
}

/// Result of a recipe suggestion request.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSuggestions {
    pub recipes: Vec<RecipeSuggestion>,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub item: String,
    #[serde(default)]
    pub amount: String,
}

/// A full recipe written from a list of ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecipe {
    pub name: String,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub cook_time: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub nutritional_info: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// Suggest recipes that use the items in a cart.
pub async fn recipe_suggestions(
    client: Option<&GeminiClient>,
    cart_items: &[String],
) -> RecipeSuggestions {
    if cart_items.is_empty() {
        return RecipeSuggestions {
            recipes: Vec::new(),
            message: "Add items to your cart to get recipe suggestions!",
        };
    }

    let Some(client) = client else {
        return RecipeSuggestions {
            recipes: Vec::new(),
            message: "AI service not configured",
        };
    };

    match client
        .generate_json::<Vec<RecipeSuggestion>>(&recipe_prompt(cart_items))
        .await
    {
        Ok(recipes) if !recipes.is_empty() => RecipeSuggestions {
            recipes,
            message: "Here are some delicious recipes based on your cart!",
        },
        Ok(_) => fallback_suggestions(),
        Err(e) => {
            tracing::warn!(error = %e, "Recipe suggestion failed, using fallback recipes");
            fallback_suggestions()
        }
    }
}

/// Recommend products a customer is likely to enjoy.
///
/// Without a model or without order history the first three products are
/// returned. If the model fails the first five are returned.
pub async fn product_recommendations(
    client: Option<&GeminiClient>,
    preferences: &[String],
    available: &[String],
) -> Vec<String> {
    let Some(client) = client.filter(|_| !preferences.is_empty()) else {
        return first(available, FALLBACK_COUNT);
    };

    match client
        .generate_json::<Vec<String>>(&recommendation_prompt(preferences, available))
        .await
    {
        Ok(names) => pick_recommendations(names, available),
        Err(e) => {
            tracing::warn!(error = %e, "Product recommendation failed, using catalogue order");
            first(available, MAX_RECOMMENDATIONS)
        }
    }
}

/// Write a complete recipe from a list of ingredients.
///
/// # Errors
///
/// Returns `GeminiError` if the model call fails or its answer is not a recipe.
pub async fn generate_recipe(
    client: &GeminiClient,
    ingredients: &[String],
    dietary: &str,
) -> Result<GeneratedRecipe, GeminiError> {
    client
        .generate_json(&generate_recipe_prompt(ingredients, dietary))
        .await
}

/// Static suggestions used when the model is unavailable.
#[must_use]
pub fn fallback_recipes() -> Vec<RecipeSuggestion> {
    vec![
        RecipeSuggestion {
            name: "Classic French Toast".to_string(),
            description: "Transform fresh bread into a delicious breakfast treat with eggs, milk, and cinnamon.".to_string(),
            pairing_reason: "Perfect way to use artisan bread for a gourmet breakfast experience.".to_string(),
            difficulty: "Easy".to_string(),
            prep_time: "15 minutes".to_string(),
            ingredients_needed: strings(&["Eggs", "Milk", "Cinnamon", "Butter", "Maple syrup"]),
            serving_suggestion: "Serve warm with fresh berries and maple syrup".to_string(),
        },
        RecipeSuggestion {
            name: "Artisan Bread Pudding".to_string(),
            description: "A comforting dessert made with cubed bread, custard, and your choice of fruits or chocolate.".to_string(),
            pairing_reason: "Excellent use of bread to create an elegant dessert.".to_string(),
            difficulty: "Medium".to_string(),
            prep_time: "45 minutes".to_string(),
            ingredients_needed: strings(&["Bread cubes", "Eggs", "Cream", "Sugar", "Vanilla", "Raisins"]),
            serving_suggestion: "Serve warm with vanilla ice cream or whipped cream".to_string(),
        },
        RecipeSuggestion {
            name: "Gourmet Sandwich Platter".to_string(),
            description: "Create an impressive array of sandwiches using fresh bread with various gourmet fillings.".to_string(),
            pairing_reason: "Showcases the quality of artisan bread with simple, delicious ingredients.".to_string(),
            difficulty: "Easy".to_string(),
            prep_time: "20 minutes".to_string(),
            ingredients_needed: strings(&["Assorted deli meats", "Cheeses", "Fresh vegetables", "Spreads", "Herbs"]),
            serving_suggestion: "Cut into halves and arrange on a wooden board".to_string(),
        },
    ]
}

fn fallback_suggestions() -> RecipeSuggestions {
    RecipeSuggestions {
        recipes: fallback_recipes(),
        message: "Here are some recipe suggestions for you!",
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn first(items: &[String], n: usize) -> Vec<String> {
    items.iter().take(n).cloned().collect()
}

/// Keep model picks that name a real product, at most five, in model order.
fn pick_recommendations(names: Vec<String>, available: &[String]) -> Vec<String> {
    let mut picked: Vec<String> = Vec::with_capacity(MAX_RECOMMENDATIONS);
    for name in names {
        if picked.len() == MAX_RECOMMENDATIONS {
            break;
        }
        if available.contains(&name) && !picked.contains(&name) {
            picked.push(name);
        }
    }
    if picked.is_empty() {
        return first(available, MAX_RECOMMENDATIONS);
    }
    picked
}

fn recipe_prompt(cart_items: &[String]) -> String {
    format!(
        r#"A customer has these bakery items in their cart: {items}

Suggest 3 creative recipes or meal ideas that pair well with these items.
Keep them practical and family-friendly, and let the fresh bread and baked
goods shine.

Answer with ONLY a JSON array in this shape:
[
  {{
    "name": "Recipe Name",
    "description": "One or two sentences",
    "pairing_reason": "Why it pairs with the cart",
    "difficulty": "Easy | Medium | Hard",
    "prep_time": "30 minutes",
    "ingredients_needed": ["ingredient"],
    "serving_suggestion": "How to serve"
  }}
]"#,
        items = cart_items.join(", ")
    )
}

fn recommendation_prompt(preferences: &[String], available: &[String]) -> String {
    format!(
        r#"A customer has previously enjoyed these bakery items: {preferences}

Available products: {available}

Pick the {MAX_RECOMMENDATIONS} available products they are most likely to enjoy,
considering flavour, product type and complementary items.

Answer with ONLY a JSON array of product names copied exactly from the
available list, for example ["Product A", "Product B"]."#,
        preferences = preferences.join(", "),
        available = available.join(", ")
    )
}

fn generate_recipe_prompt(ingredients: &[String], dietary: &str) -> String {
    format!(
        r#"Create a recipe using these bakery items and common ingredients: {ingredients}
Dietary preference: {dietary}

Answer with ONLY a JSON object in this shape:
{{
  "name": "Recipe Name",
  "servings": 4,
  "prep_time": "15 min",
  "cook_time": "30 min",
  "ingredients": [{{"item": "ingredient", "amount": "measurement"}}],
  "instructions": ["Step 1", "Step 2"],
  "nutritional_info": "Brief nutritional highlights",
  "tips": ["Tip 1"]
}}"#,
        ingredients = ingredients.join(", ")
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        strings(items)
    }

    #[tokio::test]
    async fn test_empty_cart_gets_prompt_message() {
        let result = recipe_suggestions(None, &[]).await;
        assert!(result.recipes.is_empty());
        assert_eq!(
            result.message,
            "Add items to your cart to get recipe suggestions!"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_model_returns_no_recipes() {
        let result = recipe_suggestions(None, &names(&["Sourdough"])).await;
        assert!(result.recipes.is_empty());
        assert_eq!(result.message, "AI service not configured");
    }

    #[test]
    fn test_fallback_recipes() {
        let recipes = fallback_recipes();
        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[0].name, "Classic French Toast");
        assert_eq!(recipes[1].difficulty, "Medium");
        assert!(recipes.iter().all(|r| !r.ingredients_needed.is_empty()));
    }

    #[tokio::test]
    async fn test_recommendations_without_model_take_first_three() {
        let available = names(&["Rye", "Baguette", "Croissant", "Focaccia"]);
        let picks = product_recommendations(None, &names(&["Rye"]), &available).await;
        assert_eq!(picks, names(&["Rye", "Baguette", "Croissant"]));

        let short = names(&["Rye"]);
        assert_eq!(product_recommendations(None, &[], &short).await, short);
    }

    #[test]
    fn test_pick_recommendations_filters_unknown_names() {
        let available = names(&["Rye", "Baguette", "Croissant", "Focaccia", "Brioche", "Bagel"]);
        let picks = pick_recommendations(
            names(&["Croissant", "Moon Cake", "Croissant", "Rye", "Brioche", "Bagel", "Focaccia", "Baguette"]),
            &available,
        );
        assert_eq!(picks, names(&["Croissant", "Rye", "Brioche", "Bagel", "Focaccia"]));
    }

    #[test]
    fn test_pick_recommendations_all_unknown() {
        let available = names(&["Rye", "Baguette"]);
        assert_eq!(pick_recommendations(names(&["Pizza"]), &available), available);
    }

    #[test]
    fn test_model_recipe_json_parses() {
        let text = "```json\n[{\"name\": \"Bruschetta\", \"difficulty\": \"Easy\"}]\n```";
        let recipes: Vec<RecipeSuggestion> = client::parse_model_json(text).unwrap();
        assert_eq!(recipes[0].name, "Bruschetta");
        assert!(recipes[0].ingredients_needed.is_empty());
    }

    #[test]
    fn test_generated_recipe_parses() {
        let text = r#"{"name": "Garlic Bread", "servings": 4,
            "ingredients": [{"item": "Baguette", "amount": "1"}],
            "instructions": ["Slice", "Bake"]}"#;
        let recipe: GeneratedRecipe = client::parse_model_json(text).unwrap();
        assert_eq!(recipe.servings, Some(4));
        assert_eq!(recipe.ingredients[0].item, "Baguette");
        assert_eq!(recipe.instructions.len(), 2);
    }

    #[test]
    fn test_prompts_mention_inputs() {
        assert!(recipe_prompt(&names(&["Rye", "Brioche"])).contains("Rye, Brioche"));
        assert!(generate_recipe_prompt(&names(&["Rye"]), "vegan").contains("vegan"));
        assert!(recommendation_prompt(&names(&["Rye"]), &names(&["Bagel"])).contains("Bagel"));
    }
}
