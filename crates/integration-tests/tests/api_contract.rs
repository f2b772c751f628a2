//! In-process tests for routing, auth gates and request validation.
//!
//! Every request here is answered before the handler touches the database,
//! so these run without `PostgreSQL`.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use local_crust_core::UserType;
use local_crust_integration_tests::TestApp;

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_liveness() {
    let app = TestApp::new();
    let resp = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text, "ok");
}

#[tokio::test]
async fn test_api_health() {
    let app = TestApp::new();
    let resp = app.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "healthy");
    assert_eq!(resp.body["message"], "Local Crust API is running");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let resp = app.send(Method::GET, "/api/health", None, None).await;
    let id = resp.headers.get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new();
    let resp = app.send(Method::GET, "/api/bread", None, None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Auth gates
// ============================================================================

#[tokio::test]
async fn test_customer_routes_need_token() {
    let app = TestApp::new();
    for (method, uri) in [
        (Method::GET, "/api/orders/my-orders"),
        (Method::GET, "/api/wishlist"),
        (Method::GET, "/api/customer/profile"),
        (Method::GET, "/api/notifications"),
        (Method::GET, "/api/notifications/unread-count"),
    ] {
        let resp = app.send(method, uri, None, None).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(resp.error(), Some("Authorization required"), "{uri}");
    }
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::new();
    let resp = app
        .send(Method::GET, "/api/wishlist", Some("not.a.token"), None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_token_cannot_shop() {
    let app = TestApp::new();
    let token = app.admin_token(1);
    let resp = app
        .send(Method::GET, "/api/orders/my-orders", Some(&token), None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_baker_routes_reject_customers() {
    let app = TestApp::new();
    let token = app.user_token(7, UserType::Customer);
    for uri in [
        "/api/baker/products",
        "/api/baker/dashboard/stats",
        "/api/baker/analytics/revenue-trends",
        "/api/baker/reviews",
    ] {
        let resp = app.send(Method::GET, uri, Some(&token), None).await;
        assert_eq!(resp.status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(resp.error(), Some("Baker access required"), "{uri}");
    }
}

#[tokio::test]
async fn test_admin_routes_need_token() {
    let app = TestApp::new();
    let resp = app
        .send(Method::GET, "/api/admin/dashboard/stats", None, None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error(), Some("No token provided"));
}

#[tokio::test]
async fn test_admin_routes_reject_marketplace_tokens() {
    let app = TestApp::new();
    for user_type in [UserType::Customer, UserType::Baker] {
        let token = app.user_token(3, user_type);
        let resp = app
            .send(Method::GET, "/api/admin/users", Some(&token), None)
            .await;
        assert_eq!(resp.status, StatusCode::FORBIDDEN);
        assert_eq!(resp.error(), Some("Admin access required"));
    }
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_register_requires_fields() {
    let app = TestApp::new();
    let resp = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "asha@example.com", "password": "password123"})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), Some("Missing required field: name"));
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::new();
    let resp = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "asha@example.com"})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), Some("Email and password are required"));
}

#[tokio::test]
async fn test_admin_login_requires_both_fields() {
    let app = TestApp::new();
    let resp = app
        .send(Method::POST, "/api/admin/login", None, Some(json!({})))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), Some("Username and password required"));
}

#[tokio::test]
async fn test_malformed_json_is_a_json_400() {
    let app = TestApp::new();
    let request = axum::http::Request::post("/api/auth/login")
        .header("x-forwarded-for", "198.51.100.24")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"email\":"))
        .unwrap();
    let resp = app.send_raw(request).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.error().is_some());
}

#[tokio::test]
async fn test_blank_profile_name_is_rejected() {
    let app = TestApp::new();
    let token = app.user_token(5, UserType::Customer);
    let resp = app
        .send(
            Method::PUT,
            "/api/customer/profile",
            Some(&token),
            Some(json!({"name": "   "})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), Some("Name cannot be empty"));
}

// ============================================================================
// AI fallbacks (no model configured)
// ============================================================================

#[tokio::test]
async fn test_recipe_suggestions_need_cart() {
    let app = TestApp::new();
    let resp = app
        .send(Method::POST, "/api/ai/recipe-suggestions", None, Some(json!({})))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), Some("Cart items required"));
}

#[tokio::test]
async fn test_recipe_suggestions_for_empty_cart() {
    let app = TestApp::new();
    let resp = app
        .send(
            Method::POST,
            "/api/ai/recipe-suggestions",
            None,
            Some(json!({"cart_items": []})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["recipes"], json!([]));
    assert_eq!(
        resp.body["message"],
        "Add items to your cart to get recipe suggestions!"
    );
}

#[tokio::test]
async fn test_recipe_suggestions_without_model() {
    let app = TestApp::new();
    let resp = app
        .send(
            Method::POST,
            "/api/ai/recipe-suggestions",
            None,
            Some(json!({"cart_items": ["Country Sourdough"]})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "AI service not configured");
}

#[tokio::test]
async fn test_recommendations_without_products() {
    let app = TestApp::new();
    let resp = app
        .send(
            Method::POST,
            "/api/ai/product-recommendations",
            None,
            Some(json!({"user_preferences": ["Rye"]})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["recommendations"], json!([]));
    assert_eq!(resp.body["message"], "No products available");
}

#[tokio::test]
async fn test_recommendations_fall_back_to_first_three() {
    let app = TestApp::new();
    let resp = app
        .send(
            Method::POST,
            "/api/ai/product-recommendations",
            None,
            Some(json!({
                "user_preferences": [],
                "available_products": ["Baguette", "Brioche", "Focaccia", "Rye", "Bagel"]
            })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.body["recommendations"],
        json!(["Baguette", "Brioche", "Focaccia"])
    );
    assert_eq!(resp.body["message"], "Based on your preferences");
}

#[tokio::test]
async fn test_generate_recipe_needs_ingredients() {
    let app = TestApp::new();
    let resp = app
        .send(
            Method::POST,
            "/api/ai/generate-recipe",
            None,
            Some(json!({"ingredients": []})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), Some("Ingredients required"));
}

#[tokio::test]
async fn test_generate_recipe_without_model() {
    let app = TestApp::new();
    let resp = app
        .send(
            Method::POST,
            "/api/ai/generate-recipe",
            None,
            Some(json!({"ingredients": ["flour", "butter"], "dietary": "vegetarian"})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.error(), Some("AI service not configured"));
}
