//! End-to-end marketplace journeys over HTTP.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`crust-cli migrate`)
//! - The server running (`cargo run -p local-crust-server`)
//! - An admin account whose credentials are in `CRUST_TEST_ADMIN_USERNAME`
//!   and `CRUST_TEST_ADMIN_PASSWORD`; shops must be verified before they sell
//!
//! Run with: cargo test -p local-crust-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use local_crust_integration_tests::base_url;

struct Session {
    client: Client,
    token: String,
}

impl Session {
    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(format!("{}{path}", base_url()))
            .bearer_auth(&self.token)
            .send()
            .await
            .expect("GET request");
        read(resp).await
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: &Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .request(method, format!("{}{path}", base_url()))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .expect("request");
        read(resp).await
    }
}

async fn read(resp: reqwest::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn post_public(client: &Client, path: &str, body: &Value) -> (StatusCode, Value) {
    let resp = client
        .post(format!("{}{path}", base_url()))
        .json(body)
        .send()
        .await
        .expect("POST request");
    read(resp).await
}

fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

/// Register a shop with one product and return its session and product id.
async fn register_baker(client: &Client) -> (Session, i64) {
    let (status, body) = post_public(
        client,
        "/api/baker/register",
        &json!({
            "email": unique_email("baker"),
            "password": "proof-the-dough",
            "shop_name": "Crumb Theory",
            "owner_name": "Meera Iyer",
            "phone": "9000000001",
            "business_license": "BL-42",
            "tax_id": "GST-42",
            "shop_address": "4 Church Street",
            "city": "Bengaluru",
            "state": "Karnataka",
            "zip_code": "560001",
            "shop_description": "Slow fermented breads",
            "products": [
                {"name": "Seeded Rye", "category": "Bread", "price": 220}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["user"]["baker_profile"]["verified"], false);

    let baker = Session {
        client: client.clone(),
        token: body["token"].as_str().expect("token").to_owned(),
    };
    let (status, body) = baker.get("/api/baker/products").await;
    assert_eq!(status, StatusCode::OK);
    let product_id = body["products"][0]["id"].as_i64().expect("product id");

    (baker, product_id)
}

async fn register_customer(client: &Client) -> Session {
    let (status, body) = post_public(
        client,
        "/api/auth/register",
        &json!({
            "name": "Kabir Shah",
            "email": unique_email("customer"),
            "password": "butter-and-jam",
            "user_type": "customer"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    Session {
        client: client.clone(),
        token: body["token"].as_str().expect("token").to_owned(),
    }
}

async fn order_raw(customer: &Session, product_id: i64) -> (StatusCode, Value) {
    customer
        .send(
            reqwest::Method::POST,
            "/api/orders",
            &json!({
                "items": [{"product_id": product_id, "quantity": 2, "price": 1}],
                "delivery_address": {
                    "street": "9 Lavelle Road",
                    "city": "Bengaluru",
                    "state": "Karnataka",
                    "zip_code": "560001",
                    "phone": "9000000002"
                }
            }),
        )
        .await
}

async fn place_order(customer: &Session, product_id: i64) -> Value {
    let (status, body) = order_raw(customer, product_id).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn admin_session(client: &Client) -> Session {
    let username = std::env::var("CRUST_TEST_ADMIN_USERNAME").expect("admin username");
    let password = std::env::var("CRUST_TEST_ADMIN_PASSWORD").expect("admin password");
    let (status, body) = post_public(
        client,
        "/api/admin/login",
        &json!({"username": username, "password": password}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    Session {
        client: client.clone(),
        token: body["token"].as_str().expect("token").to_owned(),
    }
}

/// Verify the baker's shop through the admin route and return the response body.
async fn verify_shop(admin: &Session, baker: &Session) -> Value {
    let (_, profile) = baker.get("/api/baker/profile").await;
    let baker_id = profile["id"].as_i64().expect("baker id");
    let (status, body) = admin
        .send(
            reqwest::Method::PUT,
            &format!("/api/admin/bakers/{baker_id}/verify"),
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

/// Register a shop and have an admin verify it.
async fn register_verified_baker(client: &Client) -> (Session, i64) {
    let admin = admin_session(client).await;
    let (baker, product_id) = register_baker(client).await;
    verify_shop(&admin, &baker).await;
    (baker, product_id)
}

async fn marketplace_ids(client: &Client) -> Vec<i64> {
    let resp = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("GET products");
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::OK);
    body["products"]
        .as_array()
        .expect("products")
        .iter()
        .filter_map(|p| p["id"].as_i64())
        .collect()
}

// ============================================================================
// Order to review
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server, migrated database and admin credentials"]
async fn test_order_delivery_review_and_reply() {
    let client = Client::new();
    let (baker, product_id) = register_verified_baker(&client).await;
    let customer = register_customer(&client).await;

    let order = place_order(&customer, product_id).await;
    let order_id = order["id"].as_i64().expect("order id");
    assert!(order["order_id"].as_str().expect("number").starts_with("LC"));
    // Catalogue price wins over the client's claimed price
    assert_eq!(order["total_amount"].as_f64(), Some(440.0));
    assert_eq!(order["status"], "pending");

    // Not yet delivered
    let review = json!({"product_id": product_id, "rating": 5, "comment": "Perfect crust"});
    let (status, body) = customer
        .send(reqwest::Method::POST, &format!("/api/orders/{order_id}/review"), &review)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Can only review delivered orders");

    let (status, body) = baker
        .send(
            reqwest::Method::PUT,
            &format!("/api/baker/orders/{order_id}/status"),
            &json!({"status": "delivered"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["order"]["previous_status"], "pending");

    let (status, body) = customer
        .send(reqwest::Method::POST, &format!("/api/orders/{order_id}/review"), &review)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Review added successfully");
    let review_id = body["review"]["id"].as_i64().expect("review id");

    // Second submission updates in place
    let (status, body) = customer
        .send(
            reqwest::Method::POST,
            &format!("/api/orders/{order_id}/review"),
            &json!({"product_id": product_id, "rating": 4}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["review"]["id"].as_i64(), Some(review_id));

    let (status, body) = baker.get("/api/baker/reviews").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_reviews"], 1);
    assert_eq!(body["average_rating"].as_f64(), Some(4.0));

    let (status, body) = baker
        .send(
            reqwest::Method::POST,
            &format!("/api/baker/reviews/{review_id}/reply"),
            &json!({"reply": "Thank you for the kind words!"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // One notice for the status change, one for the reply
    let (_, body) = customer.get("/api/notifications/unread-count").await;
    assert_eq!(body["count"], 2);
    let (status, _) = customer
        .send(reqwest::Method::PUT, "/api/notifications/mark-all-read", &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = customer.get("/api/notifications/unread-count").await;
    assert_eq!(body["count"], 0);

    let (status, body) = customer
        .client
        .get(format!("{}/api/products/{product_id}/reviews", base_url()))
        .send()
        .await
        .map(|r| (r.status(), r))
        .expect("GET reviews");
    assert_eq!(status, StatusCode::OK);
    let body: Value = body.json().await.expect("json");
    assert_eq!(body["reviews"][0]["baker_reply"], "Thank you for the kind words!");
}

#[tokio::test]
#[ignore = "Requires running server, migrated database and admin credentials"]
async fn test_orders_are_private_to_their_customer() {
    let client = Client::new();
    let (_baker, product_id) = register_verified_baker(&client).await;
    let owner = register_customer(&client).await;
    let stranger = register_customer(&client).await;

    let order = place_order(&owner, product_id).await;
    let order_id = order["id"].as_i64().expect("order id");

    let (status, _) = owner.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = stranger.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized");

    let (_, body) = stranger.get("/api/orders/my-orders").await;
    assert_eq!(body["orders"], json!([]));
}

#[tokio::test]
#[ignore = "Requires running server, migrated database and admin credentials"]
async fn test_order_keeps_price_after_catalogue_change() {
    let client = Client::new();
    let (baker, product_id) = register_verified_baker(&client).await;
    let customer = register_customer(&client).await;

    let order = place_order(&customer, product_id).await;
    let order_id = order["id"].as_i64().expect("order id");
    assert_eq!(order["total_amount"].as_f64(), Some(440.0));

    let (status, body) = baker
        .send(
            reqwest::Method::PUT,
            &format!("/api/baker/products/{product_id}"),
            &json!({"price": 300}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["product"]["price"].as_f64(), Some(300.0));

    let (status, body) = customer.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["items"][0]["price"].as_f64(), Some(220.0));
    assert_eq!(body["total_amount"].as_f64(), Some(440.0));

    // New orders pick up the new price
    let order = place_order(&customer, product_id).await;
    assert_eq!(order["total_amount"].as_f64(), Some(600.0));
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_wishlist_add_twice_then_remove() {
    let client = Client::new();
    let (_baker, product_id) = register_baker(&client).await;
    let customer = register_customer(&client).await;

    let path = format!("/api/wishlist/{product_id}");
    let (status, _) = customer.send(reqwest::Method::POST, &path, &json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = customer.send(reqwest::Method::POST, &path, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product already in wishlist");

    let (_, body) = customer.get("/api/wishlist").await;
    assert_eq!(body["wishlist"].as_array().map(Vec::len), Some(1));

    let (status, _) = customer.send(reqwest::Method::DELETE, &path, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = customer.send(reqwest::Method::DELETE, &path, &json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server, migrated database and admin credentials"]
async fn test_admin_verifies_new_shop() {
    let client = Client::new();
    let admin = admin_session(&client).await;
    let (baker, _) = register_baker(&client).await;

    let body = verify_shop(&admin, &baker).await;
    assert_eq!(body["message"], "Baker verified successfully");
    assert_eq!(body["baker"]["verified"], true);

    let (_, profile) = baker.get("/api/baker/profile").await;
    assert_eq!(profile["verified"], true);

    let (status, body) = admin.get("/api/admin/dashboard/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["verified_bakers"].as_i64().expect("verified bakers") >= 1);

    let (status, body) = admin.get("/api/admin/bakers?verified=true&per_page=100").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["total"].as_i64().expect("total") >= 1);
}

#[tokio::test]
#[ignore = "Requires running server, migrated database and admin credentials"]
async fn test_unverified_shop_is_hidden_and_cannot_sell() {
    let client = Client::new();
    let admin = admin_session(&client).await;
    let (baker, product_id) = register_baker(&client).await;
    let customer = register_customer(&client).await;

    assert!(!marketplace_ids(&client).await.contains(&product_id));
    let (status, body) = order_raw(&customer, product_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "Seeded Rye is not available for ordering");
    let (_, body) = customer.get("/api/orders/my-orders").await;
    assert_eq!(body["orders"], json!([]));

    verify_shop(&admin, &baker).await;

    assert!(marketplace_ids(&client).await.contains(&product_id));
    let (status, body) = order_raw(&customer, product_id).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}
