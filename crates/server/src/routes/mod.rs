//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! Everything below is mounted under `/api`.
//!
//! ```text
//! GET    /health                              - API health message
//!
//! # Auth (rate limited)
//! POST   /auth/register                       - Customer or baker account
//! POST   /auth/login                          - Password login
//! POST   /auth/send-otp                       - Email a one-time code
//! POST   /auth/verify-otp                     - Exchange a code for a token
//!
//! # Marketplace
//! GET    /bakers                              - Verified shops
//! GET    /products                            - In-stock products from verified shops
//! GET    /products/{product_id}/reviews       - Reviews of one product
//!
//! # Shopping (requires a customer or baker token)
//! POST   /orders                              - Place an order
//! GET    /orders/my-orders                    - Own orders with items
//! GET    /orders/{order_id}                   - One order
//! PUT    /orders/{order_id}/payment           - Record a gateway payment
//! POST   /orders/{order_id}/review            - Review a delivered product
//! GET    /payments/{payment_id}               - Gateway payment details
//! GET    /wishlist                            - Saved products
//! POST   /wishlist/{product_id}               - Save a product
//! DELETE /wishlist/{product_id}               - Forget a product
//! GET    /customer/profile                    - Profile with order stats
//! PUT    /customer/profile                    - Change display name
//! PUT    /customer/profile/address            - Save delivery address (POST also accepted)
//! GET    /notifications                       - Inbox
//! GET    /notifications/unread-count          - Unread badge
//! PUT    /notifications/mark-all-read         - Mark everything read
//! PUT    /notifications/{id}/read             - Mark one read
//! DELETE /notifications/{id}                  - Delete one
//! DELETE /notifications                       - Delete all
//!
//! # AI
//! POST   /ai/recipe-suggestions               - Ideas for a cart
//! POST   /ai/product-recommendations          - Picks from a product list
//! POST   /ai/generate-recipe                  - Full recipe from ingredients
//!
//! # Baker (requires baker token)
//! POST   /baker/register                      - Shop with catalogue (rate limited)
//! GET    /baker/profile                       - Own shop
//! GET    /baker/profile/{baker_id}            - Public shop page
//! GET    /baker/products                      - Own catalogue
//! POST   /baker/products                      - Add product
//! PUT    /baker/products/{product_id}         - Edit product
//! DELETE /baker/products/{product_id}         - Remove product
//! GET    /baker/dashboard/stats               - Headline numbers
//! GET    /baker/orders                        - Orders containing own products
//! PUT    /baker/orders/{order_id}/status      - Move an order along
//! GET    /baker/order-history                 - Filtered order history
//! GET    /baker/inventory                     - Stock and 7-day sales
//! GET    /baker/analytics/revenue-trends      - Monthly revenue
//! GET    /baker/analytics/top-products        - Best sellers
//! GET    /baker/analytics/peak-hours          - Orders by hour of day
//! GET    /baker/analytics/category-distribution - Sales by category
//! GET    /baker/analytics/customer-insights   - Repeat customers
//! GET    /baker/reviews                       - Reviews of own products
//! GET    /baker/reviews/stats                 - Rating breakdown
//! POST   /baker/reviews/{review_id}/reply     - Answer a review
//!
//! # Admin (requires admin token, except login)
//! POST   /admin/login                         - Admin login (rate limited)
//! GET    /admin/profile                       - Own admin account
//! GET    /admin/dashboard/stats               - Marketplace totals
//! GET    /admin/users                         - Accounts
//! POST   /admin/users                         - Create customer
//! GET    /admin/users/{id}                    - Account detail
//! DELETE /admin/users/{id}                    - Delete customer
//! GET    /admin/bakers                        - Shops
//! POST   /admin/bakers                        - Create shop
//! GET    /admin/bakers/{id}                   - Shop detail
//! DELETE /admin/bakers/{id}                   - Delete shop and account
//! PUT    /admin/bakers/{id}/verify            - Verify or unverify
//! GET    /admin/products                      - All products
//! DELETE /admin/products/{id}                 - Remove product
//! GET    /admin/orders                        - All orders
//! GET    /admin/orders/{id}                   - Order detail
//! GET    /admin/reviews                       - All reviews
//! DELETE /admin/reviews/{id}                  - Remove review
//! ```

pub mod admin;
pub mod ai;
pub mod auth;
pub mod baker;
pub mod bakers;
pub mod customer;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use serde::Serialize;

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Body of responses that carry nothing but a confirmation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/send-otp", post(auth::send_otp))
        .route("/verify-otp", post(auth::verify_otp))
        .layer(auth_rate_limiter())
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/my-orders", get(orders::mine))
        .route("/{order_id}", get(orders::show))
        .route("/{order_id}/payment", put(orders::record_payment))
        .route("/{order_id}/review", post(reviews::submit))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::marketplace))
        .route("/{product_id}/reviews", get(reviews::for_product))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new().route("/", get(wishlist::index)).route(
        "/{product_id}",
        post(wishlist::add).delete(wishlist::remove),
    )
}

/// Create the customer profile routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(customer::show).put(customer::update))
        .route(
            "/profile/address",
            put(customer::save_address).post(customer::save_address),
        )
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notifications::index).delete(notifications::delete_all),
        )
        .route("/unread-count", get(notifications::unread_count))
        .route("/mark-all-read", put(notifications::mark_all_read))
        .route("/{id}", delete(notifications::delete))
        .route("/{id}/read", put(notifications::mark_read))
}

/// Create the AI routes router.
pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/recipe-suggestions", post(ai::recipe_suggestions))
        .route(
            "/product-recommendations",
            post(ai::product_recommendations),
        )
        .route("/generate-recipe", post(ai::generate_recipe))
}

/// Create the baker routes router.
pub fn baker_routes() -> Router<AppState> {
    let register = Router::new()
        .route("/register", post(bakers::register))
        .layer(auth_rate_limiter());

    Router::new()
        .merge(register)
        .route("/profile", get(bakers::own_profile))
        .route("/profile/{baker_id}", get(bakers::show))
        .route("/products", get(products::own).post(products::create))
        .route(
            "/products/{product_id}",
            put(products::update).delete(products::delete),
        )
        .route("/dashboard/stats", get(baker::dashboard::stats))
        .route("/orders", get(baker::dashboard::orders))
        .route("/orders/{order_id}/status", put(baker::orders::update_status))
        .route("/order-history", get(baker::analytics::order_history))
        .route("/inventory", get(baker::analytics::inventory))
        .nest("/analytics", baker_analytics_routes())
        .route("/reviews", get(baker::reviews::index))
        .route("/reviews/stats", get(baker::reviews::stats))
        .route("/reviews/{review_id}/reply", post(baker::reviews::reply))
}

/// Create the baker analytics routes router.
pub fn baker_analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/revenue-trends", get(baker::analytics::revenue_trends))
        .route("/top-products", get(baker::analytics::top_products))
        .route("/peak-hours", get(baker::analytics::peak_hours))
        .route(
            "/category-distribution",
            get(baker::analytics::category_distribution),
        )
        .route(
            "/customer-insights",
            get(baker::analytics::customer_insights),
        )
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    let login = Router::new()
        .route("/login", post(admin::auth::login))
        .layer(auth_rate_limiter());

    Router::new()
        .merge(login)
        .route("/profile", get(admin::auth::profile))
        .route("/dashboard/stats", get(admin::dashboard::stats))
        .route("/users", get(admin::users::index).post(admin::users::create))
        .route(
            "/users/{id}",
            get(admin::users::show).delete(admin::users::delete),
        )
        .route(
            "/bakers",
            get(admin::bakers::index).post(admin::bakers::create),
        )
        .route(
            "/bakers/{id}",
            get(admin::bakers::show).delete(admin::bakers::delete),
        )
        .route("/bakers/{id}/verify", put(admin::bakers::verify))
        .route("/products", get(admin::catalog::products))
        .route("/products/{id}", delete(admin::catalog::delete_product))
        .route("/orders", get(admin::catalog::orders))
        .route("/orders/{id}", get(admin::catalog::order))
        .route("/reviews", get(admin::catalog::reviews))
        .route("/reviews/{id}", delete(admin::catalog::delete_review))
}

/// Create all routes for the API, to be nested under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::api_health))
        .nest("/auth", auth_routes())
        .route("/bakers", get(bakers::index))
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .route("/payments/{payment_id}", get(orders::payment_details))
        .nest("/wishlist", wishlist_routes())
        .nest("/customer", customer_routes())
        .nest("/notifications", notification_routes())
        .nest("/ai", ai_routes())
        .nest("/baker", baker_routes())
        .nest("/admin", admin_routes())
}
