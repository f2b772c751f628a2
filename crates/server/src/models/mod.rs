//! Domain models for the marketplace.
//!
//! Models double as JSON response bodies where the shapes line up. Money
//! fields serialize as JSON numbers.

pub mod admin;
pub mod baker;
pub mod notification;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use admin::Admin;
pub use baker::{Baker, BakerCard, NewBaker};
pub use notification::{NewNotification, Notification};
pub use order::{NewOrderItem, Order, OrderItem};
pub use product::{NewProduct, Product, ProductUpdate, ProductWithBaker};
pub use review::Review;
pub use user::User;
