//! Core types for Local Crust.
//!
//! This module provides type-safe wrappers for marketplace domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod rating;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use rating::{Rating, RatingError};
pub use status::*;
