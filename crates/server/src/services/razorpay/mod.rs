//! Razorpay payment gateway integration.
//!
//! Orders are created in paise when a customer checks out, and the checkout
//! signature is verified with the key secret before a payment is recorded.

mod client;
mod error;

pub use client::{GatewayOrder, Payment, RazorpayClient, to_paise};
pub use error::RazorpayError;
