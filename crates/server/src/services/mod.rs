//! Business services and third-party integrations.

pub mod auth;
pub mod email;
pub mod gemini;
pub mod notify;
pub mod orders;
pub mod razorpay;
