//! Local Crust Core - Shared domain types.
//!
//! This crate provides the types shared by the Local Crust components:
//! - `server` - Marketplace HTTP API (customers, bakers, admins)
//! - `cli` - Command-line tools for migrations, admin accounts and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no database
//! access, no HTTP clients. Database encoding is opt-in through the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, prices, ratings and status enums
//! - [`humanize`] - Human-friendly time and hour labels used by dashboards

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod humanize;
pub mod types;

pub use types::*;
