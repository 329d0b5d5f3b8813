//! Tinystore Core - Shared types library.
//!
//! This crate provides common types used across all Tinystore components:
//! - `api` - JSON HTTP backend for users, products and orders
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and order statuses
//! - [`validation`] - Request parameter parsing and required-field checks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{ValidationError, missing_fields, parse_id};
