//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, password hashing and bearer tokens
//! - `orders` - Order lifecycle (create, add items, change status, read aggregates)

pub mod auth;
pub mod orders;
