//! Domain models for the store.
//!
//! These types are what handlers serialize; database row types stay private
//! to the repositories in [`crate::db`].

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderItem, OrderLine, OrderWithProducts};
pub use product::{NewProduct, Product};
pub use user::{NewUser, User};
