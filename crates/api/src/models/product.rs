//! Product domain types.

use serde::{Deserialize, Serialize};

use tinystore_core::{Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: String,
}

/// Fields for creating a product. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub category: String,
}
