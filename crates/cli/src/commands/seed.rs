//! Seed the product catalog from a YAML file.
//!
//! The file is a list of products:
//!
//! ```yaml
//! - name: Laptop
//!   price: 999.99
//!   category: electronics
//! - name: Desk Lamp
//!   price: 24.5
//!   category: home
//! ```
//!
//! Every entry is validated with the same rules as `POST /api/products`
//! before the database is touched.

use std::path::Path;

use thiserror::Error;
use tracing::{error, info};

use tinystore_api::config::{ConfigError, get_database_url};
use tinystore_api::db::{self, ProductRepository, RepositoryError};
use tinystore_api::models::NewProduct;
use tinystore_api::routes::products::validate_new_product;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Catalog file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Catalog file could not be read.
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not a YAML list.
    #[error("Invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// One or more entries failed validation.
    #[error("{} validation errors found", .0.len())]
    Invalid(Vec<String>),

    /// Configuration error (missing database URL).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Insert failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Parse and validate a YAML catalog.
///
/// # Errors
///
/// Returns `SeedError::Yaml` if the document is not a list, and
/// `SeedError::Invalid` listing every entry that fails validation.
pub fn parse_catalog(content: &str) -> Result<Vec<NewProduct>, SeedError> {
    let entries: Vec<serde_json::Value> = serde_yaml::from_str(content)?;

    let mut products = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match validate_new_product(entry) {
            Ok(product) => products.push(product),
            Err(e) => errors.push(format!("entry {}: {e}", index + 1)),
        }
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(SeedError::Invalid(errors))
    }
}

/// Insert the products from a catalog file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog
/// * `clear_existing` - If true, delete every existing product first
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, or if database
/// operations fail.
pub async fn products(file_path: &str, clear_existing: bool) -> Result<usize, SeedError> {
    dotenvy::dotenv().ok();

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading product catalog");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog = match parse_catalog(&content) {
        Ok(catalog) => catalog,
        Err(SeedError::Invalid(errors)) => {
            error!("Catalog validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(SeedError::Invalid(errors));
        }
        Err(e) => return Err(e),
    };

    info!(products = catalog.len(), "Catalog validated");

    let database_url = get_database_url("API_DATABASE_URL")?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = ProductRepository::new(&pool);
    if clear_existing {
        let removed = repo.delete_all().await?;
        info!(removed, "Cleared existing products");
    }

    for product in &catalog {
        let created = repo.create(product).await?;
        info!(id = %created.id, name = %created.name, price = %created.price, "Inserted product");
    }

    info!("Seeding complete! {} products inserted", catalog.len());
    Ok(catalog.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog(
            r"
- name: Laptop
  price: 999.99
  category: electronics
- name: Desk Lamp
  price: 24.5
  category: home
",
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].name, "Laptop");
        assert_eq!(catalog[1].price.to_string(), "24.5");
    }

    #[test]
    fn test_parse_catalog_reports_every_bad_entry() {
        let err = parse_catalog(
            r"
- name: Laptop
  price: -3
  category: electronics
- name: Mouse
  price: 19.99
  category: electronics
- name: Cable
  category: electronics
",
        )
        .unwrap_err();

        let SeedError::Invalid(errors) = err else {
            panic!("expected validation errors, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("entry 1:"));
        assert!(errors[1].starts_with("entry 3:"));
    }

    #[test]
    fn test_parse_catalog_rejects_non_list() {
        assert!(matches!(
            parse_catalog("name: Laptop"),
            Err(SeedError::Yaml(_))
        ));
    }
}
