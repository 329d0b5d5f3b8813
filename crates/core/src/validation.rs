//! Request parameter validation.
//!
//! Pure helpers shared by HTTP handlers and the CLI. Callers translate
//! [`ValidationError`] into a client error response.

use serde_json::Value;
use thiserror::Error;

/// Malformed or missing client input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    /// Create a validation error with a client-facing message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Parse a raw ID parameter.
///
/// The value must be present and consist only of ASCII digits. Values that
/// overflow the `SERIAL` column are rejected the same way.
///
/// # Errors
///
/// Returns `ValidationError("Invalid <entity> id")` otherwise.
///
/// # Example
///
/// ```
/// use tinystore_core::parse_id;
///
/// assert_eq!(parse_id(Some("42"), "product").unwrap(), 42);
/// assert!(parse_id(Some("-1"), "product").is_err());
/// assert!(parse_id(None, "product").is_err());
/// ```
pub fn parse_id(raw: Option<&str>, entity: &str) -> Result<i32, ValidationError> {
    let invalid = || ValidationError::new(format!("Invalid {entity} id"));

    let raw = raw.filter(|s| !s.is_empty()).ok_or_else(invalid)?;
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    raw.parse::<i32>().map_err(|_| invalid())
}

/// Return the names of required fields that are missing from a JSON payload.
///
/// A field counts as missing when it is absent or falsy: `null`, `false`,
/// `0`, or an empty string. An empty result means the payload is valid.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tinystore_core::missing_fields;
///
/// let body = json!({ "firstName": "Alice", "lastName": "" });
/// assert_eq!(
///     missing_fields(&body, &["firstName", "lastName", "password"]),
///     vec!["lastName", "password"]
/// );
/// ```
#[must_use]
pub fn missing_fields(payload: &Value, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| payload.get(**field).is_none_or(is_falsy))
        .map(|field| (*field).to_string())
        .collect()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
