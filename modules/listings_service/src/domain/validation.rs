//! Request body validation

use crate::contract::ListingsError;
use serde_json::{Map, Value};

/// Parse a request body that must be a JSON object.
///
/// An empty body, invalid JSON or any non-object value is a malformed request.
pub fn parse_json_object(body: &[u8]) -> Result<Map<String, Value>, ListingsError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        _ => Err(ListingsError::MalformedRequest),
    }
}

/// Check required fields in order; the first one absent (or null) is reported.
pub fn require_fields(object: &Map<String, Value>, required: &[&str]) -> Result<(), ListingsError> {
    match required
        .iter()
        .find(|field| object.get(**field).map_or(true, Value::is_null))
    {
        Some(field) => Err(ListingsError::missing(*field)),
        None => Ok(()),
    }
}
