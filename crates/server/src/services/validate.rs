//! Pluggable product input validation.
//!
//! Products are schemaless, but the handful of well-known fields must have
//! the right shape before they reach the store. The rules live behind the
//! [`ProductValidator`] trait so they can be swapped without touching the
//! persistence call; [`FieldRules`] is the default implementation.
//!
//! Browser forms submit every value as a string, so [`coerce_known_fields`]
//! normalizes form input into typed JSON first. Unknown fields are never
//! coerced or rejected.

use serde_json::{Map, Number, Value};
use thiserror::Error;

use bramble_core::{ProductDoc, fields};

/// Form fields coerced from string to number when they parse as one.
const NUMERIC_FIELDS: &[&str] = &[fields::PRICE, fields::RATING, FILTER_VALUE_FIELD];

/// Body field carrying the threshold for the filter routes.
pub const FILTER_VALUE_FIELD: &str = "value";

/// Product input rejected before persistence.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is absent.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A well-known field has the wrong type.
    #[error("field '{field}' must be {expected}")]
    WrongType {
        /// Offending field name.
        field: &'static str,
        /// Human-readable expected type.
        expected: &'static str,
    },
}

/// Validates product documents before they reach the store.
pub trait ProductValidator: Send + Sync {
    /// Check a document destined for create or update.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` describing the first violated rule.
    fn validate_product(&self, doc: &ProductDoc) -> Result<(), ValidationError>;
}

/// Default validation rules.
///
/// - `productID`: required, non-empty string
/// - `price`, `rating`: numeric when present
/// - `featured`: boolean when present
/// - everything else passes through verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldRules;

impl ProductValidator for FieldRules {
    fn validate_product(&self, doc: &ProductDoc) -> Result<(), ValidationError> {
        match doc.get(fields::PRODUCT_ID) {
            None => return Err(ValidationError::MissingField(fields::PRODUCT_ID)),
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(_) => {
                return Err(ValidationError::WrongType {
                    field: fields::PRODUCT_ID,
                    expected: "a non-empty string",
                });
            }
        }

        for field in [fields::PRICE, fields::RATING] {
            if let Some(value) = doc.get(field)
                && !value.is_number()
            {
                return Err(ValidationError::WrongType {
                    field,
                    expected: "a number",
                });
            }
        }

        if let Some(value) = doc.get(fields::FEATURED)
            && !value.is_boolean()
        {
            return Err(ValidationError::WrongType {
                field: fields::FEATURED,
                expected: "a boolean",
            });
        }

        Ok(())
    }
}

/// Normalize form-submitted string values into typed JSON.
///
/// `price`, `rating` and `value` become numbers when they parse as one
/// (leaving the string in place otherwise, so validation reports it);
/// `featured` becomes a boolean, with checkbox `"on"` counting as true.
#[must_use]
pub fn coerce_known_fields(mut map: Map<String, Value>) -> Map<String, Value> {
    for field in NUMERIC_FIELDS {
        if let Some(Value::String(s)) = map.get(*field)
            && let Ok(n) = s.trim().parse::<f64>()
            && let Some(number) = Number::from_f64(n)
        {
            map.insert((*field).to_string(), Value::Number(number));
        }
    }

    if let Some(Value::String(s)) = map.get(fields::FEATURED) {
        let coerced = match s.trim() {
            "true" | "on" => Some(true),
            "false" | "" => Some(false),
            _ => None,
        };
        if let Some(flag) = coerced {
            map.insert(fields::FEATURED.to_string(), Value::Bool(flag));
        }
    }

    map
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> ProductDoc {
        ProductDoc::try_from(value).unwrap()
    }

    fn form(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
            .collect()
    }

    #[test]
    fn test_valid_product_passes() {
        let rules = FieldRules;
        let d = doc(json!({"productID": "p1", "price": 10, "rating": 4.5, "featured": true}));
        assert!(rules.validate_product(&d).is_ok());
    }

    #[test]
    fn test_product_id_required() {
        let rules = FieldRules;
        assert!(matches!(
            rules.validate_product(&doc(json!({"price": 10}))),
            Err(ValidationError::MissingField("productID"))
        ));
        assert!(matches!(
            rules.validate_product(&doc(json!({"productID": ""}))),
            Err(ValidationError::WrongType { .. })
        ));
        assert!(matches!(
            rules.validate_product(&doc(json!({"productID": 7}))),
            Err(ValidationError::WrongType { .. })
        ));
    }

    #[test]
    fn test_numeric_fields_checked_only_when_present() {
        let rules = FieldRules;
        assert!(rules.validate_product(&doc(json!({"productID": "p1"}))).is_ok());
        assert!(matches!(
            rules.validate_product(&doc(json!({"productID": "p1", "price": "ten"}))),
            Err(ValidationError::WrongType { field: "price", .. })
        ));
        assert!(matches!(
            rules.validate_product(&doc(json!({"productID": "p1", "rating": []}))),
            Err(ValidationError::WrongType { field: "rating", .. })
        ));
    }

    #[test]
    fn test_featured_must_be_boolean() {
        let rules = FieldRules;
        assert!(matches!(
            rules.validate_product(&doc(json!({"productID": "p1", "featured": "yes"}))),
            Err(ValidationError::WrongType { field: "featured", .. })
        ));
    }

    #[test]
    fn test_arbitrary_fields_ignored() {
        let rules = FieldRules;
        let d = doc(json!({"productID": "p1", "color": 42, "tags": ["a", "b"]}));
        assert!(rules.validate_product(&d).is_ok());
    }

    #[test]
    fn test_coerce_numeric_fields() {
        let map = coerce_known_fields(form(&[("price", "9.99"), ("rating", "4"), ("value", "5")]));
        assert_eq!(map.get("price"), Some(&json!(9.99)));
        assert_eq!(map.get("rating"), Some(&json!(4.0)));
        assert_eq!(map.get("value"), Some(&json!(5.0)));
    }

    #[test]
    fn test_coerce_leaves_unparseable_strings() {
        let map = coerce_known_fields(form(&[("price", "ten")]));
        assert_eq!(map.get("price"), Some(&json!("ten")));
    }

    #[test]
    fn test_coerce_featured() {
        let map = coerce_known_fields(form(&[("featured", "on")]));
        assert_eq!(map.get("featured"), Some(&json!(true)));

        let map = coerce_known_fields(form(&[("featured", "false")]));
        assert_eq!(map.get("featured"), Some(&json!(false)));

        // Unrecognized strings are left for validation to reject
        let map = coerce_known_fields(form(&[("featured", "maybe")]));
        assert_eq!(map.get("featured"), Some(&json!("maybe")));
    }

    #[test]
    fn test_coerce_ignores_unknown_fields() {
        let map = coerce_known_fields(form(&[("color", "7")]));
        assert_eq!(map.get("color"), Some(&json!("7")));
    }
}
