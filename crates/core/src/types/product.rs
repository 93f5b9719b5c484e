//! Product document type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known product field names.
///
/// Products are schemaless, but a handful of fields carry meaning for
/// listing and filtering. Everything else is stored verbatim.
pub mod fields {
    /// Externally supplied product identifier (not unique in the store).
    pub const PRODUCT_ID: &str = "productID";
    /// Numeric price.
    pub const PRICE: &str = "price";
    /// Numeric rating.
    pub const RATING: &str = "rating";
    /// Promotional listing flag.
    pub const FEATURED: &str = "featured";
}

/// Errors that can occur when building a [`ProductDoc`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ProductDocError {
    /// The value is not a JSON object.
    #[error("product must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// A schemaless product document.
///
/// Products are JSON objects with arbitrary fields. The store enforces no
/// schema; the well-known fields in [`fields`] are read through typed
/// accessors that return `None` when a field is missing or has the wrong
/// type, so malformed documents degrade to "does not match" rather than
/// erroring.
///
/// ## Examples
///
/// ```
/// use bramble_core::ProductDoc;
/// use serde_json::json;
///
/// let doc = ProductDoc::try_from(json!({
///     "productID": "p1",
///     "price": 10,
///     "featured": true,
///     "color": "green",
/// }))
/// .unwrap();
///
/// assert_eq!(doc.product_id(), Some("p1"));
/// assert_eq!(doc.price(), Some(10.0));
/// assert_eq!(doc.rating(), None);
/// assert!(doc.featured());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductDoc(Map<String, Value>);

impl ProductDoc {
    /// Create a document from a JSON object map.
    #[must_use]
    pub const fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the externally supplied product identifier, if present and a
    /// string.
    #[must_use]
    pub fn product_id(&self) -> Option<&str> {
        self.0.get(fields::PRODUCT_ID).and_then(Value::as_str)
    }

    /// Returns the price, if present and numeric.
    #[must_use]
    pub fn price(&self) -> Option<f64> {
        self.0.get(fields::PRICE).and_then(Value::as_f64)
    }

    /// Returns the rating, if present and numeric.
    #[must_use]
    pub fn rating(&self) -> Option<f64> {
        self.0.get(fields::RATING).and_then(Value::as_f64)
    }

    /// Returns true when the document is flagged for promotional listing.
    ///
    /// Missing or non-boolean `featured` fields count as not featured.
    #[must_use]
    pub fn featured(&self) -> bool {
        self.0
            .get(fields::FEATURED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns an arbitrary field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a reference to the underlying object map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the document and returns it as a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for ProductDoc {
    type Error = ProductDocError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(ProductDocError::NotAnObject("null")),
            Value::Bool(_) => Err(ProductDocError::NotAnObject("boolean")),
            Value::Number(_) => Err(ProductDocError::NotAnObject("number")),
            Value::String(_) => Err(ProductDocError::NotAnObject("string")),
            Value::Array(_) => Err(ProductDocError::NotAnObject("array")),
        }
    }
}

impl From<ProductDoc> for Value {
    fn from(doc: ProductDoc) -> Self {
        doc.into_value()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> ProductDoc {
        ProductDoc::try_from(value).unwrap()
    }

    #[test]
    fn test_try_from_rejects_non_objects() {
        assert!(ProductDoc::try_from(json!(null)).is_err());
        assert!(ProductDoc::try_from(json!(42)).is_err());
        assert!(ProductDoc::try_from(json!("p1")).is_err());
        assert!(ProductDoc::try_from(json!([1, 2])).is_err());
    }

    #[test]
    fn test_product_id() {
        assert_eq!(doc(json!({"productID": "p1"})).product_id(), Some("p1"));
        assert_eq!(doc(json!({})).product_id(), None);
        // Non-string ids are treated as absent
        assert_eq!(doc(json!({"productID": 7})).product_id(), None);
    }

    #[test]
    fn test_price_accepts_integers_and_floats() {
        assert_eq!(doc(json!({"price": 10})).price(), Some(10.0));
        assert_eq!(doc(json!({"price": 9.99})).price(), Some(9.99));
        assert_eq!(doc(json!({"price": "10"})).price(), None);
        assert_eq!(doc(json!({})).price(), None);
    }

    #[test]
    fn test_rating() {
        assert_eq!(doc(json!({"rating": 4.5})).rating(), Some(4.5));
        assert_eq!(doc(json!({"rating": true})).rating(), None);
    }

    #[test]
    fn test_featured_defaults_false() {
        assert!(doc(json!({"featured": true})).featured());
        assert!(!doc(json!({"featured": false})).featured());
        assert!(!doc(json!({"featured": "yes"})).featured());
        assert!(!doc(json!({})).featured());
    }

    #[test]
    fn test_arbitrary_fields_preserved() {
        let d = doc(json!({"productID": "p1", "color": "green", "tags": ["a"]}));
        assert_eq!(d.get("color"), Some(&json!("green")));
        assert_eq!(d.get("tags"), Some(&json!(["a"])));
        assert_eq!(d.get("missing"), None);
    }

    #[test]
    fn test_value_roundtrip() {
        let original = json!({"productID": "p1", "price": 10, "featured": true});
        let d = doc(original.clone());
        assert_eq!(d.into_value(), original);
    }

    #[test]
    fn test_serde_transparent() {
        let d = doc(json!({"productID": "p1"}));
        let serialized = serde_json::to_value(&d).unwrap();
        assert_eq!(serialized, json!({"productID": "p1"}));

        let back: ProductDoc = serde_json::from_value(json!({"price": 3})).unwrap();
        assert_eq!(back.price(), Some(3.0));
    }
}
