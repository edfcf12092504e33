//! Record model
//!
//! A record is one JSON object describing a single segment of a story. Only
//! four fields carry meaning (see [`FieldNames`](crate::FieldNames)); every
//! other field is opaque and only matters for duplicate comparison.
//!
//! An absent field and an explicit `null` read the same way: helpers here
//! take `Option<&Value>` and treat `None` and `Some(Value::Null)` alike.

use serde_json::{Map, Value};

/// One loosely-typed segment record
pub type Record = Map<String, Value>;

/// Look up a field by name.
pub fn field<'a>(record: &'a Record, name: &str) -> Option<&'a Value> {
    record.get(name)
}

/// Return the document id if it is usable.
///
/// Usable means: a JSON string that is non-empty after trimming whitespace.
/// Booleans, numbers, null and containers are never usable ids. The returned
/// id is the raw string, untrimmed.
pub fn valid_document_id(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(id)) if !id.trim().is_empty() => Some(id.as_str()),
        _ => None,
    }
}

/// Short name of the observed JSON type, used in validation messages.
pub fn value_type_name(value: Option<&Value>) -> &'static str {
    match value {
        None | Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "bool",
        Some(Value::Number(n)) if n.is_f64() => "float",
        Some(Value::Number(_)) => "int",
        Some(Value::String(_)) => "str",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Human-readable form of a value: strings verbatim, null/absent as `null`,
/// everything else as compact JSON.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_document_id_accepts_non_blank_strings() {
        assert_eq!(valid_document_id(Some(&json!("DOC1"))), Some("DOC1"));
        assert_eq!(valid_document_id(Some(&json!(" DOC1 "))), Some(" DOC1 "));
    }

    #[test]
    fn test_valid_document_id_rejects_everything_else() {
        assert_eq!(valid_document_id(None), None);
        assert_eq!(valid_document_id(Some(&Value::Null)), None);
        assert_eq!(valid_document_id(Some(&json!(""))), None);
        assert_eq!(valid_document_id(Some(&json!("  \t"))), None);
        assert_eq!(valid_document_id(Some(&json!(true))), None);
        assert_eq!(valid_document_id(Some(&json!(123))), None);
        assert_eq!(valid_document_id(Some(&json!(456.789))), None);
        assert_eq!(valid_document_id(Some(&json!(["DOC1"]))), None);
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(value_type_name(None), "null");
        assert_eq!(value_type_name(Some(&json!(true))), "bool");
        assert_eq!(value_type_name(Some(&json!(3))), "int");
        assert_eq!(value_type_name(Some(&json!(3.5))), "float");
        assert_eq!(value_type_name(Some(&json!("x"))), "str");
        assert_eq!(value_type_name(Some(&json!([1]))), "array");
        assert_eq!(value_type_name(Some(&json!({"a": 1}))), "object");
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(Some(&json!("kjasd"))), "kjasd");
        assert_eq!(display_value(Some(&json!("   "))), "   ");
        assert_eq!(display_value(Some(&json!(true))), "true");
        assert_eq!(display_value(None), "null");
        assert_eq!(display_value(Some(&json!(5.5))), "5.5");
        assert_eq!(display_value(Some(&json!({"nested": "value"}))), r#"{"nested":"value"}"#);
    }

    #[test]
    fn test_field_lookup() {
        let record: Record = serde_json::from_value(json!({"A": 1})).unwrap();
        assert_eq!(field(&record, "A"), Some(&json!(1)));
        assert_eq!(field(&record, "B"), None);
    }
}
