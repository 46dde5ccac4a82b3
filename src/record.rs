use serde_json::{Map, Value};

/// A vendor record as loaded from an import: an open set of named fields.
///
/// Field order is preserved so enriched output lines up with the source columns.
pub type VendorRecord = Map<String, Value>;

/// Field the identifier is derived from
pub const PROPERTY_CONTRACT_NUMBER: &str = "contractNumber";
/// Field the derived identifier is written to
pub const PROPERTY_OBJECT_ID: &str = "objectID";
/// Field written by the contact splitter for the email half
pub const PROPERTY_BUYER_EMAIL_ADDRESS: &str = "buyerEmailAddress";
/// Field written by the contact splitter for the phone half
pub const PROPERTY_BUYER_PHONE_NUMBER: &str = "buyerPhoneNumber";
/// Field written by the region tagger
pub const PROPERTY_REGION: &str = "region";

/// Truthiness of a field as the import source understands it.
///
/// Absent, `null`, `false`, `""` and numeric zero are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Short description of a value's JSON type, used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
