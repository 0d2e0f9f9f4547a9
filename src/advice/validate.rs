//! Response validation.
//!
//! Parses the endpoint's raw text as JSON and checks it against the advice
//! type's declared schema. Models wrap JSON in markdown fences often enough
//! that one leading/trailing fence is stripped before parsing; nothing beyond
//! that is repaired. Missing declared fields are accepted (the UI renders
//! them as absent); a present field of the wrong primitive type is not.

use super::schema::{FieldKind, Schema};
use crate::error::ValidateError;
use serde_json::Value;

/// Validate raw response text against a schema.
///
/// Never panics: any malformed input comes back as a [`ValidateError`].
pub fn validate(raw: &str, schema: &Schema) -> Result<Value, ValidateError> {
    let text = strip_code_fence(raw);
    let value: Value =
        serde_json::from_str(text).map_err(|e| ValidateError::Json(e.to_string()))?;

    match (&schema.root, &value) {
        (FieldKind::Object(fields), Value::Object(_)) => {
            check_object(&value, fields, "")?;
        }
        (FieldKind::Array(item), Value::Array(elements)) => {
            for (index, element) in elements.iter().enumerate() {
                check_value(element, item, &format!("[{index}]"))?;
            }
        }
        (root, other) => {
            return Err(ValidateError::TopLevel {
                expected: root.name(),
                actual: json_type_name(other),
            });
        }
    }

    Ok(value)
}

/// Strip one leading and one trailing markdown code fence (``` or ```json).
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // The info string ("json", "JSON", empty) runs to the first newline.
    let Some(newline) = rest.find('\n') else {
        return trimmed;
    };
    let body = rest[newline + 1..].trim_end();
    body.strip_suffix("```").map_or(body, str::trim_end).trim()
}

fn check_object(value: &Value, fields: &[super::schema::FieldSpec], path: &str) -> Result<(), ValidateError> {
    for field in fields {
        let field_path = if path.is_empty() {
            field.name.to_string()
        } else {
            format!("{path}.{}", field.name)
        };
        match value.get(field.name) {
            // Absent and null both read as "not provided" downstream.
            None | Some(Value::Null) => {}
            Some(present) => check_value(present, &field.kind, &field_path)?,
        }
    }
    Ok(())
}

fn check_value(value: &Value, kind: &FieldKind, path: &str) -> Result<(), ValidateError> {
    match (kind, value) {
        (FieldKind::String, Value::String(_))
        | (FieldKind::Number, Value::Number(_))
        | (FieldKind::Boolean, Value::Bool(_)) => Ok(()),
        (FieldKind::Array(item), Value::Array(elements)) => {
            for (index, element) in elements.iter().enumerate() {
                check_value(element, item, &format!("{path}[{index}]"))?;
            }
            Ok(())
        }
        (FieldKind::Object(fields), Value::Object(_)) => check_object(value, fields, path),
        (expected, actual) => Err(ValidateError::FieldType {
            path: path.to_string(),
            expected: expected.name(),
            actual: json_type_name(actual),
        }),
    }
}

#[must_use]
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
