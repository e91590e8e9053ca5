use crate::error::FieldError;
use serde_json::Value;

/// Whether `required` and `additionalProperties: false` are enforced.
/// Partial mode is used for graph updates: it strips `required` and forces
/// `additionalProperties: true`, but still type/enum-checks any field that
/// is present (spec §4.K).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Full,
    Partial,
}

/// Validates `document` against the JSON-Schema-subset `schema`, collecting
/// every violation rather than failing fast (so a caller can report them
/// all at once). `path` is the dotted field path accumulated so far.
pub fn validate(schema: &Value, document: &Value, mode: ValidationMode, path: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    validate_into(schema, document, mode, path, &mut errors);
    errors
}

fn validate_into(schema: &Value, document: &Value, mode: ValidationMode, path: &str, errors: &mut Vec<FieldError>) {
    let Some(schema) = schema.as_object() else {
        return;
    };

    if let Some(expected) = schema.get("type") {
        if !type_matches(expected, document) {
            errors.push(FieldError::new(
                display_path(path),
                format!("expected type {}, got {}", describe_type(expected), json_type_name(document)),
            ));
            return;
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(document) {
            errors.push(FieldError::new(display_path(path), format!("value {document} is not one of the allowed enum values")));
        }
    }

    let Some(object) = document.as_object() else {
        return;
    };

    if mode == ValidationMode::Full {
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for field in required {
                if let Some(name) = field.as_str() {
                    if !object.contains_key(name) {
                        let field_path = if path.is_empty() { name.to_string() } else { format!("{path}.{name}") };
                        errors.push(FieldError::new(field_path, format!("missing required field `{name}`")));
                    }
                }
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    if let Some(properties) = properties {
        for (key, value) in object {
            if let Some(field_schema) = properties.get(key) {
                let child_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                validate_into(field_schema, value, mode, &child_path, errors);
            }
        }
    }

    let additional_allowed = match mode {
        ValidationMode::Partial => true,
        ValidationMode::Full => schema.get("additionalProperties").and_then(Value::as_bool).unwrap_or(true),
    };
    if !additional_allowed {
        let known = properties.map(|p| p.keys().collect::<Vec<_>>()).unwrap_or_default();
        for key in object.keys() {
            if !known.contains(&key) {
                errors.push(FieldError::new(display_path(path), format!("unexpected field `{key}`")));
            }
        }
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

fn type_matches(expected: &Value, document: &Value) -> bool {
    match expected {
        Value::String(name) => json_type_name(document) == name || (name == "integer" && document.is_i64()) ,
        Value::Array(names) => names.iter().any(|n| type_matches(n, document)),
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(" | "),
        _ => "unknown".to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
