use crate::error::SchemaValidationError;
use crate::validator::{validate, ValidationMode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Collection name -> optional JSON Schema, mirroring the original
/// `NODE_SCHEMA_REGISTRY` map (collections without a schema pass silently).
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Option<Value>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self { schemas: RwLock::new(HashMap::new()) }
    }

    pub fn register(&self, collection: impl Into<String>, schema: Value) {
        self.schemas.write().expect("schema registry lock poisoned").insert(collection.into(), Some(schema));
    }

    /// Explicitly marks a collection as schema-less (always passes).
    pub fn register_unschemad(&self, collection: impl Into<String>) {
        self.schemas.write().expect("schema registry lock poisoned").insert(collection.into(), None);
    }

    pub fn schema_for(&self, collection: &str) -> Option<Value> {
        self.schemas.read().expect("schema registry lock poisoned").get(collection).cloned().flatten()
    }

    /// Validates `document` against `collection`'s schema, if one is
    /// registered. The internal `_id` composite field is stripped before
    /// validation (spec §4.K); collections with no registered schema pass
    /// silently.
    pub fn validate(&self, collection: &str, document: &Value, mode: ValidationMode) -> Result<(), SchemaValidationError> {
        let Some(schema) = self.schema_for(collection) else {
            return Ok(());
        };

        let mut stripped = document.clone();
        if let Some(object) = stripped.as_object_mut() {
            object.remove("_id");
        }

        let errors = validate(&schema, &stripped, mode, "");
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError { collection: collection.to_string(), errors })
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unregistered_collection_passes_silently() {
        let registry = SchemaRegistry::new();
        assert!(registry.validate("drives", &json!({"anything": true}), ValidationMode::Full).is_ok());
    }

    #[test]
    fn strips_id_before_validating_additional_properties() {
        let registry = SchemaRegistry::new();
        registry.register(
            "records",
            json!({"type": "object", "additionalProperties": false, "properties": {"name": {"type": "string"}}}),
        );
        let document = json!({"_id": "records/123", "name": "doc"});
        assert!(registry.validate("records", &document, ValidationMode::Full).is_ok());
    }

    #[test]
    fn registered_schema_rejects_invalid_document() {
        let registry = SchemaRegistry::new();
        registry.register("records", json!({"type": "object", "required": ["name"]}));
        let result = registry.validate("records", &json!({}), ValidationMode::Full);
        assert!(result.is_err());
    }

    #[test]
    fn missing_required_field_error_is_qualified_to_the_field_path() {
        let registry = SchemaRegistry::new();
        registry.register("records", json!({"type": "object", "required": ["org_id"]}));
        let error = registry.validate("records", &json!({}), ValidationMode::Full).unwrap_err();
        assert_eq!(error.collection, "records");
        assert_eq!(error.errors[0].path, "org_id");
    }
}
