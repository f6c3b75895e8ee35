use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use super::ComponentMetadata;

/// The published JSON schema for `<Name>.meta.json`.
///
/// Derived from the Rust types, plus the one cross-field rule a schema can
/// express: a record with `externalMapping` must carry at least one
/// migration example.
pub fn metadata_schema() -> Value {
    let root = schemars::schema_for!(ComponentMetadata);
    let mut schema = serde_json::to_value(root).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut schema {
        map.insert(
            "dependencies".to_string(),
            json!({
                "externalMapping": {
                    "required": ["migrationExamples"],
                    "properties": {
                        "migrationExamples": { "type": "array", "minItems": 1 }
                    }
                }
            }),
        );
    }
    schema
}

pub struct MetadataValidator {
    validator: jsonschema::Validator,
}

impl MetadataValidator {
    pub fn new() -> Result<Self> {
        let schema = metadata_schema();
        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| anyhow!("invalid metadata schema: {e}"))?;
        Ok(Self { validator })
    }

    /// Every violation as `<instance path>: <message>`.
    pub fn validate(&self, instance: &Value) -> Vec<String> {
        self.violations(instance, true)
    }

    /// Violations of the per-field rules only; the `externalMapping`
    /// dependency is left to the caller.
    pub fn validate_fields(&self, instance: &Value) -> Vec<String> {
        self.violations(instance, false)
    }

    fn violations(&self, instance: &Value, cross_field: bool) -> Vec<String> {
        self.validator
            .iter_errors(instance)
            .filter(|e| cross_field || !e.schema_path.to_string().starts_with("/dependencies"))
            .map(|e| {
                let path = e.instance_path.to_string();
                let path = if path.is_empty() { "/".to_string() } else { path };
                format!("{path}: {e}")
            })
            .collect()
    }
}
