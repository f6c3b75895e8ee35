//! Component metadata records.
//!
//! One `ComponentMetadata` is persisted per component as `<Name>.meta.json`
//! next to its source. The JSON shape is camelCase and is the published
//! contract checked by `--check` (see `schema.rs`).

pub mod assemble;
pub mod merge;
pub mod schema;

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Base props every component accepts; never surfaced as documented props.
pub const RESERVED_PROPS: [&str; 2] = ["className", "data-testid"];

pub fn is_reserved_prop(name: &str) -> bool {
    RESERVED_PROPS.contains(&name)
}

/// Atomic-design category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Atom,
    Molecule,
    Organism,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Atom, Category::Molecule, Category::Organism];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Atom => "atom",
            Category::Molecule => "molecule",
            Category::Organism => "organism",
        }
    }

    /// Directory name used under the components root (`atoms`, ...).
    pub fn plural(&self) -> &'static str {
        match self {
            Category::Atom => "atoms",
            Category::Molecule => "molecules",
            Category::Organism => "organisms",
        }
    }

    pub fn from_plural(s: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.plural() == s)
    }

    /// Accepts either spelling (`atom` / `atoms`), case-insensitively.
    pub fn parse(s: &str) -> Option<Category> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == lower || c.plural() == lower)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prop default as written in source: `true`, `null`, `12`, `'medium'`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl DefaultValue {
    /// Parse a raw default literal. `undefined` means "no default".
    pub fn parse(raw: &str) -> Option<DefaultValue> {
        let trimmed = raw.trim();
        match trimmed {
            "true" => return Some(DefaultValue::Bool(true)),
            "false" => return Some(DefaultValue::Bool(false)),
            "null" => return Some(DefaultValue::Null),
            "undefined" => return None,
            _ => {}
        }
        if is_plain_number(trimmed) {
            let number = if trimmed.contains('.') {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
            } else {
                trimmed
                    .parse::<i64>()
                    .map(serde_json::Number::from)
                    .or_else(|_| trimmed.parse::<u64>().map(serde_json::Number::from))
                    .ok()
            };
            if let Some(n) = number {
                return Some(DefaultValue::Number(n));
            }
        }
        let unquoted = strip_quotes(trimmed).unwrap_or(trimmed);
        Some(DefaultValue::Text(unquoted.to_string()))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            DefaultValue::Null => serde_json::Value::Null,
            DefaultValue::Bool(b) => serde_json::Value::Bool(*b),
            DefaultValue::Number(n) => serde_json::Value::Number(n.clone()),
            DefaultValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Null => f.write_str("null"),
            DefaultValue::Bool(b) => write!(f, "{b}"),
            DefaultValue::Number(n) => write!(f, "{n}"),
            DefaultValue::Text(s) => f.write_str(s),
        }
    }
}

/// `-?\d+(\.\d+)?`
fn is_plain_number(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let mut parts = s.splitn(2, '.');
    let int = parts.next().unwrap_or("");
    let frac = parts.next();
    !int.is_empty()
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.is_none_or(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

fn strip_quotes(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' || first == b'"') && (last == b'\'' || last == b'"') {
            return Some(&s[1..s.len() - 1]);
        }
    }
    None
}

/// `Option<T>` field where an explicit JSON `null` is a value, not absence.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropDescriptor {
    #[schemars(length(min = 1))]
    pub name: String,
    /// Raw type expression as written in the props interface.
    #[serde(rename = "type")]
    #[schemars(length(min = 1))]
    pub type_expr: String,
    pub required: bool,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<DefaultValue>")]
    pub default_value: Option<DefaultValue>,
    #[schemars(length(min = 1))]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UsageExample {
    #[schemars(length(min = 1))]
    pub title: String,
    #[schemars(length(min = 1))]
    pub description: String,
    #[schemars(length(min = 1))]
    pub code: String,
}

/// Before/after pair showing an external-framework usage and its replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MigrationExample {
    #[serde(alias = "mui")]
    pub before: String,
    #[serde(alias = "designSystem")]
    pub after: String,
    pub description: String,
}

/// Equivalent component in the wrapped third-party UI framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMapping {
    #[schemars(length(min = 1))]
    pub name: String,
    pub package_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Accessibility {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aria_attributes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard_navigation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_reader_notes: Option<String>,
}

impl Accessibility {
    pub fn is_empty(&self) -> bool {
        self.aria_attributes.is_empty()
            && self.keyboard_navigation.is_none()
            && self.screen_reader_notes.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageGuidelines {
    #[serde(default)]
    pub when_to_use: Vec<String>,
    #[serde(default)]
    pub when_not_to_use: Vec<String>,
    #[serde(default)]
    pub best_practices: Vec<String>,
    #[serde(default)]
    pub common_patterns: Vec<String>,
}

impl UsageGuidelines {
    pub fn is_empty(&self) -> bool {
        self.when_to_use.is_empty()
            && self.when_not_to_use.is_empty()
            && self.best_practices.is_empty()
            && self.common_patterns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    #[schemars(length(min = 1))]
    pub name: String,
    #[schemars(length(min = 1))]
    pub display_name: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_mapping: Option<ExternalMapping>,
    #[serde(default)]
    pub props: Vec<PropDescriptor>,
    #[serde(default)]
    pub examples: Vec<UsageExample>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub migration_examples: Vec<MigrationExample>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_components: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Accessibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_guidelines: Option<UsageGuidelines>,
    #[schemars(length(min = 1))]
    pub import_path: String,
    #[schemars(length(min = 1))]
    pub export_path: String,
}

impl ComponentMetadata {
    pub fn prop(&self, name: &str) -> Option<&PropDescriptor> {
        self.props.iter().find(|p| p.name == name)
    }

    pub fn when_to_use(&self) -> &[String] {
        self.usage_guidelines
            .as_ref()
            .map(|g| g.when_to_use.as_slice())
            .unwrap_or(&[])
    }

    pub fn external_name(&self) -> Option<&str> {
        self.external_mapping.as_ref().map(|m| m.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_spellings() {
        assert_eq!(Category::parse("atoms"), Some(Category::Atom));
        assert_eq!(Category::parse("Molecule"), Some(Category::Molecule));
        assert_eq!(Category::parse("organisms"), Some(Category::Organism));
        assert_eq!(Category::parse("widgets"), None);
        assert_eq!(Category::from_plural("atom"), None);
        assert_eq!(Category::Organism.plural(), "organisms");
    }

    #[test]
    fn default_value_literals() {
        assert_eq!(DefaultValue::parse("true"), Some(DefaultValue::Bool(true)));
        assert_eq!(DefaultValue::parse("false"), Some(DefaultValue::Bool(false)));
        assert_eq!(DefaultValue::parse("null"), Some(DefaultValue::Null));
        assert_eq!(DefaultValue::parse("undefined"), None);
        assert_eq!(
            DefaultValue::parse("12"),
            Some(DefaultValue::Number(serde_json::Number::from(12u64)))
        );
        assert_eq!(
            DefaultValue::parse("'medium'"),
            Some(DefaultValue::Text("medium".into()))
        );
        assert_eq!(
            DefaultValue::parse("\"a b\""),
            Some(DefaultValue::Text("a b".into()))
        );
        // Unquoted identifiers are kept verbatim.
        assert_eq!(
            DefaultValue::parse("Size.Medium"),
            Some(DefaultValue::Text("Size.Medium".into()))
        );
    }

    #[test]
    fn fractional_default_is_a_number() {
        match DefaultValue::parse("0.5") {
            Some(DefaultValue::Number(n)) => assert_eq!(n.as_f64(), Some(0.5)),
            other => panic!("expected number, got {other:?}"),
        }
        assert!(matches!(
            DefaultValue::parse("1."),
            Some(DefaultValue::Text(_))
        ));
    }

    #[test]
    fn negative_default_is_a_number() {
        assert_eq!(
            DefaultValue::parse("-8"),
            Some(DefaultValue::Number(serde_json::Number::from(-8i64)))
        );
        match DefaultValue::parse("-0.5") {
            Some(DefaultValue::Number(n)) => assert_eq!(n.as_f64(), Some(-0.5)),
            other => panic!("expected number, got {other:?}"),
        }
        assert!(matches!(
            DefaultValue::parse("-"),
            Some(DefaultValue::Text(_))
        ));
    }

    #[test]
    fn explicit_null_default_survives_roundtrip() {
        let json = r#"{"name":"value","type":"string | null","required":false,"defaultValue":null,"description":"Current value"}"#;
        let prop: PropDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(prop.default_value, Some(DefaultValue::Null));
        let back = serde_json::to_value(&prop).unwrap();
        assert!(back.get("defaultValue").unwrap().is_null());

        let absent = r#"{"name":"value","type":"string","required":true,"description":"Current value"}"#;
        let prop: PropDescriptor = serde_json::from_str(absent).unwrap();
        assert_eq!(prop.default_value, None);
        let back = serde_json::to_value(&prop).unwrap();
        assert!(back.get("defaultValue").is_none());
    }

    #[test]
    fn legacy_migration_example_keys_are_accepted() {
        let json = r#"{"mui":"<Switch />","designSystem":"<Toggle />","description":"Replace Switch"}"#;
        let ex: MigrationExample = serde_json::from_str(json).unwrap();
        assert_eq!(ex.before, "<Switch />");
        assert_eq!(ex.after, "<Toggle />");
    }

    #[test]
    fn metadata_serializes_camel_case_and_skips_empty_curated_fields() {
        let meta = ComponentMetadata {
            name: "Button".into(),
            display_name: "Button".into(),
            category: Category::Atom,
            description: "A button".into(),
            external_mapping: None,
            props: vec![],
            examples: vec![],
            migration_examples: vec![],
            related_components: vec![],
            accessibility: None,
            usage_guidelines: None,
            import_path: "@/components/atoms/Button".into(),
            export_path: "@/components".into(),
        };
        let v = serde_json::to_value(&meta).unwrap();
        assert_eq!(v["displayName"], "Button");
        assert_eq!(v["category"], "atom");
        assert!(v.get("migrationExamples").is_none());
        assert!(v.get("usageGuidelines").is_none());
        assert!(v.get("externalMapping").is_none());
    }
}
