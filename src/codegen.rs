use serde_json::{Map, Value};

use crate::metadata::ComponentMetadata;

/// Props listed in the trailing "Available props" comment.
const PROP_LISTING_LIMIT: usize = 10;

/// Render one JSX attribute: strings as `key="v"`, `true` as a bare flag,
/// anything else as `key={<json>}`.
pub fn render_attr(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) => format!("{key}=\"{s}\""),
        Value::Bool(true) => key.to_string(),
        other => format!("{key}={{{other}}}"),
    }
}

/// Single-line element: `<Name a="b" flag>children</Name>` or `<Name />`.
pub fn jsx_element(name: &str, attrs: &[(String, Value)], children: Option<&str>) -> String {
    let mut open = format!("<{name}");
    for (key, value) in attrs {
        open.push(' ');
        open.push_str(&render_attr(key, value));
    }
    match children {
        Some(content) => format!("{open}>{content}</{name}>"),
        None => format!("{open} />"),
    }
}

/// Multi-line element with one attribute per line.
fn jsx_block(name: &str, attrs: &[(String, Value)], children: Option<&str>) -> String {
    let attr_lines: String = attrs
        .iter()
        .map(|(k, v)| format!("\n  {}", render_attr(k, v)))
        .collect();
    match children {
        Some(content) => format!("<{name}{attr_lines}>\n  {content}\n</{name}>"),
        None => format!("<{name}{attr_lines} />"),
    }
}

/// A usage snippet for `meta` with the given props applied, wrapped in
/// comment headers and followed by a short prop reference.
pub fn generate_usage(
    meta: &ComponentMetadata,
    props: &Map<String, Value>,
    use_case: Option<&str>,
    package: &str,
) -> String {
    let attrs: Vec<(String, Value)> = props
        .iter()
        .filter(|(k, _)| k.as_str() != "children")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let children = match props.get("children") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Null | Value::Bool(false)) | None => meta
            .prop("children")
            .filter(|p| p.required)
            .map(|_| format!("{} Content", meta.name)),
        Some(Value::String(_)) => None,
        Some(other) => Some(other.to_string()),
    };

    let mut out = String::new();
    if let Some(use_case) = use_case.filter(|u| !u.trim().is_empty()) {
        out.push_str(&format!("// Use case: {use_case}\n"));
    }
    out.push_str(&format!("// Component: {} ({})\n", meta.name, meta.category));
    if let Some(mapping) = &meta.external_mapping {
        out.push_str(&format!(
            "// Replaces {} from {}\n",
            mapping.name, mapping.package_name
        ));
    }
    out.push_str(&format!(
        "\nimport {{ {} }} from '{package}';\n\n{}\n",
        meta.name,
        jsx_block(&meta.name, &attrs, children.as_deref())
    ));

    out.push_str("\n// Available props:\n");
    for prop in meta.props.iter().take(PROP_LISTING_LIMIT) {
        let required = if prop.required { " (required)" } else { "" };
        let default = prop
            .default_value
            .as_ref()
            .map(|d| format!(" = {}", d.to_json()))
            .unwrap_or_default();
        out.push_str(&format!(
            "//   {}{required}: {}{default}\n",
            prop.name, prop.type_expr
        ));
    }
    if meta.props.len() > PROP_LISTING_LIMIT {
        out.push_str(&format!(
            "//   ... and {} more props\n",
            meta.props.len() - PROP_LISTING_LIMIT
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Category, DefaultValue, ExternalMapping, PropDescriptor};
    use serde_json::json;

    fn prop(name: &str, required: bool) -> PropDescriptor {
        PropDescriptor {
            name: name.into(),
            type_expr: "string".into(),
            required,
            default_value: None,
            description: format!("{name} prop"),
        }
    }

    fn button(props: Vec<PropDescriptor>) -> ComponentMetadata {
        ComponentMetadata {
            name: "Button".into(),
            display_name: "Button".into(),
            category: Category::Atom,
            description: "Buttons trigger actions".into(),
            external_mapping: Some(ExternalMapping {
                name: "Button".into(),
                package_name: "@mui/material".into(),
            }),
            props,
            examples: vec![],
            migration_examples: vec![],
            related_components: vec![],
            accessibility: None,
            usage_guidelines: None,
            import_path: "@/components/atoms/Button".into(),
            export_path: "@/components".into(),
        }
    }

    #[test]
    fn attribute_rendering() {
        assert_eq!(render_attr("variant", &json!("text")), "variant=\"text\"");
        assert_eq!(render_attr("disabled", &json!(true)), "disabled");
        assert_eq!(render_attr("disabled", &json!(false)), "disabled={false}");
        assert_eq!(render_attr("count", &json!(3)), "count={3}");
        assert_eq!(render_attr("sx", &json!({"mt": 2})), "sx={{\"mt\":2}}");
    }

    #[test]
    fn inline_element() {
        let attrs = vec![("size".to_string(), json!("small"))];
        assert_eq!(jsx_element("Chip", &attrs, None), "<Chip size=\"small\" />");
        assert_eq!(jsx_element("Chip", &[], Some("Hi")), "<Chip>Hi</Chip>");
    }

    #[test]
    fn usage_with_props_and_children() {
        let meta = button(vec![prop("children", true), prop("variant", false)]);
        let props = json!({"variant": "outlined", "children": "Save"});
        let out = generate_usage(
            &meta,
            props.as_object().unwrap(),
            Some("form submit"),
            "@acme/ui",
        );
        assert!(out.starts_with("// Use case: form submit\n// Component: Button (atom)\n"));
        assert!(out.contains("// Replaces Button from @mui/material\n"));
        assert!(out.contains("import { Button } from '@acme/ui';"));
        assert!(out.contains("<Button\n  variant=\"outlined\">\n  Save\n</Button>"));
        assert!(out.contains("//   children (required): string\n"));
    }

    #[test]
    fn required_children_get_placeholder() {
        let meta = button(vec![prop("children", true)]);
        let out = generate_usage(&meta, &Map::new(), None, "@acme/ui");
        assert!(out.contains("<Button>\n  Button Content\n</Button>"));
        assert!(!out.contains("Use case"));
    }

    #[test]
    fn self_closing_without_children() {
        let mut meta = button(vec![prop("label", false)]);
        meta.props[0].default_value = Some(DefaultValue::Text("Go".into()));
        let out = generate_usage(&meta, &Map::new(), None, "@acme/ui");
        assert!(out.contains("\n<Button />\n"));
        assert!(out.contains("//   label: string = \"Go\"\n"));
    }

    #[test]
    fn prop_listing_is_capped() {
        let props = (0..13).map(|i| prop(&format!("p{i}"), false)).collect();
        let out = generate_usage(&button(props), &Map::new(), None, "@acme/ui");
        assert!(out.contains("//   p9: string\n"));
        assert!(!out.contains("//   p10: string"));
        assert!(out.contains("//   ... and 3 more props\n"));
    }
}
