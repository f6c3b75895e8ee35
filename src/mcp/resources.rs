//! Read-only views of the store, addressed by URI.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::protocol::{Resource, ResourceContents, ResourceTemplate};
use crate::error::StoreError;
use crate::metadata::{Category, RESERVED_PROPS};
use crate::store::{MetadataStore, Registry};
use crate::tokens::{CATEGORIES, TokenDocument, TokenNode};

const JSON: &str = "application/json";
const MARKDOWN: &str = "text/markdown";

/// Examples listed per category in the guidelines.
const GUIDELINE_EXAMPLES: usize = 3;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("unknown resource URI: {0}")]
    UnknownUri(String),
}

/// A parsed resource address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    Tokens,
    TokenCategory(String),
    Components,
    Component(String),
    ComponentsByCategory(String),
    Migration(String),
    Guidelines,
}

impl ResourceUri {
    pub fn parse(uri: &str) -> Option<ResourceUri> {
        let nonempty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        match uri {
            "designsystem://tokens" => Some(ResourceUri::Tokens),
            "designsystem://components" => Some(ResourceUri::Components),
            "designsystem://guidelines" => Some(ResourceUri::Guidelines),
            _ => {
                if let Some(category) = uri.strip_prefix("designsystem://tokens/") {
                    nonempty(category).map(ResourceUri::TokenCategory)
                } else if let Some(name) = uri.strip_prefix("component://") {
                    nonempty(name).map(ResourceUri::Component)
                } else if let Some(category) = uri.strip_prefix("components://") {
                    nonempty(category).map(ResourceUri::ComponentsByCategory)
                } else if let Some(external) = uri.strip_prefix("migration://") {
                    nonempty(external).map(ResourceUri::Migration)
                } else {
                    None
                }
            }
        }
    }
}

pub static TEMPLATES: &[ResourceTemplate] = &[
    ResourceTemplate {
        uri_template: "designsystem://tokens/{category}",
        name: "Design Tokens by Category",
        description: "Token subset filtered by category: color, typography, spacing, shadows, borderRadius, componentOverrides",
        mime_type: JSON,
    },
    ResourceTemplate {
        uri_template: "component://{name}",
        name: "Component Metadata",
        description: "Detailed metadata for a specific component including props, examples, accessibility, and usage guidelines",
        mime_type: JSON,
    },
    ResourceTemplate {
        uri_template: "components://{category}",
        name: "Components by Category",
        description: "All component metadata filtered by atomic design category: atoms, molecules, or organisms",
        mime_type: JSON,
    },
    ResourceTemplate {
        uri_template: "migration://{externalName}",
        name: "Migration Guide",
        description: "Migration instructions from a UI framework component to its design system equivalent",
        mime_type: MARKDOWN,
    },
];

fn resource(uri: String, name: String, description: Option<String>, mime: &'static str) -> Resource {
    Resource {
        uri,
        name,
        description,
        mime_type: Some(mime),
    }
}

/// Fixed resources plus the concrete instances of every template. Registry
/// driven entries are left out when the registry cannot be read.
pub fn list_resources(store: &MetadataStore) -> Vec<Resource> {
    let mut out = vec![
        resource(
            "designsystem://tokens".into(),
            "Design Tokens".into(),
            Some("Complete design token set including colors, typography, spacing, shadows, and border radius in DTCG format".into()),
            JSON,
        ),
        resource(
            "designsystem://components".into(),
            "Component Registry".into(),
            Some("Full list of all design system components with category, framework mapping, and status".into()),
            JSON,
        ),
        resource(
            "designsystem://guidelines".into(),
            "Design System Guidelines".into(),
            Some("General usage principles, naming conventions, and patterns".into()),
            MARKDOWN,
        ),
    ];
    for category in CATEGORIES {
        out.push(resource(
            format!("designsystem://tokens/{category}"),
            format!("{category} tokens"),
            None,
            JSON,
        ));
    }
    for category in Category::ALL {
        out.push(resource(
            format!("components://{}", category.plural()),
            format!("{} components", category.as_str()),
            None,
            JSON,
        ));
    }

    let registry = match store.load_registry() {
        Ok(registry) => registry,
        Err(e) => {
            tracing::warn!("{e}; listing fixed resources only");
            return out;
        }
    };
    let framework = &store.config().framework.package;
    for entry in &registry.components {
        out.push(resource(
            format!("component://{}", entry.name),
            entry.display_name.clone(),
            Some(format!("{} component", entry.category)),
            JSON,
        ));
    }
    for (external, target) in crate::store::MigrationMapping::from_registry(&registry).iter() {
        out.push(resource(
            format!("migration://{external}"),
            format!("{external} → {}", target.design_system_component),
            Some(format!(
                "Migration guide from {framework} {external} to {}",
                target.design_system_component
            )),
            MARKDOWN,
        ));
    }
    out
}

/// Render one resource. Not-found conditions and store failures become an
/// `{ "error": ... }` body; only an unrecognized URI is an `Err`.
pub fn read_resource(store: &MetadataStore, uri: &str) -> Result<ResourceContents, ResourceError> {
    let parsed = ResourceUri::parse(uri).ok_or_else(|| ResourceError::UnknownUri(uri.to_string()))?;
    let (mime_type, text) = match render(store, &parsed) {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::warn!(uri, "{e}");
            (JSON, error_body(&e.to_string()))
        }
    };
    Ok(ResourceContents {
        uri: uri.to_string(),
        mime_type,
        text,
    })
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| error_body(&e.to_string()))
}

fn error_body(message: &str) -> String {
    format!("{{\n  \"error\": {}\n}}", json!(message))
}

fn render(store: &MetadataStore, uri: &ResourceUri) -> Result<(&'static str, String), StoreError> {
    Ok(match uri {
        ResourceUri::Tokens => (JSON, pretty(&store.load_tokens()?)),
        ResourceUri::TokenCategory(category) => {
            let document = store.load_tokens()?;
            match document.tokens_by_category(category) {
                Some(node) => (JSON, pretty(node)),
                None => (
                    JSON,
                    error_body(&format!(
                        "Token category '{category}' not found. Available: {}",
                        document.category_names().join(", ")
                    )),
                ),
            }
        }
        ResourceUri::Components => (JSON, pretty(&store.load_registry()?)),
        ResourceUri::Component(name) => match store.load_metadata(name)? {
            Some(meta) => (JSON, pretty(&meta)),
            None => (
                JSON,
                error_body(&format!(
                    "Component '{name}' not found. Use designsystem://components to see available components."
                )),
            ),
        },
        ResourceUri::ComponentsByCategory(plural) => match Category::from_plural(plural) {
            Some(category) => (JSON, pretty(&store.load_by_category(category)?)),
            None => (
                JSON,
                error_body(&format!(
                    "Category '{plural}' not found. Use: atoms, molecules, or organisms"
                )),
            ),
        },
        ResourceUri::Migration(external) => (MARKDOWN, migration_guide(store, external)?),
        ResourceUri::Guidelines => (MARKDOWN, guidelines(store)),
    })
}

/// Markdown guide for replacing one framework component.
pub fn migration_guide(store: &MetadataStore, external: &str) -> Result<String, StoreError> {
    let config = store.config();
    let framework = &config.framework.package;
    let package = &config.design_system.package;
    let mapping = store.migration_mapping()?;

    let Some(target) = mapping.get(external) else {
        let mut out = format!(
            "# Migration: {external}\n\nNo design system equivalent found for {framework} component \"{external}\".\n\nAvailable mappings:\n"
        );
        for (name, target) in mapping.iter() {
            out.push_str(&format!("- {name} → {}\n", target.design_system_component));
        }
        return Ok(out);
    };

    let ds = &target.design_system_component;
    let meta = match store.load_metadata(ds) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::warn!("{e}; migration guide without component details");
            None
        }
    };

    let mut out = format!("# Migrate {framework} {external} → {ds}\n\n");
    out.push_str(&format!("**Category:** {}\n", target.category));
    out.push_str(&format!("**Import:** `import {{ {ds} }} from '{package}';`\n\n"));

    let Some(meta) = meta else {
        return Ok(out);
    };
    if !meta.description.is_empty() {
        out.push_str(&format!("## About {ds}\n\n{}\n\n", meta.description));
    }
    if !meta.migration_examples.is_empty() {
        out.push_str("## Migration Examples\n\n");
        for example in &meta.migration_examples {
            out.push_str(&format!("### {}\n\n", example.description));
            out.push_str(&format!("**Before ({framework}):**\n```tsx\n{}\n```\n\n", example.before));
            out.push_str(&format!("**After (Design System):**\n```tsx\n{}\n```\n\n", example.after));
        }
    }
    if !meta.props.is_empty() {
        out.push_str("## Props\n\n");
        out.push_str("| Prop | Type | Required | Default | Description |\n");
        out.push_str("|------|------|----------|---------|-------------|\n");
        for prop in &meta.props {
            let default = prop
                .default_value
                .as_ref()
                .map(|d| format!("`{d}`"))
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "| {} | `{}` | {} | {default} | {} |\n",
                prop.name,
                prop.type_expr.replace('|', "\\|"),
                if prop.required { "Yes" } else { "No" },
                prop.description
            ));
        }
        out.push('\n');
    }
    Ok(out)
}

/// Facts about the theme quoted by the guidelines and prompts.
pub(crate) struct ThemeFacts {
    pub primary_color: Option<String>,
    pub font_family: Option<String>,
    pub spacing_unit: u32,
}

impl ThemeFacts {
    pub(crate) fn load(store: &MetadataStore) -> Self {
        let document = store.load_tokens().ok();
        let leaf_text = |doc: &TokenDocument, path: &[&str]| {
            doc.lookup(path)
                .and_then(TokenNode::as_leaf)
                .and_then(|leaf| leaf.value.as_str())
                .map(str::to_string)
        };
        Self {
            primary_color: document
                .as_ref()
                .and_then(|d| leaf_text(d, &["color", "primary", "main"])),
            font_family: document
                .as_ref()
                .and_then(|d| leaf_text(d, &["typography", "fontFamily", "base"])),
            spacing_unit: store.config().theme.spacing_unit,
        }
    }
}

pub(crate) fn category_blurb(category: Category) -> &'static str {
    match category {
        Category::Atom => "Basic building blocks",
        Category::Molecule => "Combinations of atoms",
        Category::Organism => "Complex, self-contained UI sections",
    }
}

pub(crate) fn category_title(category: Category) -> &'static str {
    match category {
        Category::Atom => "Atoms",
        Category::Molecule => "Molecules",
        Category::Organism => "Organisms",
    }
}

/// Static guidance filled in from the configuration, registry and tokens.
pub fn guidelines(store: &MetadataStore) -> String {
    let config = store.config();
    let name = &config.design_system.name;
    let package = &config.design_system.package;
    let framework = &config.framework.package;
    let registry: Option<Registry> = store.load_registry().ok();
    let theme = ThemeFacts::load(store);

    let mut out = format!("# {name} Guidelines\n\n## Overview\n\n");
    out.push_str(&format!(
        "{name} is built on {framework} and follows atomic design principles. Components are published from `{package}`.\n\n"
    ));

    out.push_str("## Architecture\n\n");
    for category in Category::ALL {
        let examples: Vec<&str> = registry
            .iter()
            .flat_map(|r| r.by_category(category))
            .take(GUIDELINE_EXAMPLES)
            .map(|e| e.name.as_str())
            .collect();
        let examples = if examples.is_empty() {
            String::new()
        } else {
            format!(" ({}, etc.)", examples.join(", "))
        };
        out.push_str(&format!(
            "- **{}**: {}{examples}\n",
            category_title(category),
            category_blurb(category)
        ));
    }

    out.push_str("\n## Theme\n\n");
    if let Some(primary) = &theme.primary_color {
        out.push_str(&format!("- **Primary Color**: {primary}\n"));
    }
    if let Some(font) = &theme.font_family {
        out.push_str(&format!("- **Font Family**: {font}\n"));
    }
    out.push_str(&format!("- **Base Spacing**: {}px\n", theme.spacing_unit));

    let sample: Vec<&str> = registry
        .iter()
        .flat_map(|r| r.components.iter())
        .take(GUIDELINE_EXAMPLES)
        .map(|e| e.name.as_str())
        .collect();
    let sample = if sample.is_empty() {
        "Button".to_string()
    } else {
        sample.join(", ")
    };
    out.push_str(&format!(
        "\n## Import Patterns\n\n```tsx\n// Import components\nimport {{ {sample} }} from '{package}';\n\n// Import theme for custom ThemeProvider wrapping\nimport {{ theme }} from '{package}';\n```\n\n"
    ));

    let reserved: Vec<String> = RESERVED_PROPS.iter().map(|p| format!("`{p}`")).collect();
    out.push_str("## Component Conventions\n\n");
    out.push_str(&format!("1. All components accept {} props\n", reserved.join(" and ")));
    out.push_str(&format!("2. Components extend {framework} counterparts where applicable\n"));
    out.push_str(&format!("3. Use the design system component instead of raw {framework} components\n"));
    out.push_str("4. Wrap your app in `<ThemeProvider theme={theme}>` and `<CssBaseline />`\n\n");

    out.push_str("## Naming Conventions\n\n");
    out.push_str("- Components use PascalCase\n");
    let renamed: Vec<String> = registry
        .as_ref()
        .map(crate::store::MigrationMapping::from_registry)
        .map(|mapping| {
            mapping
                .iter()
                .filter(|(external, target)| *external != target.design_system_component)
                .map(|(external, target)| {
                    format!("`{}` (not {external})", target.design_system_component)
                })
                .collect()
        })
        .unwrap_or_default();
    if !renamed.is_empty() {
        out.push_str(&format!(
            "- Some differ from {framework} names: {}\n",
            renamed.join(", ")
        ));
    }
    out.push_str(&format!("- Props follow {framework} conventions where possible\n\n"));

    out.push_str(
        "## Accessibility\n\n\
         - All interactive components support keyboard navigation\n\
         - Use `aria-label` for icon-only buttons\n\
         - Form inputs should have associated labels\n\
         - Color choices meet WCAG contrast requirements\n",
    );
    out
}
