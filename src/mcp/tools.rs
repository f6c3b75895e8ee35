//! Tool table: every callable operation with its input schema and handler.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use thiserror::Error;

use super::protocol::{Tool, ToolAnnotations, ToolCallResult};
use crate::codegen::generate_usage;
use crate::error::StoreError;
use crate::metadata::Category;
use crate::migrate::MigrationTransformer;
use crate::query::{self, ComponentSummary};
use crate::store::MetadataStore;
use crate::tokens::query::filter_node;
use crate::validate::{UsageReport, ValidationEngine};

/// Failures that turn a tool result into `isError: true`. Unknown names and
/// empty searches are ordinary results, not errors.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error("invalid arguments: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

type Handler = fn(&MetadataStore, Value) -> Result<ToolCallResult, ToolError>;

pub struct ToolDef {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    schema: fn() -> Value,
    handler: Handler,
}

impl ToolDef {
    pub fn call(&self, store: &MetadataStore, arguments: Value) -> ToolCallResult {
        tracing::debug!(tool = self.name, "tool call");
        (self.handler)(store, arguments).unwrap_or_else(|e| {
            tracing::debug!(tool = self.name, "tool failed: {e}");
            ToolCallResult::error(e.to_string())
        })
    }

    pub fn describe(&self) -> Tool {
        Tool {
            name: self.name,
            title: self.title,
            description: self.description,
            input_schema: (self.schema)(),
            annotations: ToolAnnotations {
                read_only_hint: true,
            },
        }
    }
}

pub static TOOLS: &[ToolDef] = &[
    ToolDef {
        name: "get_design_tokens",
        title: "Get Design Tokens",
        description: "Query design tokens by category (color, typography, spacing, shadows, borderRadius) or get the full token set. Use this to find exact color values, font sizes, spacing values, etc.",
        schema: design_tokens_schema,
        handler: get_design_tokens,
    },
    ToolDef {
        name: "get_component_info",
        title: "Get Component Info",
        description: "Get detailed metadata for a design system component by name, including props, examples, accessibility info, and usage guidelines.",
        schema: component_name_schema,
        handler: get_component_info,
    },
    ToolDef {
        name: "search_components",
        title: "Search Components",
        description: "Search for components by name, description, prop, use case, or framework equivalent. Returns matching component summaries.",
        schema: search_schema,
        handler: search_components,
    },
    ToolDef {
        name: "generate_component_code",
        title: "Generate Component Code",
        description: "Generate a code snippet for a design system component with correct imports and prop usage based on a use case description.",
        schema: generate_schema,
        handler: generate_component_code,
    },
    ToolDef {
        name: "migrate_code",
        title: "Migrate Code",
        description: "Convert UI framework component imports and usage to design system equivalents. Provide framework code and get the migrated version.",
        schema: migrate_schema,
        handler: migrate_code,
    },
    ToolDef {
        name: "get_color_palette",
        title: "Get Color Palette",
        description: "Return the complete color palette with semantic names and hex values. Useful for finding the right color for any use case.",
        schema: empty_schema,
        handler: get_color_palette,
    },
    ToolDef {
        name: "get_typography_scale",
        title: "Get Typography Scale",
        description: "Return the complete typography scale with all variants (h1-h6, body1, body2, caption, etc.) and their properties.",
        schema: empty_schema,
        handler: get_typography_scale,
    },
    ToolDef {
        name: "suggest_component",
        title: "Suggest Component",
        description: "Given a UI description or use case, suggest the most appropriate design system component(s) to use.",
        schema: suggest_schema,
        handler: suggest_component,
    },
    ToolDef {
        name: "validate_component_usage",
        title: "Validate Component Usage",
        description: "Check if a component usage follows best practices from the design system guidelines. Returns suggestions and warnings.",
        schema: validate_schema,
        handler: validate_component_usage,
    },
];

pub fn find_tool(name: &str) -> Option<&'static ToolDef> {
    TOOLS.iter().find(|t| t.name == name)
}

pub fn list_tools() -> Vec<Tool> {
    TOOLS.iter().map(ToolDef::describe).collect()
}

/// Missing arguments deserialize like an empty object.
fn parse_args<A: DeserializeOwned>(arguments: Value) -> Result<A, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    Ok(serde_json::from_value(arguments)?)
}

fn not_found_component(store: &MetadataStore, name: &str) -> Result<ToolCallResult, ToolError> {
    let registry = store.load_registry()?;
    let names: Vec<&str> = registry.components.iter().map(|c| c.name.as_str()).collect();
    Ok(ToolCallResult::text(format!(
        "Component \"{name}\" not found.\n\nAvailable components: {}",
        names.join(", ")
    )))
}

// get_design_tokens

fn design_tokens_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "category": {
                "type": "string",
                "description": "Token category: \"color\", \"typography\", \"spacing\", \"shadows\", \"borderRadius\", \"componentOverrides\". Omit for all tokens."
            },
            "search": {
                "type": "string",
                "description": "Search within tokens by key name (e.g., \"primary\", \"h1\", \"error\")"
            }
        }
    })
}

#[derive(Deserialize)]
struct DesignTokensArgs {
    category: Option<String>,
    search: Option<String>,
}

fn get_design_tokens(store: &MetadataStore, arguments: Value) -> Result<ToolCallResult, ToolError> {
    let args: DesignTokensArgs = parse_args(arguments)?;
    let document = store.load_tokens()?;

    let node = match &args.category {
        Some(category) => match document.tokens_by_category(category) {
            Some(node) => node.clone(),
            None => {
                return Ok(ToolCallResult::text(format!(
                    "Token category \"{category}\" not found. Available categories: {}",
                    document.category_names().join(", ")
                )));
            }
        },
        None => crate::tokens::TokenNode::Group(document.root.clone()),
    };

    match args.search.as_deref().filter(|s| !s.is_empty()) {
        Some(search) => match filter_node(&node, search) {
            Some(filtered) => Ok(ToolCallResult::json(&filtered)),
            None => Ok(ToolCallResult::text(format!("No tokens found matching \"{search}\"."))),
        },
        None => Ok(ToolCallResult::json(&node)),
    }
}

// get_component_info

fn component_name_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "componentName": {
                "type": "string",
                "description": "The component name (e.g., \"Button\", \"Input\", \"Modal\", \"Table\")"
            }
        },
        "required": ["componentName"]
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentNameArgs {
    component_name: String,
}

fn get_component_info(store: &MetadataStore, arguments: Value) -> Result<ToolCallResult, ToolError> {
    let args: ComponentNameArgs = parse_args(arguments)?;
    match store.load_metadata(&args.component_name)? {
        Some(meta) => Ok(ToolCallResult::json(&meta)),
        None => not_found_component(store, &args.component_name),
    }
}

// search_components

fn search_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Search query (e.g., \"input\", \"navigation\", \"date\", \"toggle\")"
            },
            "category": {
                "type": "string",
                "enum": ["atom", "molecule", "organism"],
                "description": "Filter by atomic design category"
            }
        },
        "required": ["query"]
    })
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
    category: Option<String>,
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, ToolError> {
    raw.map(|c| {
        Category::parse(c).ok_or_else(|| {
            ToolError::InvalidValue(format!(
                "unknown category \"{c}\", expected atom, molecule or organism"
            ))
        })
    })
    .transpose()
}

fn search_components(store: &MetadataStore, arguments: Value) -> Result<ToolCallResult, ToolError> {
    let args: SearchArgs = parse_args(arguments)?;
    let category = parse_category(args.category.as_deref())?;
    let components = store.load_all()?;
    let found = query::search(&components, &args.query, category);

    if found.is_empty() {
        let scope = category
            .map(|c| format!(" in category \"{c}\""))
            .unwrap_or_default();
        return Ok(ToolCallResult::text(format!(
            "No components found matching \"{}\"{scope}. Try a broader search term.",
            args.query
        )));
    }
    let summaries: Vec<ComponentSummary> = found.into_iter().map(ComponentSummary::from).collect();
    Ok(ToolCallResult::json(&summaries))
}

// generate_component_code

fn generate_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "componentName": { "type": "string", "description": "The component name" },
            "props": {
                "type": "object",
                "description": "Props to apply (e.g., { \"variant\": \"contained\", \"color\": \"primary\" })"
            },
            "useCase": {
                "type": "string",
                "description": "Description of the use case to generate appropriate code"
            }
        },
        "required": ["componentName"]
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateArgs {
    component_name: String,
    #[serde(default)]
    props: Map<String, Value>,
    use_case: Option<String>,
}

fn generate_component_code(
    store: &MetadataStore,
    arguments: Value,
) -> Result<ToolCallResult, ToolError> {
    let args: GenerateArgs = parse_args(arguments)?;
    let Some(meta) = store.load_metadata(&args.component_name)? else {
        return Ok(ToolCallResult::text(format!(
            "Component \"{}\" not found. Use search_components to find available components.",
            args.component_name
        )));
    };
    let package = &store.config().design_system.package;
    Ok(ToolCallResult::text(generate_usage(
        &meta,
        &args.props,
        args.use_case.as_deref(),
        package,
    )))
}

// migrate_code

fn migrate_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "code": {
                "type": "string",
                "description": "The framework code (TypeScript/TSX) to migrate"
            }
        },
        "required": ["code"]
    })
}

#[derive(Deserialize)]
struct MigrateArgs {
    code: String,
}

fn migrate_code(store: &MetadataStore, arguments: Value) -> Result<ToolCallResult, ToolError> {
    let args: MigrateArgs = parse_args(arguments)?;
    let config = store.config();
    let mapping = store.migration_mapping()?;
    let outcome = MigrationTransformer::new(
        &mapping,
        &config.framework.package,
        &config.design_system.package,
    )
    .transform(&args.code);
    Ok(ToolCallResult::text(outcome.render_markdown(&config.framework.package)))
}

// get_color_palette / get_typography_scale

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn get_color_palette(store: &MetadataStore, _arguments: Value) -> Result<ToolCallResult, ToolError> {
    let document = store.load_tokens()?;
    Ok(match document.color_palette() {
        Some(palette) => ToolCallResult::json(palette),
        None => ToolCallResult::text("The token document has no color palette."),
    })
}

fn get_typography_scale(
    store: &MetadataStore,
    _arguments: Value,
) -> Result<ToolCallResult, ToolError> {
    let document = store.load_tokens()?;
    Ok(match document.typography_scale() {
        Some(scale) => ToolCallResult::json(scale),
        None => ToolCallResult::text("The token document has no typography scale."),
    })
}

// suggest_component

fn suggest_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "description": {
                "type": "string",
                "description": "Description of the UI element or use case (e.g., \"a form with text inputs and a submit button\", \"a data table with pagination\")"
            }
        },
        "required": ["description"]
    })
}

#[derive(Deserialize)]
struct SuggestArgs {
    description: String,
}

fn suggest_component(store: &MetadataStore, arguments: Value) -> Result<ToolCallResult, ToolError> {
    let args: SuggestArgs = parse_args(arguments)?;
    let components = store.load_all()?;
    let suggestions = query::suggest(&components, &args.description);
    if suggestions.is_empty() {
        return Ok(ToolCallResult::text(format!(
            "No specific component suggestions for: \"{}\". Try describing the UI element more specifically, or use search_components to browse available components.",
            args.description
        )));
    }
    Ok(ToolCallResult::json(&suggestions))
}

// validate_component_usage

fn validate_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "componentName": { "type": "string", "description": "The component name" },
            "props": { "type": "object", "description": "Props being used" },
            "context": {
                "type": "string",
                "description": "Context of usage (e.g., \"inside a form\", \"in a table header\")"
            }
        },
        "required": ["componentName"]
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateArgs {
    component_name: String,
    #[serde(default)]
    props: Map<String, Value>,
    context: Option<String>,
}

fn validate_component_usage(
    store: &MetadataStore,
    arguments: Value,
) -> Result<ToolCallResult, ToolError> {
    let args: ValidateArgs = parse_args(arguments)?;
    let report = match store.load_metadata(&args.component_name)? {
        Some(meta) => {
            let supplied: Vec<String> = args.props.keys().cloned().collect();
            ValidationEngine::new(&store.config().icon_only_components).validate(
                &meta,
                &supplied,
                args.context.as_deref(),
            )
        }
        None => UsageReport::unknown(&args.component_name),
    };
    Ok(ToolCallResult::json(&report))
}
