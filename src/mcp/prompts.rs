//! Prompt templates. The component inventory and mapping list are rendered
//! from the registry at request time.

use serde_json::{Map, Value};
use thiserror::Error;

use super::protocol::{Prompt, PromptArgument, PromptGetResult, PromptMessage, TextContent};
use super::resources::{ThemeFacts, category_title};
use crate::metadata::Category;
use crate::store::{MetadataStore, MigrationMapping, Registry};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("missing required argument \"{argument}\" for prompt {prompt}")]
    MissingArgument {
        prompt: &'static str,
        argument: &'static str,
    },
}

/// Values and context a template renders from.
struct PromptContext<'a> {
    args: &'a Map<String, Value>,
    registry: Option<Registry>,
    theme: ThemeFacts,
    package: &'a str,
    framework: &'a str,
    system_name: &'a str,
}

impl PromptContext<'_> {
    fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

struct PromptDef {
    name: &'static str,
    title: &'static str,
    description: &'static str,
    arguments: &'static [PromptArgument],
    render: fn(&PromptContext<'_>) -> String,
}

static PROMPTS: &[PromptDef] = &[
    PromptDef {
        name: "create-component-layout",
        title: "Create Component Layout",
        description: "Guide for building a page section or layout using design system components. Describe what you want to build and get a structured implementation plan.",
        arguments: &[
            PromptArgument {
                name: "description",
                description: "Description of the page/section to build (e.g., \"a data table with search, filters, and pagination\")",
                required: true,
            },
            PromptArgument {
                name: "requirements",
                description: "Additional requirements or constraints",
                required: false,
            },
        ],
        render: create_component_layout,
    },
    PromptDef {
        name: "migrate-code",
        title: "Migrate Code",
        description: "Step-by-step migration workflow to convert UI framework code to design system components.",
        arguments: &[
            PromptArgument {
                name: "code",
                description: "The framework code to migrate",
                required: true,
            },
            PromptArgument {
                name: "scope",
                description: "Scope of migration: \"full\" for entire file, \"component\" for a single component",
                required: false,
            },
        ],
        render: migrate_code,
    },
    PromptDef {
        name: "choose-component",
        title: "Choose Component",
        description: "Interactive flow to pick the right design system component for a specific UI requirement.",
        arguments: &[PromptArgument {
            name: "uiDescription",
            description: "Description of what the UI element should do or look like",
            required: true,
        }],
        render: choose_component,
    },
    PromptDef {
        name: "apply-theme",
        title: "Apply Theme",
        description: "Guide for applying and customizing the design system theme in a React application.",
        arguments: &[
            PromptArgument {
                name: "framework",
                description: "Framework being used (e.g., \"Next.js\", \"Vite\", \"Create React App\")",
                required: false,
            },
            PromptArgument {
                name: "customizations",
                description: "Any theme customizations needed",
                required: false,
            },
        ],
        render: apply_theme,
    },
];

pub fn list_prompts() -> Vec<Prompt> {
    PROMPTS
        .iter()
        .map(|p| Prompt {
            name: p.name,
            title: p.title,
            description: p.description,
            arguments: p.arguments.to_vec(),
        })
        .collect()
}

pub fn get_prompt(
    store: &MetadataStore,
    name: &str,
    args: &Map<String, Value>,
) -> Result<PromptGetResult, PromptError> {
    let def = PROMPTS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| PromptError::UnknownPrompt(name.to_string()))?;

    let config = store.config();
    let ctx = PromptContext {
        args,
        registry: store
            .load_registry()
            .inspect_err(|e| tracing::warn!("{e}; prompt rendered without inventory"))
            .ok(),
        theme: ThemeFacts::load(store),
        package: &config.design_system.package,
        framework: &config.framework.package,
        system_name: &config.design_system.name,
    };
    if let Some(missing) = def
        .arguments
        .iter()
        .find(|a| a.required && ctx.arg(a.name).is_none())
    {
        return Err(PromptError::MissingArgument {
            prompt: def.name,
            argument: missing.name,
        });
    }

    Ok(PromptGetResult {
        description: def.description,
        messages: vec![PromptMessage {
            role: "user",
            content: TextContent::new((def.render)(&ctx)),
        }],
    })
}

fn inventory(registry: Option<&Registry>) -> String {
    let Some(registry) = registry else {
        return "(component registry unavailable; use search_components)\n".to_string();
    };
    let mut out = String::new();
    for category in Category::ALL {
        let names: Vec<&str> = registry.by_category(category).map(|e| e.name.as_str()).collect();
        if !names.is_empty() {
            out.push_str(&format!("**{}**: {}\n\n", category_title(category), names.join(", ")));
        }
    }
    out
}

fn theme_summary(ctx: &PromptContext<'_>) -> String {
    let mut out = String::new();
    if let Some(font) = &ctx.theme.font_family {
        out.push_str(&format!("- **Font**: {font}\n"));
    }
    if let Some(primary) = &ctx.theme.primary_color {
        out.push_str(&format!("- **Primary color**: {primary}\n"));
    }
    out.push_str(&format!("- **Spacing**: {}px base unit\n", ctx.theme.spacing_unit));
    out.push_str("- Components organized as atoms, molecules, and organisms\n");
    out
}

fn create_component_layout(ctx: &PromptContext<'_>) -> String {
    let requirements = ctx
        .arg("requirements")
        .map(|r| format!("Additional requirements: {r}\n\n"))
        .unwrap_or_default();
    format!(
        "You are helping build a UI layout using the {name} ({package}).\n\n\
         ## Design System Context\n\n\
         The {name} is built on {framework} with:\n{theme}\n\
         ## Available Components\n\n{inventory}\
         ## Task\n\n\
         Build a layout for: {description}\n\n\
         {requirements}\
         Please:\n\
         1. List the components needed from the design system\n\
         2. Provide the correct import statements from '{package}'\n\
         3. Show the complete JSX structure with appropriate props\n\
         4. Wrap the app in ThemeProvider with the design system theme\n\
         5. Follow accessibility best practices\n\
         6. Use the search_components and get_component_info tools to look up exact prop types\n\n\
         Use the design system's tools to verify component APIs before writing code.",
        name = ctx.system_name,
        package = ctx.package,
        framework = ctx.framework,
        theme = theme_summary(ctx),
        inventory = inventory(ctx.registry.as_ref()),
        description = ctx.arg("description").unwrap_or_default(),
    )
}

fn migrate_code(ctx: &PromptContext<'_>) -> String {
    let mappings: String = ctx
        .registry
        .as_ref()
        .map(MigrationMapping::from_registry)
        .map(|mapping| {
            mapping
                .iter()
                .map(|(external, target)| {
                    format!("- {external} -> {}\n", target.design_system_component)
                })
                .collect()
        })
        .unwrap_or_default();
    format!(
        "You are helping migrate {framework} code to the {name} ({package}).\n\n\
         ## Migration Scope: {scope}\n\n\
         ## Code to Migrate\n\n```tsx\n{code}\n```\n\n\
         ## Migration Steps\n\n\
         1. **Identify framework components** - Use the migrate_code tool to get automatic mappings\n\
         2. **Check component APIs** - Use get_component_info for each design system component to verify prop compatibility\n\
         3. **Update imports** - Replace {framework} imports with {package}\n\
         4. **Adjust props** - Some props may differ between a framework component and its replacement\n\
         5. **Verify theme** - Ensure ThemeProvider wraps the app with the design system theme\n\n\
         ## Component Mappings\n{mappings}\n\
         Please migrate the code above, explaining each change. Use the design system tools to verify component APIs.",
        framework = ctx.framework,
        name = ctx.system_name,
        package = ctx.package,
        scope = ctx.arg("scope").unwrap_or("full"),
        code = ctx.arg("code").unwrap_or_default(),
    )
}

fn choose_component(ctx: &PromptContext<'_>) -> String {
    format!(
        "Help me choose the right component from the {name} for this UI need:\n\n\
         \"{ui}\"\n\n\
         Please:\n\
         1. Use the suggest_component tool with this description\n\
         2. For each suggested component, use get_component_info to get full details\n\
         3. Compare the top candidates and explain why each might be appropriate\n\
         4. Recommend the best option with a code example\n\
         5. Mention any accessibility considerations\n\
         6. Note if the component should be combined with others",
        name = ctx.system_name,
        ui = ctx.arg("uiDescription").unwrap_or_default(),
    )
}

fn apply_theme(ctx: &PromptContext<'_>) -> String {
    let customizations = ctx
        .arg("customizations")
        .map(|c| format!("Customization needs: {c}\n\n"))
        .unwrap_or_default();
    format!(
        "Help me set up the {name} theme in my {app} application.\n\n\
         {customizations}\
         Current theme:\n{theme}\n\
         Please:\n\
         1. Use the get_design_tokens tool to show the current token values\n\
         2. Show how to install the package: npm install {package}\n\
         3. Demonstrate the ThemeProvider setup with CssBaseline\n\
         4. Show how to access theme values in custom styled components\n\
         5. Explain how the theme's palette, typography, and spacing work\n\
         6. If customizations are needed, show how to extend the theme\n\n\
         The package exports:\n\
         - `theme` - The theme object\n\
         - `palette` - Color palette\n\
         - `typography` - Typography scale\n\
         - All UI components",
        name = ctx.system_name,
        app = ctx.arg("framework").unwrap_or("React"),
        theme = theme_summary(ctx),
        package = ctx.package,
    )
}
