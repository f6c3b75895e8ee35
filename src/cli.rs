use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// What a single invocation does. Exactly one action runs; `Check` when no
/// action flag is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Generate,
    Tokens,
    EmitSchema,
    Check,
    Serve,
    List,
    Search {
        query: String,
        category: Option<String>,
    },
    Suggest(String),
    /// `None` reads the source from stdin.
    Migrate(Option<PathBuf>),
    Validate {
        name: String,
        props: Vec<String>,
        context: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "dsmeta",
    version,
    about = "Design-system metadata extraction, tokens and MCP server",
    group(ArgGroup::new("action").multiple(false))
)]
pub struct Args {
    /// Project root (the directory holding dsmeta.yml)
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json", "github", "quiet"])]
    pub format: String,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Regenerate component metadata and the registry from source
    #[arg(long, group = "action")]
    pub generate: bool,

    /// Regenerate design tokens from the theme sources
    #[arg(long, group = "action")]
    pub tokens: bool,

    /// Write the component metadata JSON schema
    #[arg(long, group = "action")]
    pub emit_schema: bool,

    /// Validate registry, metadata and tokens (the default action)
    #[arg(long, group = "action")]
    pub check: bool,

    /// Serve the Model Context Protocol on stdio
    #[arg(long, group = "action")]
    pub serve: bool,

    /// List every registered component
    #[arg(long, group = "action")]
    pub list: bool,

    /// Search components by name, description, props and guidance
    #[arg(long, value_name = "QUERY", group = "action")]
    pub search: Option<String>,

    /// Restrict --search to one category (atoms, molecules, organisms)
    #[arg(long, value_name = "CATEGORY", requires = "search")]
    pub category: Option<String>,

    /// Suggest components for a free-text UI description
    #[arg(long, value_name = "TEXT", group = "action")]
    pub suggest: Option<String>,

    /// Rewrite framework component usage in FILE to the design system
    #[arg(long, value_name = "FILE", group = "action")]
    pub migrate: Option<PathBuf>,

    /// Read the source to migrate from stdin
    #[arg(long, conflicts_with = "migrate", group = "action")]
    pub stdin: bool,

    /// Validate a proposed usage of component NAME
    #[arg(long, value_name = "NAME", group = "action")]
    pub validate: Option<String>,

    /// Prop names supplied to --validate (comma-separated)
    #[arg(long, value_delimiter = ',', requires = "validate")]
    pub props: Vec<String>,

    /// Usage context for --validate (e.g. "inside a form")
    #[arg(long, value_name = "TEXT", requires = "validate")]
    pub context: Option<String>,
}

impl Args {
    /// Resolve the selected action. clap's `action` group guarantees at most
    /// one flag is set.
    pub fn action(&self) -> Action {
        if self.generate {
            Action::Generate
        } else if self.tokens {
            Action::Tokens
        } else if self.emit_schema {
            Action::EmitSchema
        } else if self.serve {
            Action::Serve
        } else if self.list {
            Action::List
        } else if let Some(query) = &self.search {
            Action::Search {
                query: query.clone(),
                category: self.category.clone(),
            }
        } else if let Some(text) = &self.suggest {
            Action::Suggest(text.clone())
        } else if let Some(file) = &self.migrate {
            Action::Migrate(Some(file.clone()))
        } else if self.stdin {
            Action::Migrate(None)
        } else if let Some(name) = &self.validate {
            Action::Validate {
                name: name.clone(),
                props: self.props.iter().map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect(),
                context: self.context.clone(),
            }
        } else {
            Action::Check
        }
    }
}
