pub mod cache;
pub mod check;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod correction;
pub mod diagnostic;
pub mod error;
pub mod extract;
pub mod formatter;
pub mod fs;
pub mod mcp;
pub mod metadata;
pub mod migrate;
pub mod pipeline;
pub mod query;
pub mod store;
pub mod tokens;
pub mod validate;

#[cfg(test)]
pub mod testutil;

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use cli::{Action, Args};
use config::load_config;
use formatter::create_formatter;
use mcp::server::McpServer;
use metadata::Category;
use migrate::MigrationTransformer;
use query::ComponentSummary;
use store::MetadataStore;
use validate::{UsageReport, ValidationEngine};

/// Run one CLI invocation. Returns the exit code: 0 = clean, 1 = findings,
/// 2 = invalid usage. Fatal errors are returned as `Err` (exit 3).
pub fn run(args: Args) -> Result<i32> {
    let config = load_config(args.config.as_deref(), &args.root)?;
    match config.config_path() {
        Some(path) => tracing::debug!(path = %path.display(), "config loaded"),
        None => tracing::debug!("no config file found, using defaults"),
    }
    tracing::debug!(root = %config.root().display(), categories = ?config.categories, "project");

    let store = MetadataStore::new(config);
    let stdout = io::stdout();
    match args.action() {
        Action::Serve => {
            McpServer::new(store).run(io::stdin().lock(), stdout.lock())?;
            Ok(0)
        }
        Action::Migrate(None) => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("cannot read source from stdin")?;
            migrate_source(&store, &source, &args.format, &mut stdout.lock())
        }
        action => execute(&store, &action, &args.format, &mut stdout.lock()),
    }
}

/// Run every action that does not own stdin, writing its report to `out`.
pub fn execute(
    store: &MetadataStore,
    action: &Action,
    format: &str,
    out: &mut dyn Write,
) -> Result<i32> {
    let json = format == "json";
    match action {
        Action::Generate => {
            let report = pipeline::generate(store)?;
            let config = store.config();
            writeln!(
                out,
                "Generated metadata for {} components ({})",
                report.generated.len(),
                config
                    .categories
                    .iter()
                    .map(|c| format!("{} {}", report.count_in(*c), c.plural()))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            writeln!(out, "Registry: {}", config.display_path(&report.registry_path))?;
            for skipped in &report.skipped {
                writeln!(out, "skipped: {skipped}")?;
            }
            Ok(if report.skipped.is_empty() { 0 } else { 1 })
        }
        Action::Tokens => {
            let report = pipeline::generate_tokens(store)?;
            writeln!(
                out,
                "Wrote {} token categories to {}",
                report.categories.len(),
                store.config().display_path(&report.path)
            )?;
            for category in &report.missing {
                writeln!(out, "missing: {category}")?;
            }
            Ok(0)
        }
        Action::EmitSchema => {
            let path = pipeline::emit_schema(store)?;
            writeln!(out, "Wrote schema to {}", store.config().display_path(&path))?;
            Ok(0)
        }
        Action::Check => {
            let report = check::check(store)?;
            create_formatter(format).format_to(&report.diagnostics, &report.files, out);
            Ok(if report.diagnostics.is_empty() { 0 } else { 1 })
        }
        Action::List => {
            let components = store.load_all()?;
            let summaries: Vec<ComponentSummary> =
                components.iter().map(ComponentSummary::from).collect();
            if json {
                write_json(out, &summaries)?;
            } else {
                write_summaries(out, &summaries)?;
            }
            Ok(0)
        }
        Action::Search { query, category } => {
            let category = match category.as_deref().map(|c| (c, Category::parse(c))) {
                None => None,
                Some((_, Some(parsed))) => Some(parsed),
                Some((raw, None)) => {
                    eprintln!("error: unknown category \"{raw}\" (use atoms, molecules or organisms)");
                    return Ok(2);
                }
            };
            let components = store.load_all()?;
            let summaries: Vec<ComponentSummary> = query::search(&components, query, category)
                .into_iter()
                .map(ComponentSummary::from)
                .collect();
            if json {
                write_json(out, &summaries)?;
            } else if summaries.is_empty() {
                writeln!(out, "No components found matching \"{query}\".")?;
            } else {
                write_summaries(out, &summaries)?;
            }
            Ok(0)
        }
        Action::Suggest(text) => {
            let components = store.load_all()?;
            let suggestions = query::suggest(&components, text);
            if json {
                write_json(out, &suggestions)?;
            } else if suggestions.is_empty() {
                writeln!(out, "No matching components for \"{text}\".")?;
            } else {
                for s in &suggestions {
                    writeln!(out, "{} ({}, score {}): {}", s.name, s.category, s.relevance_score, s.description)?;
                }
            }
            Ok(0)
        }
        Action::Migrate(Some(path)) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            migrate_source(store, &source, format, out)
        }
        Action::Migrate(None) => {
            anyhow::bail!("migrating from stdin is handled by run")
        }
        Action::Validate {
            name,
            props,
            context,
        } => {
            let report = match store.load_metadata(name)? {
                Some(meta) => ValidationEngine::new(&store.config().icon_only_components)
                    .validate(&meta, props, context.as_deref()),
                None => UsageReport::unknown(name),
            };
            if json {
                write_json(out, &report)?;
            } else {
                let verdict = if report.valid { "valid" } else { "invalid" };
                writeln!(out, "{}: {verdict}", report.component)?;
                for warning in &report.warnings {
                    writeln!(out, "  warning: {warning}")?;
                }
                for suggestion in &report.suggestions {
                    writeln!(out, "  suggestion: {suggestion}")?;
                }
            }
            Ok(if report.valid { 0 } else { 1 })
        }
        Action::Serve => anyhow::bail!("the protocol server is started by run"),
    }
}

/// Exit code 1 when anything was rewritten.
fn migrate_source(
    store: &MetadataStore,
    source: &str,
    format: &str,
    out: &mut dyn Write,
) -> Result<i32> {
    let config = store.config();
    let mapping = store.migration_mapping()?;
    let outcome = MigrationTransformer::new(
        &mapping,
        &config.framework.package,
        &config.design_system.package,
    )
    .transform(source);

    if format == "json" {
        #[derive(Serialize)]
        struct MigrationJson<'a> {
            code: &'a str,
            changes: Vec<String>,
        }
        write_json(
            out,
            &MigrationJson {
                code: &outcome.code,
                changes: outcome.changes.iter().map(ToString::to_string).collect(),
            },
        )?;
    } else {
        write!(out, "{}", outcome.render_markdown(&config.framework.package))?;
    }
    Ok(if outcome.is_unchanged() { 0 } else { 1 })
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_summaries(out: &mut dyn Write, summaries: &[ComponentSummary]) -> Result<()> {
    for s in summaries {
        match &s.external_mapping {
            Some(ext) => writeln!(out, "{} ({}) [{ext}]: {}", s.name, s.category, s.description)?,
            None => writeln!(out, "{} ({}): {}", s.name, s.category, s.description)?,
        }
    }
    let noun = if summaries.len() == 1 { "component" } else { "components" };
    writeln!(out, "\n{} {noun}", summaries.len())?;
    Ok(())
}
