//! Consistency check over the persisted store: registry, metadata files and
//! token document.

use std::path::PathBuf;

use anyhow::Result;
use rayon::prelude::*;
use serde_json::Value;

use crate::diagnostic::{Diagnostic, Severity};
use crate::error::StoreError;
use crate::metadata::ComponentMetadata;
use crate::metadata::schema::MetadataValidator;
use crate::store::{MetadataStore, Registry, RegistryEntry};

#[derive(Debug, Default)]
pub struct CheckReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Every file that was inspected, project-relative.
    pub files: Vec<PathBuf>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Run every store rule. Only an unreadable registry is fatal; everything
/// else becomes a diagnostic.
pub fn check(store: &MetadataStore) -> Result<CheckReport> {
    let config = store.config();
    let registry = store.load_registry()?;
    let registry_path = config.display_path(&config.registry_path());
    let validator = MetadataValidator::new()?;

    let mut report = CheckReport::default();
    report.files.push(PathBuf::from(&registry_path));
    report.diagnostics.extend(check_registry(&registry, &registry_path));

    let per_entry: Vec<(PathBuf, Vec<Diagnostic>)> = registry
        .components
        .par_iter()
        .map(|entry| {
            let path = config.display_path(&store.metadata_path(entry));
            let diagnostics = check_entry(store, &validator, entry, &path);
            (PathBuf::from(path), diagnostics)
        })
        .collect();
    for (path, diagnostics) in per_entry {
        report.files.push(path);
        report.diagnostics.extend(diagnostics);
    }

    let tokens_path = config.display_path(&config.tokens_path());
    report.files.push(PathBuf::from(&tokens_path));
    report.diagnostics.extend(check_tokens(store, &tokens_path));

    report.diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    tracing::debug!(
        files = report.files.len(),
        problems = report.diagnostics.len(),
        "store check finished"
    );
    Ok(report)
}

fn check_registry(registry: &Registry, path: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = registry
        .count_mismatches()
        .into_iter()
        .map(|m| Diagnostic::new(path, Severity::Error, "Registry/CountMismatch", m))
        .collect();
    for name in registry.duplicate_names() {
        diagnostics.push(Diagnostic::new(
            path,
            Severity::Error,
            "Registry/DuplicateName",
            format!("component \"{name}\" is listed more than once"),
        ));
    }
    diagnostics
}

fn check_entry(
    store: &MetadataStore,
    validator: &MetadataValidator,
    entry: &RegistryEntry,
    path: &str,
) -> Vec<Diagnostic> {
    let error = |rule: &str, message: String| Diagnostic::new(path, Severity::Error, rule, message);

    let text = match std::fs::read_to_string(store.metadata_path(entry)) {
        Ok(text) => text,
        Err(e) => {
            return vec![error(
                "Metadata/Unresolvable",
                format!("metadata for \"{}\" cannot be read: {e}", entry.name),
            )];
        }
    };
    let raw: Value = match serde_json::from_str(&text) {
        Ok(raw) => raw,
        Err(e) => {
            return vec![error("Metadata/Unresolvable", format!("malformed JSON: {e}"))];
        }
    };

    let mut diagnostics: Vec<Diagnostic> = validator
        .validate_fields(&raw)
        .into_iter()
        .map(|v| error("Metadata/Schema", v))
        .collect();

    let Ok(meta) = serde_json::from_value::<ComponentMetadata>(raw) else {
        // Already reported as schema violations.
        return diagnostics;
    };

    if meta.name != entry.name {
        diagnostics.push(error(
            "Metadata/NameMismatch",
            format!(
                "metadata name \"{}\" does not match registry entry \"{}\"",
                meta.name, entry.name
            ),
        ));
    }
    if let Some(external) = meta
        .external_name()
        .filter(|_| meta.migration_examples.is_empty())
    {
        diagnostics.push(error(
            "Metadata/MissingMigrationExample",
            format!("externalMapping \"{external}\" has no migrationExamples"),
        ));
    }
    if meta.description.trim().is_empty() {
        diagnostics.push(Diagnostic::new(
            path,
            Severity::Warning,
            "Metadata/EmptyDescription",
            format!("\"{}\" has no description", meta.name),
        ));
    }
    diagnostics
}

fn check_tokens(store: &MetadataStore, path: &str) -> Vec<Diagnostic> {
    let document = match store.load_tokens() {
        Ok(document) => document,
        Err(e) => {
            let reason = match e {
                StoreError::Configuration { reason, .. } => reason,
                other => other.to_string(),
            };
            return vec![Diagnostic::new(path, Severity::Error, "Tokens/Unreadable", reason)];
        }
    };

    let mut diagnostics: Vec<Diagnostic> = document
        .missing_categories()
        .into_iter()
        .map(|category| {
            Diagnostic::new(
                path,
                Severity::Warning,
                "Tokens/MissingCategory",
                format!("token category \"{category}\" is missing"),
            )
        })
        .collect();
    for violation in document.invariant_violations() {
        let rule = if violation.starts_with("color.") {
            "Tokens/PrimaryColor"
        } else {
            "Tokens/FontSize"
        };
        diagnostics.push(Diagnostic::new(path, Severity::Error, rule, violation));
    }
    diagnostics
}
