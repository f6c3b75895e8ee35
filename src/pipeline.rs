use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;

use crate::error::StoreError;
use crate::extract::extract_fields;
use crate::fs::{ComponentUnit, SourceScanner, metadata_file_name};
use crate::metadata::assemble::assemble;
use crate::metadata::merge::merge;
use crate::metadata::schema::metadata_schema;
use crate::metadata::{Category, ComponentMetadata};
use crate::store::registry::DEFAULT_STATUS;
use crate::store::{MetadataStore, Registry, RegistryEntry};
use crate::tokens::TokenDocument;
use crate::tokens::extract::{ThemeTexts, build_document};

/// One unit written by a regeneration run.
#[derive(Debug, Clone)]
pub struct GeneratedComponent {
    pub name: String,
    pub category: Category,
    pub path: PathBuf,
    /// Whether a persisted record was merged in.
    pub merged: bool,
    pub external_mapping: Option<String>,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub generated: Vec<GeneratedComponent>,
    /// Units that could not be read or written, with the reason.
    pub skipped: Vec<String>,
    pub registry_path: PathBuf,
}

impl GenerateReport {
    pub fn count_in(&self, category: Category) -> usize {
        self.generated.iter().filter(|g| g.category == category).count()
    }
}

struct UnitOutcome {
    unit_dir: PathBuf,
    metadata: ComponentMetadata,
    path: PathBuf,
    merged: bool,
}

/// Scan, extract, assemble, merge and persist every unit, then rewrite the
/// registry from the scan.
///
/// Units are processed in parallel; each writes only its own metadata file.
/// The registry is written once at the end and lists only units whose
/// metadata was written.
pub fn generate(store: &MetadataStore) -> Result<GenerateReport> {
    let config = store.config();
    let scanner = SourceScanner::new(config).context("cannot scan components")?;

    let mut report = GenerateReport::default();
    let mut units: Vec<ComponentUnit> = Vec::new();
    for unit in scanner.units() {
        match unit {
            Ok(unit) => units.push(unit),
            Err(e) => {
                tracing::warn!("{e}");
                report.skipped.push(e.to_string());
            }
        }
    }
    tracing::info!(units = units.len(), "scanned components");

    let previous = match store.load_registry() {
        Ok(registry) => Some(registry),
        Err(e) => {
            tracing::debug!("no previous registry: {e}");
            None
        }
    };

    let outcomes: Vec<Result<UnitOutcome, StoreError>> =
        units.par_iter().map(|unit| regenerate_unit(store, unit)).collect();

    let mut entries = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let outcome = match outcome {
            Ok(o) => o,
            Err(e) => {
                tracing::warn!("{e}");
                report.skipped.push(e.to_string());
                continue;
            }
        };
        let meta = &outcome.metadata;
        let prior = previous
            .as_ref()
            .and_then(|r| r.components.iter().find(|e| e.name == meta.name));

        entries.push(RegistryEntry {
            name: meta.name.clone(),
            display_name: prior
                .map(|p| p.display_name.clone())
                .unwrap_or_else(|| meta.display_name.clone()),
            category: meta.category,
            storage_path: config.display_path(&outcome.unit_dir),
            metadata_file_name: metadata_file_name(&meta.name),
            external_mapping_name: meta.external_name().map(str::to_string),
            status: prior
                .map(|p| p.status.clone())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        });
        report.generated.push(GeneratedComponent {
            name: meta.name.clone(),
            category: meta.category,
            path: outcome.path,
            merged: outcome.merged,
            external_mapping: meta.external_name().map(str::to_string),
        });
    }

    let registry = Registry::from_entries(entries);
    report.registry_path = store.write_registry(&registry)?;
    tracing::info!(
        components = registry.total_components,
        path = %report.registry_path.display(),
        "registry written"
    );
    Ok(report)
}

fn regenerate_unit(store: &MetadataStore, unit: &ComponentUnit) -> Result<UnitOutcome, StoreError> {
    let config = store.config();
    let fields = extract_fields(unit, &config.framework);
    let generated = assemble(unit, fields, config);

    let existing_path = unit.dir.join(unit.metadata_file_name());
    let existing = match store.read_metadata(&existing_path) {
        Ok(existing) => existing,
        Err(e) => {
            tracing::warn!("{e}; regenerating from source only");
            None
        }
    };

    let merged = existing.is_some();
    let metadata = merge(generated, existing.as_ref());
    let path = store.write_metadata(&unit.dir, &metadata)?;
    tracing::debug!(component = %metadata.name, merged, "metadata written");

    Ok(UnitOutcome {
        unit_dir: unit.dir.clone(),
        metadata,
        path,
        merged,
    })
}

#[derive(Debug)]
pub struct TokensReport {
    pub path: PathBuf,
    pub categories: Vec<String>,
    pub missing: Vec<&'static str>,
}

/// Build the token document from the theme sources. A document that breaks
/// the token invariants is not written.
pub fn generate_tokens(store: &MetadataStore) -> Result<TokensReport> {
    let config = store.config();
    let sources = ThemeTexts::load(config);
    let document = build_document(&sources, config.theme.spacing_unit, &config.design_system.name);
    write_tokens_checked(store, &document)
}

fn write_tokens_checked(store: &MetadataStore, document: &TokenDocument) -> Result<TokensReport> {
    let violations = document.invariant_violations();
    if !violations.is_empty() {
        bail!("refusing to write tokens: {}", violations.join("; "));
    }
    let missing = document.missing_categories();
    for category in &missing {
        tracing::warn!(category, "token category missing from theme sources");
    }
    let path = store.write_tokens(document)?;
    Ok(TokensReport {
        path,
        categories: document.category_names().into_iter().map(String::from).collect(),
        missing,
    })
}

/// Write the published metadata schema.
pub fn emit_schema(store: &MetadataStore) -> Result<PathBuf> {
    Ok(store.write_schema(&metadata_schema())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Project;
    use serde_json::json;

    #[test]
    fn generate_writes_metadata_and_registry() {
        let project = Project::with_sources();
        let store = MetadataStore::new(project.config());
        let report = generate(&store).unwrap();

        let names: Vec<_> = report.generated.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Badge", "Button", "Dropdown"]);
        assert!(report.skipped.is_empty());
        assert_eq!(report.count_in(Category::Atom), 2);

        let button = project.read_json("src/components/atoms/Button/Button.meta.json");
        assert_eq!(button["description"], "Buttons allow users to take actions with a single tap.");
        assert_eq!(button["externalMapping"]["name"], "Button");
        assert_eq!(button["migrationExamples"].as_array().unwrap().len(), 1);
        assert_eq!(button["examples"][0]["title"], "Primary");
        assert_eq!(button["importPath"], "@/components/atoms/Button");
        let props: Vec<_> = button["props"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(props, vec!["variant", "children", "disabled"]);

        let registry = project.read_json("src/tokens/components-registry.json");
        assert_eq!(registry["totalComponents"], 3);
        assert_eq!(registry["categories"]["molecules"], 1);
        assert_eq!(registry["components"][1]["storagePath"], "src/components/atoms/Button");
        assert_eq!(registry["components"][0]["externalMappingName"], json!(null));
        assert_eq!(registry["components"][2]["externalMappingName"], "Select");
        assert_eq!(registry["components"][2]["status"], "stable");
    }

    #[test]
    fn regeneration_keeps_curated_fields_and_registry_status() {
        let project = Project::with_sources();
        let store = MetadataStore::new(project.config());
        generate(&store).unwrap();

        let rel = "src/components/atoms/Badge/Badge.meta.json";
        let mut badge = project.read_json(rel);
        badge["relatedComponents"] = json!(["Button"]);
        badge["usageGuidelines"] = json!({
            "whenToUse": ["Counts and statuses"],
            "whenNotToUse": [], "bestPractices": [], "commonPatterns": []
        });
        project.write_json(rel, &badge);

        let reg_rel = "src/tokens/components-registry.json";
        let mut registry = project.read_json(reg_rel);
        registry["components"][0]["status"] = json!("beta");
        registry["components"][0]["displayName"] = json!("Status Badge");
        project.write_json(reg_rel, &registry);

        let report = generate(&store).unwrap();
        assert!(report.generated.iter().all(|g| g.merged));

        let badge = project.read_json(rel);
        assert_eq!(badge["relatedComponents"], json!(["Button"]));
        assert_eq!(badge["usageGuidelines"]["whenToUse"][0], "Counts and statuses");
        let registry = project.read_json(reg_rel);
        assert_eq!(registry["components"][0]["status"], "beta");
        assert_eq!(registry["components"][0]["displayName"], "Status Badge");
    }

    #[test]
    fn regeneration_is_stable() {
        let project = Project::with_sources();
        let store = MetadataStore::new(project.config());
        generate(&store).unwrap();
        let first = project.read("src/components/molecules/Dropdown/Dropdown.meta.json");
        generate(&store).unwrap();
        let second = project.read("src/components/molecules/Dropdown/Dropdown.meta.json");
        assert_eq!(first, second);
    }

    #[test]
    fn missing_components_root_is_fatal() {
        let project = Project::new();
        let store = MetadataStore::new(project.config());
        assert!(generate(&store).is_err());
    }

    #[test]
    fn tokens_written_from_theme() {
        let project = Project::with_sources();
        let store = MetadataStore::new(project.config());
        let report = generate_tokens(&store).unwrap();
        assert!(report.missing.is_empty());
        let tokens = project.read_json("src/tokens/tokens.json");
        assert_eq!(tokens["color"]["primary"]["main"]["$value"], "#266079");
        assert_eq!(tokens["color"]["primary"]["main"]["$type"], "color");
        assert_eq!(tokens["spacing"]["2"]["$value"], "16px");
    }

    #[test]
    fn tokens_without_primary_color_are_refused() {
        let project = Project::with_sources();
        project.write("src/theme/palette.ts", "export const palette = { secondary: { main: '#000' } };");
        let store = MetadataStore::new(project.config());
        let err = generate_tokens(&store).unwrap_err();
        assert!(err.to_string().contains("color.primary.main"));
        assert!(!project.path().join("src/tokens/tokens.json").exists());
    }

    #[test]
    fn schema_is_emitted() {
        let project = Project::new();
        let store = MetadataStore::new(project.config());
        let path = emit_schema(&store).unwrap();
        let schema: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert!(schema["properties"]["props"].is_object());
    }
}
