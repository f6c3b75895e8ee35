use super::{ComponentMetadata, MigrationExample, UsageExample};
use crate::config::ResolvedConfig;
use crate::extract::ExtractedFields;
use crate::fs::ComponentUnit;

/// Build a complete record from a unit and what was extracted from it.
///
/// Curated-only fields (related components, accessibility, usage
/// guidelines) are left empty here; they come from the persisted record on
/// merge.
pub fn assemble(
    unit: &ComponentUnit,
    fields: ExtractedFields,
    config: &ResolvedConfig,
) -> ComponentMetadata {
    let ds = &config.design_system;
    let name = unit.name.as_str();

    let examples = if fields.examples.is_empty() {
        vec![basic_example(name, &ds.export_path)]
    } else {
        fields.examples
    };

    let migration_examples = fields
        .external_mapping
        .as_ref()
        .map(|mapping| {
            vec![MigrationExample {
                before: format!(
                    "import {{ {ext} }} from '{pkg}';\n<{ext} />",
                    ext = mapping.name,
                    pkg = mapping.package_name
                ),
                after: format!(
                    "import {{ {name} }} from '{}';\n<{name} />",
                    ds.export_path
                ),
                description: format!(
                    "Replace {} from {} with {name}",
                    mapping.name, mapping.package_name
                ),
            }]
        })
        .unwrap_or_default();

    ComponentMetadata {
        name: name.to_string(),
        display_name: name.to_string(),
        category: unit.category,
        description: fields.description.unwrap_or_default(),
        external_mapping: fields.external_mapping,
        props: fields.props,
        examples,
        migration_examples,
        related_components: Vec::new(),
        accessibility: None,
        usage_guidelines: None,
        import_path: format!("{}/{}/{name}", ds.import_root, unit.category.plural()),
        export_path: ds.export_path.clone(),
    }
}

fn basic_example(name: &str, export_path: &str) -> UsageExample {
    UsageExample {
        title: "Basic Usage".to_string(),
        description: format!("Basic usage of {name}"),
        code: format!("import {{ {name} }} from '{export_path}';\n\n<{name} />"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_fields;
    use crate::metadata::{Category, ExternalMapping, is_reserved_prop};
    use std::path::Path;

    fn config() -> ResolvedConfig {
        ResolvedConfig::defaults(Path::new("/proj"))
    }

    #[test]
    fn paths_follow_category_convention() {
        let unit = ComponentUnit::from_source("Dropdown", Category::Molecule, "");
        let meta = assemble(&unit, ExtractedFields::default(), &config());
        assert_eq!(meta.import_path, "@/components/molecules/Dropdown");
        assert_eq!(meta.export_path, "@/components");
        assert_eq!(meta.display_name, "Dropdown");
        assert_eq!(meta.category, Category::Molecule);
    }

    #[test]
    fn basic_example_when_none_found() {
        let unit = ComponentUnit::from_source("Badge", Category::Atom, "");
        let meta = assemble(&unit, ExtractedFields::default(), &config());
        assert_eq!(meta.examples.len(), 1);
        assert_eq!(meta.examples[0].title, "Basic Usage");
        assert_eq!(
            meta.examples[0].code,
            "import { Badge } from '@/components';\n\n<Badge />"
        );
        assert!(meta.migration_examples.is_empty());
    }

    #[test]
    fn mapping_yields_exactly_one_migration_example() {
        let unit = ComponentUnit::from_source("Toggle", Category::Atom, "");
        let fields = ExtractedFields {
            external_mapping: Some(ExternalMapping {
                name: "Switch".into(),
                package_name: "@mui/material".into(),
            }),
            ..ExtractedFields::default()
        };
        let meta = assemble(&unit, fields, &config());
        assert_eq!(meta.migration_examples.len(), 1);
        let ex = &meta.migration_examples[0];
        assert_eq!(ex.before, "import { Switch } from '@mui/material';\n<Switch />");
        assert_eq!(ex.after, "import { Toggle } from '@/components';\n<Toggle />");
        assert_eq!(ex.description, "Replace Switch from @mui/material with Toggle");
    }

    #[test]
    fn assembled_props_never_include_reserved_names() {
        let src = "export interface CardProps {\n  className?: string;\n  'data-testid'?: string;\n  title: string;\n}";
        let unit = ComponentUnit::from_source("Card", Category::Molecule, src);
        let fields = extract_fields(&unit, &config().framework);
        let meta = assemble(&unit, fields, &config());
        assert!(meta.props.iter().all(|p| !is_reserved_prop(&p.name)));
        assert_eq!(meta.props.len(), 1);
    }
}
