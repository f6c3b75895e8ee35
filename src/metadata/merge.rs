use super::ComponentMetadata;

/// Reconcile a freshly assembled record with the persisted one.
///
/// | field                                   | source                              |
/// |-----------------------------------------|-------------------------------------|
/// | name, displayName, category, paths      | generated                           |
/// | description, externalMapping, migration | generated, existing if generated empty |
/// | props, examples                         | generated if non-empty, else existing |
/// | related, accessibility, guidelines      | existing if present, else generated |
pub fn merge(generated: ComponentMetadata, existing: Option<&ComponentMetadata>) -> ComponentMetadata {
    let Some(existing) = existing else {
        return generated;
    };

    ComponentMetadata {
        name: generated.name,
        display_name: generated.display_name,
        category: generated.category,
        import_path: generated.import_path,
        export_path: generated.export_path,

        description: if generated.description.trim().is_empty() {
            existing.description.clone()
        } else {
            generated.description
        },
        external_mapping: generated
            .external_mapping
            .or_else(|| existing.external_mapping.clone()),
        migration_examples: non_empty_or(generated.migration_examples, &existing.migration_examples),

        props: non_empty_or(generated.props, &existing.props),
        examples: non_empty_or(generated.examples, &existing.examples),

        related_components: if existing.related_components.is_empty() {
            generated.related_components
        } else {
            existing.related_components.clone()
        },
        accessibility: existing
            .accessibility
            .clone()
            .filter(|a| !a.is_empty())
            .or(generated.accessibility),
        usage_guidelines: existing
            .usage_guidelines
            .clone()
            .filter(|g| !g.is_empty())
            .or(generated.usage_guidelines),
    }
}

fn non_empty_or<T: Clone>(generated: Vec<T>, existing: &[T]) -> Vec<T> {
    if generated.is_empty() {
        existing.to_vec()
    } else {
        generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        Accessibility, Category, ExternalMapping, MigrationExample, PropDescriptor, UsageExample,
        UsageGuidelines,
    };

    fn base(name: &str) -> ComponentMetadata {
        ComponentMetadata {
            name: name.into(),
            display_name: name.into(),
            category: Category::Atom,
            description: String::new(),
            external_mapping: None,
            props: vec![],
            examples: vec![],
            migration_examples: vec![],
            related_components: vec![],
            accessibility: None,
            usage_guidelines: None,
            import_path: format!("@/components/atoms/{name}"),
            export_path: "@/components".into(),
        }
    }

    fn guidelines(entry: &str) -> UsageGuidelines {
        UsageGuidelines {
            when_to_use: vec![entry.into()],
            ..UsageGuidelines::default()
        }
    }

    #[test]
    fn no_existing_returns_generated() {
        let g = base("Button");
        assert_eq!(merge(g.clone(), None), g);
    }

    #[test]
    fn structural_fields_always_generated() {
        let mut existing = base("Button");
        existing.display_name = "Old Button".into();
        existing.category = Category::Molecule;
        existing.import_path = "@/old".into();
        let merged = merge(base("Button"), Some(&existing));
        assert_eq!(merged.display_name, "Button");
        assert_eq!(merged.category, Category::Atom);
        assert_eq!(merged.import_path, "@/components/atoms/Button");
    }

    #[test]
    fn description_falls_back_when_generated_empty() {
        let mut existing = base("Button");
        existing.description = "Curated".into();
        let merged = merge(base("Button"), Some(&existing));
        assert_eq!(merged.description, "Curated");

        let mut generated = base("Button");
        generated.description = "From source".into();
        let merged = merge(generated, Some(&existing));
        assert_eq!(merged.description, "From source");
    }

    #[test]
    fn mapping_and_migration_fall_back_together() {
        let mut existing = base("Toggle");
        existing.external_mapping = Some(ExternalMapping {
            name: "Switch".into(),
            package_name: "@mui/material".into(),
        });
        existing.migration_examples = vec![MigrationExample {
            before: "<Switch />".into(),
            after: "<Toggle />".into(),
            description: "curated".into(),
        }];
        let merged = merge(base("Toggle"), Some(&existing));
        assert_eq!(merged.external_name(), Some("Switch"));
        assert_eq!(merged.migration_examples.len(), 1);
    }

    #[test]
    fn props_and_examples_prefer_non_empty_generated() {
        let prop = PropDescriptor {
            name: "label".into(),
            type_expr: "string".into(),
            required: true,
            default_value: None,
            description: "Label".into(),
        };
        let mut existing = base("Chip");
        existing.props = vec![prop.clone()];
        existing.examples = vec![UsageExample {
            title: "Curated".into(),
            description: "d".into(),
            code: "<Chip />".into(),
        }];

        let merged = merge(base("Chip"), Some(&existing));
        assert_eq!(merged.props, existing.props);
        assert_eq!(merged.examples, existing.examples);

        let mut generated = base("Chip");
        generated.props = vec![PropDescriptor {
            name: "size".into(),
            ..prop
        }];
        let merged = merge(generated, Some(&existing));
        assert_eq!(merged.props[0].name, "size");
    }

    #[test]
    fn curated_fields_survive_regeneration() {
        let mut existing = base("IconButton");
        existing.related_components = vec!["Button".into()];
        existing.accessibility = Some(Accessibility {
            aria_attributes: vec!["aria-label".into()],
            ..Accessibility::default()
        });
        existing.usage_guidelines = Some(guidelines("Toolbar actions"));

        let mut generated = base("IconButton");
        generated.usage_guidelines = Some(guidelines("generated"));
        let merged = merge(generated, Some(&existing));
        assert_eq!(merged.related_components, vec!["Button".to_string()]);
        assert_eq!(merged.accessibility, existing.accessibility);
        assert_eq!(merged.usage_guidelines, existing.usage_guidelines);
    }

    #[test]
    fn empty_curated_fields_take_generated() {
        let mut existing = base("Tag");
        existing.usage_guidelines = Some(UsageGuidelines::default());
        let mut generated = base("Tag");
        generated.usage_guidelines = Some(guidelines("generated"));
        let merged = merge(generated.clone(), Some(&existing));
        assert_eq!(merged.usage_guidelines, generated.usage_guidelines);
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_guidelines() -> impl Strategy<Value = UsageGuidelines> {
            (
                prop::collection::vec("[a-z ]{1,12}", 0..3),
                prop::collection::vec("[a-z ]{1,12}", 0..3),
                prop::collection::vec("[a-z ]{1,12}", 0..3),
                prop::collection::vec("[a-z ]{1,12}", 0..3),
            )
                .prop_map(|(a, b, c, d)| UsageGuidelines {
                    when_to_use: a,
                    when_not_to_use: b,
                    best_practices: c,
                    common_patterns: d,
                })
        }

        proptest! {
            #[test]
            fn existing_guidelines_kept_when_generated_has_none(
                g in arb_guidelines(),
                generated_empty in any::<bool>(),
            ) {
                prop_assume!(!g.is_empty());
                let mut existing = base("X");
                existing.usage_guidelines = Some(g.clone());
                let mut generated = base("X");
                if generated_empty {
                    generated.usage_guidelines = Some(UsageGuidelines::default());
                }
                let merged = merge(generated, Some(&existing));
                prop_assert_eq!(merged.usage_guidelines, Some(g));
            }

            #[test]
            fn merge_is_idempotent(desc in "[a-z]{0,8}", curated in "[a-z]{0,8}") {
                let mut existing = base("X");
                existing.description = curated;
                let mut generated = base("X");
                generated.description = desc;
                let once = merge(generated.clone(), Some(&existing));
                let twice = merge(generated, Some(&once));
                prop_assert_eq!(once, twice);
            }
        }
    }
}
