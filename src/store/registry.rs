use serde::{Deserialize, Serialize};

use crate::metadata::Category;

pub const REGISTRY_DESCRIPTION: &str = "Registry of all design system components with metadata";
pub const REGISTRY_VERSION: &str = "1.0.0";
pub const DEFAULT_STATUS: &str = "stable";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub name: String,
    pub display_name: String,
    pub category: Category,
    /// Unit directory relative to the project root.
    #[serde(alias = "path")]
    pub storage_path: String,
    #[serde(alias = "metadataFile")]
    pub metadata_file_name: String,
    /// Always serialized, as `null` when the component has no equivalent.
    #[serde(alias = "muiComponent", default)]
    pub external_mapping_name: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryCounts {
    pub atoms: usize,
    pub molecules: usize,
    pub organisms: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Atom => self.atoms,
            Category::Molecule => self.molecules,
            Category::Organism => self.organisms,
        }
    }

    fn bump(&mut self, category: Category) {
        match category {
            Category::Atom => self.atoms += 1,
            Category::Molecule => self.molecules += 1,
            Category::Organism => self.organisms += 1,
        }
    }
}

/// The flat, authoritative list of known components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    #[serde(rename = "$description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub total_components: usize,
    pub categories: CategoryCounts,
    pub components: Vec<RegistryEntry>,
}

impl Registry {
    /// Build a registry whose counts agree with `components`.
    pub fn from_entries(components: Vec<RegistryEntry>) -> Self {
        let mut categories = CategoryCounts::default();
        for entry in &components {
            categories.bump(entry.category);
        }
        Self {
            description: Some(REGISTRY_DESCRIPTION.to_string()),
            version: Some(REGISTRY_VERSION.to_string()),
            total_components: components.len(),
            categories,
            components,
        }
    }

    /// Case-insensitive name lookup.
    pub fn find(&self, name: &str) -> Option<&RegistryEntry> {
        self.components
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &RegistryEntry> {
        self.components.iter().filter(move |e| e.category == category)
    }

    /// Disagreements between the declared counts and the entries.
    pub fn count_mismatches(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.total_components != self.components.len() {
            problems.push(format!(
                "totalComponents is {} but {} components are listed",
                self.total_components,
                self.components.len()
            ));
        }
        for category in Category::ALL {
            let declared = self.categories.get(category);
            let actual = self.by_category(category).count();
            if declared != actual {
                problems.push(format!(
                    "categories.{} is {declared} but {actual} {} are listed",
                    category.plural(),
                    category.plural()
                ));
            }
        }
        problems
    }

    /// Names that appear more than once, in first-occurrence order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for entry in &self.components {
            if !seen.insert(entry.name.as_str()) && !dups.contains(&entry.name.as_str()) {
                dups.push(entry.name.as_str());
            }
        }
        dups
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTarget {
    pub design_system_component: String,
    pub category: Category,
}

/// `externalName → design-system component`, derived from the registry.
///
/// Keys keep registry order. A later row naming the same external
/// component replaces the earlier target in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationMapping {
    entries: Vec<(String, MappingTarget)>,
}

impl MigrationMapping {
    pub fn from_registry(registry: &Registry) -> Self {
        Self::from_pairs(registry.components.iter().filter_map(|e| {
            let external = e.external_mapping_name.as_ref()?;
            Some((
                external.clone(),
                MappingTarget {
                    design_system_component: e.name.clone(),
                    category: e.category,
                },
            ))
        }))
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, MappingTarget)>) -> Self {
        let mut mapping = Self::default();
        for (external, target) in pairs {
            match mapping.entries.iter_mut().find(|(k, _)| *k == external) {
                Some(slot) => slot.1 = target,
                None => mapping.entries.push((external, target)),
            }
        }
        mapping
    }

    pub fn get(&self, external: &str) -> Option<&MappingTarget> {
        self.entries
            .iter()
            .find(|(k, _)| k == external)
            .map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingTarget)> {
        self.entries.iter().map(|(k, t)| (k.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, category: Category, external: Option<&str>) -> RegistryEntry {
        RegistryEntry {
            name: name.into(),
            display_name: name.into(),
            category,
            storage_path: format!("src/components/{}/{name}", category.plural()),
            metadata_file_name: format!("{name}.meta.json"),
            external_mapping_name: external.map(String::from),
            status: DEFAULT_STATUS.into(),
        }
    }

    #[test]
    fn reads_legacy_field_names() {
        let raw = json!({
            "$description": "Registry",
            "version": "1.0.0",
            "totalComponents": 1,
            "categories": { "atoms": 1, "molecules": 0, "organisms": 0 },
            "components": [{
                "name": "Button",
                "displayName": "Button",
                "category": "atom",
                "path": "src/components/atoms/Button",
                "metadataFile": "Button.meta.json",
                "muiComponent": "Button",
                "status": "stable"
            }]
        });
        let registry: Registry = serde_json::from_value(raw).unwrap();
        let e = &registry.components[0];
        assert_eq!(e.storage_path, "src/components/atoms/Button");
        assert_eq!(e.metadata_file_name, "Button.meta.json");
        assert_eq!(e.external_mapping_name.as_deref(), Some("Button"));
        assert!(registry.count_mismatches().is_empty());
    }

    #[test]
    fn missing_status_defaults_to_stable() {
        let raw = json!({
            "name": "Tag", "displayName": "Tag", "category": "atom",
            "storagePath": "x", "metadataFileName": "Tag.meta.json"
        });
        let e: RegistryEntry = serde_json::from_value(raw).unwrap();
        assert_eq!(e.status, "stable");
        assert_eq!(e.external_mapping_name, None);
    }

    #[test]
    fn null_mapping_is_serialized() {
        let v = serde_json::to_value(entry("Tag", Category::Atom, None)).unwrap();
        assert_eq!(v["externalMappingName"], serde_json::Value::Null);
    }

    #[test]
    fn from_entries_recounts() {
        let registry = Registry::from_entries(vec![
            entry("Button", Category::Atom, Some("Button")),
            entry("Badge", Category::Atom, None),
            entry("Dropdown", Category::Molecule, Some("Select")),
        ]);
        assert_eq!(registry.total_components, 3);
        assert_eq!(registry.categories.atoms, 2);
        assert_eq!(registry.categories.molecules, 1);
        assert_eq!(registry.categories.organisms, 0);
        assert!(registry.count_mismatches().is_empty());
    }

    #[test]
    fn mismatched_counts_are_reported() {
        let mut registry = Registry::from_entries(vec![entry("Button", Category::Atom, None)]);
        registry.total_components = 2;
        registry.categories.organisms = 1;
        let problems = registry.count_mismatches();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("totalComponents is 2"));
        assert!(problems[1].contains("categories.organisms"));
    }

    #[test]
    fn find_is_case_insensitive() {
        let registry = Registry::from_entries(vec![entry("IconButton", Category::Atom, None)]);
        assert!(registry.find("iconbutton").is_some());
        assert!(registry.find("Icon").is_none());
    }

    #[test]
    fn duplicates_reported_once() {
        let registry = Registry::from_entries(vec![
            entry("A", Category::Atom, None),
            entry("A", Category::Atom, None),
            entry("A", Category::Molecule, None),
            entry("B", Category::Atom, None),
        ]);
        assert_eq!(registry.duplicate_names(), vec!["A"]);
    }

    #[test]
    fn mapping_skips_null_and_keeps_order() {
        let registry = Registry::from_entries(vec![
            entry("Toggle", Category::Atom, Some("Switch")),
            entry("Badge", Category::Atom, None),
            entry("Dropdown", Category::Molecule, Some("Select")),
        ]);
        let mapping = MigrationMapping::from_registry(&registry);
        assert_eq!(mapping.len(), 2);
        let keys: Vec<_> = mapping.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Switch", "Select"]);
        let target = mapping.get("Select").unwrap();
        assert_eq!(target.design_system_component, "Dropdown");
        assert_eq!(target.category, Category::Molecule);
        assert!(mapping.get("Badge").is_none());
    }

    #[test]
    fn duplicate_external_name_later_wins_in_place() {
        let registry = Registry::from_entries(vec![
            entry("Old", Category::Atom, Some("Chip")),
            entry("Other", Category::Atom, Some("Card")),
            entry("Tag", Category::Atom, Some("Chip")),
        ]);
        let mapping = MigrationMapping::from_registry(&registry);
        let pairs: Vec<_> = mapping
            .iter()
            .map(|(k, t)| (k, t.design_system_component.as_str()))
            .collect();
        assert_eq!(pairs, vec![("Chip", "Tag"), ("Card", "Other")]);
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mapping_has_one_key_per_mapped_entry(
                mapped in prop::collection::vec(any::<bool>(), 0..20),
            ) {
                let entries: Vec<_> = mapped
                    .iter()
                    .enumerate()
                    .map(|(i, m)| {
                        let name = format!("C{i}");
                        let external = m.then(|| format!("Ext{i}"));
                        entry(&name, Category::Atom, external.as_deref())
                    })
                    .collect();
                let registry = Registry::from_entries(entries);
                let expected = mapped.iter().filter(|m| **m).count();

                let mapping = MigrationMapping::from_registry(&registry);
                prop_assert_eq!(mapping.len(), expected);
                prop_assert_eq!(mapping, MigrationMapping::from_registry(&registry));
            }
        }
    }
}
