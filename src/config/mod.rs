use std::path::{Path, PathBuf};

use serde_yml::Value;

use crate::error::StoreError;
use crate::metadata::Category;

pub const CONFIG_FILE: &str = "dsmeta.yml";

/// Largest accepted `theme.spacingUnit`, in pixels.
pub const MAX_SPACING_UNIT: u32 = 1024;

/// Theme source files the token extractor reads.
#[derive(Debug, Clone)]
pub struct ThemeSources {
    pub palette: PathBuf,
    pub typography: PathBuf,
    pub shadows: PathBuf,
    /// Base spacing unit in px; the spacing scale is derived from it.
    pub spacing_unit: u32,
}

/// The third-party UI framework the design system wraps.
#[derive(Debug, Clone)]
pub struct FrameworkConfig {
    pub package: String,
    /// Local alias prefix used when importing framework components (`Mui`).
    pub prefix: String,
}

#[derive(Debug, Clone)]
pub struct DesignSystemConfig {
    pub name: String,
    /// Package consumers import from (`import { Button } from '<package>'`).
    pub package: String,
    /// Root of per-component import paths (`<importRoot>/<plural>/<Name>`).
    pub import_root: String,
    pub export_path: String,
}

/// Resolved project configuration.
///
/// This is the explicit storage root plus category list that the scanner
/// and store are built from; nothing resolves paths relative to the
/// process working directory.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    root: PathBuf,
    config_path: Option<PathBuf>,
    pub components_dir: PathBuf,
    pub categories: Vec<Category>,
    pub registry_file: PathBuf,
    pub tokens_file: PathBuf,
    pub schema_file: PathBuf,
    pub theme: ThemeSources,
    pub framework: FrameworkConfig,
    pub design_system: DesignSystemConfig,
    pub icon_only_components: Vec<String>,
    excludes: Vec<String>,
}

impl ResolvedConfig {
    /// Built-in defaults for a project rooted at `root`.
    pub fn defaults(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            config_path: None,
            components_dir: PathBuf::from("src/components"),
            categories: Category::ALL.to_vec(),
            registry_file: PathBuf::from("src/tokens/components-registry.json"),
            tokens_file: PathBuf::from("src/tokens/tokens.json"),
            schema_file: PathBuf::from("src/tokens/component-metadata.schema.json"),
            theme: ThemeSources {
                palette: PathBuf::from("src/theme/palette.ts"),
                typography: PathBuf::from("src/theme/typography.ts"),
                shadows: PathBuf::from("src/theme/index.ts"),
                spacing_unit: 8,
            },
            framework: FrameworkConfig {
                package: "@mui/material".to_string(),
                prefix: "Mui".to_string(),
            },
            design_system: DesignSystemConfig {
                name: "Design System".to_string(),
                package: "@design-system/components".to_string(),
                import_root: "@/components".to_string(),
                export_path: "@/components".to_string(),
            },
            icon_only_components: vec!["IconButton".to_string()],
            excludes: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration file that was read, if one was found.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn components_root(&self) -> PathBuf {
        self.root.join(&self.components_dir)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.registry_file)
    }

    pub fn tokens_path(&self) -> PathBuf {
        self.root.join(&self.tokens_file)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.root.join(&self.schema_file)
    }

    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Path relative to the project root, `/`-separated, for display and
    /// for paths recorded in the registry.
    pub fn display_path(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Glob patterns excluded from the component scan.
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }
}

/// Load `dsmeta.yml` from `path`, or from the project root when no path is
/// given. A missing file yields the built-in defaults; a malformed one is a
/// configuration error.
pub fn load_config(path: Option<&Path>, root: &Path) -> Result<ResolvedConfig, StoreError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => root.join(CONFIG_FILE),
    };

    let mut config = ResolvedConfig::defaults(root);
    if !config_path.exists() {
        return Ok(config);
    }

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| StoreError::configuration(&config_path, e))?;
    let raw: Value = serde_yml::from_str(&contents)
        .map_err(|e| StoreError::configuration(&config_path, e))?;
    config.config_path = Some(config_path.clone());

    let map = match &raw {
        Value::Mapping(map) => map,
        Value::Null => return Ok(config),
        _ => {
            return Err(StoreError::configuration(
                &config_path,
                "expected a mapping at the top level",
            ));
        }
    };

    for (key, value) in map {
        let Some(key) = key.as_str() else {
            continue;
        };
        match key {
            "componentsDir" => set_path(&mut config.components_dir, value),
            "registryFile" => set_path(&mut config.registry_file, value),
            "tokensFile" => set_path(&mut config.tokens_file, value),
            "schemaFile" => set_path(&mut config.schema_file, value),
            "categories" => {
                let names = value_to_string_list(value).ok_or_else(|| {
                    StoreError::configuration(&config_path, "categories must be a list")
                })?;
                config.categories = parse_categories(&names)
                    .map_err(|reason| StoreError::configuration(&config_path, reason))?;
            }
            "theme" => {
                set_path(&mut config.theme.palette, lookup(value, "palette"));
                set_path(&mut config.theme.typography, lookup(value, "typography"));
                set_path(&mut config.theme.shadows, lookup(value, "shadows"));
                if let Some(unit) = lookup(value, "spacingUnit").as_u64() {
                    config.theme.spacing_unit = u32::try_from(unit)
                        .ok()
                        .filter(|u| (1..=MAX_SPACING_UNIT).contains(u))
                        .ok_or_else(|| {
                            StoreError::configuration(
                                &config_path,
                                format!("spacingUnit must be between 1 and {MAX_SPACING_UNIT}"),
                            )
                        })?;
                }
            }
            "framework" => {
                set_string(&mut config.framework.package, lookup(value, "package"));
                set_string(&mut config.framework.prefix, lookup(value, "prefix"));
            }
            "designSystem" => {
                let ds = &mut config.design_system;
                set_string(&mut ds.name, lookup(value, "name"));
                set_string(&mut ds.package, lookup(value, "package"));
                set_string(&mut ds.import_root, lookup(value, "importRoot"));
                set_string(&mut ds.export_path, lookup(value, "exportPath"));
            }
            "iconOnlyComponents" => {
                if let Some(list) = value_to_string_list(value) {
                    config.icon_only_components = list;
                }
            }
            "exclude" => {
                if let Some(list) = value_to_string_list(value) {
                    config.excludes = list;
                }
            }
            other => {
                tracing::debug!(key = other, "ignoring unknown config key");
            }
        }
    }

    Ok(config)
}

fn parse_categories(names: &[String]) -> Result<Vec<Category>, String> {
    let mut out = Vec::new();
    for name in names {
        let category = Category::from_plural(name)
            .ok_or_else(|| format!("unknown category directory `{name}`"))?;
        if !out.contains(&category) {
            out.push(category);
        }
    }
    if out.is_empty() {
        return Err("categories must not be empty".to_string());
    }
    Ok(out)
}

fn lookup<'a>(value: &'a Value, key: &str) -> &'a Value {
    static NULL: Value = Value::Null;
    value
        .as_mapping()
        .and_then(|m| m.get(&Value::String(key.to_string())))
        .unwrap_or(&NULL)
}

fn set_path(slot: &mut PathBuf, value: &Value) {
    if let Some(s) = value.as_str() {
        *slot = PathBuf::from(s);
    }
}

fn set_string(slot: &mut String, value: &Value) {
    if let Some(s) = value.as_str() {
        *slot = s.to_string();
    }
}

fn value_to_string_list(value: &Value) -> Option<Vec<String>> {
    value.as_sequence().map(|seq| {
        seq.iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    })
}
