pub mod registry;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cache::{CacheLookup, MetadataCache};
use crate::config::ResolvedConfig;
use crate::error::StoreError;
use crate::fs::metadata_file_name;
use crate::metadata::{Category, ComponentMetadata};
use crate::tokens::TokenDocument;

pub use registry::{MappingTarget, MigrationMapping, Registry, RegistryEntry};

/// Read/write access to the registry, per-component metadata files and the
/// token document of one project.
///
/// Every read goes back to disk: the registry and token document are
/// re-read on each call, and metadata files are served from the
/// [`MetadataCache`] only after their stat or content hash is re-validated.
pub struct MetadataStore {
    config: ResolvedConfig,
    cache: MetadataCache,
}

impl MetadataStore {
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            config,
            cache: MetadataCache::new(),
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// The registry file. Missing or malformed is a configuration error.
    pub fn load_registry(&self) -> Result<Registry, StoreError> {
        let path = self.config.registry_path();
        let text = std::fs::read_to_string(&path)
            .map_err(|e| StoreError::configuration(&path, format!("cannot read registry: {e}")))?;
        serde_json::from_str(&text)
            .map_err(|e| StoreError::configuration(&path, format!("malformed registry: {e}")))
    }

    /// Rebuilt from the registry on every call.
    pub fn migration_mapping(&self) -> Result<MigrationMapping, StoreError> {
        Ok(MigrationMapping::from_registry(&self.load_registry()?))
    }

    pub fn metadata_path(&self, entry: &RegistryEntry) -> PathBuf {
        self.config
            .resolve(Path::new(&entry.storage_path))
            .join(&entry.metadata_file_name)
    }

    /// Parse one metadata file. `Ok(None)` when the file does not exist.
    pub fn read_metadata(&self, path: &Path) -> Result<Option<ComponentMetadata>, StoreError> {
        let content = match self.cache.lookup(path) {
            Ok(CacheLookup::StatHit(meta) | CacheLookup::ContentHit(meta)) => return Ok(Some(meta)),
            Ok(CacheLookup::Miss(content)) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::invalid(path, e)),
        };
        let meta: ComponentMetadata =
            serde_json::from_slice(&content).map_err(|e| StoreError::invalid(path, e))?;
        self.cache.put(path, &content, &meta);
        Ok(Some(meta))
    }

    /// One component by case-insensitive registry name.
    ///
    /// `Ok(None)` when the name is not registered or its file is absent;
    /// `Err` for a broken registry or a malformed metadata file.
    pub fn load_metadata(&self, name: &str) -> Result<Option<ComponentMetadata>, StoreError> {
        let registry = self.load_registry()?;
        let Some(entry) = registry.find(name) else {
            return Ok(None);
        };
        self.read_metadata(&self.metadata_path(entry))
    }

    /// Every registered component whose metadata loads, in registry order.
    /// Missing or malformed files are logged and left out.
    pub fn load_all(&self) -> Result<Vec<ComponentMetadata>, StoreError> {
        let registry = self.load_registry()?;
        Ok(self.load_entries(registry.components.iter()))
    }

    pub fn load_by_category(&self, category: Category) -> Result<Vec<ComponentMetadata>, StoreError> {
        let registry = self.load_registry()?;
        Ok(self.load_entries(registry.by_category(category)))
    }

    fn load_entries<'a>(
        &self,
        entries: impl Iterator<Item = &'a RegistryEntry>,
    ) -> Vec<ComponentMetadata> {
        entries
            .filter_map(|entry| {
                let path = self.metadata_path(entry);
                match self.read_metadata(&path) {
                    Ok(Some(meta)) => Some(meta),
                    Ok(None) => {
                        tracing::warn!(
                            component = %entry.name,
                            path = %path.display(),
                            "metadata file missing, skipping"
                        );
                        None
                    }
                    Err(e) => {
                        tracing::warn!(component = %entry.name, "{e}, skipping");
                        None
                    }
                }
            })
            .collect()
    }

    /// The token document. Missing or malformed is a configuration error.
    pub fn load_tokens(&self) -> Result<TokenDocument, StoreError> {
        let path = self.config.tokens_path();
        let text = std::fs::read_to_string(&path)
            .map_err(|e| StoreError::configuration(&path, format!("cannot read tokens: {e}")))?;
        serde_json::from_str(&text)
            .map_err(|e| StoreError::configuration(&path, format!("malformed tokens: {e}")))
    }

    /// Write `<dir>/<Name>.meta.json`.
    pub fn write_metadata(&self, dir: &Path, meta: &ComponentMetadata) -> Result<PathBuf, StoreError> {
        let path = dir.join(metadata_file_name(&meta.name));
        write_json(&path, meta)?;
        self.cache.invalidate(&path);
        Ok(path)
    }

    pub fn write_registry(&self, registry: &Registry) -> Result<PathBuf, StoreError> {
        let path = self.config.registry_path();
        write_json(&path, registry)?;
        Ok(path)
    }

    pub fn write_tokens(&self, tokens: &TokenDocument) -> Result<PathBuf, StoreError> {
        let path = self.config.tokens_path();
        write_json(&path, tokens)?;
        Ok(path)
    }

    pub fn write_schema(&self, schema: &serde_json::Value) -> Result<PathBuf, StoreError> {
        let path = self.config.schema_path();
        write_json(&path, schema)?;
        Ok(path)
    }
}

/// Pretty-printed JSON with a trailing newline, written to a temp file and
/// renamed into place.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let mut json = serde_json::to_string_pretty(value).map_err(|e| write_err(e.into()))?;
    json.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(write_err)
}
