use std::path::{Path, PathBuf};

use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;

use crate::config::ResolvedConfig;
use crate::error::ScanError;
use crate::metadata::Category;

/// One discovered component: `<categoryDir>/<Name>/<Name>.tsx`.
#[derive(Debug, Clone)]
pub struct ComponentUnit {
    pub name: String,
    pub category: Category,
    pub source_text: String,
    /// Companion `<Name>.stories.tsx`, when present.
    pub story_text: Option<String>,
    /// Unit directory.
    pub dir: PathBuf,
}

impl ComponentUnit {
    pub fn from_source(name: &str, category: Category, source_text: &str) -> Self {
        Self {
            name: name.to_string(),
            category,
            source_text: source_text.to_string(),
            story_text: None,
            dir: PathBuf::from(category.plural()).join(name),
        }
    }

    pub fn metadata_file_name(&self) -> String {
        metadata_file_name(&self.name)
    }
}

pub fn metadata_file_name(name: &str) -> String {
    format!("{name}.meta.json")
}

/// Walks `<componentsDir>/<category>/` for each configured category, in
/// configuration order.
///
/// The scan is lazy and restartable: every call to [`SourceScanner::units`]
/// re-reads the tree. Unit directories without a same-named primary source
/// file are not units and are passed over silently; units whose source
/// cannot be read are yielded as `Err` so the caller can report and move on.
pub struct SourceScanner {
    root: PathBuf,
    categories: Vec<Category>,
    overrides: Option<Override>,
}

impl SourceScanner {
    pub fn new(config: &ResolvedConfig) -> Result<Self, ScanError> {
        Self::with_categories(
            &config.components_root(),
            &config.categories,
            config.excludes(),
        )
    }

    pub fn with_categories(
        root: &Path,
        categories: &[Category],
        excludes: &[String],
    ) -> Result<Self, ScanError> {
        std::fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let overrides = if excludes.is_empty() {
            None
        } else {
            let mut builder = OverrideBuilder::new(root);
            for pattern in excludes {
                if let Err(e) = builder.add(&format!("!{pattern}")) {
                    tracing::warn!(%pattern, error = %e, "ignoring invalid exclude pattern");
                }
            }
            match builder.build() {
                Ok(o) => Some(o),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to build exclude overrides");
                    None
                }
            }
        };

        Ok(Self {
            root: root.to_path_buf(),
            categories: categories.to_vec(),
            overrides,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn units(&self) -> impl Iterator<Item = Result<ComponentUnit, ScanError>> + '_ {
        self.categories.iter().flat_map(move |&category| {
            self.unit_dirs(category)
                .into_iter()
                .filter_map(move |dir| match dir {
                    Ok(dir) => read_unit(category, &dir).transpose(),
                    Err(e) => Some(Err(e)),
                })
        })
    }

    /// Immediate subdirectories of one category directory, sorted by name.
    fn unit_dirs(&self, category: Category) -> Vec<Result<PathBuf, ScanError>> {
        let category_dir = self.root.join(category.plural());
        if !category_dir.is_dir() {
            tracing::debug!(dir = %category_dir.display(), "category directory absent");
            return Vec::new();
        }

        let mut builder = WalkBuilder::new(&category_dir);
        builder
            .max_depth(Some(1))
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        if let Some(overrides) = &self.overrides {
            builder.overrides(overrides.clone());
        }

        let mut dirs = Vec::new();
        for entry in builder.build() {
            match entry {
                Ok(entry) => {
                    if entry.depth() == 1 && entry.file_type().is_some_and(|t| t.is_dir()) {
                        dirs.push(Ok(entry.into_path()));
                    }
                }
                Err(e) => dirs.push(Err(ScanError::UnitUnreadable {
                    path: category_dir.clone(),
                    reason: e.to_string(),
                })),
            }
        }
        dirs
    }
}

fn read_unit(category: Category, dir: &Path) -> Result<Option<ComponentUnit>, ScanError> {
    let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let primary = dir.join(format!("{name}.tsx"));
    if !primary.is_file() {
        return Ok(None);
    }

    let source_text =
        std::fs::read_to_string(&primary).map_err(|e| ScanError::UnitUnreadable {
            path: primary.clone(),
            reason: e.to_string(),
        })?;

    let story_path = dir.join(format!("{name}.stories.tsx"));
    let story_text = if story_path.is_file() {
        match std::fs::read_to_string(&story_path) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(path = %story_path.display(), error = %e, "unreadable story file");
                None
            }
        }
    } else {
        None
    };

    Ok(Some(ComponentUnit {
        name: name.to_string(),
        category,
        source_text,
        story_text,
        dir: dir.to_path_buf(),
    }))
}
