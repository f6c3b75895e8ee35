use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::correction::{Correction, CorrectionSet};
use crate::store::MigrationMapping;

static NAMED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bimport\s+(?:type\s+)?(?:([A-Za-z_$][\w$]*)\s*,\s*)?\{([^}]*)\}\s*from\s*['"]([^'"]+)['"][ \t]*;?[ \t]*\n?"#,
    )
    .unwrap()
});
static DEFAULT_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s+([A-Za-z_$][\w$]*)\s+from\s*['"]([^'"]+)['"][ \t]*;?[ \t]*\n?"#)
        .unwrap()
});

/// `external → designSystem`, as recorded in the change log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub from: String,
    pub to: String,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub code: String,
    /// Ordered, without duplicates.
    pub changes: Vec<Change>,
}

impl MigrationOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn render_markdown(&self, framework: &str) -> String {
        let mut out = String::from("## Migration Result\n\n");
        if self.changes.is_empty() {
            out.push_str(&format!(
                "No {framework} components found to migrate. The code may already use the design system or contain components without direct mappings.\n"
            ));
            return out;
        }
        out.push_str("### Changes Made\n");
        for change in &self.changes {
            out.push_str(&format!("- {change}\n"));
        }
        out.push_str(&format!(
            "\n### Migrated Code\n```tsx\n{}\n```\n",
            self.code.trim()
        ));
        out
    }
}

#[derive(Debug)]
struct Specifier {
    imported: String,
    local: String,
    text: String,
}

/// An import statement pulling components from the framework.
#[derive(Debug)]
struct ExternalImport {
    /// Whole statement including trailing `;` and line break.
    span: (usize, usize),
    /// Inside of `{ ... }`, for named imports.
    braces: Option<(usize, usize)>,
    default_local: Option<String>,
    /// Component named by a `<pkg>/<Name>` path import.
    path_component: Option<String>,
    specifiers: Vec<Specifier>,
}

/// Rewrites framework component imports and JSX tags to design-system
/// components.
///
/// Pure text transformation. Running it on its own output changes nothing
/// and records no changes.
pub struct MigrationTransformer<'a> {
    mapping: &'a MigrationMapping,
    framework_package: &'a str,
    design_system_package: &'a str,
}

impl<'a> MigrationTransformer<'a> {
    pub fn new(
        mapping: &'a MigrationMapping,
        framework_package: &'a str,
        design_system_package: &'a str,
    ) -> Self {
        Self {
            mapping,
            framework_package,
            design_system_package,
        }
    }

    pub fn transform(&self, source: &str) -> MigrationOutcome {
        let imports = self.external_imports(source);
        let ds_names: HashSet<&str> = self
            .mapping
            .iter()
            .map(|(_, t)| t.design_system_component.as_str())
            .collect();

        let mut edits = Vec::new();
        let mut changes: Vec<Change> = Vec::new();
        let mut introduced: Vec<String> = Vec::new();
        // (import index, specifier index); `usize::MAX` marks a path import.
        let mut migrated: HashSet<(usize, usize)> = HashSet::new();

        for (priority, (external, target)) in self.mapping.iter().enumerate() {
            let priority = priority + 1;
            let ds_name = target.design_system_component.as_str();

            let mut locals: Vec<&str> = Vec::new();
            for (i, import) in imports.iter().enumerate() {
                if import.path_component.as_deref() == Some(external) {
                    if let Some(local) = import.default_local.as_deref() {
                        if !locals.contains(&local) {
                            locals.push(local);
                        }
                    }
                    migrated.insert((i, usize::MAX));
                }
                for (j, spec) in import.specifiers.iter().enumerate() {
                    if spec.imported == external {
                        if !locals.contains(&spec.local.as_str()) {
                            locals.push(&spec.local);
                        }
                        migrated.insert((i, j));
                    }
                }
            }
            let imported = !locals.is_empty();
            if !ds_names.contains(external) && !locals.contains(&external) {
                locals.push(external);
            }

            let mut tagged = false;
            for local in locals {
                for (start, end) in tag_name_spans(source, local) {
                    edits.push(Correction::replace(start, end, ds_name, priority));
                    tagged = true;
                }
            }

            if imported || tagged {
                let change = Change {
                    from: external.to_string(),
                    to: ds_name.to_string(),
                };
                if !changes.contains(&change) {
                    changes.push(change);
                }
                if !introduced.iter().any(|n| n == ds_name) {
                    introduced.push(ds_name.to_string());
                }
            }
        }

        for (i, import) in imports.iter().enumerate() {
            edits.extend(strip_migrated(source, i, import, &migrated));
        }

        if !introduced.is_empty() {
            edits.extend(self.design_system_import(source, &introduced));
        }

        let code = CorrectionSet::from_vec(edits).apply(source);
        MigrationOutcome { code, changes }
    }

    fn external_imports(&self, source: &str) -> Vec<ExternalImport> {
        let mut imports = Vec::new();
        let path_prefix = format!("{}/", self.framework_package);

        for caps in NAMED_IMPORT.captures_iter(source) {
            let (Some(whole), Some(braces), Some(from)) = (caps.get(0), caps.get(2), caps.get(3))
            else {
                continue;
            };
            if from.as_str() != self.framework_package {
                continue;
            }
            imports.push(ExternalImport {
                span: (whole.start(), whole.end()),
                braces: Some((braces.start(), braces.end())),
                default_local: caps.get(1).map(|m| m.as_str().to_string()),
                path_component: None,
                specifiers: parse_specifiers(braces.as_str()),
            });
        }

        for caps in DEFAULT_IMPORT.captures_iter(source) {
            let (Some(whole), Some(local), Some(from)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let Some(component) = from.as_str().strip_prefix(&path_prefix) else {
                continue;
            };
            if component.contains('/') {
                continue;
            }
            imports.push(ExternalImport {
                span: (whole.start(), whole.end()),
                braces: None,
                default_local: Some(local.as_str().to_string()),
                path_component: Some(component.to_string()),
                specifiers: Vec::new(),
            });
        }

        imports.sort_by_key(|i| i.span.0);
        imports
    }

    /// Merge into an existing design-system import, or prepend a new one.
    fn design_system_import(&self, source: &str, introduced: &[String]) -> Option<Correction> {
        let existing = NAMED_IMPORT.captures_iter(source).find(|caps| {
            caps.get(3).is_some_and(|m| m.as_str() == self.design_system_package)
        });

        if let Some(braces) = existing.as_ref().and_then(|caps| caps.get(2)) {
            let current = parse_specifiers(braces.as_str());
            let missing: Vec<&str> = introduced
                .iter()
                .map(String::as_str)
                .filter(|name| !current.iter().any(|s| s.local == *name))
                .collect();
            if missing.is_empty() {
                return None;
            }
            let mut names: Vec<&str> = current.iter().map(|s| s.text.as_str()).collect();
            names.extend(missing);
            return Some(Correction::replace(
                braces.start(),
                braces.end(),
                format!(" {} ", names.join(", ")),
                0,
            ));
        }

        Some(Correction::replace(
            0,
            0,
            format!(
                "import {{ {} }} from '{}';\n",
                introduced.join(", "),
                self.design_system_package
            ),
            0,
        ))
    }
}

/// Drop migrated specifiers; a statement left with nothing to import goes.
fn strip_migrated(
    source: &str,
    index: usize,
    import: &ExternalImport,
    migrated: &HashSet<(usize, usize)>,
) -> Option<Correction> {
    if import.path_component.is_some() {
        return migrated
            .contains(&(index, usize::MAX))
            .then(|| Correction::delete(import.span.0, import.span.1, usize::MAX));
    }

    let remaining: Vec<&Specifier> = import
        .specifiers
        .iter()
        .enumerate()
        .filter(|(j, _)| !migrated.contains(&(index, *j)))
        .map(|(_, s)| s)
        .collect();
    if remaining.len() == import.specifiers.len() {
        return None;
    }
    if remaining.is_empty() && import.default_local.is_none() {
        return Some(Correction::delete(import.span.0, import.span.1, usize::MAX));
    }

    let (start, end) = import.braces?;
    let inner = &source[start..end];
    let text = if remaining.is_empty() {
        String::from(" ")
    } else if inner.contains('\n') {
        let indent = "  ";
        format!(
            "\n{}\n",
            remaining
                .iter()
                .map(|s| format!("{indent}{},", s.text))
                .collect::<Vec<_>>()
                .join("\n")
        )
    } else {
        format!(
            " {} ",
            remaining.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(", ")
        )
    };
    Some(Correction::replace(start, end, text, usize::MAX))
}

fn parse_specifiers(inner: &str) -> Vec<Specifier> {
    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|text| {
            let bare = text.strip_prefix("type ").unwrap_or(text).trim();
            let (imported, local) = match bare.split_once(" as ") {
                Some((imported, local)) => (imported.trim(), local.trim()),
                None => (bare, bare),
            };
            Specifier {
                imported: imported.to_string(),
                local: local.to_string(),
                text: text.to_string(),
            }
        })
        .collect()
}

/// Byte spans of the tag name in every `<Name` / `</Name` followed by
/// whitespace, `/` or `>`.
fn tag_name_spans(source: &str, name: &str) -> Vec<(usize, usize)> {
    let Ok(re) = fancy_regex::Regex::new(&format!(r"<(/?){}(?=[\s/>])", regex::escape(name)))
    else {
        return Vec::new();
    };
    let mut spans = Vec::new();
    for caps in re.captures_iter(source) {
        let Ok(caps) = caps else {
            break;
        };
        if let Some(slash) = caps.get(1) {
            spans.push((slash.end(), slash.end() + name.len()));
        }
    }
    spans
}
