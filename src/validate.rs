use serde::Serialize;

use crate::metadata::{Accessibility, Category, ComponentMetadata};

/// Props that count as an accessible label for icon-only components.
pub const LABEL_PROPS: [&str; 2] = ["aria-label", "aria-labelledby"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub component: String,
    pub category: Option<Category>,
    pub valid: bool,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub accessibility: Option<Accessibility>,
}

impl UsageReport {
    /// The single-entry answer for a name the registry does not know.
    pub fn unknown(name: &str) -> Self {
        Self {
            component: name.to_string(),
            category: None,
            valid: false,
            warnings: vec![format!("Component \"{name}\" not found.")],
            suggestions: Vec::new(),
            accessibility: None,
        }
    }
}

/// Checks a proposed usage against a component's metadata and guidelines.
pub struct ValidationEngine<'a> {
    icon_only_components: &'a [String],
}

impl<'a> ValidationEngine<'a> {
    pub fn new(icon_only_components: &'a [String]) -> Self {
        Self {
            icon_only_components,
        }
    }

    /// Warnings make a usage invalid; suggestions never do.
    pub fn validate(
        &self,
        meta: &ComponentMetadata,
        supplied: &[String],
        context: Option<&str>,
    ) -> UsageReport {
        let has = |name: &str| supplied.iter().any(|p| p == name);
        let mut warnings = Vec::new();

        for prop in meta.props.iter().filter(|p| p.required && !has(p.name.as_str())) {
            warnings.push(format!(
                "Missing required prop: \"{}\" ({}) - {}",
                prop.name, prop.type_expr, prop.description
            ));
        }

        let icon_only = self
            .icon_only_components
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&meta.name));
        if icon_only && !LABEL_PROPS.into_iter().any(has) {
            warnings.push(format!(
                "{} should have an aria-label since it has no visible text",
                meta.name
            ));
        }

        let guidelines = meta.usage_guidelines.as_ref();
        if let (Some(context), Some(guidelines)) = (context, guidelines) {
            let context = context.to_lowercase();
            for entry in &guidelines.when_not_to_use {
                let clause = leading_clause(entry);
                if !clause.is_empty() && context.contains(&clause) {
                    warnings.push(format!("Potential misuse: {entry}"));
                }
            }
        }

        UsageReport {
            component: meta.name.clone(),
            category: Some(meta.category),
            valid: warnings.is_empty(),
            warnings,
            suggestions: guidelines
                .map(|g| g.best_practices.clone())
                .unwrap_or_default(),
            accessibility: meta.accessibility.clone(),
        }
    }
}

/// Lowercased text before the first `(`, trimmed.
fn leading_clause(entry: &str) -> String {
    entry
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
