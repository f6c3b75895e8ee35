use regex::Regex;

use crate::config::FrameworkConfig;
use crate::metadata::ExternalMapping;

/// Detect which framework component a unit wraps. Rules are tried in order
/// and the first hit wins:
///
/// 1. `import MuiX ... from '<pkg>/Name'` (default import of a component path)
/// 2. `import { Name as MuiName } from '<pkg>'`
/// 3. `import { Name as MuiName` without a recognizable source
/// 4. `<MuiName` used as a tag
pub fn external_mapping(source: &str, framework: &FrameworkConfig) -> Option<ExternalMapping> {
    let pkg = regex::escape(&framework.package);
    let prefix = regex::escape(&framework.prefix);
    let rules = [
        format!(r#"import\s+{prefix}\w*\b[^;\n]*?from\s+['"]{pkg}/(\w+)['"]"#),
        format!(r#"import\s*\{{[^}}]*?\b(\w+)\s+as\s+{prefix}\w+[^}}]*\}}\s*from\s+['"]{pkg}['"]"#),
        format!(r"import\s*\{{\s*(\w+)\s+as\s+{prefix}\w+"),
        format!(r"<{prefix}(\w+)"),
    ];

    rules.iter().find_map(|pattern| {
        let re = Regex::new(pattern).ok()?;
        let name = re.captures(source)?.get(1)?.as_str();
        Some(ExternalMapping {
            name: name.to_string(),
            package_name: framework.package.clone(),
        })
    })
}
