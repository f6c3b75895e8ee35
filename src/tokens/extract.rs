use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{DTCG_SCHEMA, TokenDocument, TokenGroup, TokenKind, TokenLeaf};
use crate::config::ResolvedConfig;
use crate::extract::balanced_block;

/// Palette groups, each tagged on its `main` key.
const PALETTE_GROUPS: [(&str, &str); 6] = [
    ("primary", "Primary brand color"),
    ("secondary", "Secondary brand color"),
    ("error", "Error/destructive color"),
    ("warning", "Warning color"),
    ("info", "Informational color"),
    ("success", "Success color"),
];

const TYPOGRAPHY_VARIANTS: [&str; 15] = [
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "body1",
    "body2",
    "body2Medium",
    "body2Bold",
    "subtitle1",
    "subtitle2",
    "overline",
    "caption",
    "button",
];

const SPACING_STEPS: [u32; 10] = [0, 1, 2, 3, 4, 5, 6, 8, 10, 12];

static STRING_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)\s*:\s*(?:'([^']+)'|"([^"]+)")"#).unwrap());
static NUMERIC_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]?(\d+)['"]?\s*:\s*(?:'([^']+)'|"([^"]+)")"#).unwrap());
static DIVIDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bdivider\s*:\s*(?:'([^']+)'|"([^"]+)")"#).unwrap());
static FONT_FAMILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bfontFamily\s*:\s*(?:'([^']+)'|"([^"]+)")"#).unwrap());
static FONT_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bfontSize\s*:\s*(?:'([^']+)'|"([^"]+)")"#).unwrap());
static FONT_WEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bfontWeight\s*:\s*['"]?(\d+)"#).unwrap());
static LINE_HEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\blineHeight\s*:\s*['"]?([^'",\s}]+)['"]?"#).unwrap());
static LETTER_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bletterSpacing\s*:\s*(?:'([^']+)'|"([^"]+)")"#).unwrap());
static TEXT_TRANSFORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\btextTransform\s*:\s*(?:'([^']+)'|"([^"]+)")"#).unwrap());
static SHADOW_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\bconst\s+shadows\b[^=]*=\s*\[(.*?)\]\s*(?:as\s+\w+(?:\[\])?\s*)?;").unwrap()
});
static SHADOW_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:'([^']*)'|"([^"]*)")(?:[ \t]*,?[ \t]*//[ \t]*([^\n]*))?"#).unwrap()
});
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d+)?").unwrap());

/// Raw text of the theme sources; any of them may be missing.
#[derive(Debug, Clone, Default)]
pub struct ThemeTexts {
    pub palette: Option<String>,
    pub typography: Option<String>,
    pub shadows: Option<String>,
}

impl ThemeTexts {
    pub fn load(config: &ResolvedConfig) -> Self {
        Self {
            palette: read_optional(&config.resolve(&config.theme.palette)),
            typography: read_optional(&config.resolve(&config.theme.typography)),
            shadows: read_optional(&config.resolve(&config.theme.shadows)),
        }
    }
}

fn read_optional(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "theme source unavailable");
            None
        }
    }
}

/// Build the full document. Categories parsed from a missing or
/// unrecognizable source are omitted; the constant categories are always
/// present.
pub fn build_document(sources: &ThemeTexts, spacing_unit: u32, system_name: &str) -> TokenDocument {
    let mut root = TokenGroup::described(&format!("{system_name} tokens in DTCG format"));
    root.extra
        .push(("$schema".to_string(), Value::String(DTCG_SCHEMA.to_string())));

    if let Some(color) = sources.palette.as_deref().and_then(extract_palette) {
        root.insert("color", color);
    }
    if let Some(typography) = sources.typography.as_deref().and_then(extract_typography) {
        root.insert("typography", typography);
    }
    root.insert("spacing", spacing_tokens(spacing_unit));
    root.insert("borderRadius", border_radius_tokens());
    if let Some(shadows) = sources.shadows.as_deref().and_then(extract_shadows) {
        root.insert("shadows", shadows);
    }
    root.insert("componentOverrides", component_override_tokens());

    TokenDocument { root }
}

/// First match of `re` whose value is a single- or double-quoted string
/// captured by the two groups starting at `group`.
fn quoted<'t>(re: &Regex, text: &'t str, group: usize) -> Option<&'t str> {
    let caps = re.captures(text)?;
    caps.get(group)
        .or_else(|| caps.get(group + 1))
        .map(|m| m.as_str())
}

/// Inner text of the first `<name>: { ... }` block.
fn named_block<'a>(content: &'a str, name: &str) -> Option<&'a str> {
    let re = Regex::new(&format!(r"\b{}\s*:\s*\{{", regex::escape(name))).ok()?;
    let m = re.find(content)?;
    let (start, end) = balanced_block(content, m.end() - 1)?;
    Some(&content[start..end])
}

fn color_pairs(block: &str, pattern: &Regex) -> Vec<(String, TokenLeaf)> {
    pattern
        .captures_iter(block)
        .filter_map(|c| {
            let key = c.get(1)?.as_str().to_string();
            let value = c.get(2).or_else(|| c.get(3))?.as_str();
            Some((key, TokenLeaf::new(value, TokenKind::Color)))
        })
        .collect()
}

pub fn extract_palette(content: &str) -> Option<TokenGroup> {
    let mut colors = TokenGroup::described("Color palette tokens");

    for (name, description) in PALETTE_GROUPS {
        let Some(block) = named_block(content, name) else {
            tracing::debug!(group = name, "palette group not found");
            continue;
        };
        let mut group = TokenGroup::new();
        for (key, leaf) in color_pairs(block, &STRING_PAIR) {
            let leaf = if key == "main" {
                leaf.described(description)
            } else {
                leaf
            };
            group.insert(key, leaf);
        }
        colors.insert(name, group);
    }

    let scales = [
        ("grey", "Neutral grey scale", &*NUMERIC_PAIR),
        ("text", "Text color tokens", &*STRING_PAIR),
        ("background", "Background color tokens", &*STRING_PAIR),
    ];
    for (name, description, pattern) in scales {
        if let Some(block) = named_block(content, name) {
            let mut group = TokenGroup::described(description);
            for (key, leaf) in color_pairs(block, pattern) {
                group.insert(key, leaf);
            }
            colors.insert(name, group);
        }
    }

    if let Some(divider) = quoted(&DIVIDER, content, 1) {
        colors.insert(
            "divider",
            TokenLeaf::new(divider, TokenKind::Color).described("Divider/border color"),
        );
    }

    (!colors.is_empty()).then_some(colors)
}

pub fn extract_typography(content: &str) -> Option<TokenGroup> {
    let mut typography = TokenGroup::described("Typography scale tokens");

    if let Some(family) = quoted(&FONT_FAMILY, content, 1) {
        typography.insert(
            "fontFamily",
            TokenGroup::new().with(
                "base",
                TokenLeaf::new(family, TokenKind::FontFamily)
                    .described("Base font family for the entire design system"),
            ),
        );
    }

    for variant in TYPOGRAPHY_VARIANTS {
        let Some(block) = named_block(content, variant) else {
            continue;
        };
        typography.insert(variant, variant_tokens(block));
    }

    (!typography.is_empty()).then_some(typography)
}

fn variant_tokens(block: &str) -> TokenGroup {
    let mut entry = TokenGroup::new();

    if let Some(size) = quoted(&FONT_SIZE, block, 1) {
        entry.insert("fontSize", TokenLeaf::new(size, TokenKind::Dimension));
    }
    if let Some(weight) = FONT_WEIGHT
        .captures(block)
        .and_then(|c| c[1].parse::<u64>().ok())
    {
        entry.insert("fontWeight", TokenLeaf::new(weight, TokenKind::FontWeight));
    }
    if let Some(c) = LINE_HEIGHT.captures(block) {
        entry.insert("lineHeight", line_height(&c[1]));
    }
    if let Some(spacing) = quoted(&LETTER_SPACING, block, 1) {
        entry.insert("letterSpacing", TokenLeaf::new(spacing, TokenKind::Dimension));
    }
    if let Some(family) = quoted(&FONT_FAMILY, block, 1) {
        entry.insert("fontFamily", TokenLeaf::new(family, TokenKind::FontFamily));
    }
    if let Some(transform) = quoted(&TEXT_TRANSFORM, block, 1) {
        entry.insert("textTransform", TokenLeaf::new(transform, TokenKind::Other));
    }

    entry
}

/// `'20px'` is a dimension; `1.5` is a bare number.
fn line_height(raw: &str) -> TokenLeaf {
    if raw.contains("px") {
        return TokenLeaf::new(raw, TokenKind::Dimension);
    }
    let number = LEADING_NUMBER
        .find(raw)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .and_then(serde_json::Number::from_f64);
    match number {
        Some(n) => TokenLeaf::new(normalize_number(n), TokenKind::Number),
        None => TokenLeaf::new(raw, TokenKind::Other),
    }
}

/// Whole floats are written as integers (`1`, not `1.0`).
fn normalize_number(n: serde_json::Number) -> Value {
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Value::from(f as i64),
        _ => Value::Number(n),
    }
}

pub fn extract_shadows(content: &str) -> Option<TokenGroup> {
    let list = SHADOW_LIST.captures(content)?.get(1)?.as_str();
    let mut shadows = TokenGroup::described("Elevation shadow tokens from Figma");

    for (index, caps) in SHADOW_ENTRY.captures_iter(list).enumerate() {
        let Some(value) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let key = if index == 0 {
            "none".to_string()
        } else {
            format!("elevation{index}")
        };
        let mut leaf = TokenLeaf::new(value.as_str(), TokenKind::Shadow);
        if let Some(comment) = caps.get(3).map(|c| c.as_str().trim()).filter(|c| !c.is_empty()) {
            leaf = leaf.described(comment);
        }
        shadows.insert(key, leaf);
    }

    Some(shadows)
}

pub fn spacing_tokens(unit: u32) -> TokenGroup {
    let mut spacing = TokenGroup::described(&format!("Spacing scale based on {unit}px base unit"));
    spacing.insert(
        "base",
        TokenLeaf::new(format!("{unit}px"), TokenKind::Dimension).described("Base spacing unit"),
    );
    for step in SPACING_STEPS {
        spacing.insert(
            step.to_string(),
            TokenLeaf::new(
                format!("{}px", u64::from(step) * u64::from(unit)),
                TokenKind::Dimension,
            ),
        );
    }
    spacing
}

fn dimension(value: &str) -> TokenLeaf {
    TokenLeaf::new(value, TokenKind::Dimension)
}

pub fn border_radius_tokens() -> TokenGroup {
    TokenGroup::described("Border radius tokens")
        .with("default", dimension("8px").described("Default border radius"))
        .with(
            "small",
            dimension("6px").described("Used for chips and small elements"),
        )
        .with(
            "medium",
            dimension("8px").described("Used for buttons, inputs, cards"),
        )
        .with("large", dimension("12px").described("Used for dialogs and cards"))
        .with(
            "full",
            dimension("100px").described("Used for avatars and circular elements"),
        )
}

fn radius_only(value: &str) -> TokenGroup {
    TokenGroup::new().with("borderRadius", dimension(value))
}

fn sized(small: &str, medium: &str, large: &str) -> TokenGroup {
    TokenGroup::new()
        .with("small", dimension(small))
        .with("medium", dimension(medium))
        .with("large", dimension(large))
}

pub fn component_override_tokens() -> TokenGroup {
    TokenGroup::described("Component-specific design token overrides")
        .with(
            "button",
            radius_only("8px")
                .with("padding", sized("6px 16px", "10px 24px", "12px 32px"))
                .with("fontSize", sized("0.8125rem", "0.9375rem", "1.05rem")),
        )
        .with(
            "input",
            radius_only("8px")
                .with("padding", dimension("10px 14px"))
                .with("fontSize", dimension("14px"))
                .with("lineHeight", dimension("20px"))
                .with("borderWidth", dimension("1px"))
                .with("focusBorderWidth", dimension("1.5px")),
        )
        .with(
            "card",
            radius_only("12px").with(
                "shadow",
                TokenLeaf::new(
                    "0 1px 3px 0 rgba(0, 0, 0, 0.1), 0 1px 2px 0 rgba(0, 0, 0, 0.06)",
                    TokenKind::Shadow,
                ),
            ),
        )
        .with("chip", radius_only("6px"))
        .with("dialog", radius_only("12px"))
        .with("avatar", radius_only("100px"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenNode;

    const PALETTE: &str = r##"
export const palette = {
  primary: { main: '#266079', light: '#5a8ea6', dark: '#1a4355', contrastText: '#ffffff' },
  secondary: {
    main: "#7b61ff",
  },
  error: { main: '#d32f2f' },
  grey: {
    50: '#fafafa',
    100: '#f5f5f5',
  },
  text: { primary: '#1a1a1a', secondary: '#666666' },
  background: { default: '#f7f8fa', paper: '#ffffff' },
  divider: '#e0e0e0',
};
"##;

    const TYPOGRAPHY: &str = r#"
export const typography = {
  fontFamily: '"Inter", sans-serif',
  h1: { fontSize: '48px', fontWeight: 600, lineHeight: '56px', letterSpacing: '-0.5px' },
  body1: { fontSize: '16px', fontWeight: 400, lineHeight: 1.5 },
  body2Medium: { fontSize: '14px', fontWeight: 500, lineHeight: 1 },
  button: { fontSize: '14px', fontWeight: 600, textTransform: 'none', fontFamily: 'Roboto' },
};
"#;

    const THEME: &str = r#"
const shadows = [
  'none',
  '0px 1px 2px rgba(0,0,0,0.05)', // xs
  '0px 2px 4px rgba(0,0,0,0.08)',
  // standalone comment
  "0px 4px 8px rgba(0,0,0,0.12)", // md
];
"#;

    fn leaf<'a>(g: &'a TokenGroup, path: &[&str]) -> &'a TokenLeaf {
        let mut node = g.get(path[0]).unwrap();
        for k in &path[1..] {
            node = node.as_group().unwrap().get(k).unwrap();
        }
        node.as_leaf().unwrap()
    }

    #[test]
    fn palette_groups_and_scales() {
        let colors = extract_palette(PALETTE).unwrap();
        let main = leaf(&colors, &["primary", "main"]);
        assert_eq!(main.value, "#266079");
        assert_eq!(main.kind, TokenKind::Color);
        assert_eq!(main.description.as_deref(), Some("Primary brand color"));
        assert_eq!(leaf(&colors, &["primary", "light"]).description, None);
        assert_eq!(leaf(&colors, &["secondary", "main"]).value, "#7b61ff");
        assert!(colors.get("warning").is_none());
        assert_eq!(leaf(&colors, &["grey", "100"]).value, "#f5f5f5");
        assert_eq!(leaf(&colors, &["text", "secondary"]).value, "#666666");
        assert_eq!(leaf(&colors, &["background", "paper"]).value, "#ffffff");
        assert_eq!(leaf(&colors, &["divider"]).value, "#e0e0e0");
        // `contrastText` inside primary does not start a text group.
        assert_eq!(
            colors.get("text").unwrap().as_group().unwrap().description.as_deref(),
            Some("Text color tokens")
        );
    }

    #[test]
    fn typography_variants() {
        let typo = extract_typography(TYPOGRAPHY).unwrap();
        assert_eq!(
            leaf(&typo, &["fontFamily", "base"]).value,
            "\"Inter\", sans-serif"
        );
        let h1_size = leaf(&typo, &["h1", "fontSize"]);
        assert_eq!(h1_size.kind, TokenKind::Dimension);
        assert_eq!(leaf(&typo, &["h1", "fontWeight"]).value, 600);
        assert_eq!(leaf(&typo, &["h1", "lineHeight"]).kind, TokenKind::Dimension);
        assert_eq!(leaf(&typo, &["h1", "letterSpacing"]).value, "-0.5px");
        let body_lh = leaf(&typo, &["body1", "lineHeight"]);
        assert_eq!(body_lh.kind, TokenKind::Number);
        assert_eq!(body_lh.value, 1.5);
        assert_eq!(leaf(&typo, &["body2Medium", "lineHeight"]).value, 1);
        assert_eq!(leaf(&typo, &["button", "textTransform"]).kind, TokenKind::Other);
        assert_eq!(leaf(&typo, &["button", "fontFamily"]).value, "Roboto");
        assert!(typo.get("h2").is_none());
    }

    #[test]
    fn shadow_list_with_trailing_comments() {
        let shadows = extract_shadows(THEME).unwrap();
        let keys: Vec<_> = shadows.keys().collect();
        assert_eq!(keys, vec!["none", "elevation1", "elevation2", "elevation3"]);
        assert_eq!(leaf(&shadows, &["none"]).value, "none");
        assert_eq!(leaf(&shadows, &["elevation1"]).description.as_deref(), Some("xs"));
        assert_eq!(leaf(&shadows, &["elevation2"]).description, None);
        assert_eq!(leaf(&shadows, &["elevation3"]).description.as_deref(), Some("md"));
    }

    #[test]
    fn spacing_scale_follows_unit() {
        let spacing = spacing_tokens(4);
        assert_eq!(leaf(&spacing, &["base"]).value, "4px");
        assert_eq!(leaf(&spacing, &["12"]).value, "48px");
        assert_eq!(spacing.keys().count(), 11);
    }

    #[test]
    fn spacing_scale_does_not_wrap_for_large_units() {
        let spacing = spacing_tokens(u32::MAX);
        assert_eq!(leaf(&spacing, &["12"]).value, "51539607540px");
    }

    #[test]
    fn missing_sources_omit_only_their_categories() {
        let sources = ThemeTexts {
            palette: Some(PALETTE.to_string()),
            typography: None,
            shadows: Some("export const theme = {};".to_string()),
        };
        let doc = build_document(&sources, 8, "Acme");
        assert_eq!(
            doc.category_names(),
            vec!["color", "spacing", "borderRadius", "componentOverrides"]
        );
        assert_eq!(doc.root.description.as_deref(), Some("Acme tokens in DTCG format"));
        assert!(doc.invariant_violations().is_empty());
    }

    #[test]
    fn full_document_satisfies_invariants() {
        let sources = ThemeTexts {
            palette: Some(PALETTE.to_string()),
            typography: Some(TYPOGRAPHY.to_string()),
            shadows: Some(THEME.to_string()),
        };
        let doc = build_document(&sources, 8, "Acme");
        assert!(doc.missing_categories().is_empty());
        assert!(doc.invariant_violations().is_empty());
        match doc.lookup(&["componentOverrides", "button", "padding", "large"]) {
            Some(TokenNode::Leaf(l)) => assert_eq!(l.value, "12px 32px"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
