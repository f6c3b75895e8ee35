use std::sync::LazyLock;

use regex::Regex;

static DOC_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*\*(.*?)\*/").unwrap());
static DECORATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\*\s?").unwrap());
static ANY_EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*export\s+(?:default\s+)?(?:const|function)\b").unwrap());

/// Strip comment decoration from the inside of a `/** ... */` block and
/// join the remaining non-empty lines with single spaces.
pub fn clean_doc(raw: &str) -> String {
    raw.lines()
        .map(|line| DECORATION.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Content of the documentation block that ends immediately before a match
/// of `anchor` (which must be `^`-anchored). Only whitespace may separate
/// the block from the declaration.
pub fn doc_before(text: &str, anchor: &Regex) -> Option<String> {
    DOC_BLOCK.captures_iter(text).find_map(|caps| {
        let block = caps.get(0)?;
        if anchor.is_match(&text[block.end()..]) {
            caps.get(1).map(|inner| inner.as_str().to_string())
        } else {
            None
        }
    })
}

/// Description of a component: the doc block before its primary export,
/// else before any exported `const`/`function`, else before its props
/// declaration. Empty cleaned text counts as absent.
pub fn component_description(source: &str, name: &str) -> Option<String> {
    let escaped = regex::escape(name);
    let primary = Regex::new(&format!(
        r"^\s*export\s+(?:default\s+)?(?:const|function)\s+{escaped}\b"
    ))
    .ok();
    let props_decl = Regex::new(&format!(
        r"^\s*export\s+(?:interface|type)\s+{escaped}Props\b"
    ))
    .ok();

    let anchors = [primary.as_ref(), Some(&*ANY_EXPORT), props_decl.as_ref()];
    anchors
        .into_iter()
        .flatten()
        .filter_map(|anchor| doc_before(source, anchor))
        .map(|raw| clean_doc(&raw))
        .find(|text| !text.is_empty())
}
