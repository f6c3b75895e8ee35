use std::sync::LazyLock;

use regex::Regex;

use super::docs::clean_doc;
use super::{balanced_block, skip_block_comment, skip_line_comment, skip_string};
use crate::metadata::{DefaultValue, PropDescriptor, is_reserved_prop};

static LEADING_DOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*/\*\*(.*?)\*/").unwrap());
static LEADING_LINE_COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\s*//[^\n]*\n)*\s*").unwrap());
static MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)^(?:readonly\s+)?(?:'([^']+)'|"([^"]+)"|([A-Za-z_$][\w$]*))\s*(\?)?\s*:\s*(.+)$"#,
    )
    .unwrap()
});
static DEFAULT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"@default\s+('[^']*'|"[^"]*"|\S+)"#).unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Props declared by `<Name>Props`, in declaration order.
///
/// Accepts `interface NameProps ... {` and `type NameProps = ... {`. Each
/// top-level member yields one descriptor; nested object types stay part of
/// their member's type text.
pub fn extract_props(source: &str, name: &str) -> Vec<PropDescriptor> {
    let Some(body) = props_body(source, name) else {
        return Vec::new();
    };

    let mut props: Vec<PropDescriptor> = Vec::new();
    for member in split_members(body) {
        let Some(prop) = parse_member(member, source) else {
            continue;
        };
        if is_reserved_prop(&prop.name) || props.iter().any(|p| p.name == prop.name) {
            continue;
        }
        props.push(prop);
    }
    props
}

fn props_body<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    let escaped = regex::escape(name);
    let decl = Regex::new(&format!(
        r"(?:export\s+)?(?:interface\s+{escaped}Props\b[^{{]*|type\s+{escaped}Props\s*=[^{{]*)\{{"
    ))
    .ok()?;
    let m = decl.find(source)?;
    let (start, end) = balanced_block(source, m.end() - 1)?;
    Some(&source[start..end])
}

/// Split an interface body into member texts (each including its leading
/// doc block). Members end at a top-level `;` or `,`, or at a top-level line
/// break when the member is complete and the next line does not continue
/// its type.
fn split_members(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut members = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'(' | b'[' | b'<' => depth += 1,
            b'}' | b')' | b']' => depth -= 1,
            b'>' if i > 0 && bytes[i - 1] != b'=' => depth -= 1,
            b'\'' | b'"' | b'`' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b';' | b',' if depth <= 0 => {
                members.push(&body[start..i]);
                start = i + 1;
            }
            b'\n' if depth <= 0 && ends_member(&body[start..i], &body[i + 1..]) => {
                members.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < body.len() {
        members.push(&body[start..]);
    }
    members.into_iter().filter(|m| !m.trim().is_empty()).collect()
}

fn ends_member(pending: &str, rest: &str) -> bool {
    let code = strip_leading_comments(pending).trim_end();
    if code.is_empty() || !code.contains(':') {
        return false;
    }
    if ["|", "&", "=>", ":", "?"].iter().any(|t| code.ends_with(t)) {
        return false;
    }
    let next = rest.trim_start();
    !(next.starts_with('|') || next.starts_with('&') || next.starts_with("=>"))
}

fn strip_leading_comments(member: &str) -> &str {
    let mut rest = member;
    loop {
        let before = rest.len();
        if let Some(m) = LEADING_DOC.find(rest) {
            rest = &rest[m.end()..];
        }
        if let Some(m) = LEADING_LINE_COMMENTS.find(rest) {
            rest = &rest[m.end()..];
        }
        if rest.len() == before {
            return rest;
        }
    }
}

fn parse_member(member: &str, source: &str) -> Option<PropDescriptor> {
    let doc = LEADING_DOC
        .captures(member)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    let code = strip_leading_comments(member).trim();

    let caps = MEMBER.captures(code)?;
    let name = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))?
        .as_str()
        .to_string();
    let optional = caps.get(4).is_some();
    let type_expr = WHITESPACE
        .replace_all(caps.get(5)?.as_str().trim(), " ")
        .into_owned();
    if type_expr.is_empty() {
        return None;
    }

    let doc_default = doc.as_deref().and_then(|d| {
        DEFAULT_TAG
            .captures(d)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    });
    let default_value = match doc_default {
        Some(raw) => DefaultValue::parse(&raw),
        None => destructured_default(source, &name),
    };

    let description = doc
        .map(|d| clean_doc(&DEFAULT_TAG.replace_all(&d, "")))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("{name} prop"));

    Some(PropDescriptor {
        name,
        type_expr,
        required: !optional,
        default_value,
        description,
    })
}

/// `name = <literal>` anywhere in the source. This deliberately scans the
/// whole file, so a local variable sharing the prop's name can be picked up;
/// curated metadata overrides such misreads on merge.
fn destructured_default(source: &str, name: &str) -> Option<DefaultValue> {
    let re = Regex::new(&format!(
        r#"\b{}\s*=\s*('[^']*'|"[^"]*"|true\b|false\b|-?\d+(?:\.\d+)?|null\b|undefined\b)"#,
        regex::escape(name)
    ))
    .ok()?;
    let raw = re.captures(source)?.get(1)?.as_str().to_string();
    DefaultValue::parse(&raw)
}
