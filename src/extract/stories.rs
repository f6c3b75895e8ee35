use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{balanced_block, skip_block_comment, skip_line_comment, skip_string};
use crate::codegen::jsx_element;
use crate::metadata::UsageExample;

static STORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+const\s+([A-Za-z_$][\w$]*)\s*:\s*Story(?:Obj)?\b[^=]*=\s*\{").unwrap()
});
static ARGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bargs\s*:\s*\{").unwrap());
static SIMPLE_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)^(?:([A-Za-z_$][\w$]*)|'([^']+)'|"([^"]+)")\s*:\s*('(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|true|false|-?\d+(?:\.\d+)?)$"#,
    )
    .unwrap()
});

/// One example per `export const X: Story = { args: { ... } }` in a story
/// file. Stories without an `args` block carry nothing renderable and are
/// skipped; args that are not plain literals are left out of the snippet.
pub fn story_examples(stories: &str, component: &str) -> Vec<UsageExample> {
    let mut examples = Vec::new();
    for caps in STORY.captures_iter(stories) {
        let (Some(whole), Some(story)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some((start, end)) = balanced_block(stories, whole.end() - 1) else {
            continue;
        };
        let body = &stories[start..end];
        let Some(args_match) = ARGS.find(body) else {
            continue;
        };
        let Some((a_start, a_end)) = balanced_block(body, args_match.end() - 1) else {
            continue;
        };

        let args = simple_args(&body[a_start..a_end]);
        let (children, attrs): (Vec<_>, Vec<_>) =
            args.into_iter().partition(|(name, _)| name == "children");
        let children = children.into_iter().find_map(|(_, v)| match v {
            Value::String(s) => Some(s),
            _ => None,
        });

        let story = story.as_str();
        examples.push(UsageExample {
            title: story.to_string(),
            description: format!("Example: {story}"),
            code: format!(
                "// {story} example\n{}",
                jsx_element(component, &attrs, children.as_deref())
            ),
        });
    }
    examples
}

fn simple_args(body: &str) -> Vec<(String, Value)> {
    top_level_entries(body)
        .into_iter()
        .filter_map(|entry| {
            let caps = SIMPLE_ARG.captures(entry.trim())?;
            let name = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
            let value = literal_value(caps.get(4)?.as_str())?;
            Some((name.as_str().to_string(), value))
        })
        .collect()
}

fn literal_value(raw: &str) -> Option<Value> {
    match raw {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ if raw.starts_with('\'') || raw.starts_with('"') => {
            Some(Value::String(raw[1..raw.len() - 1].replace("\\'", "'")))
        }
        _ => serde_json::from_str(raw).ok(),
    }
}

/// Comma-separated entries of an object literal body, ignoring commas
/// inside nested brackets, strings and comments.
fn top_level_entries(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut entries = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'(' | b'[' => depth += 1,
            b'}' | b')' | b']' => depth -= 1,
            b'\'' | b'"' | b'`' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b',' if depth == 0 => {
                entries.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    entries.push(&body[start..]);
    entries
        .into_iter()
        .map(strip_comments)
        .filter(|e| !e.trim().is_empty())
        .collect()
}

fn strip_comments(entry: &str) -> &str {
    let mut rest = entry.trim_start();
    while rest.starts_with("//") || rest.starts_with("/*") {
        let bytes = rest.as_bytes();
        let end = if rest.starts_with("//") {
            skip_line_comment(bytes, 0)
        } else {
            skip_block_comment(bytes, 0)
        };
        rest = rest.get(end + 1..).unwrap_or("").trim_start();
    }
    rest
}
