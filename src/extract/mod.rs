//! Pattern-based field extraction from component source text.
//!
//! Each rule is independent and returns "not found" rather than failing, so
//! a source file that trips one rule still yields whatever the others find.
//! None of this is a TypeScript parser; it recognizes the shapes a design
//! system's components are conventionally written in.

pub mod docs;
pub mod mapping;
pub mod props;
pub mod stories;

use crate::config::FrameworkConfig;
use crate::fs::ComponentUnit;
use crate::metadata::{ExternalMapping, PropDescriptor, UsageExample};

/// Everything the extractor could recover from one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub description: Option<String>,
    pub props: Vec<PropDescriptor>,
    pub external_mapping: Option<ExternalMapping>,
    pub examples: Vec<UsageExample>,
}

pub fn extract_fields(unit: &ComponentUnit, framework: &FrameworkConfig) -> ExtractedFields {
    let source = unit.source_text.as_str();
    let description = docs::component_description(source, &unit.name);
    let props = props::extract_props(source, &unit.name);
    let external_mapping = mapping::external_mapping(source, framework);
    let examples = unit
        .story_text
        .as_deref()
        .map(|stories| stories::story_examples(stories, &unit.name))
        .unwrap_or_default();

    if description.is_none() {
        tracing::debug!(component = %unit.name, "no description block found");
    }
    if props.is_empty() {
        tracing::debug!(component = %unit.name, "no props declaration found");
    }

    ExtractedFields {
        description,
        props,
        external_mapping,
        examples,
    }
}

/// Given the byte offset of an opening `{`, return the byte range of the
/// text between it and its matching `}`. String literals and comments are
/// skipped so braces inside them do not count.
pub(crate) fn balanced_block(text: &str, open: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open + 1, i));
                }
            }
            b'\'' | b'"' | b'`' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the closing quote of the string starting at `start`, or the
/// last byte if unterminated.
pub(crate) fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b if b == quote => return i,
            b'\n' if quote != b'`' => return i,
            _ => {}
        }
        i += 1;
    }
    bytes.len().saturating_sub(1)
}

pub(crate) fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len().saturating_sub(1), |p| start + p)
}

pub(crate) fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 1;
        }
        i += 1;
    }
    bytes.len().saturating_sub(1)
}
