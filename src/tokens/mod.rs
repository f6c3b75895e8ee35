//! DTCG-style design token document.
//!
//! Groups keep their source order on both read and write: a document
//! regenerated from unchanged theme files is byte-identical to the last one.
//! `$`-prefixed keys are metadata (`$description`, `$schema`, ...) and never
//! token names.

pub mod extract;
pub mod query;

use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Top-level categories every complete document carries.
pub const CATEGORIES: [&str; 6] = [
    "color",
    "typography",
    "spacing",
    "borderRadius",
    "shadows",
    "componentOverrides",
];

pub const DTCG_SCHEMA: &str = "https://design-tokens.github.io/community-group/format/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Color,
    Dimension,
    FontWeight,
    FontFamily,
    Shadow,
    Number,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLeaf {
    #[serde(rename = "$value")]
    pub value: Value,
    #[serde(rename = "$type")]
    pub kind: TokenKind,
    #[serde(
        rename = "$description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

impl TokenLeaf {
    pub fn new(value: impl Into<Value>, kind: TokenKind) -> Self {
        Self {
            value: value.into(),
            kind,
            description: None,
        }
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenNode {
    Leaf(TokenLeaf),
    Group(TokenGroup),
}

impl TokenNode {
    pub fn as_group(&self) -> Option<&TokenGroup> {
        match self {
            TokenNode::Group(g) => Some(g),
            TokenNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&TokenLeaf> {
        match self {
            TokenNode::Leaf(l) => Some(l),
            TokenNode::Group(_) => None,
        }
    }
}

impl From<TokenLeaf> for TokenNode {
    fn from(leaf: TokenLeaf) -> Self {
        TokenNode::Leaf(leaf)
    }
}

impl From<TokenGroup> for TokenNode {
    fn from(group: TokenGroup) -> Self {
        TokenNode::Group(group)
    }
}

/// An ordered group of named tokens or sub-groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenGroup {
    pub description: Option<String>,
    /// Other `$` keys (`$schema`, `$extensions`), kept verbatim.
    pub extra: Vec<(String, Value)>,
    pub entries: Vec<(String, TokenNode)>,
}

impl TokenGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn described(description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::default()
        }
    }

    /// Insert or replace `key`, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<TokenNode>) {
        let key = key.into();
        let node = node.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = node,
            None => self.entries.push((key, node)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, node: impl Into<TokenNode>) -> Self {
        self.insert(key, node);
        self
    }

    pub fn get(&self, key: &str) -> Option<&TokenNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TokenGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.extra.len() + usize::from(self.description.is_some()) + self.entries.len();
        let mut map = serializer.serialize_map(Some(len))?;
        for (k, v) in &self.extra {
            map.serialize_entry(k, v)?;
        }
        if let Some(d) = &self.description {
            map.serialize_entry("$description", d)?;
        }
        for (k, node) in &self.entries {
            map.serialize_entry(k, node)?;
        }
        map.end()
    }
}

impl Serialize for TokenNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TokenNode::Leaf(leaf) => leaf.serialize(serializer),
            TokenNode::Group(group) => group.serialize(serializer),
        }
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = TokenNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a token (object with $value) or a token group (object)")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TokenNode, A::Error> {
        let mut value: Option<Value> = None;
        let mut kind: Option<TokenKind> = None;
        let mut group = TokenGroup::new();

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "$value" => value = Some(map.next_value()?),
                "$type" => kind = Some(map.next_value()?),
                "$description" => group.description = Some(map.next_value()?),
                k if k.starts_with('$') => {
                    if value.is_some() {
                        map.next_value::<IgnoredAny>()?;
                    } else {
                        group.extra.push((key, map.next_value()?));
                    }
                }
                _ => {
                    let node = map.next_value::<TokenNode>()?;
                    group.entries.push((key, node));
                }
            }
        }

        match value {
            Some(value) => {
                if !group.entries.is_empty() {
                    return Err(de::Error::custom("a token with $value cannot have children"));
                }
                let kind = kind.ok_or_else(|| de::Error::missing_field("$type"))?;
                Ok(TokenNode::Leaf(TokenLeaf {
                    value,
                    kind,
                    description: group.description,
                }))
            }
            None => Ok(TokenNode::Group(group)),
        }
    }
}

impl<'de> Deserialize<'de> for TokenNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NodeVisitor)
    }
}

impl<'de> Deserialize<'de> for TokenGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TokenNode::deserialize(deserializer)? {
            TokenNode::Group(group) => Ok(group),
            TokenNode::Leaf(_) => Err(de::Error::custom("expected a token group, found a token")),
        }
    }
}

/// The whole token file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDocument {
    pub root: TokenGroup,
}

impl TokenDocument {
    pub fn category(&self, name: &str) -> Option<&TokenNode> {
        self.root.get(name)
    }

    /// Token category names present, in document order.
    pub fn category_names(&self) -> Vec<&str> {
        self.root.keys().collect()
    }

    pub fn lookup(&self, path: &[&str]) -> Option<&TokenNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.get(first)?;
        for key in rest {
            node = node.as_group()?.get(key)?;
        }
        Some(node)
    }

    pub fn missing_categories(&self) -> Vec<&'static str> {
        CATEGORIES
            .into_iter()
            .filter(|c| self.root.get(c).is_none())
            .collect()
    }

    /// Breaches of the document invariants: `color.primary.main` must be a
    /// color token, and every typography variant's `fontSize` a dimension.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        match self.lookup(&["color", "primary", "main"]) {
            Some(TokenNode::Leaf(leaf)) if leaf.kind == TokenKind::Color => {}
            Some(TokenNode::Leaf(leaf)) => violations.push(format!(
                "color.primary.main must be a color token, found {:?}",
                leaf.kind
            )),
            Some(TokenNode::Group(_)) => {
                violations.push("color.primary.main must be a token, found a group".to_string())
            }
            None => violations.push("color.primary.main is missing".to_string()),
        }

        if let Some(typography) = self.category("typography").and_then(TokenNode::as_group) {
            for (variant, node) in &typography.entries {
                let Some(font_size) = node.as_group().and_then(|g| g.get("fontSize")) else {
                    continue;
                };
                match font_size {
                    TokenNode::Leaf(leaf) if leaf.kind == TokenKind::Dimension => {}
                    _ => violations.push(format!(
                        "typography.{variant}.fontSize must be a dimension token"
                    )),
                }
            }
        }

        violations
    }
}
