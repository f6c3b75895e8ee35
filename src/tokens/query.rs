use super::{TokenDocument, TokenGroup, TokenNode};

impl TokenDocument {
    /// A top-level category (`color`, `typography`, ...). `$` keys are
    /// never categories.
    pub fn tokens_by_category(&self, name: &str) -> Option<&TokenNode> {
        if name.starts_with('$') {
            return None;
        }
        self.category(name)
    }

    pub fn color_palette(&self) -> Option<&TokenNode> {
        self.category("color")
    }

    pub fn typography_scale(&self) -> Option<&TokenNode> {
        self.category("typography")
    }
}

/// Keep the parts of `group` whose key path contains `query`
/// (case-insensitive). A matching key keeps its whole subtree; a group
/// survives only if some descendant key matches. Group metadata
/// (`$description` and friends) is carried along with surviving groups.
pub fn filter_tokens(group: &TokenGroup, query: &str) -> Option<TokenGroup> {
    filter_group(group, &query.to_lowercase())
}

fn filter_group(group: &TokenGroup, query: &str) -> Option<TokenGroup> {
    let mut out = TokenGroup {
        description: group.description.clone(),
        extra: group.extra.clone(),
        entries: Vec::new(),
    };
    for (key, node) in &group.entries {
        if key.to_lowercase().contains(query) {
            out.entries.push((key.clone(), node.clone()));
        } else if let TokenNode::Group(child) = node {
            if let Some(kept) = filter_group(child, query) {
                out.entries.push((key.clone(), TokenNode::Group(kept)));
            }
        }
    }
    (!out.entries.is_empty()).then_some(out)
}

/// Filter any node: a leaf has no keys of its own, so it never matches.
pub fn filter_node(node: &TokenNode, query: &str) -> Option<TokenNode> {
    match node {
        TokenNode::Group(group) => filter_tokens(group, query).map(TokenNode::Group),
        TokenNode::Leaf(_) => None,
    }
}
