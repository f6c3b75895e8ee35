use serde::Serialize;

use crate::metadata::{Category, ComponentMetadata};

pub const SUGGESTION_LIMIT: usize = 5;
/// Words shorter than this are ignored when scoring suggestions.
pub const MIN_WORD_LEN: usize = 3;

/// Compact listing entry returned by searches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub name: String,
    pub category: Category,
    pub description: String,
    pub external_mapping: Option<String>,
    pub prop_count: usize,
    pub import_path: String,
}

impl From<&ComponentMetadata> for ComponentSummary {
    fn from(meta: &ComponentMetadata) -> Self {
        Self {
            name: meta.name.clone(),
            category: meta.category,
            description: meta.description.clone(),
            external_mapping: meta.external_name().map(str::to_string),
            prop_count: meta.props.len(),
            import_path: meta.import_path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub name: String,
    pub category: Category,
    pub description: String,
    pub relevance_score: u32,
    pub when_to_use: Vec<String>,
    pub import_path: String,
}

/// Case-insensitive substring search over names, description, framework
/// equivalent, props and "when to use" guidance. The category filter is
/// exact. Input order is preserved.
pub fn search<'a>(
    components: &'a [ComponentMetadata],
    query: &str,
    category: Option<Category>,
) -> Vec<&'a ComponentMetadata> {
    let q = query.to_lowercase();
    components
        .iter()
        .filter(|c| category.is_none_or(|cat| c.category == cat))
        .filter(|c| matches_query(c, &q))
        .collect()
}

fn matches_query(c: &ComponentMetadata, q: &str) -> bool {
    let has = |text: &str| text.to_lowercase().contains(q);
    has(c.name.as_str())
        || has(c.display_name.as_str())
        || has(c.description.as_str())
        || c.external_name().is_some_and(has)
        || c.props
            .iter()
            .any(|p| has(p.name.as_str()) || has(p.description.as_str()))
        || c.when_to_use().iter().any(|u| has(u.as_str()))
}

/// Score of one component against the lowercased words of a request.
///
/// Per word: +10 name, +5 description, +3 any "when to use" entry, +1 any
/// prop name.
pub fn relevance(c: &ComponentMetadata, words: &[String]) -> u32 {
    let name = c.name.to_lowercase();
    let description = c.description.to_lowercase();
    let when_to_use: Vec<String> = c.when_to_use().iter().map(|u| u.to_lowercase()).collect();
    let props: Vec<String> = c.props.iter().map(|p| p.name.to_lowercase()).collect();

    let mut score = 0;
    for word in words {
        let word = word.as_str();
        if name.contains(word) {
            score += 10;
        }
        if description.contains(word) {
            score += 5;
        }
        if when_to_use.iter().any(|u| u.contains(word)) {
            score += 3;
        }
        if props.iter().any(|p| p.contains(word)) {
            score += 1;
        }
    }
    score
}

pub fn scoring_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .map(str::to_string)
        .collect()
}

/// Up to [`SUGGESTION_LIMIT`] components for a free-text request, best
/// first. Ties keep input order. An empty result is a valid answer.
pub fn suggest(components: &[ComponentMetadata], text: &str) -> Vec<Suggestion> {
    let words = scoring_words(text);
    let mut scored: Vec<(u32, &ComponentMetadata)> = components
        .iter()
        .map(|c| (relevance(c, &words), c))
        .filter(|(score, _)| *score > 0)
        .collect();
    // sort_by is stable, so equal scores stay in input order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(SUGGESTION_LIMIT);

    scored
        .into_iter()
        .map(|(score, c)| Suggestion {
            name: c.name.clone(),
            category: c.category,
            description: c.description.clone(),
            relevance_score: score,
            when_to_use: c.when_to_use().iter().take(3).cloned().collect(),
            import_path: c.import_path.clone(),
        })
        .collect()
}
