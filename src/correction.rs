/// One text edit: replace the byte range `[start..end)` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub start: usize,
    pub end: usize,
    /// Empty for a deletion.
    pub replacement: String,
    /// Lower wins when two edits start at the same offset.
    pub priority: usize,
}

impl Correction {
    pub fn replace(start: usize, end: usize, replacement: impl Into<String>, priority: usize) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
            priority,
        }
    }

    pub fn delete(start: usize, end: usize, priority: usize) -> Self {
        Self::replace(start, end, "", priority)
    }
}

/// Non-overlapping edits sorted by start offset.
///
/// Sorted by `(start, priority)`; an edit that overlaps the previously
/// accepted one is dropped.
#[derive(Debug, Default)]
pub struct CorrectionSet {
    corrections: Vec<Correction>,
}

impl CorrectionSet {
    pub fn from_vec(mut raw: Vec<Correction>) -> Self {
        raw.sort_by(|a, b| a.start.cmp(&b.start).then(a.priority.cmp(&b.priority)));

        let mut accepted: Vec<Correction> = Vec::with_capacity(raw.len());
        for c in raw {
            if accepted.last().is_some_and(|last| c.start < last.end) {
                tracing::debug!(start = c.start, end = c.end, "dropping overlapping edit");
                continue;
            }
            accepted.push(c);
        }
        Self {
            corrections: accepted,
        }
    }

    /// Apply in one linear pass. Offsets must fall on char boundaries of
    /// `source`.
    pub fn apply(&self, source: &str) -> String {
        let mut result = String::with_capacity(source.len());
        let mut cursor = 0;
        for c in &self.corrections {
            if c.start > cursor {
                result.push_str(&source[cursor..c.start]);
            }
            result.push_str(&c.replacement);
            cursor = cursor.max(c.end);
        }
        if cursor < source.len() {
            result.push_str(&source[cursor..]);
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }
}
