use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn letter(&self) -> char {
        match self {
            Severity::Warning => 'W',
            Severity::Error => 'E',
        }
    }

    pub fn from_str(s: &str) -> Option<Severity> {
        match s.to_lowercase().as_str() {
            "warning" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// One finding of the store check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Project-relative path of the file the finding is about.
    pub path: String,
    pub severity: Severity,
    /// `Area/Name`, e.g. `Registry/CountMismatch`.
    pub rule: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        path: impl Into<String>,
        severity: Severity,
        rule: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            severity,
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    pub fn sort_key(&self) -> (&str, &str, &str) {
        (&self.path, &self.rule, &self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}: {}",
            self.path, self.severity, self.rule, self.message,
        )
    }
}
