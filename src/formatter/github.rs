use std::io::Write;
use std::path::PathBuf;

use crate::diagnostic::{Diagnostic, Severity};
use crate::formatter::Formatter;

/// GitHub Actions workflow commands, one per problem.
pub struct GithubFormatter;

impl Formatter for GithubFormatter {
    fn format_to(&self, diagnostics: &[Diagnostic], _files: &[PathBuf], out: &mut dyn Write) {
        for d in diagnostics {
            let level = match d.severity {
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            let _ = writeln!(
                out,
                "::{level} file={}::{}: {}",
                d.path,
                d.rule,
                escape_data(&d.message),
            );
        }
    }
}

/// Workflow command data must not contain raw `%`, CR or LF.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
