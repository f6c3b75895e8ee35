use std::io::Write;
use std::path::PathBuf;

use crate::diagnostic::Diagnostic;
use crate::formatter::{Formatter, summary_line};

/// Like text, but silent on a clean run.
pub struct QuietFormatter;

impl Formatter for QuietFormatter {
    fn format_to(&self, diagnostics: &[Diagnostic], files: &[PathBuf], out: &mut dyn Write) {
        if diagnostics.is_empty() {
            return;
        }
        for d in diagnostics {
            let _ = writeln!(out, "{d}");
        }
        let _ = writeln!(out, "\n{}", summary_line(diagnostics.len(), files.len()));
    }
}
