use std::io::Write;
use std::path::PathBuf;

use crate::diagnostic::Diagnostic;
use crate::formatter::{Formatter, summary_line};

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_to(&self, diagnostics: &[Diagnostic], files: &[PathBuf], out: &mut dyn Write) {
        for d in diagnostics {
            let _ = writeln!(out, "{d}");
        }
        if !diagnostics.is_empty() {
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "{}", summary_line(diagnostics.len(), files.len()));
    }
}
