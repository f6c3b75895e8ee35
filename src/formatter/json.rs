use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::diagnostic::{Diagnostic, Severity};
use crate::formatter::Formatter;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    metadata: Metadata,
    problems: Vec<Problem<'a>>,
}

#[derive(Serialize)]
struct Metadata {
    files_checked: usize,
    problem_count: usize,
    error_count: usize,
}

#[derive(Serialize)]
struct Problem<'a> {
    path: &'a str,
    severity: String,
    rule: &'a str,
    message: &'a str,
}

impl Formatter for JsonFormatter {
    fn format_to(&self, diagnostics: &[Diagnostic], files: &[PathBuf], out: &mut dyn Write) {
        let output = JsonOutput {
            metadata: Metadata {
                files_checked: files.len(),
                problem_count: diagnostics.len(),
                error_count: diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .count(),
            },
            problems: diagnostics
                .iter()
                .map(|d| Problem {
                    path: &d.path,
                    severity: d.severity.letter().to_string(),
                    rule: &d.rule,
                    message: &d.message,
                })
                .collect(),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                let _ = writeln!(out, "{text}");
            }
            Err(e) => tracing::error!("cannot serialize check report: {e}"),
        }
    }
}
