pub mod github;
pub mod json;
pub mod quiet;
pub mod text;

use std::io::Write;
use std::path::PathBuf;

use crate::diagnostic::Diagnostic;

pub trait Formatter {
    fn format_to(&self, diagnostics: &[Diagnostic], files: &[PathBuf], out: &mut dyn Write);

    fn print(&self, diagnostics: &[Diagnostic], files: &[PathBuf]) {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.format_to(diagnostics, files, &mut lock);
    }
}

pub fn create_formatter(format: &str) -> Box<dyn Formatter> {
    match format {
        "json" => Box::new(json::JsonFormatter),
        "github" => Box::new(github::GithubFormatter),
        "quiet" => Box::new(quiet::QuietFormatter),
        _ => Box::new(text::TextFormatter),
    }
}

/// `N files checked, M problems found`, pluralized.
pub(crate) fn summary_line(problem_count: usize, file_count: usize) -> String {
    let problem_word = if problem_count == 1 {
        "problem"
    } else {
        "problems"
    };
    let file_word = if file_count == 1 { "file" } else { "files" };
    format!("{file_count} {file_word} checked, {problem_count} {problem_word} found")
}
