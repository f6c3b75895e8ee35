#![no_main]

use dsmeta::tokens::extract::{ThemeTexts, build_document};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let sources = ThemeTexts {
        palette: Some(text.to_string()),
        typography: Some(text.to_string()),
        shadows: Some(text.to_string()),
    };
    let document = build_document(&sources, 8, "Fuzz");
    let _ = document.invariant_violations();
    assert!(document.category("spacing").is_some());
});
