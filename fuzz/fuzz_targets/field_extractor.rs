#![no_main]

use std::path::Path;

use dsmeta::config::ResolvedConfig;
use dsmeta::extract::extract_fields;
use dsmeta::fs::ComponentUnit;
use dsmeta::metadata::Category;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let config = ResolvedConfig::defaults(Path::new("."));
    let unit = ComponentUnit::from_source("Widget", Category::Atom, source);
    let fields = extract_fields(&unit, &config.framework);
    for prop in &fields.props {
        assert!(!prop.name.is_empty());
    }
});
