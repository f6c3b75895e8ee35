#![no_main]

use dsmeta::metadata::Category;
use dsmeta::migrate::MigrationTransformer;
use dsmeta::store::{MappingTarget, MigrationMapping};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let mapping = MigrationMapping::from_pairs([
        (
            "Select".to_string(),
            MappingTarget {
                design_system_component: "Dropdown".to_string(),
                category: Category::Molecule,
            },
        ),
        (
            "Switch".to_string(),
            MappingTarget {
                design_system_component: "Toggle".to_string(),
                category: Category::Atom,
            },
        ),
    ]);
    let transformer = MigrationTransformer::new(&mapping, "@mui/material", "@/components");
    let once = transformer.transform(source);
    // A second pass over migrated code has nothing left to rewrite.
    let twice = transformer.transform(&once.code);
    assert!(twice.is_unchanged());
});
