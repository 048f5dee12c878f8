//! Path parser must never panic; accepted paths display/parse round-trip.

#![no_main]

use libfuzzer_sys::fuzz_target;
use statebind_tree::Path;

fuzz_target!(|data: &str| {
    if let Ok(path) = Path::parse(data) {
        let shown = path.to_string();
        let again = Path::parse(&shown).expect("displayed path re-parses");
        assert_eq!(path, again);
    }
});
