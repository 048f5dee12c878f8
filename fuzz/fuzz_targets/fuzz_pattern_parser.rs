//! Pattern parser must never panic, and accepted patterns must round-trip
//! through their stored text.

#![no_main]

use libfuzzer_sys::fuzz_target;
use statebind_scan::Pattern;

fuzz_target!(|data: &str| {
    if let Ok(pattern) = Pattern::parse(data) {
        // Accepted text is stored verbatim and re-parses identically.
        let again = Pattern::parse(pattern.text()).expect("accepted pattern re-parses");
        assert_eq!(pattern, again);
    }
});
