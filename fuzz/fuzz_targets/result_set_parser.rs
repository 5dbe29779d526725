#![no_main]

use benchscale::loader::parse;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Malformed documents must come back as errors, never panics
        if let Ok(set) = parse(input, Path::new("fuzz-full.json")) {
            let _ = benchscale::loader::serialize(&set);
        }
    }
});
