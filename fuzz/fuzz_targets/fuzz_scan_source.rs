#![no_main]

use libfuzzer_sys::fuzz_target;

mod utils;

fuzz_target!(|data: &[u8]| {
    let Some(text) = utils::truncate_utf8(data) else {
        return;
    };

    // Malformed input must come back as a ParseError, never a panic or hang.
    let _ = sunda_syntax::parse_unit(text);
});
