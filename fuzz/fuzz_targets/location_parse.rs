#![no_main]

use doctree::Location;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    for section in [None, Some("footer")] {
        if let Ok(loc) = Location::parse(text, section) {
            let again = Location::parse(&loc.to_string(), section);
            assert_eq!(again.as_ref(), Ok(&loc), "reformatting {text:?} changed it");
        }
    }
});
