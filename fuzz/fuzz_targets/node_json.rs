#![no_main]

use doctree::{from_ordered_dict, to_ordered_dict};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(node) = from_ordered_dict(&value) else {
        return;
    };
    let encoded = to_ordered_dict(&node);
    let decoded = from_ordered_dict(&encoded).expect("re-decoding an encoded node");
    assert_eq!(decoded, node);
    assert_eq!(to_ordered_dict(&decoded), encoded);
});
