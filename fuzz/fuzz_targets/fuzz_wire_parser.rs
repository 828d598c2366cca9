#![no_main]

use libfuzzer_sys::fuzz_target;
use rui_wire::{parse_record, unescape};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Neither entry point may panic on arbitrary text.
    let _ = unescape(text);
    let Ok(record) = parse_record(text) else {
        return;
    };

    // Whatever parses must survive its own encoding.
    let encoded = record.encode();
    let reparsed = parse_record(&encoded).expect("encoded record must parse");
    assert_eq!(reparsed.encode(), encoded, "encoding is not stable");
});
