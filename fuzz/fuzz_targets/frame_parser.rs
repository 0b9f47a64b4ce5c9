#![no_main]

use crashgroup::{group_unsymbolicated, GrouperConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Crash text comes from arbitrary client runtimes; lossy decoding keeps
    // invalid UTF-8 reachable for the parser
    let input = String::from_utf8_lossy(data);

    // Grouping must never panic and always yields an EXC- id
    let result = group_unsymbolicated(&input, &GrouperConfig::default());
    assert!(result.group.group_id.starts_with("EXC-"));
});
