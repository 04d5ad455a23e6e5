#![no_main]

use gitledger_git::diagnostics::Diagnostics;
use gitledger_git::log::{parse_commit_records, parse_commit_records_with_stats};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut diags = Diagnostics::new();
    let _ = parse_commit_records(&text, &mut diags);
    let _ = parse_commit_records_with_stats(&text, &mut diags);
});
