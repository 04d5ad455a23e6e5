#![no_main]

use gitledger_git::diagnostics::Diagnostics;
use gitledger_git::numstat::{count_commit_boundaries, parse_statistics, tokenize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut diags = Diagnostics::new();
    let stats = parse_statistics(&text, &mut diags);

    let headers: u64 = count_commit_boundaries(&tokenize(&text)).values().sum();
    let commits: u64 = stats.values().map(|s| s.commit_count).sum();
    assert_eq!(headers, commits);
});
