// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use artisan_core::describe;
use artisan_format::{parse_schema, render_schema};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(raws) = parse_schema(text) else {
        return;
    };
    let Ok(described) = raws
        .iter()
        .map(describe)
        .collect::<Result<Vec<_>, _>>()
    else {
        return;
    };

    // Rendered text parses back to the same identities.
    let rendered = render_schema(described.iter());
    let again = parse_schema(&rendered).expect("rendered schema parses");
    for (raw, desc) in again.iter().zip(&described) {
        let reparsed = describe(raw).expect("rendered schema describes");
        assert_eq!(reparsed.key(), desc.key());
    }
});
