// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use artisan_extensions::{CodecRegistry, DecodeLimits, RegistryConfig};
use libfuzzer_sys::fuzz_target;

const SCHEMA: &str = "
    struct Point { x: i32; y: vari64; }
    union Shape {
        Circle { center: Point; radius: f64; }
        Label { text: string<64>; glyph: char; }
        Empty = 200;
    }
    struct Scene {
        name: string;
        shapes: seq<Shape, 256>;
        mask: [u8; 4];
        parent: optional ref Scene;
        blob: optional bytes;
    }
";

fuzz_target!(|data: &[u8]| {
    let registry = CodecRegistry::with_config(RegistryConfig {
        limits: DecodeLimits::default()
            .with_max_depth(32)
            .with_max_length(1 << 16),
    });
    if registry.load_schema(SCHEMA).is_err() {
        return;
    }
    let Ok(codec) = registry.get_or_create_by_name("Scene") else {
        return;
    };

    // Anything that decodes must encode again, and that encoding must decode.
    if let Ok(value) = codec.decode_from_slice(data) {
        let encoded = codec.encode_to_vec(&value).expect("decoded value re-encodes");
        codec
            .decode_from_slice(&encoded)
            .expect("re-encoded value decodes");
    }
});
