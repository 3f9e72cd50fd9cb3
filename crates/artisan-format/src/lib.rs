// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Artisan Wire Format
//!
//! Canonical byte-level encoding of primitive and composite values, plus the
//! schema text language.
//!
//! | kind | bytes |
//! |------|-------|
//! | `bool` | `0x00` / `0x01` |
//! | `u8`..`u64`, `i8`..`i64` | fixed width, two's complement, big-endian |
//! | `f32` / `f64` | IEEE-754 bits, big-endian |
//! | `char` | scalar value as `u32` BE |
//! | `varu64` / `vari64` | LEB128 / zig-zag LEB128 |
//! | `string` / `bytes` | `u32` BE length + bytes |
//! | optional field | `0x00` absent / `0x01` present, then the value |
//! | sequence | `u32` BE count + elements |
//! | array `[T; N]` | N elements, no prefix |
//! | struct | fields in ordinal order |
//! | union | `u8` tag + the variant's fields |
//!
//! # Example
//!
//! ```rust
//! use artisan_core::{PrimitiveKind, Value};
//! use artisan_format::{decode_primitive, encode_primitive, SliceSource};
//!
//! let kind = PrimitiveKind::String { max_length: None };
//! let mut bytes = Vec::new();
//! encode_primitive(kind, &Value::String("ok".into()), &mut bytes).unwrap();
//! assert_eq!(bytes, [0x00, 0x00, 0x00, 0x02, 0x6F, 0x6B]);
//!
//! let mut source = SliceSource::new(&bytes);
//! assert_eq!(decode_primitive(kind, &mut source).unwrap(), Value::String("ok".into()));
//! ```

pub mod config;
mod error;
mod io;
mod primitive;
pub mod schema;
pub mod varint;

pub use config::DecodeLimits;
pub use error::{FormatError, Result};
pub use io::{ByteSink, ByteSource, IoSink, IoSource, SliceSource};
pub use primitive::{
    decode_primitive, decode_primitive_with, encode_primitive, read_length, read_presence,
    write_length, write_presence,
};
pub use schema::{load_schema, parse_schema, render_schema, SchemaError};
