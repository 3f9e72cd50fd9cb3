// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-level encode/decode errors.

use artisan_core::ValueError;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Violation of the wire format during encode or decode.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Input ended before a complete value was read.
    #[error("truncated input at offset {offset}: {needed} more byte(s) needed")]
    Truncated { offset: usize, needed: usize },

    /// Value does not fit the declared width.
    #[error("value {value} out of range for {kind}")]
    OutOfRange { kind: &'static str, value: String },

    /// Marker byte outside its allowed set (bool, presence, union tag).
    #[error("invalid {context} tag 0x{tag:02x}")]
    InvalidTag { context: String, tag: u8 },

    #[error("invalid unicode scalar value 0x{0:x}")]
    InvalidChar(u32),

    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// Value shape does not match the declared kind.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("missing field '{field}' of {type_name}")]
    MissingField { type_name: String, field: String },

    #[error("unknown field '{field}' for {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("unknown variant '{variant}' of {type_name}")]
    UnknownVariant { type_name: String, variant: String },

    /// Array value with the wrong number of elements.
    #[error("expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Length above the declared bound of a string, bytes or sequence kind.
    #[error("length {length} exceeds declared bound {bound}")]
    BoundExceeded { bound: usize, length: usize },

    /// Length prefix above the decoder's configured limit.
    #[error("length {length} exceeds decode limit {limit}")]
    LengthLimit { limit: usize, length: usize },

    /// Length does not fit the `u32` prefix.
    #[error("length {0} does not fit the length prefix")]
    LengthOverflow(usize),

    #[error("varint longer than 10 bytes or above 64 bits")]
    VarintOverflow,

    #[error("nesting deeper than {0}")]
    DepthExceeded(usize),

    /// Bytes left over after a complete value.
    #[error("{0} trailing byte(s) after value")]
    TrailingBytes(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Conversion failures between Rust types and [`artisan_core::Value`].
impl From<ValueError> for FormatError {
    fn from(err: ValueError) -> Self {
        match err {
            ValueError::TypeMismatch { expected, found } => Self::TypeMismatch { expected, found },
            ValueError::MissingField(field) => Self::MissingField {
                type_name: "value".to_string(),
                field,
            },
            ValueError::UnknownVariant(variant) => Self::UnknownVariant {
                type_name: "value".to_string(),
                variant,
            },
            ValueError::LengthMismatch { expected, found } => {
                Self::LengthMismatch { expected, found }
            }
        }
    }
}

impl FormatError {
    /// Shape mismatch between a declared kind and a value.
    pub fn mismatch(expected: impl ToString, found: &artisan_core::Value) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.kind_name().to_string(),
        }
    }
}

/// Result alias for wire operations.
pub type Result<T> = std::result::Result<T, FormatError>;
