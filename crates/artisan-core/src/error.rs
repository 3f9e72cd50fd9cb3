// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the type model.

use thiserror::Error;

/// Malformed or unsupported type shape, detected before any generation or I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Type or member name is empty or not an identifier.
    #[error("invalid name: '{0}'")]
    InvalidName(String),

    /// Two fields of one layout share a name.
    #[error("duplicate field '{field}' in type {type_name}")]
    DuplicateField { type_name: String, field: String },

    /// Two union variants share a name.
    #[error("duplicate variant '{variant}' in type {type_name}")]
    DuplicateVariant { type_name: String, variant: String },

    /// Two union variants share a tag.
    #[error("duplicate variant tag {tag} in type {type_name}")]
    DuplicateTag { type_name: String, tag: u8 },

    /// A union needs at least one variant, and at most 256.
    #[error("union {type_name} has {count} variants (expected 1..=256)")]
    VariantCount { type_name: String, count: usize },

    /// Ordinals of a layout are not exactly `0..n`.
    #[error("ordinals of {type_name} are not contiguous: expected {expected}, found {found}")]
    NonContiguousOrdinals {
        type_name: String,
        expected: u32,
        found: u32,
    },

    /// Two fields of one layout share an ordinal.
    #[error("duplicate ordinal {ordinal} in type {type_name}")]
    DuplicateOrdinal { type_name: String, ordinal: u32 },

    /// A field embeds its own type inline instead of through an indirect reference.
    #[error("field '{field}' of {type_name} embeds its own type inline; use an indirect reference")]
    SelfReference { type_name: String, field: String },

    /// Inline composition forms a cycle across several types.
    #[error("cyclic inline composition: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// A field declares a kind the model cannot encode.
    #[error("field '{field}' of {type_name} has unsupported kind '{kind}'")]
    UnsupportedKind {
        type_name: String,
        field: String,
        kind: String,
    },

    /// A referenced type is not described in the model.
    #[error("unknown type '{name}' referenced by {referenced_by}")]
    UnknownType { name: String, referenced_by: String },

    /// A different descriptor is already registered under this name.
    #[error("type {name} is already described with a different structure")]
    Conflict { name: String },
}

/// Mismatch between a dynamic value and the Rust type it is converted into.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("unknown variant '{0}'")]
    UnknownVariant(String),

    #[error("expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Result alias for type model operations.
pub type Result<T> = std::result::Result<T, DescriptorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_error_display() {
        let err = DescriptorError::DuplicateField {
            type_name: "Point".into(),
            field: "x".into(),
        };
        assert_eq!(err.to_string(), "duplicate field 'x' in type Point");

        let err = DescriptorError::Cycle {
            path: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "cyclic inline composition: A -> B -> A");
    }

    #[test]
    fn test_value_error_display() {
        let err = ValueError::TypeMismatch {
            expected: "u32".into(),
            found: "String(\"x\")".into(),
        };
        assert_eq!(
            err.to_string(),
            "type mismatch: expected u32, found String(\"x\")"
        );
    }
}
