// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema Text Language
//!
//! Describes types in text and feeds them to a [`TypeModel`].
//!
//! ```text
//! # comment
//! struct Reading {
//!     id: u32;
//!     name: string<32>;
//!     samples: seq<f64, 1024>;
//!     origin: Point;
//!     next: optional ref Reading;
//! }
//!
//! union Shape {
//!     Circle = 0 { radius: f64; }
//!     Empty = 3;
//! }
//! ```
//!
//! `@ N` pins a field ordinal and `= N` a variant tag; everything else takes
//! the lowest free value in declaration order.

mod lexer;
mod parser;

use artisan_core::{ordinal_order, DescriptorError, RawType, TypeDescriptor, TypeModel, TypeShape};
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Text does not follow the schema grammar.
    #[error("{line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Text parsed but describes an invalid type.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

impl SchemaError {
    pub(crate) fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Parse schema text into raw type metadata.
pub fn parse_schema(text: &str) -> Result<Vec<RawType>, SchemaError> {
    parser::Parser::new(text)?.parse_schema()
}

/// Parse schema text and describe every type into `model`.
///
/// Types may reference each other in any order. Nothing is registered if
/// any type fails.
pub fn load_schema(
    model: &mut TypeModel,
    text: &str,
) -> Result<Vec<Arc<TypeDescriptor>>, SchemaError> {
    let raws = parse_schema(text)?;
    let described = model.describe_all(&raws)?;
    log::debug!(
        "[schema::load_schema] loaded {} types: {}",
        described.len(),
        described
            .iter()
            .map(|d| d.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(described)
}

/// Render descriptors back to schema text.
///
/// Fields come out in ordinal order and variants with explicit tags, so
/// loading the output yields the same fingerprints.
pub fn render_schema<'a, I>(descriptors: I) -> String
where
    I: IntoIterator<Item = &'a TypeDescriptor>,
{
    let mut out = String::new();
    for (i, desc) in descriptors.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match desc.shape() {
            TypeShape::Struct(fields) => {
                let _ = writeln!(out, "struct {} {{", desc.name());
                for field in ordinal_order(fields) {
                    render_field(&mut out, "    ", field);
                }
                out.push_str("}\n");
            }
            TypeShape::Union(variants) => {
                let _ = writeln!(out, "union {} {{", desc.name());
                for variant in variants {
                    if variant.fields.is_empty() {
                        let _ = writeln!(out, "    {} = {};", variant.name, variant.tag);
                        continue;
                    }
                    let _ = writeln!(out, "    {} = {} {{", variant.name, variant.tag);
                    for field in ordinal_order(&variant.fields) {
                        render_field(&mut out, "        ", field);
                    }
                    out.push_str("    }\n");
                }
                out.push_str("}\n");
            }
        }
    }
    out
}

fn render_field(out: &mut String, indent: &str, field: &artisan_core::FieldDescriptor) {
    let _ = writeln!(
        out,
        "{}{}: {}{};",
        indent,
        field.name,
        if field.optional { "optional " } else { "" },
        field.kind
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "
        struct Reading {
            first: u64 @ 0;
            id: u32;
            origin: Point;
            tags: seq<string<8>, 4>;
            next: optional ref Reading;
        }
        struct Point { x: i32; y: i32; }
        union Shape {
            Circle { radius: f64; }
            Empty = 3;
        }
    ";

    #[test]
    fn test_load_schema_with_forward_reference() {
        let mut model = TypeModel::new();
        let types = load_schema(&mut model, SCHEMA).expect("load");
        let names: Vec<&str> = types.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Reading", "Point", "Shape"]);

        let reading = model.get("Reading").expect("described");
        let first = reading.field("first").expect("field");
        let id = reading.field("id").expect("field");
        assert_eq!((first.ordinal, id.ordinal), (0, 1));
    }

    #[test]
    fn test_load_schema_reports_descriptor_errors() {
        let mut model = TypeModel::new();
        let err = load_schema(&mut model, "struct A { x: u8; x: u16; }").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Descriptor(DescriptorError::DuplicateField { .. })
        ));

        let err = load_schema(&mut model, "struct A { b: B; } struct B { a: A; }").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Descriptor(DescriptorError::Cycle { .. })
        ));
        assert!(model.is_empty());
    }

    #[test]
    fn test_render_reloads_to_same_identity() {
        let mut model = TypeModel::new();
        let types = load_schema(&mut model, SCHEMA).expect("load");
        let text = render_schema(types.iter().map(|d| d.as_ref()));

        let mut reloaded = TypeModel::new();
        let again = load_schema(&mut reloaded, &text).expect("reload");
        let keys: Vec<_> = types.iter().map(|d| d.key()).collect();
        let again_keys: Vec<_> = again.iter().map(|d| d.key()).collect();
        assert_eq!(keys, again_keys);
    }

    #[test]
    fn test_render_layout() {
        let mut model = TypeModel::new();
        let types = load_schema(&mut model, "struct P { y: i32 @ 1; x: i32 @ 0; }").expect("load");
        assert_eq!(
            render_schema(types.iter().map(|d| d.as_ref())),
            "struct P {\n    x: i32;\n    y: i32;\n}\n"
        );
    }
}
