// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw field metadata and its conversion into descriptors.
//!
//! Raw metadata is what an external collaborator hands over: the derive
//! macro, a schema text, or hand-written tables. Kinds are still names at
//! this stage; [`describe`] resolves primitive keywords and turns every
//! other identifier into a type reference.

use crate::descriptor::{FieldDescriptor, TypeDescriptor, VariantDescriptor};
use crate::error::{DescriptorError, Result};
use crate::kind::{PrimitiveKind, ValueKind};
use crate::validate::validate;
use std::collections::BTreeSet;

/// Type names reserved for kinds the wire format has no encoding for.
const UNSUPPORTED_KINDS: &[&str] = &["u128", "i128", "usize", "isize", "f16", "f128", "str"];

/// Unresolved metadata for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawType {
    pub name: String,
    pub shape: RawShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawShape {
    Struct(Vec<RawField>),
    Union(Vec<RawVariant>),
}

/// Unresolved field. Fields without an ordinal take the lowest free one,
/// in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub name: String,
    pub ty: RawKind,
    pub optional: bool,
    pub ordinal: Option<u32>,
}

/// Unresolved variant. Variants without a tag take the lowest free one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVariant {
    pub name: String,
    pub tag: Option<u8>,
    pub fields: Vec<RawField>,
}

/// Kind as written by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawKind {
    /// Primitive keyword or type name.
    Named(String),
    /// Length-bounded `string` or `bytes`.
    Bounded(String, usize),
    Sequence(Box<RawKind>, Option<usize>),
    Array(Box<RawKind>, usize),
    /// Lazily resolved type reference.
    Indirect(String),
}

impl RawType {
    pub fn structure(name: impl Into<String>, fields: Vec<RawField>) -> Self {
        Self {
            name: name.into(),
            shape: RawShape::Struct(fields),
        }
    }

    pub fn union(name: impl Into<String>, variants: Vec<RawVariant>) -> Self {
        Self {
            name: name.into(),
            shape: RawShape::Union(variants),
        }
    }
}

impl RawField {
    pub fn new(name: impl Into<String>, ty: RawKind) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            ordinal: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn at(mut self, ordinal: u32) -> Self {
        self.ordinal = Some(ordinal);
        self
    }
}

impl RawVariant {
    pub fn new(name: impl Into<String>, fields: Vec<RawField>) -> Self {
        Self {
            name: name.into(),
            tag: None,
            fields,
        }
    }

    pub fn tagged(mut self, tag: u8) -> Self {
        self.tag = Some(tag);
        self
    }
}

impl RawKind {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn sequence(element: RawKind) -> Self {
        Self::Sequence(Box::new(element), None)
    }

    pub fn array(element: RawKind, length: usize) -> Self {
        Self::Array(Box::new(element), length)
    }

    pub fn indirect(name: impl Into<String>) -> Self {
        Self::Indirect(name.into())
    }
}

/// Convert raw metadata into a validated descriptor.
///
/// Deterministic: the same input always yields the same descriptor and
/// fingerprint. Referenced names are not resolved here.
pub fn describe(raw: &RawType) -> Result<TypeDescriptor> {
    let desc = match &raw.shape {
        RawShape::Struct(fields) => {
            TypeDescriptor::struct_type(raw.name.as_str(), convert_fields(&raw.name, fields)?)
        }
        RawShape::Union(variants) => {
            TypeDescriptor::union_type(raw.name.as_str(), convert_variants(&raw.name, variants)?)
        }
    };
    validate(&desc)?;
    Ok(desc)
}

fn convert_fields(type_name: &str, fields: &[RawField]) -> Result<Vec<FieldDescriptor>> {
    let mut taken: BTreeSet<u32> = fields.iter().filter_map(|f| f.ordinal).collect();
    let mut next = 0u32;
    let mut out = Vec::with_capacity(fields.len());

    for field in fields {
        let ordinal = match field.ordinal {
            Some(ordinal) => ordinal,
            None => {
                while taken.contains(&next) {
                    next += 1;
                }
                taken.insert(next);
                next
            }
        };
        let kind = convert_kind(type_name, &field.name, &field.ty)?;
        let mut desc = FieldDescriptor::new(field.name.as_str(), kind, ordinal);
        desc.optional = field.optional;
        out.push(desc);
    }
    Ok(out)
}

fn convert_variants(type_name: &str, variants: &[RawVariant]) -> Result<Vec<VariantDescriptor>> {
    let mut taken: BTreeSet<u8> = variants.iter().filter_map(|v| v.tag).collect();
    let mut next = 0u16;
    let mut out = Vec::with_capacity(variants.len());

    for variant in variants {
        let tag = match variant.tag {
            Some(tag) => tag,
            None => {
                while next <= u16::from(u8::MAX) && taken.contains(&(next as u8)) {
                    next += 1;
                }
                let tag = u8::try_from(next).map_err(|_| DescriptorError::VariantCount {
                    type_name: type_name.to_string(),
                    count: variants.len(),
                })?;
                taken.insert(tag);
                tag
            }
        };
        let fields = convert_fields(type_name, &variant.fields)?;
        out.push(VariantDescriptor::new(variant.name.as_str(), tag, fields));
    }
    Ok(out)
}

fn convert_kind(type_name: &str, field: &str, raw: &RawKind) -> Result<ValueKind> {
    let unsupported = |kind: String| DescriptorError::UnsupportedKind {
        type_name: type_name.to_string(),
        field: field.to_string(),
        kind,
    };

    match raw {
        RawKind::Named(name) => {
            if let Some(primitive) = PrimitiveKind::from_name(name) {
                Ok(ValueKind::Primitive(primitive))
            } else if UNSUPPORTED_KINDS.contains(&name.as_str()) {
                Err(unsupported(name.clone()))
            } else {
                Ok(ValueKind::nested(name.as_str()))
            }
        }
        RawKind::Bounded(name, max) => PrimitiveKind::from_name(name)
            .and_then(|p| p.with_max_length(*max))
            .map(ValueKind::Primitive)
            .ok_or_else(|| unsupported(format!("{}<{}>", name, max))),
        RawKind::Sequence(element, max_length) => Ok(ValueKind::Sequence {
            element: Box::new(convert_kind(type_name, field, element)?),
            max_length: *max_length,
        }),
        RawKind::Array(element, length) => Ok(ValueKind::array(
            convert_kind(type_name, field, element)?,
            *length,
        )),
        RawKind::Indirect(name) => {
            if PrimitiveKind::from_name(name).is_some() || UNSUPPORTED_KINDS.contains(&name.as_str())
            {
                Err(unsupported(format!("ref {}", name)))
            } else {
                Ok(ValueKind::indirect(name.as_str()))
            }
        }
    }
}
