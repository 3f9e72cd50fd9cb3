// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural validation of descriptors.

use crate::descriptor::{FieldDescriptor, TypeDescriptor, TypeShape};
use crate::error::{DescriptorError, Result};
use crate::kind::{PrimitiveKind, ValueKind};
use std::collections::HashSet;

/// Largest number of variants a one-byte tag can address.
pub const MAX_VARIANTS: usize = 256;

/// Check a descriptor's structural invariants.
///
/// - type, field, variant and referenced names are identifiers
/// - field names and ordinals are unique, ordinals are exactly `0..n`
/// - unions have `1..=256` variants with unique names and tags
/// - no field embeds the enclosing type inline (use `ValueKind::Indirect`)
///
/// Resolution of referenced names is the catalog's job ([`crate::TypeModel`]).
pub fn validate(desc: &TypeDescriptor) -> Result<()> {
    check_identifier(desc.name())?;

    match desc.shape() {
        TypeShape::Struct(fields) => validate_fields(desc.name(), fields),
        TypeShape::Union(variants) => {
            if variants.is_empty() || variants.len() > MAX_VARIANTS {
                return Err(DescriptorError::VariantCount {
                    type_name: desc.name().to_string(),
                    count: variants.len(),
                });
            }

            let mut names = HashSet::new();
            let mut tags = HashSet::new();
            for variant in variants {
                check_identifier(&variant.name)?;
                if !names.insert(variant.name.as_str()) {
                    return Err(DescriptorError::DuplicateVariant {
                        type_name: desc.name().to_string(),
                        variant: variant.name.clone(),
                    });
                }
                if !tags.insert(variant.tag) {
                    return Err(DescriptorError::DuplicateTag {
                        type_name: desc.name().to_string(),
                        tag: variant.tag,
                    });
                }
                validate_fields(desc.name(), &variant.fields)?;
            }
            Ok(())
        }
    }
}

fn validate_fields(type_name: &str, fields: &[FieldDescriptor]) -> Result<()> {
    let mut names = HashSet::new();
    let mut ordinals = Vec::with_capacity(fields.len());

    for field in fields {
        check_identifier(&field.name)?;
        if !names.insert(field.name.as_str()) {
            return Err(DescriptorError::DuplicateField {
                type_name: type_name.to_string(),
                field: field.name.clone(),
            });
        }
        check_kind(type_name, field)?;
        ordinals.push(field.ordinal);
    }

    ordinals.sort_unstable();
    for (index, ordinal) in ordinals.iter().copied().enumerate() {
        let expected = index as u32;
        if ordinal == expected {
            continue;
        }
        if index > 0 && ordinals[index - 1] == ordinal {
            return Err(DescriptorError::DuplicateOrdinal {
                type_name: type_name.to_string(),
                ordinal,
            });
        }
        return Err(DescriptorError::NonContiguousOrdinals {
            type_name: type_name.to_string(),
            expected,
            found: ordinal,
        });
    }
    Ok(())
}

fn check_kind(type_name: &str, field: &FieldDescriptor) -> Result<()> {
    let mut result = Ok(());
    field.kind.for_each_ref(&mut |r, inline| {
        if result.is_err() {
            return;
        }
        if let Err(e) = check_identifier(r.name()) {
            result = Err(e);
        } else if inline && r.name() == type_name {
            result = Err(DescriptorError::SelfReference {
                type_name: type_name.to_string(),
                field: field.name.clone(),
            });
        }
    });
    result?;

    if let Some(kind) = oversized_bound(&field.kind) {
        return Err(DescriptorError::UnsupportedKind {
            type_name: type_name.to_string(),
            field: field.name.clone(),
            kind,
        });
    }
    Ok(())
}

/// Bounds the 32-bit length prefix cannot express.
fn oversized_bound(kind: &ValueKind) -> Option<String> {
    let limit = u32::MAX as usize;
    match kind {
        ValueKind::Primitive(p) => match p {
            PrimitiveKind::String {
                max_length: Some(max),
            }
            | PrimitiveKind::Bytes {
                max_length: Some(max),
            } if *max > limit => Some(kind.to_string()),
            _ => None,
        },
        ValueKind::Sequence {
            element,
            max_length,
        } => {
            if max_length.is_some_and(|max| max > limit) {
                Some(kind.to_string())
            } else {
                oversized_bound(element)
            }
        }
        ValueKind::Array { element, .. } => oversized_bound(element),
        ValueKind::Nested(_) | ValueKind::Indirect(_) => None,
    }
}

/// Identifier rule shared by type, field and variant names.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(DescriptorError::InvalidName(name.to_string()))
    }
}
