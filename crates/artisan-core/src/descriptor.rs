// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: immutable structural descriptions of serializable types.
//!
//! A [`TypeDescriptor`] is identified by its name together with a 64-bit
//! structural fingerprint ([`TypeKey`]). Two descriptors with the same name
//! but a different wire layout never share an identity, so caches keyed on
//! [`TypeKey`] cannot hand out a codec built for an older shape.

use crate::kind::{TypeRef, ValueKind};
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

/// Field of a struct or of a union variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Declared kind.
    pub kind: ValueKind,
    /// Optional fields carry a presence tag on the wire.
    pub optional: bool,
    /// Position in the encoding order.
    pub ordinal: u32,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: impl Into<ValueKind>, ordinal: u32) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            optional: false,
            ordinal,
        }
    }

    /// Mark as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Move to another ordinal.
    pub fn at(mut self, ordinal: u32) -> Self {
        self.ordinal = ordinal;
        self
    }
}

/// Variant of a sum type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantDescriptor {
    pub name: String,
    /// Discriminant written before the variant's fields.
    pub tag: u8,
    pub fields: Vec<FieldDescriptor>,
}

impl VariantDescriptor {
    pub fn new(name: impl Into<String>, tag: u8, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            tag,
            fields,
        }
    }

    /// Variant without fields.
    pub fn unit(name: impl Into<String>, tag: u8) -> Self {
        Self::new(name, tag, Vec::new())
    }
}

/// Layout of a described type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// Product type: all fields, in ordinal order.
    Struct(Vec<FieldDescriptor>),
    /// Sum type: one tagged variant.
    Union(Vec<VariantDescriptor>),
}

/// Identity of a descriptor: name plus structural fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    name: Arc<str>,
    fingerprint: u64,
}

impl TypeKey {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:016x}", self.name, self.fingerprint)
    }
}

/// Immutable description of a serializable type.
///
/// Construction does not validate; run [`crate::validate`] (the builders and
/// [`crate::TypeModel`] do) before handing a descriptor to a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: Arc<str>,
    shape: TypeShape,
    fingerprint: u64,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<Arc<str>>, shape: TypeShape) -> Self {
        let name = name.into();
        let fingerprint = fingerprint(&name, &shape);
        Self {
            name,
            shape,
            fingerprint,
        }
    }

    /// Create a struct descriptor.
    pub fn struct_type(name: impl Into<Arc<str>>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeShape::Struct(fields))
    }

    /// Create a union descriptor.
    pub fn union_type(name: impl Into<Arc<str>>, variants: Vec<VariantDescriptor>) -> Self {
        Self::new(name, TypeShape::Union(variants))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Identity used by codec caches.
    pub fn key(&self) -> TypeKey {
        TypeKey {
            name: Arc::clone(&self.name),
            fingerprint: self.fingerprint,
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.shape, TypeShape::Struct(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self.shape, TypeShape::Union(_))
    }

    /// Fields if this is a struct, in declaration order.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.shape {
            TypeShape::Struct(fields) => Some(fields),
            TypeShape::Union(_) => None,
        }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// Variants if this is a union, in declaration order.
    pub fn variants(&self) -> Option<&[VariantDescriptor]> {
        match &self.shape {
            TypeShape::Union(variants) => Some(variants),
            TypeShape::Struct(_) => None,
        }
    }

    pub fn variant(&self, name: &str) -> Option<&VariantDescriptor> {
        self.variants()?.iter().find(|v| v.name == name)
    }

    pub fn variant_by_tag(&self, tag: u8) -> Option<&VariantDescriptor> {
        self.variants()?.iter().find(|v| v.tag == tag)
    }

    /// Every type reference in the layout, inline ones flagged `true`.
    pub fn references(&self) -> Vec<(TypeRef, bool)> {
        let mut refs = Vec::new();
        let mut collect = |fields: &[FieldDescriptor]| {
            for field in fields {
                field
                    .kind
                    .for_each_ref(&mut |r, inline| refs.push((r.clone(), inline)));
            }
        };
        match &self.shape {
            TypeShape::Struct(fields) => collect(fields),
            TypeShape::Union(variants) => {
                for variant in variants {
                    collect(&variant.fields);
                }
            }
        }
        refs
    }
}

/// Fields sorted into encoding order.
pub fn ordinal_order(fields: &[FieldDescriptor]) -> Vec<&FieldDescriptor> {
    let mut ordered: Vec<&FieldDescriptor> = fields.iter().collect();
    ordered.sort_by_key(|f| f.ordinal);
    ordered
}

/// FNV-1a (64-bit) over the canonical layout text.
///
/// Fields are hashed in ordinal order and variants in tag order, so
/// reordering declarations without touching ordinals keeps the identity.
fn fingerprint(name: &str, shape: &TypeShape) -> u64 {
    let mut canonical = String::new();
    let write_fields = |out: &mut String, fields: &[FieldDescriptor]| {
        for field in ordinal_order(fields) {
            let _ = write!(
                out,
                "{}:{}{}:{};",
                field.ordinal,
                field.name,
                if field.optional { "?" } else { "" },
                field.kind
            );
        }
    };
    match shape {
        TypeShape::Struct(fields) => {
            let _ = write!(canonical, "struct {}{{", name);
            write_fields(&mut canonical, fields);
            canonical.push('}');
        }
        TypeShape::Union(variants) => {
            let _ = write!(canonical, "union {}{{", name);
            let mut ordered: Vec<&VariantDescriptor> = variants.iter().collect();
            ordered.sort_by_key(|v| v.tag);
            for variant in ordered {
                let _ = write!(canonical, "{}={}{{", variant.name, variant.tag);
                write_fields(&mut canonical, &variant.fields);
                canonical.push('}');
            }
            canonical.push('}');
        }
    }
    fnv1a_64(canonical.as_bytes())
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::PrimitiveKind;

    fn point(x_ordinal: u32, y_ordinal: u32) -> TypeDescriptor {
        TypeDescriptor::struct_type(
            "Point",
            vec![
                FieldDescriptor::new("x", PrimitiveKind::I32, x_ordinal),
                FieldDescriptor::new("y", PrimitiveKind::I32, y_ordinal),
            ],
        )
    }

    #[test]
    fn test_struct_accessors() {
        let desc = point(0, 1);
        assert!(desc.is_struct());
        assert!(!desc.is_union());
        assert_eq!(desc.fields().map(|f| f.len()), Some(2));
        assert!(desc.field("x").is_some());
        assert!(desc.field("z").is_none());
        assert!(desc.variants().is_none());
    }

    #[test]
    fn test_fingerprint_tracks_ordinals() {
        assert_eq!(point(0, 1).fingerprint(), point(0, 1).fingerprint());
        assert_ne!(point(0, 1).fingerprint(), point(1, 0).fingerprint());
        assert_ne!(point(0, 1).key(), point(1, 0).key());
    }

    #[test]
    fn test_fingerprint_ignores_declaration_order() {
        let swapped = TypeDescriptor::struct_type(
            "Point",
            vec![
                FieldDescriptor::new("y", PrimitiveKind::I32, 1),
                FieldDescriptor::new("x", PrimitiveKind::I32, 0),
            ],
        );
        assert_eq!(swapped.key(), point(0, 1).key());
    }

    #[test]
    fn test_fingerprint_tracks_name_and_optionality() {
        let renamed = TypeDescriptor::struct_type(
            "Vec2",
            vec![
                FieldDescriptor::new("x", PrimitiveKind::I32, 0),
                FieldDescriptor::new("y", PrimitiveKind::I32, 1),
            ],
        );
        assert_ne!(renamed.fingerprint(), point(0, 1).fingerprint());

        let optional = TypeDescriptor::struct_type(
            "Point",
            vec![
                FieldDescriptor::new("x", PrimitiveKind::I32, 0),
                FieldDescriptor::new("y", PrimitiveKind::I32, 1).optional(),
            ],
        );
        assert_ne!(optional.fingerprint(), point(0, 1).fingerprint());
    }

    #[test]
    fn test_union_lookup() {
        let shape = TypeDescriptor::union_type(
            "Shape",
            vec![
                VariantDescriptor::new(
                    "Circle",
                    0,
                    vec![FieldDescriptor::new("radius", PrimitiveKind::F64, 0)],
                ),
                VariantDescriptor::unit("Empty", 3),
            ],
        );
        assert!(shape.is_union());
        assert_eq!(shape.variant("Empty").map(|v| v.tag), Some(3));
        assert_eq!(
            shape.variant_by_tag(0).map(|v| v.name.as_str()),
            Some("Circle")
        );
        assert!(shape.variant_by_tag(1).is_none());
    }

    #[test]
    fn test_references_collects_nested_and_indirect() {
        let desc = TypeDescriptor::struct_type(
            "Node",
            vec![
                FieldDescriptor::new("origin", ValueKind::nested("Point"), 0),
                FieldDescriptor::new(
                    "children",
                    ValueKind::sequence(ValueKind::indirect("Node")),
                    1,
                ),
            ],
        );
        let refs: Vec<(String, bool)> = desc
            .references()
            .into_iter()
            .map(|(r, inline)| (r.name().to_string(), inline))
            .collect();
        assert_eq!(
            refs,
            vec![("Point".to_string(), true), ("Node".to_string(), false)]
        );
    }

    #[test]
    fn test_key_display() {
        let key = point(0, 1).key();
        let shown = key.to_string();
        assert!(shown.starts_with("Point#"));
        assert_eq!(shown.len(), "Point#".len() + 16);
    }
}
