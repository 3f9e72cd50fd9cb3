// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value kinds a field can declare.

use std::fmt;
use std::sync::Arc;

/// Primitive kinds with a fixed wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Char,
    /// Unsigned LEB128 varint.
    VarU64,
    /// Zig-zag LEB128 varint.
    VarI64,
    String { max_length: Option<usize> },
    Bytes { max_length: Option<usize> },
}

impl PrimitiveKind {
    /// Encoded size in bytes (None for varints and length-prefixed kinds).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 | Self::Char => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::VarU64 | Self::VarI64 | Self::String { .. } | Self::Bytes { .. } => None,
        }
    }

    /// Whether the kind holds an integer.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::VarU64
                | Self::VarI64
        )
    }

    /// Keyword used by schemas and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::VarU64 => "varu64",
            Self::VarI64 => "vari64",
            Self::String { .. } => "string",
            Self::Bytes { .. } => "bytes",
        }
    }

    /// Resolve a primitive keyword. Length-prefixed kinds come back unbounded.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "char" => Self::Char,
            "varu64" => Self::VarU64,
            "vari64" => Self::VarI64,
            "string" => Self::String { max_length: None },
            "bytes" => Self::Bytes { max_length: None },
            _ => return None,
        };
        Some(kind)
    }

    /// Apply a length bound to `string`/`bytes`; other kinds are returned as-is.
    pub fn with_max_length(self, max: usize) -> Option<Self> {
        match self {
            Self::String { .. } => Some(Self::String {
                max_length: Some(max),
            }),
            Self::Bytes { .. } => Some(Self::Bytes {
                max_length: Some(max),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String {
                max_length: Some(max),
            }
            | Self::Bytes {
                max_length: Some(max),
            } => write!(f, "{}<{}>", self.name(), max),
            _ => f.write_str(self.name()),
        }
    }
}

/// Reference to another described type, by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(Arc<str>);

impl TypeRef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn as_arc(&self) -> &Arc<str> {
        &self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared kind of a field or sequence element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Primitive(PrimitiveKind),
    /// Inline composition; the referenced codec is resolved when the
    /// containing codec is generated.
    Nested(TypeRef),
    /// Lazy reference resolved on first use. Required for recursion.
    Indirect(TypeRef),
    /// Length-prefixed homogeneous sequence.
    Sequence {
        element: Box<ValueKind>,
        max_length: Option<usize>,
    },
    /// Fixed-length homogeneous array, no length prefix.
    Array {
        element: Box<ValueKind>,
        length: usize,
    },
}

impl ValueKind {
    pub fn nested(name: impl Into<Arc<str>>) -> Self {
        Self::Nested(TypeRef::new(name))
    }

    pub fn indirect(name: impl Into<Arc<str>>) -> Self {
        Self::Indirect(TypeRef::new(name))
    }

    pub fn sequence(element: ValueKind) -> Self {
        Self::Sequence {
            element: Box::new(element),
            max_length: None,
        }
    }

    pub fn bounded_sequence(element: ValueKind, max_length: usize) -> Self {
        Self::Sequence {
            element: Box::new(element),
            max_length: Some(max_length),
        }
    }

    pub fn array(element: ValueKind, length: usize) -> Self {
        Self::Array {
            element: Box::new(element),
            length,
        }
    }

    /// Visit every type reference in this kind, inline ones flagged `true`.
    pub fn for_each_ref<F>(&self, f: &mut F)
    where
        F: FnMut(&TypeRef, bool),
    {
        match self {
            Self::Primitive(_) => {}
            Self::Nested(r) => f(r, true),
            Self::Indirect(r) => f(r, false),
            Self::Sequence { element, .. } | Self::Array { element, .. } => {
                element.for_each_ref(f)
            }
        }
    }
}

impl From<PrimitiveKind> for ValueKind {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{}", p),
            Self::Nested(r) => write!(f, "{}", r),
            Self::Indirect(r) => write!(f, "ref {}", r),
            Self::Sequence {
                element,
                max_length: None,
            } => write!(f, "seq<{}>", element),
            Self::Sequence {
                element,
                max_length: Some(max),
            } => write!(f, "seq<{}, {}>", element, max),
            Self::Array { element, length } => write!(f, "[{}; {}]", element, length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_size() {
        assert_eq!(PrimitiveKind::Bool.size(), Some(1));
        assert_eq!(PrimitiveKind::I16.size(), Some(2));
        assert_eq!(PrimitiveKind::Char.size(), Some(4));
        assert_eq!(PrimitiveKind::F64.size(), Some(8));
        assert_eq!(PrimitiveKind::VarU64.size(), None);
        assert_eq!(PrimitiveKind::String { max_length: None }.size(), None);
    }

    #[test]
    fn test_primitive_names_resolve_back() {
        for kind in [
            PrimitiveKind::Bool,
            PrimitiveKind::U64,
            PrimitiveKind::I8,
            PrimitiveKind::F32,
            PrimitiveKind::VarI64,
            PrimitiveKind::Bytes { max_length: None },
        ] {
            assert_eq!(PrimitiveKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_name("u128"), None);
    }

    #[test]
    fn test_bounds_only_apply_to_length_prefixed() {
        assert_eq!(
            PrimitiveKind::String { max_length: None }.with_max_length(8),
            Some(PrimitiveKind::String {
                max_length: Some(8)
            })
        );
        assert_eq!(PrimitiveKind::U32.with_max_length(8), None);
    }

    #[test]
    fn test_value_kind_display() {
        let kind = ValueKind::bounded_sequence(
            ValueKind::array(PrimitiveKind::U8.into(), 4),
            16,
        );
        assert_eq!(kind.to_string(), "seq<[u8; 4], 16>");
        assert_eq!(ValueKind::indirect("Node").to_string(), "ref Node");
        assert_eq!(
            ValueKind::Primitive(PrimitiveKind::String {
                max_length: Some(32)
            })
            .to_string(),
            "string<32>"
        );
    }

    #[test]
    fn test_for_each_ref_flags_inline() {
        let kind = ValueKind::sequence(ValueKind::nested("Point"));
        let mut seen = Vec::new();
        kind.for_each_ref(&mut |r, inline| seen.push((r.name().to_string(), inline)));
        assert_eq!(seen, vec![("Point".to_string(), true)]);

        let kind = ValueKind::indirect("Node");
        seen.clear();
        kind.for_each_ref(&mut |r, inline| seen.push((r.name().to_string(), inline)));
        assert_eq!(seen, vec![("Node".to_string(), false)]);
    }
}
