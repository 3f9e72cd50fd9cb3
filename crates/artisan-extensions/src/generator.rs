// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec generation.
//!
//! [`CodecGenerator::generate`] walks a descriptor once and compiles a tree of
//! closures: one per field in ordinal order, each calling a wire primitive, a
//! captured nested codec, or an element loop. Nothing inspects the descriptor
//! again at encode or decode time.

use crate::codec::{Codec, DecodeContext, DecodeFn, EncodeContext, EncodeFn};
use crate::error::{GenerationError, Result};
use crate::lazy::LazyCodec;
use artisan_core::{
    ordinal_order, validate, FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeKey, TypeShape,
    Value, ValueKind, VariantDescriptor,
};
use artisan_format::config::PREALLOCATION_LIMIT;
use artisan_format::{
    decode_primitive_with, encode_primitive, read_length, read_presence, write_length,
    write_presence, ByteSink, ByteSource, DecodeLimits, FormatError,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

/// Source of codecs for referenced types.
pub trait CodecResolver: Send + Sync {
    /// Codec for the type registered under `name`.
    fn resolve(&self, name: &str, referenced_by: &str) -> Result<Arc<Codec>>;

    /// Bumped whenever previously resolved codecs may be stale.
    fn epoch(&self) -> u64 {
        0
    }
}

/// Resolver that knows no types.
struct NoResolver;

impl CodecResolver for NoResolver {
    fn resolve(&self, name: &str, referenced_by: &str) -> Result<Arc<Codec>> {
        Err(unresolved(name, referenced_by))
    }
}

fn unresolved(name: &str, referenced_by: &str) -> crate::error::ArtisanError {
    GenerationError::Unresolved {
        type_name: name.to_string(),
        referenced_by: referenced_by.to_string(),
    }
    .into()
}

struct Compiled {
    encode: EncodeFn,
    decode: DecodeFn,
}

struct CompiledField {
    name: String,
    optional: bool,
    encode: EncodeFn,
    decode: DecodeFn,
}

struct CompiledVariant {
    name: String,
    tag: u8,
    fields: Vec<CompiledField>,
}

pub struct CodecGenerator {
    resolver: Weak<dyn CodecResolver>,
    limits: DecodeLimits,
}

impl CodecGenerator {
    pub fn new(resolver: Weak<dyn CodecResolver>) -> Self {
        Self {
            resolver,
            limits: DecodeLimits::default(),
        }
    }

    /// Generator for self-contained descriptors; any reference is unresolved.
    pub fn standalone() -> Self {
        let resolver: Weak<dyn CodecResolver> = Weak::<NoResolver>::new();
        Self::new(resolver)
    }

    /// Default decode limits of generated codecs.
    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn generate(&self, descriptor: &Arc<TypeDescriptor>) -> Result<Codec> {
        validate(descriptor)?;
        let mut dependencies = Vec::new();
        let compiled = match descriptor.shape() {
            TypeShape::Struct(fields) => {
                let fields = self.compile_fields(descriptor.name(), fields, &mut dependencies)?;
                compile_struct(descriptor.name(), fields)
            }
            TypeShape::Union(variants) => {
                let variants =
                    self.compile_variants(descriptor.name(), variants, &mut dependencies)?;
                compile_union(descriptor.name(), variants)
            }
        };
        let mut unique: Vec<TypeKey> = Vec::with_capacity(dependencies.len());
        for key in dependencies {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }

        log::debug!(
            "[CodecGenerator::generate] {} ({} inline dependencies)",
            descriptor.key(),
            unique.len()
        );
        Ok(Codec::new(
            Arc::clone(descriptor),
            compiled.encode,
            compiled.decode,
            unique,
            self.limits,
        ))
    }

    fn compile_fields(
        &self,
        owner: &str,
        fields: &[FieldDescriptor],
        dependencies: &mut Vec<TypeKey>,
    ) -> Result<Vec<CompiledField>> {
        ordinal_order(fields)
            .into_iter()
            .map(|field| {
                let compiled = self.compile_kind(owner, &field.kind, dependencies)?;
                Ok(CompiledField {
                    name: field.name.clone(),
                    optional: field.optional,
                    encode: compiled.encode,
                    decode: compiled.decode,
                })
            })
            .collect()
    }

    fn compile_variants(
        &self,
        owner: &str,
        variants: &[VariantDescriptor],
        dependencies: &mut Vec<TypeKey>,
    ) -> Result<Vec<CompiledVariant>> {
        variants
            .iter()
            .map(|variant| {
                Ok(CompiledVariant {
                    name: variant.name.clone(),
                    tag: variant.tag,
                    fields: self.compile_fields(owner, &variant.fields, dependencies)?,
                })
            })
            .collect()
    }

    fn compile_kind(
        &self,
        owner: &str,
        kind: &ValueKind,
        dependencies: &mut Vec<TypeKey>,
    ) -> Result<Compiled> {
        match kind {
            ValueKind::Primitive(primitive) => Ok(compile_primitive(*primitive)),
            ValueKind::Nested(reference) => {
                let resolver = self
                    .resolver
                    .upgrade()
                    .ok_or_else(|| unresolved(reference.name(), owner))?;
                let codec = resolver.resolve(reference.name(), owner)?;
                dependencies.push(codec.key());
                let decoder = Arc::clone(&codec);
                Ok(Compiled {
                    encode: Box::new(move |value, sink, ctx| {
                        codec.encode_nested(value, sink, ctx)
                    }),
                    decode: Box::new(move |source, ctx| decoder.decode_nested(source, ctx)),
                })
            }
            ValueKind::Indirect(reference) => {
                if self.resolver.strong_count() == 0 {
                    return Err(unresolved(reference.name(), owner));
                }
                let lazy = Arc::new(LazyCodec::new(
                    reference.name(),
                    owner,
                    Weak::clone(&self.resolver),
                ));
                let decoder = Arc::clone(&lazy);
                Ok(Compiled {
                    encode: Box::new(move |value, sink, ctx| {
                        lazy.get()?.encode_nested(value, sink, ctx)
                    }),
                    decode: Box::new(move |source, ctx| {
                        decoder.get()?.decode_nested(source, ctx)
                    }),
                })
            }
            ValueKind::Sequence {
                element,
                max_length,
            } => {
                let is_bytes = **element == ValueKind::Primitive(PrimitiveKind::U8);
                let element = self.compile_kind(owner, element, dependencies)?;
                Ok(compile_sequence(element, *max_length, is_bytes))
            }
            ValueKind::Array { element, length } => {
                let is_bytes = **element == ValueKind::Primitive(PrimitiveKind::U8);
                let element = self.compile_kind(owner, element, dependencies)?;
                Ok(compile_array(element, *length, is_bytes))
            }
        }
    }
}

fn compile_primitive(kind: PrimitiveKind) -> Compiled {
    Compiled {
        encode: Box::new(move |value, sink, _ctx| Ok(encode_primitive(kind, value, sink)?)),
        decode: Box::new(move |source, ctx| {
            Ok(decode_primitive_with(kind, source, ctx.limits())?)
        }),
    }
}

/// Elements of a sequence or array value.
///
/// Raw bytes are accepted for a sequence of `u8`; decoding always yields
/// `Value::Sequence`.
fn elements<'v>(value: &'v Value, is_bytes: bool) -> Result<Elements<'v>> {
    match value {
        Value::Sequence(items) => Ok(Elements::Values(items)),
        Value::Bytes(bytes) if is_bytes => Ok(Elements::Bytes(bytes)),
        other => Err(FormatError::mismatch("sequence", other).into()),
    }
}

enum Elements<'v> {
    Values(&'v [Value]),
    Bytes(&'v [u8]),
}

impl Elements<'_> {
    fn len(&self) -> usize {
        match self {
            Self::Values(items) => items.len(),
            Self::Bytes(bytes) => bytes.len(),
        }
    }

    fn encode_each(
        &self,
        encode: &EncodeFn,
        sink: &mut dyn ByteSink,
        ctx: &mut EncodeContext,
    ) -> Result<()> {
        match self {
            Self::Values(items) => {
                for item in items.iter() {
                    encode(item, sink, ctx)?;
                }
            }
            Self::Bytes(bytes) => {
                for byte in bytes.iter() {
                    encode(&Value::U8(*byte), sink, ctx)?;
                }
            }
        }
        Ok(())
    }
}

fn decode_elements(
    decode: &DecodeFn,
    count: usize,
    source: &mut dyn ByteSource,
    ctx: &mut DecodeContext,
) -> Result<Value> {
    ctx.enter()?;
    let mut items = Vec::with_capacity(count.min(PREALLOCATION_LIMIT));
    for _ in 0..count {
        items.push(decode(source, ctx)?);
    }
    ctx.leave();
    Ok(Value::Sequence(items))
}

fn compile_sequence(element: Compiled, max_length: Option<usize>, is_bytes: bool) -> Compiled {
    let Compiled {
        encode: encode_element,
        decode: decode_element,
    } = element;
    Compiled {
        encode: Box::new(move |value, sink, ctx| {
            let items = elements(value, is_bytes)?;
            ctx.enter()?;
            write_length(sink, items.len(), max_length)?;
            items.encode_each(&encode_element, sink, ctx)?;
            ctx.leave();
            Ok(())
        }),
        decode: Box::new(move |source, ctx| {
            let count = read_length(source, max_length, ctx.limits())?;
            decode_elements(&decode_element, count, source, ctx)
        }),
    }
}

fn compile_array(element: Compiled, length: usize, is_bytes: bool) -> Compiled {
    let Compiled {
        encode: encode_element,
        decode: decode_element,
    } = element;
    Compiled {
        encode: Box::new(move |value, sink, ctx| {
            let items = elements(value, is_bytes)?;
            if items.len() != length {
                return Err(FormatError::LengthMismatch {
                    expected: length,
                    found: items.len(),
                }
                .into());
            }
            ctx.enter()?;
            items.encode_each(&encode_element, sink, ctx)?;
            ctx.leave();
            Ok(())
        }),
        decode: Box::new(move |source, ctx| decode_elements(&decode_element, length, source, ctx)),
    }
}

fn encode_fields(
    type_name: &str,
    fields: &[CompiledField],
    values: &BTreeMap<String, Value>,
    sink: &mut dyn ByteSink,
    ctx: &mut EncodeContext,
) -> Result<()> {
    if let Some(unknown) = values
        .keys()
        .find(|name| !fields.iter().any(|f| &f.name == *name))
    {
        return Err(FormatError::UnknownField {
            type_name: type_name.to_string(),
            field: unknown.clone(),
        }
        .into());
    }

    for field in fields {
        let value = values.get(&field.name).filter(|v| !v.is_null());
        match (value, field.optional) {
            (Some(value), true) => {
                write_presence(sink, true)?;
                (field.encode)(value, sink, ctx)?;
            }
            (None, true) => write_presence(sink, false)?,
            (Some(value), false) => (field.encode)(value, sink, ctx)?,
            (None, false) => {
                return Err(FormatError::MissingField {
                    type_name: type_name.to_string(),
                    field: field.name.clone(),
                }
                .into())
            }
        }
    }
    Ok(())
}

fn decode_fields(
    fields: &[CompiledField],
    source: &mut dyn ByteSource,
    ctx: &mut DecodeContext,
) -> Result<BTreeMap<String, Value>> {
    let mut values = BTreeMap::new();
    for field in fields {
        let value = if field.optional && !read_presence(source)? {
            Value::Null
        } else {
            (field.decode)(source, ctx)?
        };
        values.insert(field.name.clone(), value);
    }
    Ok(values)
}

fn compile_struct(type_name: &str, fields: Vec<CompiledField>) -> Compiled {
    let fields: Arc<[CompiledField]> = fields.into();
    let decode_fields_of = Arc::clone(&fields);
    let name = type_name.to_string();
    Compiled {
        encode: Box::new(move |value, sink, ctx| match value {
            Value::Struct(values) => {
                ctx.enter()?;
                encode_fields(&name, &fields, values, sink, ctx)?;
                ctx.leave();
                Ok(())
            }
            other => Err(FormatError::mismatch(&name, other).into()),
        }),
        decode: Box::new(move |source, ctx| {
            ctx.enter()?;
            let values = decode_fields(&decode_fields_of, source, ctx)?;
            ctx.leave();
            Ok(Value::Struct(values))
        }),
    }
}

fn compile_union(type_name: &str, variants: Vec<CompiledVariant>) -> Compiled {
    let mut by_tag: Vec<Option<usize>> = vec![None; 256];
    for (index, variant) in variants.iter().enumerate() {
        by_tag[usize::from(variant.tag)] = Some(index);
    }
    let variants: Arc<[CompiledVariant]> = variants.into();
    let decode_variants = Arc::clone(&variants);
    let name = type_name.to_string();
    let decode_name = name.clone();

    Compiled {
        encode: Box::new(move |value, sink, ctx| {
            let (variant_name, values) = match value {
                Value::Variant {
                    name: variant_name,
                    fields,
                } => (variant_name, fields),
                other => return Err(FormatError::mismatch(&name, other).into()),
            };
            let variant = variants
                .iter()
                .find(|v| &v.name == variant_name)
                .ok_or_else(|| FormatError::UnknownVariant {
                    type_name: name.clone(),
                    variant: variant_name.clone(),
                })?;
            ctx.enter()?;
            sink.write_u8(variant.tag)?;
            encode_fields(&name, &variant.fields, values, sink, ctx)?;
            ctx.leave();
            Ok(())
        }),
        decode: Box::new(move |source, ctx| {
            let tag = source.read_u8()?;
            let variant = by_tag[usize::from(tag)]
                .map(|index| &decode_variants[index])
                .ok_or_else(|| FormatError::InvalidTag {
                    context: format!("{} variant", decode_name),
                    tag,
                })?;
            ctx.enter()?;
            let fields = decode_fields(&variant.fields, source, ctx)?;
            ctx.leave();
            Ok(Value::Variant {
                name: variant.name.clone(),
                fields,
            })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artisan_core::TypeDescriptorBuilder;

    fn generate(desc: TypeDescriptor) -> Codec {
        CodecGenerator::standalone()
            .generate(&Arc::new(desc))
            .expect("generate")
    }

    fn record() -> TypeDescriptor {
        TypeDescriptorBuilder::new("Record")
            .field("id", PrimitiveKind::I32)
            .string_field("name")
            .build()
            .expect("valid")
    }

    #[test]
    fn test_struct_layout() {
        let codec = generate(record());
        let value = Value::structure([
            ("id", Value::I32(7)),
            ("name", Value::String("ok".into())),
        ]);
        let bytes = codec.encode_to_vec(&value).expect("encode");
        assert_eq!(
            bytes,
            [0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x02, 0x6F, 0x6B]
        );
        assert_eq!(codec.decode_from_slice(&bytes).expect("decode"), value);
    }

    #[test]
    fn test_missing_and_unknown_fields() {
        let codec = generate(record());
        let missing = Value::structure([("id", Value::I32(7))]);
        assert!(matches!(
            codec.encode_to_vec(&missing),
            Err(crate::ArtisanError::Format(FormatError::MissingField { .. }))
        ));

        let extra = Value::structure([
            ("id", Value::I32(7)),
            ("name", Value::String("ok".into())),
            ("extra", Value::Bool(true)),
        ]);
        let mut sink = Vec::new();
        assert!(matches!(
            codec.encode(&extra, &mut sink),
            Err(crate::ArtisanError::Format(FormatError::UnknownField { .. }))
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_optional_presence_byte() {
        let desc = TypeDescriptorBuilder::new("Maybe")
            .optional_field("value", PrimitiveKind::U16)
            .build()
            .expect("valid");
        let codec = generate(desc);

        let absent = Value::structure([("value", Value::Null)]);
        assert_eq!(codec.encode_to_vec(&absent).expect("encode"), [0x00]);
        let empty = Value::structure(Vec::<(String, Value)>::new());
        assert_eq!(codec.encode_to_vec(&empty).expect("encode"), [0x00]);
        assert_eq!(codec.decode_from_slice(&[0x00]).expect("decode"), absent);

        let present = Value::structure([("value", Value::U16(0x0102))]);
        assert_eq!(
            codec.encode_to_vec(&present).expect("encode"),
            [0x01, 0x01, 0x02]
        );
        assert!(codec.decode_from_slice(&[0x02, 0x01, 0x02]).is_err());
    }

    #[test]
    fn test_sequence_and_array() {
        let desc = TypeDescriptorBuilder::new("Frame")
            .bounded_sequence_field("samples", PrimitiveKind::I32, 4)
            .array_field("mac", PrimitiveKind::U8, 2)
            .build()
            .expect("valid");
        let codec = generate(desc);

        let value = Value::structure([
            (
                "samples",
                Value::Sequence(vec![Value::I32(1), Value::I32(2), Value::I32(3)]),
            ),
            ("mac", Value::Bytes(vec![0xAB, 0xCD])),
        ]);
        let bytes = codec.encode_to_vec(&value).expect("encode");
        assert_eq!(
            bytes,
            [
                0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00,
                0x00, 0x00, 0x03, 0xAB, 0xCD
            ]
        );

        let too_long = Value::structure([
            ("samples", Value::Sequence(vec![Value::I32(0); 5])),
            ("mac", Value::Bytes(vec![0, 0])),
        ]);
        assert!(matches!(
            codec.encode_to_vec(&too_long),
            Err(crate::ArtisanError::Format(FormatError::BoundExceeded { bound: 4, length: 5 }))
        ));

        let short_array = Value::structure([
            ("samples", Value::Sequence(Vec::new())),
            ("mac", Value::Bytes(vec![0])),
        ]);
        assert!(matches!(
            codec.encode_to_vec(&short_array),
            Err(crate::ArtisanError::Format(FormatError::LengthMismatch {
                expected: 2,
                found: 1
            }))
        ));
    }

    #[test]
    fn test_octet_values_decode_to_canonical_form() {
        let desc = TypeDescriptorBuilder::new("Packet")
            .array_field("mac", PrimitiveKind::U8, 2)
            .sequence_field("body", PrimitiveKind::U8)
            .field("blob", PrimitiveKind::Bytes { max_length: None })
            .build()
            .expect("valid");
        let codec = generate(desc);

        let raw = Value::structure([
            ("mac", Value::Bytes(vec![1, 2])),
            ("body", Value::Bytes(vec![3])),
            ("blob", Value::Sequence(vec![Value::U8(4), Value::U8(5)])),
        ]);
        let canonical = Value::structure([
            ("mac", Value::Sequence(vec![Value::U8(1), Value::U8(2)])),
            ("body", Value::Sequence(vec![Value::U8(3)])),
            ("blob", Value::Bytes(vec![4, 5])),
        ]);

        let bytes = codec.encode_to_vec(&raw).expect("encode");
        assert_eq!(bytes, codec.encode_to_vec(&canonical).expect("encode"));
        let decoded = codec.decode_from_slice(&bytes).expect("decode");
        assert_eq!(decoded, canonical);
        assert_eq!(codec.encode_to_vec(&decoded).expect("encode"), bytes);
    }

    #[test]
    fn test_union_tags() {
        let desc = artisan_core::UnionBuilder::new("Shape")
            .variant_with_tag(
                "Circle",
                2,
                vec![FieldDescriptor::new("radius", PrimitiveKind::F32, 0)],
            )
            .unit_variant("Empty")
            .build()
            .expect("valid");
        let codec = generate(desc);

        let circle = Value::variant("Circle", [("radius", Value::F32(1.5))]);
        let bytes = codec.encode_to_vec(&circle).expect("encode");
        assert_eq!(bytes, [0x02, 0x3F, 0xC0, 0x00, 0x00]);
        assert_eq!(codec.decode_from_slice(&bytes).expect("decode"), circle);

        let empty = Value::unit_variant("Empty");
        assert_eq!(codec.encode_to_vec(&empty).expect("encode"), [0x03]);

        assert!(matches!(
            codec.decode_from_slice(&[0x09]),
            Err(crate::ArtisanError::Format(FormatError::InvalidTag { tag: 0x09, .. }))
        ));
        assert!(matches!(
            codec.encode_to_vec(&Value::unit_variant("Square")),
            Err(crate::ArtisanError::Format(FormatError::UnknownVariant { .. }))
        ));
    }

    #[test]
    fn test_standalone_rejects_references() {
        let nested = TypeDescriptorBuilder::new("Path")
            .nested_field("start", "Point")
            .build()
            .expect("valid");
        assert!(matches!(
            CodecGenerator::standalone().generate(&Arc::new(nested)),
            Err(crate::ArtisanError::Generation(GenerationError::Unresolved { .. }))
        ));

        let indirect = TypeDescriptorBuilder::new("Node")
            .indirect_field("next", "Node")
            .build()
            .expect("valid");
        assert!(CodecGenerator::standalone()
            .generate(&Arc::new(indirect))
            .is_err());
    }

    #[test]
    fn test_trailing_bytes() {
        let codec = generate(record());
        let value = Value::structure([("id", Value::I32(1)), ("name", Value::String(String::new()))]);
        let mut bytes = codec.encode_to_vec(&value).expect("encode");
        bytes.push(0xFF);
        assert!(matches!(
            codec.decode_from_slice(&bytes),
            Err(crate::ArtisanError::Format(FormatError::TrailingBytes(1)))
        ));
    }
}
