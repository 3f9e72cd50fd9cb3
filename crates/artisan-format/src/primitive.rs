// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive values and framing.
//!
//! All fixed-width integers and floats are big-endian. `string` and `bytes`
//! carry a `u32` length prefix; their declared bound counts bytes.

use crate::config::{DecodeLimits, BOOL_FALSE, BOOL_TRUE, TAG_ABSENT, TAG_PRESENT};
use crate::error::{FormatError, Result};
use crate::io::{ByteSink, ByteSource};
use crate::varint::{read_vari64, read_varu64, write_vari64, write_varu64};
use artisan_core::{PrimitiveKind, Value};

/// Write a value's big-endian bytes.
macro_rules! write_be {
    ($sink:expr, $value:expr) => {
        $sink.write_bytes(&$value.to_be_bytes())
    };
}

/// Read a big-endian value of the given type.
macro_rules! read_be {
    ($source:expr, $type:ty) => {{
        let mut buf = [0u8; std::mem::size_of::<$type>()];
        $source.read_exact_into(&mut buf)?;
        <$type>::from_be_bytes(buf)
    }};
}

/// Encode one primitive value.
///
/// Integer kinds accept any integer variant whose value fits the declared
/// width; `f64` also accepts `F32`; `bytes` also accepts a sequence of
/// bytes.
pub fn encode_primitive(kind: PrimitiveKind, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
    match kind {
        PrimitiveKind::Bool => match value {
            Value::Bool(b) => sink.write_u8(if *b { BOOL_TRUE } else { BOOL_FALSE }),
            other => Err(FormatError::mismatch(kind, other)),
        },
        PrimitiveKind::U8 => sink.write_u8(integer(kind, value)? as u8),
        PrimitiveKind::I8 => sink.write_u8(integer(kind, value)? as i8 as u8),
        PrimitiveKind::U16 => write_be!(sink, integer(kind, value)? as u16),
        PrimitiveKind::I16 => write_be!(sink, integer(kind, value)? as i16),
        PrimitiveKind::U32 => write_be!(sink, integer(kind, value)? as u32),
        PrimitiveKind::I32 => write_be!(sink, integer(kind, value)? as i32),
        PrimitiveKind::U64 => write_be!(sink, integer(kind, value)? as u64),
        PrimitiveKind::I64 => write_be!(sink, integer(kind, value)? as i64),
        PrimitiveKind::VarU64 => write_varu64(sink, integer(kind, value)? as u64),
        PrimitiveKind::VarI64 => write_vari64(sink, integer(kind, value)? as i64),
        PrimitiveKind::F32 => match value {
            Value::F32(v) => write_be!(sink, v.to_bits()),
            other => Err(FormatError::mismatch(kind, other)),
        },
        PrimitiveKind::F64 => match value {
            Value::F64(v) => write_be!(sink, v.to_bits()),
            Value::F32(v) => write_be!(sink, f64::from(*v).to_bits()),
            other => Err(FormatError::mismatch(kind, other)),
        },
        PrimitiveKind::Char => match value {
            Value::Char(c) => write_be!(sink, u32::from(*c)),
            other => Err(FormatError::mismatch(kind, other)),
        },
        PrimitiveKind::String { max_length } => match value {
            Value::String(s) => {
                write_length(sink, s.len(), max_length)?;
                sink.write_bytes(s.as_bytes())
            }
            other => Err(FormatError::mismatch(kind, other)),
        },
        PrimitiveKind::Bytes { max_length } => match value {
            Value::Bytes(bytes) => {
                write_length(sink, bytes.len(), max_length)?;
                sink.write_bytes(bytes)
            }
            Value::Sequence(items) => {
                write_length(sink, items.len(), max_length)?;
                for item in items {
                    sink.write_u8(integer(PrimitiveKind::U8, item)? as u8)?;
                }
                Ok(())
            }
            other => Err(FormatError::mismatch(kind, other)),
        },
    }
}

/// Decode one primitive value with default limits.
pub fn decode_primitive(kind: PrimitiveKind, source: &mut dyn ByteSource) -> Result<Value> {
    decode_primitive_with(kind, source, &DecodeLimits::default())
}

/// Decode one primitive value.
///
/// Decoding yields exactly the variant matching `kind`; varint kinds decode
/// to `U64`/`I64`.
pub fn decode_primitive_with(
    kind: PrimitiveKind,
    source: &mut dyn ByteSource,
    limits: &DecodeLimits,
) -> Result<Value> {
    let value = match kind {
        PrimitiveKind::Bool => match source.read_u8()? {
            BOOL_FALSE => Value::Bool(false),
            BOOL_TRUE => Value::Bool(true),
            tag => {
                return Err(FormatError::InvalidTag {
                    context: "bool".into(),
                    tag,
                })
            }
        },
        PrimitiveKind::U8 => Value::U8(source.read_u8()?),
        PrimitiveKind::I8 => Value::I8(source.read_u8()? as i8),
        PrimitiveKind::U16 => Value::U16(read_be!(source, u16)),
        PrimitiveKind::I16 => Value::I16(read_be!(source, i16)),
        PrimitiveKind::U32 => Value::U32(read_be!(source, u32)),
        PrimitiveKind::I32 => Value::I32(read_be!(source, i32)),
        PrimitiveKind::U64 => Value::U64(read_be!(source, u64)),
        PrimitiveKind::I64 => Value::I64(read_be!(source, i64)),
        PrimitiveKind::VarU64 => Value::U64(read_varu64(source)?),
        PrimitiveKind::VarI64 => Value::I64(read_vari64(source)?),
        PrimitiveKind::F32 => Value::F32(f32::from_bits(read_be!(source, u32))),
        PrimitiveKind::F64 => Value::F64(f64::from_bits(read_be!(source, u64))),
        PrimitiveKind::Char => {
            let scalar = read_be!(source, u32);
            Value::Char(char::from_u32(scalar).ok_or(FormatError::InvalidChar(scalar))?)
        }
        PrimitiveKind::String { max_length } => {
            let len = read_length(source, max_length, limits)?;
            Value::String(String::from_utf8(source.read_vec(len)?)?)
        }
        PrimitiveKind::Bytes { max_length } => {
            let len = read_length(source, max_length, limits)?;
            Value::Bytes(source.read_vec(len)?)
        }
    };
    Ok(value)
}

/// Check an integer value against the width of `kind`.
fn integer(kind: PrimitiveKind, value: &Value) -> Result<i128> {
    let n = value
        .as_i128()
        .ok_or_else(|| FormatError::mismatch(kind, value))?;
    let (min, max) = integer_range(kind);
    if n < min || n > max {
        return Err(FormatError::OutOfRange {
            kind: kind.name(),
            value: n.to_string(),
        });
    }
    Ok(n)
}

fn integer_range(kind: PrimitiveKind) -> (i128, i128) {
    match kind {
        PrimitiveKind::U8 => (0, i128::from(u8::MAX)),
        PrimitiveKind::U16 => (0, i128::from(u16::MAX)),
        PrimitiveKind::U32 => (0, i128::from(u32::MAX)),
        PrimitiveKind::U64 | PrimitiveKind::VarU64 => (0, i128::from(u64::MAX)),
        PrimitiveKind::I8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
        PrimitiveKind::I16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
        PrimitiveKind::I32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
        PrimitiveKind::I64 | PrimitiveKind::VarI64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
        _ => (0, -1),
    }
}

/// Write a `u32` length prefix after checking the declared bound.
pub fn write_length(sink: &mut dyn ByteSink, length: usize, bound: Option<usize>) -> Result<()> {
    if let Some(bound) = bound {
        if length > bound {
            return Err(FormatError::BoundExceeded { bound, length });
        }
    }
    let prefix = u32::try_from(length).map_err(|_| FormatError::LengthOverflow(length))?;
    write_be!(sink, prefix)
}

/// Read a `u32` length prefix and check it against the declared bound and
/// the decoder limits.
pub fn read_length(
    source: &mut dyn ByteSource,
    bound: Option<usize>,
    limits: &DecodeLimits,
) -> Result<usize> {
    let length = read_be!(source, u32) as usize;
    if let Some(bound) = bound {
        if length > bound {
            return Err(FormatError::BoundExceeded { bound, length });
        }
    }
    if length > limits.max_length {
        return Err(FormatError::LengthLimit {
            limit: limits.max_length,
            length,
        });
    }
    Ok(length)
}

/// Write the presence byte of an optional field.
pub fn write_presence(sink: &mut dyn ByteSink, present: bool) -> Result<()> {
    sink.write_u8(if present { TAG_PRESENT } else { TAG_ABSENT })
}

/// Read the presence byte of an optional field.
pub fn read_presence(source: &mut dyn ByteSource) -> Result<bool> {
    match source.read_u8()? {
        TAG_ABSENT => Ok(false),
        TAG_PRESENT => Ok(true),
        tag => Err(FormatError::InvalidTag {
            context: "presence".into(),
            tag,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SliceSource;

    fn encode(kind: PrimitiveKind, value: Value) -> Vec<u8> {
        let mut out = Vec::new();
        encode_primitive(kind, &value, &mut out).expect("encode");
        out
    }

    fn decode(kind: PrimitiveKind, bytes: &[u8]) -> Result<Value> {
        let mut source = SliceSource::new(bytes);
        decode_primitive(kind, &mut source)
    }

    fn string() -> PrimitiveKind {
        PrimitiveKind::String { max_length: None }
    }

    #[test]
    fn test_integers_are_big_endian() {
        assert_eq!(encode(PrimitiveKind::I32, Value::I32(7)), vec![0, 0, 0, 7]);
        assert_eq!(encode(PrimitiveKind::U16, Value::U16(0x0102)), vec![1, 2]);
        assert_eq!(encode(PrimitiveKind::I16, Value::I16(-2)), vec![0xff, 0xfe]);
        assert_eq!(
            encode(PrimitiveKind::U64, Value::U64(1)),
            vec![0, 0, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_integer_widening_and_range() {
        assert_eq!(encode(PrimitiveKind::U8, Value::I64(200)), vec![200]);
        let mut out = Vec::new();
        let err = encode_primitive(PrimitiveKind::U8, &Value::I32(256), &mut out).unwrap_err();
        assert!(matches!(err, FormatError::OutOfRange { kind: "u8", .. }));
        let err = encode_primitive(PrimitiveKind::U32, &Value::I8(-1), &mut out).unwrap_err();
        assert!(matches!(err, FormatError::OutOfRange { .. }));
        let err =
            encode_primitive(PrimitiveKind::I32, &Value::String("7".into()), &mut out).unwrap_err();
        assert!(matches!(err, FormatError::TypeMismatch { .. }));
    }

    #[test]
    fn test_decode_yields_declared_variant() {
        assert_eq!(decode(PrimitiveKind::I8, &[0xff]).expect("i8"), Value::I8(-1));
        assert_eq!(decode(PrimitiveKind::VarU64, &[0xac, 0x02]).expect("varint"), Value::U64(300));
    }

    #[test]
    fn test_floats() {
        assert_eq!(
            encode(PrimitiveKind::F32, Value::F32(1.0)),
            vec![0x3f, 0x80, 0, 0]
        );
        let widened = encode(PrimitiveKind::F64, Value::F32(0.5));
        assert_eq!(decode(PrimitiveKind::F64, &widened).expect("f64"), Value::F64(0.5));
    }

    #[test]
    fn test_bool_tag() {
        assert_eq!(encode(PrimitiveKind::Bool, Value::Bool(true)), vec![1]);
        assert!(matches!(
            decode(PrimitiveKind::Bool, &[2]),
            Err(FormatError::InvalidTag { tag: 2, .. })
        ));
    }

    #[test]
    fn test_char_scalar() {
        assert_eq!(
            encode(PrimitiveKind::Char, Value::Char('A')),
            vec![0, 0, 0, 0x41]
        );
        assert!(matches!(
            decode(PrimitiveKind::Char, &[0, 0, 0xd8, 0]),
            Err(FormatError::InvalidChar(0xd800))
        ));
    }

    #[test]
    fn test_string_layout() {
        assert_eq!(
            encode(string(), Value::String("ok".into())),
            vec![0, 0, 0, 2, 0x6f, 0x6b]
        );
        assert!(matches!(
            decode(string(), &[0, 0, 0, 2, 0xc3, 0x28]),
            Err(FormatError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_bounds() {
        let bounded = PrimitiveKind::String {
            max_length: Some(2),
        };
        let mut out = Vec::new();
        let err = encode_primitive(bounded, &Value::String("abc".into()), &mut out).unwrap_err();
        assert!(matches!(
            err,
            FormatError::BoundExceeded {
                bound: 2,
                length: 3
            }
        ));
        assert!(matches!(
            decode(bounded, &[0, 0, 0, 3, b'a', b'b', b'c']),
            Err(FormatError::BoundExceeded { .. })
        ));
    }

    #[test]
    fn test_length_limit() {
        let limits = DecodeLimits::default().with_max_length(1);
        let bytes = [0, 0, 0, 2, 1, 2];
        let mut source = SliceSource::new(&bytes);
        let kind = PrimitiveKind::Bytes { max_length: None };
        assert!(matches!(
            decode_primitive_with(kind, &mut source, &limits),
            Err(FormatError::LengthLimit {
                limit: 1,
                length: 2
            })
        ));
    }

    #[test]
    fn test_bytes_accepts_byte_sequence() {
        let kind = PrimitiveKind::Bytes { max_length: None };
        let value = Value::Sequence(vec![Value::U8(1), Value::U8(2)]);
        assert_eq!(encode(kind, value), vec![0, 0, 0, 2, 1, 2]);
    }

    #[test]
    fn test_presence() {
        let mut out = Vec::new();
        write_presence(&mut out, true).expect("write");
        write_presence(&mut out, false).expect("write");
        assert_eq!(out, vec![1, 0]);

        let bytes = [7u8];
        let mut source = SliceSource::new(&bytes);
        assert!(matches!(
            read_presence(&mut source),
            Err(FormatError::InvalidTag { tag: 7, .. })
        ));
    }

    #[test]
    fn test_truncated_primitive() {
        assert!(matches!(
            decode(PrimitiveKind::U32, &[0, 0, 1]),
            Err(FormatError::Truncated {
                offset: 0,
                needed: 1
            })
        ));
    }
}
