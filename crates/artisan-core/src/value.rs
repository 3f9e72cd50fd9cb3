// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic values and conversions from/to Rust types.

use crate::error::ValueError;
use std::collections::BTreeMap;

/// A dynamic value that can hold any described type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Primitives
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),

    // Composites
    Struct(BTreeMap<String, Value>),
    /// Sequence or fixed-length array.
    Sequence(Vec<Value>),
    /// Union value: the chosen variant and its fields.
    Variant {
        name: String,
        fields: BTreeMap<String, Value>,
    },

    /// Absent optional field.
    Null,
}

impl Value {
    /// Build a struct value from `(name, value)` pairs.
    pub fn structure<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a union value.
    pub fn variant<I, K>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Variant {
            name: name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Union value of a variant without fields.
    pub fn unit_variant(name: impl Into<String>) -> Self {
        Self::Variant {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Struct(_) => "struct",
            Self::Sequence(_) => "sequence",
            Self::Variant { .. } => "variant",
            Self::Null => "null",
        }
    }

    /// Any integer variant, widened.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::U8(v) => Some(i128::from(*v)),
            Self::U16(v) => Some(i128::from(*v)),
            Self::U32(v) => Some(i128::from(*v)),
            Self::U64(v) => Some(i128::from(*v)),
            Self::I8(v) => Some(i128::from(*v)),
            Self::I16(v) => Some(i128::from(*v)),
            Self::I32(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Field of a struct or union value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) | Self::Variant { fields, .. } => fields.get(name),
            _ => None,
        }
    }

    /// Element of a sequence value.
    pub fn get(&self, index: usize) -> Option<&Value> {
        match self {
            Self::Sequence(items) => items.get(index),
            _ => None,
        }
    }
}

/// Convert a Rust value into a [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Rebuild a Rust value from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

fn mismatch(expected: &str, found: &Value) -> ValueError {
    ValueError::TypeMismatch {
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

/// Fetch and convert a named field; used by derived impls.
pub fn take_field<T: FromValue>(
    fields: &BTreeMap<String, Value>,
    name: &str,
) -> Result<T, ValueError> {
    match fields.get(name) {
        Some(value) => T::from_value(value),
        None => Err(ValueError::MissingField(name.to_string())),
    }
}

/// Fetch an optional field; a missing entry reads as `None`.
pub fn take_optional<T: FromValue>(
    fields: &BTreeMap<String, Value>,
    name: &str,
) -> Result<Option<T>, ValueError> {
    match fields.get(name) {
        Some(value) => Option::<T>::from_value(value),
        None => Ok(None),
    }
}

macro_rules! impl_scalar {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::$variant(*self)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, ValueError> {
                match value {
                    Value::$variant(v) => Ok(*v),
                    other => Err(mismatch($name, other)),
                }
            }
        }
    };
}

impl_scalar!(bool, Bool, "bool");
impl_scalar!(u8, U8, "u8");
impl_scalar!(u16, U16, "u16");
impl_scalar!(u32, U32, "u32");
impl_scalar!(u64, U64, "u64");
impl_scalar!(i8, I8, "i8");
impl_scalar!(i16, I16, "i16");
impl_scalar!(i32, I32, "i32");
impl_scalar!(i64, I64, "i64");
impl_scalar!(f32, F32, "f32");
impl_scalar!(f64, F64, "f64");
impl_scalar!(char, Char, "char");

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(value.clone())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Sequence(items) => items.iter().map(T::from_value).collect(),
            // Sequences of u8 may arrive as raw bytes.
            Value::Bytes(bytes) => bytes.iter().map(|b| T::from_value(&Value::U8(*b))).collect(),
            other => Err(mismatch("sequence", other)),
        }
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        let items = Vec::<T>::from_value(value)?;
        let found = items.len();
        items.try_into().map_err(|_| ValueError::LengthMismatch {
            expected: N,
            found,
        })
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Box::new)
    }
}
