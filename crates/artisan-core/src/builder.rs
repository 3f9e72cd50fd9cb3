// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.
//!
//! Fields and variants take the next position as ordinal/tag unless one is
//! given explicitly. `build()` validates the result.

use crate::descriptor::{FieldDescriptor, TypeDescriptor, VariantDescriptor};
use crate::error::{DescriptorError, Result};
use crate::kind::{PrimitiveKind, ValueKind};
use crate::validate::validate;

/// Builder for struct descriptors.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    fn next_ordinal(&self) -> u32 {
        self.fields.len() as u32
    }

    /// Add a field of any kind.
    pub fn field(mut self, name: impl Into<String>, kind: impl Into<ValueKind>) -> Self {
        let ordinal = self.next_ordinal();
        self.fields.push(FieldDescriptor::new(name, kind, ordinal));
        self
    }

    /// Add an optional field.
    pub fn optional_field(mut self, name: impl Into<String>, kind: impl Into<ValueKind>) -> Self {
        let ordinal = self.next_ordinal();
        self.fields
            .push(FieldDescriptor::new(name, kind, ordinal).optional());
        self
    }

    /// Add a field at an explicit ordinal.
    pub fn field_at(
        mut self,
        name: impl Into<String>,
        kind: impl Into<ValueKind>,
        ordinal: u32,
    ) -> Self {
        self.fields.push(FieldDescriptor::new(name, kind, ordinal));
        self
    }

    /// Add a prepared field descriptor as-is.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String { max_length: None })
    }

    pub fn bounded_string_field(self, name: impl Into<String>, max_length: usize) -> Self {
        self.field(
            name,
            PrimitiveKind::String {
                max_length: Some(max_length),
            },
        )
    }

    /// Add a sequence field.
    pub fn sequence_field(self, name: impl Into<String>, element: impl Into<ValueKind>) -> Self {
        self.field(name, ValueKind::sequence(element.into()))
    }

    /// Add a bounded sequence field.
    pub fn bounded_sequence_field(
        self,
        name: impl Into<String>,
        element: impl Into<ValueKind>,
        max_length: usize,
    ) -> Self {
        self.field(name, ValueKind::bounded_sequence(element.into(), max_length))
    }

    /// Add an array field.
    pub fn array_field(
        self,
        name: impl Into<String>,
        element: impl Into<ValueKind>,
        length: usize,
    ) -> Self {
        self.field(name, ValueKind::array(element.into(), length))
    }

    /// Add a field embedding another described type inline.
    pub fn nested_field(self, name: impl Into<String>, type_name: &str) -> Self {
        self.field(name, ValueKind::nested(type_name))
    }

    /// Add a lazily resolved reference to another (or the same) type.
    pub fn indirect_field(self, name: impl Into<String>, type_name: &str) -> Self {
        self.field(name, ValueKind::indirect(type_name))
    }

    /// Build and validate the TypeDescriptor.
    pub fn build(self) -> Result<TypeDescriptor> {
        let desc = TypeDescriptor::struct_type(self.name, self.fields);
        validate(&desc)?;
        Ok(desc)
    }
}

/// Builder for union (sum type) descriptors.
#[derive(Debug)]
pub struct UnionBuilder {
    name: String,
    variants: Vec<VariantDescriptor>,
    next_tag: u16,
    overflow: usize,
}

impl UnionBuilder {
    /// Create a new union builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            next_tag: 0,
            overflow: 0,
        }
    }

    /// Add a variant at the next tag.
    pub fn variant(mut self, name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        match u8::try_from(self.next_tag) {
            Ok(tag) => {
                self.variants.push(VariantDescriptor::new(name, tag, fields));
                self.next_tag += 1;
            }
            Err(_) => self.overflow += 1,
        }
        self
    }

    /// Add a variant without fields.
    pub fn unit_variant(self, name: impl Into<String>) -> Self {
        self.variant(name, Vec::new())
    }

    /// Add a variant with an explicit tag; later implicit tags continue after it.
    pub fn variant_with_tag(
        mut self,
        name: impl Into<String>,
        tag: u8,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        self.variants.push(VariantDescriptor::new(name, tag, fields));
        self.next_tag = u16::from(tag) + 1;
        self
    }

    /// Build and validate the TypeDescriptor.
    pub fn build(self) -> Result<TypeDescriptor> {
        if self.overflow > 0 {
            return Err(DescriptorError::VariantCount {
                type_name: self.name,
                count: self.variants.len() + self.overflow,
            });
        }
        let desc = TypeDescriptor::union_type(self.name, self.variants);
        validate(&desc)?;
        Ok(desc)
    }
}
