// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Artisan Type Model
//!
//! Shape of serializable data, independent of any wire format.
//!
//! # Features
//!
//! - **TypeDescriptor**: immutable description with a structural fingerprint
//! - **Builder API**: fluent interface for struct and union descriptors
//! - **RawType / describe**: conversion of external metadata (derive, schema text)
//! - **TypeModel**: catalog resolving references between descriptors
//! - **Value**: dynamic value tree plus `ToValue`/`FromValue` conversions
//!
//! # Example
//!
//! ```rust
//! use artisan_core::{PrimitiveKind, TypeDescriptorBuilder, TypeModel, ValueKind};
//!
//! let point = TypeDescriptorBuilder::new("Point")
//!     .field("x", PrimitiveKind::I32)
//!     .field("y", PrimitiveKind::I32)
//!     .build()
//!     .unwrap();
//!
//! let path = TypeDescriptorBuilder::new("Path")
//!     .sequence_field("points", ValueKind::nested("Point"))
//!     .optional_field("label", PrimitiveKind::String { max_length: Some(64) })
//!     .build()
//!     .unwrap();
//!
//! let mut model = TypeModel::new();
//! model.insert(point).unwrap();
//! model.insert(path.clone()).unwrap();
//! assert!(model.check_inline(&path).is_ok());
//! ```

mod builder;
mod describe;
mod descriptor;
mod error;
mod kind;
mod model;
mod raw;
mod validate;
mod value;

pub use builder::{TypeDescriptorBuilder, UnionBuilder};
pub use describe::Describe;
pub use descriptor::{
    ordinal_order, FieldDescriptor, TypeDescriptor, TypeKey, TypeShape, VariantDescriptor,
};
pub use error::{DescriptorError, Result, ValueError};
pub use kind::{PrimitiveKind, TypeRef, ValueKind};
pub use model::TypeModel;
pub use raw::{describe, RawField, RawKind, RawShape, RawType, RawVariant};
pub use validate::{is_identifier, validate, MAX_VARIANTS};
pub use value::{take_field, take_optional, FromValue, ToValue, Value};
