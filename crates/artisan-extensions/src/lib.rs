// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Artisan Codec Generation
//!
//! Turns type descriptors into specialized encoder/decoder pairs and caches
//! them per descriptor identity.
//!
//! # Features
//!
//! - **CodecGenerator**: compiles a descriptor into a closure tree, once
//! - **CodecRegistry**: explicit, thread-safe cache with exactly-once generation
//! - **TypedCodec**: encode `&T` / decode `T` for `#[derive(Artisan)]` types
//! - **Lazy references**: `ref T` fields resolve on first use, enabling recursion
//!
//! # Example
//!
//! ```rust
//! use artisan_extensions::{Artisan, CodecRegistry};
//!
//! #[derive(Debug, PartialEq, Artisan)]
//! struct Record {
//!     id: i32,
//!     name: String,
//! }
//!
//! let registry = CodecRegistry::new();
//! let codec = registry.typed::<Record>().unwrap();
//!
//! let record = Record { id: 7, name: "ok".into() };
//! let bytes = codec.encode(&record).unwrap();
//! assert_eq!(bytes, [0, 0, 0, 7, 0, 0, 0, 2, b'o', b'k']);
//! assert_eq!(codec.decode(&bytes).unwrap(), record);
//! ```

extern crate self as artisan_extensions;

mod codec;
mod error;
mod generator;
mod lazy;
mod registry;
mod typed;

pub use codec::{Codec, DecodeContext, EncodeContext};
pub use error::{ArtisanError, GenerationError, Result};
pub use generator::{CodecGenerator, CodecResolver};
pub use registry::{CodecRegistry, RegistryConfig, RegistryStats};
pub use typed::TypedCodec;

pub use artisan_derive::Artisan;

pub use artisan_core::{
    Describe, DescriptorError, FieldDescriptor, FromValue, PrimitiveKind, ToValue,
    TypeDescriptor, TypeDescriptorBuilder, TypeKey, TypeModel, UnionBuilder, Value, ValueKind,
    VariantDescriptor,
};
pub use artisan_format::{
    ByteSink, ByteSource, DecodeLimits, FormatError, IoSink, IoSource, SchemaError, SliceSource,
};

/// Paths used by `#[derive(Artisan)]` expansions.
#[doc(hidden)]
pub mod __private {
    pub use artisan_core;
}
