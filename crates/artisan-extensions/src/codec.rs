// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generated codecs.
//!
//! A [`Codec`] is an encode/decode pair compiled for exactly one
//! [`TypeDescriptor`]. It is immutable once built and shared through `Arc`.

use crate::error::Result;
use artisan_core::{TypeDescriptor, TypeKey, Value};
use artisan_format::{ByteSink, ByteSource, DecodeLimits, FormatError, SliceSource};
use std::fmt;
use std::sync::Arc;

pub(crate) type EncodeFn =
    Box<dyn Fn(&Value, &mut dyn ByteSink, &mut EncodeContext) -> Result<()> + Send + Sync>;
pub(crate) type DecodeFn =
    Box<dyn Fn(&mut dyn ByteSource, &mut DecodeContext) -> Result<Value> + Send + Sync>;

/// Nesting depth of structs, unions, sequences and arrays.
#[derive(Debug, Clone, Copy)]
struct Depth {
    max: usize,
    current: usize,
}

impl Depth {
    fn new(max: usize) -> Self {
        Self { max, current: 0 }
    }

    fn enter(&mut self) -> std::result::Result<(), FormatError> {
        if self.current >= self.max {
            return Err(FormatError::DepthExceeded(self.max));
        }
        self.current += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.current = self.current.saturating_sub(1);
    }
}

/// State carried through one top-level decode.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext {
    limits: DecodeLimits,
    depth: Depth,
}

impl DecodeContext {
    pub fn new(limits: DecodeLimits) -> Self {
        Self {
            limits,
            depth: Depth::new(limits.max_depth),
        }
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth.current
    }

    /// Enter a struct, union, sequence or array.
    pub fn enter(&mut self) -> std::result::Result<(), FormatError> {
        self.depth.enter()
    }

    pub fn leave(&mut self) {
        self.depth.leave();
    }
}

/// State carried through one top-level encode.
///
/// Encoding counts nesting exactly as decoding does, so a value nested deeper
/// than the decode limit is refused instead of producing bytes the same codec
/// would reject.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext {
    depth: Depth,
}

impl EncodeContext {
    pub fn new(limits: DecodeLimits) -> Self {
        Self {
            depth: Depth::new(limits.max_depth),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth.current
    }

    pub fn enter(&mut self) -> std::result::Result<(), FormatError> {
        self.depth.enter()
    }

    pub fn leave(&mut self) {
        self.depth.leave();
    }
}

/// Encoder/decoder specialized to one type descriptor.
pub struct Codec {
    descriptor: Arc<TypeDescriptor>,
    encode: EncodeFn,
    decode: DecodeFn,
    dependencies: Vec<TypeKey>,
    limits: DecodeLimits,
}

impl Codec {
    pub(crate) fn new(
        descriptor: Arc<TypeDescriptor>,
        encode: EncodeFn,
        decode: DecodeFn,
        dependencies: Vec<TypeKey>,
        limits: DecodeLimits,
    ) -> Self {
        Self {
            descriptor,
            encode,
            decode,
            dependencies,
            limits,
        }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn key(&self) -> TypeKey {
        self.descriptor.key()
    }

    /// Types embedded inline, whose codecs were captured at generation.
    pub fn dependencies(&self) -> &[TypeKey] {
        &self.dependencies
    }

    /// Limits applied by [`Codec::decode`].
    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Encode `value` into `sink`.
    ///
    /// Validation happens field by field; on error the sink may already hold
    /// a prefix of the encoding. Values nested deeper than this codec's
    /// `max_depth` fail with [`FormatError::DepthExceeded`].
    pub fn encode(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        self.encode_with_limits(value, sink, self.limits)
    }

    /// Encode against the depth budget of `limits`.
    pub fn encode_with_limits(
        &self,
        value: &Value,
        sink: &mut dyn ByteSink,
        limits: DecodeLimits,
    ) -> Result<()> {
        let mut ctx = EncodeContext::new(limits);
        (self.encode)(value, sink, &mut ctx)
    }

    pub fn encode_to_vec(&self, value: &Value) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(value, &mut buf)?;
        Ok(buf)
    }

    /// Decode one value from `source` with this codec's limits.
    pub fn decode(&self, source: &mut dyn ByteSource) -> Result<Value> {
        self.decode_with_limits(source, self.limits)
    }

    pub fn decode_with_limits(
        &self,
        source: &mut dyn ByteSource,
        limits: DecodeLimits,
    ) -> Result<Value> {
        let mut ctx = DecodeContext::new(limits);
        (self.decode)(source, &mut ctx)
    }

    /// Decode a buffer holding exactly one value.
    pub fn decode_from_slice(&self, bytes: &[u8]) -> Result<Value> {
        let mut source = SliceSource::new(bytes);
        let value = self.decode(&mut source)?;
        if !source.is_eof() {
            return Err(FormatError::TrailingBytes(source.remaining()).into());
        }
        Ok(value)
    }

    /// Encode as part of an enclosing value, sharing its depth budget.
    pub(crate) fn encode_nested(
        &self,
        value: &Value,
        sink: &mut dyn ByteSink,
        ctx: &mut EncodeContext,
    ) -> Result<()> {
        (self.encode)(value, sink, ctx)
    }

    /// Decode as part of an enclosing value, sharing its depth budget.
    pub(crate) fn decode_nested(
        &self,
        source: &mut dyn ByteSource,
        ctx: &mut DecodeContext,
    ) -> Result<Value> {
        (self.decode)(source, ctx)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("key", &self.descriptor.key())
            .field("dependencies", &self.dependencies)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
