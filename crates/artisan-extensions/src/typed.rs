// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed view over a generated codec.

use crate::codec::Codec;
use crate::error::Result;
use artisan_core::{FromValue, ToValue};
use artisan_format::{ByteSink, ByteSource, FormatError};
use std::marker::PhantomData;
use std::sync::Arc;

/// Encodes `&T` and decodes `T` through the codec of `T`'s descriptor.
pub struct TypedCodec<T> {
    codec: Arc<Codec>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedCodec<T> {
    fn clone(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            _marker: PhantomData,
        }
    }
}

impl<T: ToValue + FromValue> TypedCodec<T> {
    pub fn new(codec: Arc<Codec>) -> Self {
        Self {
            codec,
            _marker: PhantomData,
        }
    }

    pub fn codec(&self) -> &Arc<Codec> {
        &self.codec
    }

    pub fn encode(&self, value: &T) -> Result<Vec<u8>> {
        self.codec.encode_to_vec(&value.to_value())
    }

    pub fn encode_into(&self, value: &T, sink: &mut dyn ByteSink) -> Result<()> {
        self.codec.encode(&value.to_value(), sink)
    }

    /// Decode a buffer holding exactly one `T`.
    pub fn decode(&self, bytes: &[u8]) -> Result<T> {
        let value = self.codec.decode_from_slice(bytes)?;
        Ok(T::from_value(&value).map_err(FormatError::from)?)
    }

    pub fn decode_from(&self, source: &mut dyn ByteSource) -> Result<T> {
        let value = self.codec.decode(source)?;
        Ok(T::from_value(&value).map_err(FormatError::from)?)
    }
}

impl<T> std::fmt::Debug for TypedCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCodec")
            .field("type", &std::any::type_name::<T>())
            .field("codec", &self.codec)
            .finish()
    }
}
