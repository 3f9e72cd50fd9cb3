// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Indirect references resolved on first use.
//!
//! The handle keeps only a weak pointer to the resolved codec. A recursive
//! type's codec therefore never owns itself, and the registry's strong
//! reference decides its lifetime.

use crate::codec::Codec;
use crate::error::{GenerationError, Result};
use crate::generator::CodecResolver;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

pub(crate) struct LazyCodec {
    name: String,
    referenced_by: String,
    resolver: Weak<dyn CodecResolver>,
    /// Resolver epoch of the cached codec, and the codec itself.
    cache: RwLock<(u64, Weak<Codec>)>,
}

impl LazyCodec {
    pub(crate) fn new(
        name: impl Into<String>,
        referenced_by: impl Into<String>,
        resolver: Weak<dyn CodecResolver>,
    ) -> Self {
        Self {
            name: name.into(),
            referenced_by: referenced_by.into(),
            resolver,
            cache: RwLock::new((0, Weak::new())),
        }
    }

    pub(crate) fn get(&self) -> Result<Arc<Codec>> {
        let resolver = self
            .resolver
            .upgrade()
            .ok_or_else(|| GenerationError::RegistryDropped {
                type_name: self.name.clone(),
            })?;
        let epoch = resolver.epoch();

        {
            let cache = self.cache.read();
            if cache.0 == epoch {
                if let Some(codec) = cache.1.upgrade() {
                    return Ok(codec);
                }
            }
        }

        let codec = resolver.resolve(&self.name, &self.referenced_by)?;
        log::trace!(
            "[LazyCodec::get] {} -> {} (epoch {})",
            self.referenced_by,
            codec.key(),
            epoch
        );
        *self.cache.write() = (epoch, Arc::downgrade(&codec));
        Ok(codec)
    }
}
