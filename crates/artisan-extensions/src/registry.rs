// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec registry.
//!
//! Caches generated codecs keyed by [`TypeKey`] (name plus structural
//! fingerprint), so generation cost is paid once per identity. Each identity
//! owns a slot: a once-set codec cell read without locking, plus a mutex held
//! only while generating. Concurrent first requests for the same type wait on
//! that mutex and observe the same `Arc<Codec>`; lookups of installed codecs
//! and of other types proceed without waiting.
//!
//! Registries are explicit objects. Cloning a [`CodecRegistry`] shares the
//! same cache.

use crate::codec::Codec;
use crate::error::{ArtisanError, GenerationError, Result};
use crate::generator::{CodecGenerator, CodecResolver};
use crate::typed::TypedCodec;
use artisan_core::{
    validate, Describe, DescriptorError, FromValue, ToValue, TypeDescriptor, TypeKey, TypeModel,
};
use artisan_format::{DecodeLimits, SchemaError};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Instant;

/// Runtime configuration of a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Default decode limits of generated codecs.
    pub limits: DecodeLimits,
}

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub hits: u64,
    pub misses: u64,
    /// Successful generations.
    pub generations: u64,
    /// Failed generations.
    pub failures: u64,
    /// Duration of the most recent successful generation.
    pub last_generation_ns: u64,
}

/// Cache entry of one identity.
#[derive(Default)]
struct Slot {
    codec: OnceLock<Arc<Codec>>,
    generating: Mutex<()>,
}

impl Slot {
    fn inlines(&self, key: &TypeKey) -> bool {
        self.codec
            .get()
            .is_some_and(|codec| codec.dependencies().contains(key))
    }
}

struct RegistryInner {
    this: Weak<RegistryInner>,
    model: RwLock<TypeModel>,
    codecs: DashMap<TypeKey, Arc<Slot>>,
    epoch: AtomicU64,
    stats: RwLock<RegistryStats>,
    config: RegistryConfig,
}

#[derive(Clone)]
pub struct CodecRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let inner = Arc::new_cyclic(|this| RegistryInner {
            this: Weak::clone(this),
            model: RwLock::new(TypeModel::new()),
            codecs: DashMap::new(),
            epoch: AtomicU64::new(0),
            stats: RwLock::new(RegistryStats::default()),
            config,
        });
        Self { inner }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Codec for `descriptor`, generated on first request.
    ///
    /// The descriptor is validated and registered under its name. If that
    /// name held a structurally different descriptor, the old one is replaced
    /// and its codecs (plus every codec that inlined them) are invalidated.
    pub fn get_or_create(&self, descriptor: &TypeDescriptor) -> Result<Arc<Codec>> {
        validate(descriptor)?;

        let (descriptor, displaced) = {
            let mut model = self.inner.model.write();
            match model.get(descriptor.name()) {
                Some(existing) if existing.fingerprint() == descriptor.fingerprint() => {
                    (existing, None)
                }
                _ => {
                    model.check_inline(descriptor).map_err(unresolved_from)?;
                    let descriptor = Arc::new(descriptor.clone());
                    let displaced = model.replace(Arc::clone(&descriptor))?;
                    (descriptor, displaced)
                }
            }
        };

        if let Some(old) = displaced {
            log::warn!(
                "[CodecRegistry::get_or_create] {} replaced by {}",
                old.key(),
                descriptor.key()
            );
            self.invalidate(&old);
        }

        self.inner.codec_for(&descriptor)
    }

    /// Codec for the type registered under `name`.
    pub fn get_or_create_by_name(&self, name: &str) -> Result<Arc<Codec>> {
        self.inner.resolve(name, "lookup")
    }

    /// Cached codec for `descriptor`, without generating.
    ///
    /// Returns `None` until a generation for it has completed.
    pub fn get(&self, descriptor: &TypeDescriptor) -> Option<Arc<Codec>> {
        self.inner
            .codecs
            .get(&descriptor.key())
            .and_then(|slot| slot.codec.get().cloned())
    }

    /// Register a descriptor without generating its codec.
    ///
    /// A different structure under a taken name is a conflict; use
    /// [`CodecRegistry::get_or_create`] to replace it.
    pub fn register(&self, descriptor: TypeDescriptor) -> Result<Arc<TypeDescriptor>> {
        Ok(self.inner.model.write().insert(descriptor)?)
    }

    /// Describe a Rust type (and everything it references) into the registry.
    pub fn describe<T: Describe + ?Sized>(&self) -> Result<Arc<TypeDescriptor>> {
        Ok(self.inner.model.write().describe_type::<T>()?)
    }

    /// Load every type of a schema text.
    pub fn load_schema(
        &self,
        text: &str,
    ) -> std::result::Result<Vec<Arc<TypeDescriptor>>, SchemaError> {
        artisan_format::load_schema(&mut self.inner.model.write(), text)
    }

    /// Descriptor registered under `name`.
    pub fn descriptor(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.inner.model.read().get(name)
    }

    /// Typed view over the codec of a described Rust type.
    pub fn typed<T>(&self) -> Result<TypedCodec<T>>
    where
        T: Describe + ToValue + FromValue,
    {
        let descriptor = self.describe::<T>()?;
        let codec = self.inner.codec_for(&descriptor)?;
        Ok(TypedCodec::new(codec))
    }

    /// Drop the codec of `descriptor` and every cached codec that inlined it.
    ///
    /// Returns the number of codecs dropped. Lazy references re-resolve on
    /// their next use.
    pub fn invalidate(&self, descriptor: &TypeDescriptor) -> usize {
        let mut stale = vec![descriptor.key()];
        let mut dropped = 0;

        while let Some(key) = stale.pop() {
            if self.inner.codecs.remove(&key).is_some() {
                dropped += 1;
            }

            let dependents: Vec<TypeKey> = self
                .inner
                .codecs
                .iter()
                .filter(|entry| entry.value().inlines(&key))
                .map(|entry| entry.key().clone())
                .collect();
            for dependent in dependents {
                if !stale.contains(&dependent) {
                    stale.push(dependent);
                }
            }
        }

        let epoch = self.inner.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!(
            "[CodecRegistry::invalidate] {} dropped {} codec(s), epoch {}",
            descriptor.key(),
            dropped,
            epoch
        );
        dropped
    }

    /// Drop every codec and descriptor.
    pub fn reset(&self) {
        self.inner.codecs.clear();
        self.inner.model.write().clear();
        *self.inner.stats.write() = RegistryStats::default();
        let epoch = self.inner.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!("[CodecRegistry::reset] cleared, epoch {}", epoch);
    }

    /// Number of cached codecs.
    pub fn len(&self) -> usize {
        self.inner
            .codecs
            .iter()
            .filter(|entry| entry.value().codec.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        *self.inner.stats.read()
    }
}

impl RegistryInner {
    fn codec_for(&self, descriptor: &Arc<TypeDescriptor>) -> Result<Arc<Codec>> {
        let key = descriptor.key();
        loop {
            let existing = self.codecs.get(&key).map(|entry| Arc::clone(entry.value()));
            let slot = match existing {
                Some(slot) => slot,
                None => Arc::clone(&*self.codecs.entry(key.clone()).or_default()),
            };
            if let Some(codec) = slot.codec.get() {
                self.record_hit();
                log::trace!("[CodecRegistry::codec_for] hit {}", key);
                return Ok(Arc::clone(codec));
            }

            let generating = slot.generating.lock();
            if let Some(codec) = slot.codec.get() {
                self.record_hit();
                log::trace!("[CodecRegistry::codec_for] hit {} after wait", key);
                return Ok(Arc::clone(codec));
            }

            // A failed generation or an invalidation may have retired this
            // slot while we waited on it.
            let current = self
                .codecs
                .get(&key)
                .is_some_and(|entry| Arc::ptr_eq(entry.value(), &slot));
            if !current {
                continue;
            }

            let start = Instant::now();
            match self.generate(descriptor) {
                Ok(codec) => {
                    let codec = Arc::clone(slot.codec.get_or_init(|| Arc::new(codec)));
                    drop(generating);
                    self.record_generation(start);
                    return Ok(codec);
                }
                Err(err) => {
                    drop(generating);
                    self.codecs.remove_if(&key, |_, s| Arc::ptr_eq(s, &slot));
                    self.record_failure();
                    log::debug!("[CodecRegistry::codec_for] {} failed: {}", key, err);
                    return Err(err);
                }
            }
        }
    }

    fn generate(&self, descriptor: &Arc<TypeDescriptor>) -> Result<Codec> {
        self.model
            .read()
            .check_inline(descriptor)
            .map_err(unresolved_from)?;
        let resolver: Weak<dyn CodecResolver> = self.this.clone();
        CodecGenerator::new(resolver)
            .with_limits(self.config.limits)
            .generate(descriptor)
    }

    fn record_hit(&self) {
        let mut stats = self.stats.write();
        stats.hits = stats.hits.saturating_add(1);
    }

    fn record_generation(&self, start: Instant) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
        stats.generations = stats.generations.saturating_add(1);
        stats.last_generation_ns = start.elapsed().as_nanos() as u64;
    }

    fn record_failure(&self) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
        stats.failures = stats.failures.saturating_add(1);
    }
}

impl CodecResolver for RegistryInner {
    fn resolve(&self, name: &str, referenced_by: &str) -> Result<Arc<Codec>> {
        let descriptor = self.model.read().get(name).ok_or_else(|| {
            ArtisanError::from(GenerationError::Unresolved {
                type_name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })
        })?;
        self.codec_for(&descriptor)
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

/// Missing inline dependencies are a generation failure; other descriptor
/// errors pass through.
fn unresolved_from(err: DescriptorError) -> ArtisanError {
    match err {
        DescriptorError::UnknownType {
            name,
            referenced_by,
        } => GenerationError::Unresolved {
            type_name: name,
            referenced_by,
        }
        .into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artisan_core::{PrimitiveKind, TypeDescriptorBuilder, Value};

    fn point() -> TypeDescriptor {
        TypeDescriptorBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .field("y", PrimitiveKind::I32)
            .build()
            .expect("valid")
    }

    fn path() -> TypeDescriptor {
        TypeDescriptorBuilder::new("Path")
            .sequence_field("points", artisan_core::ValueKind::nested("Point"))
            .build()
            .expect("valid")
    }

    #[test]
    fn test_generates_once() {
        let registry = CodecRegistry::new();
        let first = registry.get_or_create(&point()).expect("codec");
        let second = registry.get_or_create(&point()).expect("codec");
        assert!(Arc::ptr_eq(&first, &second));

        let stats = registry.stats();
        assert_eq!(stats.generations, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_peeks_without_generating() {
        let registry = CodecRegistry::new();
        assert!(registry.get(&point()).is_none());
        let codec = registry.get_or_create(&point()).expect("codec");
        let peeked = registry.get(&point()).expect("cached");
        assert!(Arc::ptr_eq(&codec, &peeked));
    }

    #[test]
    fn test_unresolved_leaves_no_entry() {
        let registry = CodecRegistry::new();
        let err = registry.get_or_create(&path()).unwrap_err();
        assert!(matches!(
            err,
            ArtisanError::Generation(GenerationError::Unresolved { ref type_name, .. })
                if type_name == "Point"
        ));
        assert!(registry.is_empty());
        assert!(registry.descriptor("Path").is_none());
    }

    #[test]
    fn test_invalidate_drops_dependents() {
        let registry = CodecRegistry::new();
        registry.get_or_create(&point()).expect("point");
        let old_path = registry.get_or_create(&path()).expect("path");
        assert_eq!(old_path.dependencies(), &[point().key()]);

        assert_eq!(registry.invalidate(&point()), 2);
        assert!(registry.is_empty());

        let new_path = registry.get_or_create(&path()).expect("path");
        assert!(!Arc::ptr_eq(&old_path, &new_path));
        assert_eq!(registry.stats().generations, 4);
    }

    #[test]
    fn test_replacing_structure_invalidates() {
        let registry = CodecRegistry::new();
        registry.get_or_create(&point()).expect("point");
        registry.get_or_create(&path()).expect("path");

        let point3 = TypeDescriptorBuilder::new("Point")
            .field("x", PrimitiveKind::I32)
            .field("y", PrimitiveKind::I32)
            .field("z", PrimitiveKind::I32)
            .build()
            .expect("valid");
        registry.get_or_create(&point3).expect("point3");
        assert!(registry.get(&point()).is_none());
        assert!(registry.get(&path()).is_none());

        let path_codec = registry.get_or_create_by_name("Path").expect("path");
        let value = Value::structure([(
            "points",
            Value::Sequence(vec![Value::structure([
                ("x", Value::I32(1)),
                ("y", Value::I32(2)),
                ("z", Value::I32(3)),
            ])]),
        )]);
        let bytes = path_codec.encode_to_vec(&value).expect("encode");
        assert_eq!(bytes.len(), 4 + 12);
    }

    #[test]
    fn test_register_conflict() {
        let registry = CodecRegistry::new();
        registry.register(point()).expect("register");
        let other = TypeDescriptorBuilder::new("Point")
            .field("x", PrimitiveKind::I64)
            .build()
            .expect("valid");
        assert!(matches!(
            registry.register(other),
            Err(ArtisanError::Descriptor(DescriptorError::Conflict { .. }))
        ));
    }

    #[test]
    fn test_reset() {
        let registry = CodecRegistry::new();
        registry.get_or_create(&point()).expect("point");
        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.descriptor("Point").is_none());
        assert_eq!(registry.stats(), RegistryStats::default());
    }

    #[test]
    fn test_by_name_unknown() {
        let registry = CodecRegistry::new();
        assert!(matches!(
            registry.get_or_create_by_name("Nope"),
            Err(ArtisanError::Generation(GenerationError::Unresolved { .. }))
        ));
        assert_eq!(registry.stats().failures, 0);
    }
}
