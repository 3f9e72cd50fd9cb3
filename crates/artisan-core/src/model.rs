// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Catalog of described types.
//!
//! `TypeModel` maps type names to validated descriptors and resolves the
//! references between them. Inline (`Nested`) references must name a type
//! that is already described, or one described in the same batch; indirect
//! references may point anywhere and are only resolved when a codec first
//! needs them.

use crate::describe::Describe;
use crate::descriptor::TypeDescriptor;
use crate::error::{DescriptorError, Result};
use crate::raw::{self, RawType};
use crate::validate::validate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct TypeModel {
    types: HashMap<Arc<str>, Arc<TypeDescriptor>>,
    order: Vec<Arc<str>>,
    /// Types currently being described through [`Describe`].
    pending: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    Active,
    Done,
}

impl TypeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    /// Register a descriptor.
    ///
    /// Registering the same structure twice is a no-op returning the existing
    /// descriptor; a different structure under a taken name is a
    /// [`DescriptorError::Conflict`]. References are not resolved here.
    pub fn insert(&mut self, desc: impl Into<Arc<TypeDescriptor>>) -> Result<Arc<TypeDescriptor>> {
        let desc = desc.into();
        validate(&desc)?;

        if let Some(existing) = self.types.get(desc.name()) {
            if existing.fingerprint() == desc.fingerprint() {
                return Ok(Arc::clone(existing));
            }
            return Err(DescriptorError::Conflict {
                name: desc.name().to_string(),
            });
        }

        let name: Arc<str> = Arc::from(desc.name());
        self.order.push(Arc::clone(&name));
        self.types.insert(name, Arc::clone(&desc));
        Ok(desc)
    }

    /// Register a descriptor, displacing a structurally different one.
    ///
    /// Returns the displaced descriptor, or `None` if the name was free or
    /// already held the same structure.
    pub fn replace(
        &mut self,
        desc: impl Into<Arc<TypeDescriptor>>,
    ) -> Result<Option<Arc<TypeDescriptor>>> {
        let desc = desc.into();
        validate(&desc)?;

        match self.types.get(desc.name()) {
            Some(existing) if existing.fingerprint() == desc.fingerprint() => Ok(None),
            Some(_) => {
                log::debug!(
                    "[TypeModel::replace] {} now {:016x}",
                    desc.name(),
                    desc.fingerprint()
                );
                let name: Arc<str> = Arc::from(desc.name());
                Ok(self.types.insert(name, desc))
            }
            None => {
                let name: Arc<str> = Arc::from(desc.name());
                self.order.push(Arc::clone(&name));
                self.types.insert(name, desc);
                Ok(None)
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<TypeDescriptor>> {
        let removed = self.types.remove(name)?;
        self.order.retain(|n| n.as_ref() != name);
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.types.clear();
        self.order.clear();
        self.pending.clear();
    }

    /// Describe one raw type against this catalog.
    ///
    /// Inline references must already be described.
    pub fn describe(&mut self, raw: &RawType) -> Result<Arc<TypeDescriptor>> {
        let desc = raw::describe(raw)?;
        for (reference, inline) in desc.references() {
            if inline && !self.contains(reference.name()) {
                return Err(DescriptorError::UnknownType {
                    name: reference.name().to_string(),
                    referenced_by: desc.name().to_string(),
                });
            }
        }
        self.insert(desc)
    }

    /// Describe a batch of raw types that may reference each other.
    ///
    /// Inline references may point forward within the batch; the batch is
    /// registered in dependency order. A cycle of inline references is a
    /// [`DescriptorError::Cycle`]. Nothing is registered on failure.
    /// Results come back in input order.
    pub fn describe_all(&mut self, raws: &[RawType]) -> Result<Vec<Arc<TypeDescriptor>>> {
        let batch: Vec<TypeDescriptor> = raws.iter().map(raw::describe).collect::<Result<_>>()?;

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(batch.len());
        for (i, desc) in batch.iter().enumerate() {
            if let Some(&prev) = index.get(desc.name()) {
                if batch[prev].fingerprint() != desc.fingerprint() {
                    return Err(DescriptorError::Conflict {
                        name: desc.name().to_string(),
                    });
                }
                continue;
            }
            if let Some(existing) = self.types.get(desc.name()) {
                if existing.fingerprint() != desc.fingerprint() {
                    return Err(DescriptorError::Conflict {
                        name: desc.name().to_string(),
                    });
                }
            }
            index.insert(desc.name(), i);
        }

        let mut marks = vec![Mark::New; batch.len()];
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(batch.len());
        for (i, desc) in batch.iter().enumerate() {
            if index.get(desc.name()) == Some(&i) {
                self.visit(i, &batch, &index, &mut marks, &mut path, &mut order)?;
            }
        }

        let mut registered: HashMap<&str, Arc<TypeDescriptor>> = HashMap::new();
        for i in order {
            registered.insert(batch[i].name(), self.insert(batch[i].clone())?);
        }

        log::debug!(
            "[TypeModel::describe_all] described {} types ({} total)",
            registered.len(),
            self.len()
        );

        Ok(batch
            .iter()
            .filter_map(|desc| registered.get(desc.name()).cloned())
            .collect())
    }

    fn visit(
        &self,
        i: usize,
        batch: &[TypeDescriptor],
        index: &HashMap<&str, usize>,
        marks: &mut [Mark],
        path: &mut Vec<String>,
        order: &mut Vec<usize>,
    ) -> Result<()> {
        let name = batch[i].name();
        match marks[i] {
            Mark::Done => return Ok(()),
            Mark::Active => return Err(cycle_error(path, name)),
            Mark::New => {}
        }

        marks[i] = Mark::Active;
        path.push(name.to_string());
        for (reference, inline) in batch[i].references() {
            if !inline {
                continue;
            }
            if let Some(&j) = index.get(reference.name()) {
                self.visit(j, batch, index, marks, path, order)?;
            } else if !self.contains(reference.name()) {
                return Err(DescriptorError::UnknownType {
                    name: reference.name().to_string(),
                    referenced_by: name.to_string(),
                });
            }
        }
        path.pop();
        marks[i] = Mark::Done;
        order.push(i);
        Ok(())
    }

    /// Check that every inline reference reachable from `desc` is described
    /// and that inline composition is acyclic.
    pub fn check_inline(&self, desc: &TypeDescriptor) -> Result<()> {
        let mut path = vec![desc.name().to_string()];
        let mut done = HashSet::new();
        for (reference, inline) in desc.references() {
            if inline {
                self.walk_inline(reference.name(), desc.name(), &mut path, &mut done)?;
            }
        }
        Ok(())
    }

    fn walk_inline(
        &self,
        name: &str,
        referenced_by: &str,
        path: &mut Vec<String>,
        done: &mut HashSet<String>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if path.iter().any(|p| p == name) {
            return Err(cycle_error(path, name));
        }
        let desc = self.get(name).ok_or_else(|| DescriptorError::UnknownType {
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })?;

        path.push(name.to_string());
        for (reference, inline) in desc.references() {
            if inline {
                self.walk_inline(reference.name(), desc.name(), path, done)?;
            }
        }
        path.pop();
        done.insert(name.to_string());
        Ok(())
    }

    /// Describe a Rust type and everything it references.
    pub fn describe_type<T: Describe + ?Sized>(&mut self) -> Result<Arc<TypeDescriptor>> {
        T::describe_into(self)
    }

    /// Describe the target of an indirect reference.
    ///
    /// A type that is still being described is left to its outer call, which
    /// is how `Box<Self>` and mutually recursive types terminate.
    pub fn describe_deferred<T: Describe + ?Sized>(&mut self) -> Result<()> {
        if self.is_pending(T::type_name()) || self.contains(T::type_name()) {
            return Ok(());
        }
        T::describe_into(self).map(|_| ())
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.iter().any(|p| p == name)
    }

    /// Mark a type as being described; re-entering it inline is a cycle.
    pub(crate) fn enter(&mut self, name: &str) -> Result<()> {
        if self.is_pending(name) {
            return Err(cycle_error(&self.pending, name));
        }
        self.pending.push(name.to_string());
        Ok(())
    }

    pub(crate) fn leave(&mut self, name: &str) {
        if let Some(pos) = self.pending.iter().rposition(|p| p == name) {
            self.pending.truncate(pos);
        }
    }
}

fn cycle_error(path: &[String], name: &str) -> DescriptorError {
    let start = path.iter().position(|p| p == name).unwrap_or(0);
    let mut cycle: Vec<String> = path[start..].to_vec();
    cycle.push(name.to_string());
    DescriptorError::Cycle { path: cycle }
}
