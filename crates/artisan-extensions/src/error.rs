// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for codec generation and the registry.

use artisan_core::DescriptorError;
use artisan_format::FormatError;
use thiserror::Error;

/// A descriptor that validated but cannot become a codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Referenced type is neither registered nor describable.
    #[error("cannot resolve type '{type_name}' referenced by {referenced_by}")]
    Unresolved {
        type_name: String,
        referenced_by: String,
    },

    /// The registry backing a lazy reference no longer exists.
    #[error("registry dropped while resolving '{type_name}'")]
    RegistryDropped { type_name: String },
}

/// Any failure surfaced by the toolkit.
#[derive(Debug, Error)]
pub enum ArtisanError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl ArtisanError {
    /// Byte-level failure, if this is one.
    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            Self::Format(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArtisanError>;
