// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and decode limits - Single Source of Truth
//!
//! Every framing width and marker byte of the Artisan wire format is defined
//! here. **Never hardcode them elsewhere.**
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: wire constants (prefix widths, tag bytes)
//! - **Level 2 (Per codec)**: [`DecodeLimits`] bounding untrusted input

// =======================================================================
// Framing
// =======================================================================

/// Width of the big-endian `u32` length prefix of strings, bytes and sequences.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Presence byte of an absent optional field.
pub const TAG_ABSENT: u8 = 0x00;

/// Presence byte of a present optional field.
pub const TAG_PRESENT: u8 = 0x01;

/// Encoded `false`.
pub const BOOL_FALSE: u8 = 0x00;

/// Encoded `true`.
pub const BOOL_TRUE: u8 = 0x01;

/// Longest LEB128 encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

// =======================================================================
// Decode limits
// =======================================================================

/// Default nesting depth accepted by a decoder.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default largest length prefix accepted by a decoder (16 MiB).
pub const DEFAULT_MAX_LENGTH: usize = 16 * 1024 * 1024;

/// Upper bound on elements reserved ahead of decoding a sequence.
///
/// A length prefix is only a claim; capacity beyond this grows as elements
/// actually decode.
pub const PREALLOCATION_LIMIT: usize = 4096;

/// Bounds applied while decoding untrusted bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Deepest nesting of structs, unions and sequences.
    pub max_depth: usize,
    /// Largest length prefix (bytes for strings, elements for sequences).
    pub max_length: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl DecodeLimits {
    /// No limits beyond what the wire format itself can express.
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_length: u32::MAX as usize,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
}
