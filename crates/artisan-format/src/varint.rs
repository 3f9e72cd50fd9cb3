// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LEB128 varints for the explicitly variable-width kinds.

use crate::config::MAX_VARINT_LEN;
use crate::error::{FormatError, Result};
use crate::io::{ByteSink, ByteSource};

/// Encoded length of `value` in bytes.
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Write an unsigned LEB128 varint.
pub fn write_varu64(sink: &mut dyn ByteSink, mut value: u64) -> Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut len = 0;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf[len] = byte;
            len += 1;
            break;
        }
        buf[len] = byte | 0x80;
        len += 1;
    }
    sink.write_bytes(&buf[..len])
}

/// Read an unsigned LEB128 varint.
///
/// Fails with [`FormatError::VarintOverflow`] on encodings longer than ten
/// bytes or whose tenth byte carries bits above 64.
pub fn read_varu64(source: &mut dyn ByteSource) -> Result<u64> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        let byte = source.read_u8()?;
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(FormatError::VarintOverflow);
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(FormatError::VarintOverflow)
}

/// Write a zig-zag LEB128 varint.
pub fn write_vari64(sink: &mut dyn ByteSink, value: i64) -> Result<()> {
    write_varu64(sink, zigzag_encode(value))
}

/// Read a zig-zag LEB128 varint.
pub fn read_vari64(source: &mut dyn ByteSource) -> Result<i64> {
    read_varu64(source).map(zigzag_decode)
}
