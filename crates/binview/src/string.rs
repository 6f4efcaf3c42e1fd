// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! String descriptors and pluggable character-set codecs.
//!
//! - [`FixedString`]: fixed byte capacity, optional filler/terminator byte.
//! - [`VarString`]: `u32` length prefix followed by the encoded bytes
//!   (dynamic size, reported on every read and write).

use crate::buffer::{bytes, bytes_mut, read_array, Endian};
use crate::descriptor::{Size, TypeDescriptor};
use crate::error::{Error, Result};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Character-set codec used by string descriptors.
pub trait StringCodec: fmt::Debug + Send + Sync {
    fn encode(&self, text: &str) -> Vec<u8>;

    /// Decode bytes; invalid sequences are replaced, never rejected.
    fn decode(&self, bytes: &[u8]) -> String;
}

/// UTF-8 codec (default).
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8;

impl StringCodec for Utf8 {
    fn encode(&self, text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    fn decode(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// ISO-8859-1 codec. Characters above U+00FF encode as `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

impl StringCodec for Latin1 {
    fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }

    fn decode(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| char::from(b)).collect()
    }
}

fn expect_string<'a>(value: &'a Value, name: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| Error::TypeMismatch {
        expected: name.to_string(),
        got: value.kind_name().to_string(),
    })
}

/// Fixed-capacity string.
///
/// With a filler byte, reads stop at its first occurrence and writes pad the
/// unused tail with it. Without one, reads decode the whole capacity and
/// writes leave bytes past the encoded text as they were.
#[derive(Debug, Clone)]
pub struct FixedString {
    name: String,
    capacity: usize,
    filler: Option<u8>,
    codec: Arc<dyn StringCodec>,
}

impl FixedString {
    pub fn new(capacity: usize) -> Self {
        Self {
            name: format!("string[{}]", capacity),
            capacity,
            filler: None,
            codec: Arc::new(Utf8),
        }
    }

    /// Pad/terminator byte.
    pub fn filler(mut self, filler: u8) -> Self {
        self.filler = Some(filler);
        self
    }

    pub fn codec(mut self, codec: Arc<dyn StringCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn filler_byte(&self) -> Option<u8> {
        self.filler
    }
}

impl TypeDescriptor for FixedString {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> Size {
        Size::Fixed(self.capacity)
    }

    fn align(&self) -> usize {
        1
    }

    fn read(&self, buf: &[u8], offset: usize, _endian: Endian) -> Result<Value> {
        let raw = bytes(buf, offset, self.capacity)?;
        let end = self
            .filler
            .and_then(|filler| raw.iter().position(|&b| b == filler))
            .unwrap_or(raw.len());
        Ok(Value::String(self.codec.decode(&raw[..end])))
    }

    fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        _endian: Endian,
        value: &Value,
    ) -> Result<Option<usize>> {
        if value.is_null() {
            return Ok(None);
        }
        let encoded = self.codec.encode(expect_string(value, &self.name)?);
        let used = encoded.len().min(self.capacity);
        let dst = bytes_mut(buf, offset, self.capacity)?;
        dst[..used].copy_from_slice(&encoded[..used]);
        if let Some(filler) = self.filler {
            dst[used..].fill(filler);
        }
        Ok(None)
    }
}

/// Length-prefixed string of dynamic size.
#[derive(Debug, Clone)]
pub struct VarString {
    codec: Arc<dyn StringCodec>,
}

impl VarString {
    pub fn new() -> Self {
        Self {
            codec: Arc::new(Utf8),
        }
    }

    pub fn codec(mut self, codec: Arc<dyn StringCodec>) -> Self {
        self.codec = codec;
        self
    }

    fn prefix(buf: &[u8], offset: usize, endian: Endian) -> Result<usize> {
        let raw = read_array(buf, offset)?;
        let len = match endian {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        };
        Ok(len as usize)
    }
}

impl Default for VarString {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDescriptor for VarString {
    fn name(&self) -> &str {
        "varstring"
    }

    fn size(&self) -> Size {
        Size::Dynamic
    }

    fn align(&self) -> usize {
        4
    }

    fn read(&self, buf: &[u8], offset: usize, endian: Endian) -> Result<Value> {
        self.read_sized(buf, offset, endian).map(|(value, _)| value)
    }

    fn read_sized(
        &self,
        buf: &[u8],
        offset: usize,
        endian: Endian,
    ) -> Result<(Value, Option<usize>)> {
        let len = Self::prefix(buf, offset, endian)?;
        let raw = bytes(buf, offset + 4, len)?;
        Ok((Value::String(self.codec.decode(raw)), Some(4 + len)))
    }

    fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        endian: Endian,
        value: &Value,
    ) -> Result<Option<usize>> {
        if value.is_null() {
            // Untouched, but the walk still needs the current extent.
            return Ok(Some(4 + Self::prefix(buf, offset, endian)?));
        }
        let encoded = self.codec.encode(expect_string(value, "varstring")?);
        let len = u32::try_from(encoded.len()).map_err(|_| Error::ValueOutOfRange {
            kind: "varstring".to_string(),
            value: encoded.len().to_string(),
        })?;
        let prefix = match endian {
            Endian::Little => len.to_le_bytes(),
            Endian::Big => len.to_be_bytes(),
        };
        let dst = bytes_mut(buf, offset, 4 + encoded.len())?;
        dst[..4].copy_from_slice(&prefix);
        dst[4..].copy_from_slice(&encoded);
        Ok(Some(4 + encoded.len()))
    }
}
