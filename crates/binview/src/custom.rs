// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Closure-backed descriptors for user-defined leaf types.

use crate::buffer::Endian;
use crate::descriptor::{Size, TypeDescriptor};
use crate::error::{Error, Result};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

type ReadFn = Arc<dyn Fn(&[u8], usize, Endian) -> Result<(Value, Option<usize>)> + Send + Sync>;
type WriteFn = Arc<dyn Fn(&mut [u8], usize, Endian, &Value) -> Result<Option<usize>> + Send + Sync>;

/// Leaf descriptor whose codec is supplied as closures.
///
/// Reading or writing before the matching closure is configured fails with
/// [`Error::Definition`].
///
/// # Example
///
/// ```rust
/// use binview::{CustomDescriptor, Endian, Size, TypeDescriptor, Value};
///
/// // 16.16 fixed-point number stored in a u32
/// let fixed = CustomDescriptor::new("fixed16_16", Size::Fixed(4), 4)
///     .reader(|buf, offset, _endian| {
///         let raw = u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap());
///         Ok((Value::F64(f64::from(raw) / 65536.0), Some(4)))
///     });
///
/// let buf = 0x0001_8000u32.to_le_bytes();
/// assert_eq!(fixed.read(&buf, 0, Endian::Little).unwrap(), Value::F64(1.5));
/// ```
#[derive(Clone)]
pub struct CustomDescriptor {
    name: String,
    size: Size,
    align: usize,
    endian: Option<Endian>,
    reader: Option<ReadFn>,
    writer: Option<WriteFn>,
}

impl CustomDescriptor {
    pub fn new(name: impl Into<String>, size: Size, align: usize) -> Self {
        Self {
            name: name.into(),
            size,
            align: align.max(1),
            endian: None,
            reader: None,
            writer: None,
        }
    }

    /// Decoder returning the value and, for dynamic sizes, the bytes used.
    pub fn reader<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8], usize, Endian) -> Result<(Value, Option<usize>)> + Send + Sync + 'static,
    {
        self.reader = Some(Arc::new(f));
        self
    }

    /// Encoder returning the bytes used for dynamic sizes.
    pub fn writer<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut [u8], usize, Endian, &Value) -> Result<Option<usize>> + Send + Sync + 'static,
    {
        self.writer = Some(Arc::new(f));
        self
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = Some(endian);
        self
    }

    fn not_configured(&self, op: &str) -> Error {
        Error::Definition(format!("'{}' has no {} configured", self.name, op))
    }
}

impl fmt::Debug for CustomDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomDescriptor")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("align", &self.align)
            .field("reader", &self.reader.is_some())
            .field("writer", &self.writer.is_some())
            .finish()
    }
}

impl TypeDescriptor for CustomDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> Size {
        self.size
    }

    fn align(&self) -> usize {
        self.align
    }

    fn endian(&self) -> Option<Endian> {
        self.endian
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
        let reader = self.reader.as_ref().ok_or_else(|| self.not_configured("reader"))?;
        reader(buf, offset, self.endian.unwrap_or(endian))
    }

    fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        endian: Endian,
        value: &Value,
    ) -> Result<Option<usize>> {
        let writer = self.writer.as_ref().ok_or_else(|| self.not_configured("writer"))?;
        writer(buf, offset, self.endian.unwrap_or(endian), value)
    }
}
