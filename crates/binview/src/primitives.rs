// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-width numeric descriptors.

use crate::buffer::{bytes_mut, read_array, Endian};
use crate::descriptor::{DescriptorRef, Size, TypeDescriptor};
use crate::error::{Error, Result};
use crate::value::Value;
use std::str::FromStr;
use std::sync::Arc;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveKind {
    /// Get the size in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Natural alignment (same as the size for every primitive).
    pub const fn alignment(self) -> usize {
        self.size()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Shared descriptor using the caller's byte order.
    pub fn descriptor(self) -> DescriptorRef {
        Arc::new(Primitive::new(self))
    }
}

impl FromStr for PrimitiveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Self::Bool,
            "u8" | "uint8" => Self::U8,
            "u16" | "uint16" => Self::U16,
            "u32" | "uint32" => Self::U32,
            "u64" | "uint64" => Self::U64,
            "i8" | "int8" => Self::I8,
            "i16" | "int16" => Self::I16,
            "i32" | "int32" => Self::I32,
            "i64" | "int64" => Self::I64,
            "f32" | "float32" => Self::F32,
            "f64" | "float64" => Self::F64,
            other => {
                return Err(Error::Definition(format!(
                    "Unknown primitive type: {}",
                    other
                )))
            }
        };
        Ok(kind)
    }
}

/// Descriptor for a single primitive, optionally pinned to one byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    kind: PrimitiveKind,
    endian: Option<Endian>,
}

macro_rules! decode {
    ($ty:ty, $buf:expr, $offset:expr, $endian:expr) => {{
        let raw = read_array($buf, $offset)?;
        match $endian {
            Endian::Little => <$ty>::from_le_bytes(raw),
            Endian::Big => <$ty>::from_be_bytes(raw),
        }
    }};
}

macro_rules! encode {
    ($value:expr, $buf:expr, $offset:expr, $endian:expr) => {{
        let v = $value;
        let raw = match $endian {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        };
        bytes_mut($buf, $offset, raw.len())?.copy_from_slice(&raw);
    }};
}

impl Primitive {
    pub const fn new(kind: PrimitiveKind) -> Self {
        Self { kind, endian: None }
    }

    /// Force a byte order regardless of what the caller asks for.
    pub const fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = Some(endian);
        self
    }

    pub const fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    fn mismatch(&self, value: &Value) -> Error {
        Error::TypeMismatch {
            expected: self.kind.name().to_string(),
            got: value.kind_name().to_string(),
        }
    }

    fn integer<T: TryFrom<i128>>(&self, value: &Value) -> Result<T> {
        let raw = value.as_integer().ok_or_else(|| self.mismatch(value))?;
        T::try_from(raw).map_err(|_| Error::ValueOutOfRange {
            kind: self.kind.name().to_string(),
            value: raw.to_string(),
        })
    }

    fn float(&self, value: &Value) -> Result<f64> {
        value.as_float().ok_or_else(|| self.mismatch(value))
    }
}

impl TypeDescriptor for Primitive {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn size(&self) -> Size {
        Size::Fixed(self.kind.size())
    }

    fn align(&self) -> usize {
        self.kind.alignment()
    }

    fn endian(&self) -> Option<Endian> {
        self.endian
    }

    fn read(&self, buf: &[u8], offset: usize, endian: Endian) -> Result<Value> {
        let endian = self.endian.unwrap_or(endian);
        let value = match self.kind {
            PrimitiveKind::Bool => Value::Bool(read_array::<1>(buf, offset)?[0] != 0),
            PrimitiveKind::U8 => Value::U8(read_array::<1>(buf, offset)?[0]),
            PrimitiveKind::I8 => Value::I8(decode!(i8, buf, offset, endian)),
            PrimitiveKind::U16 => Value::U16(decode!(u16, buf, offset, endian)),
            PrimitiveKind::I16 => Value::I16(decode!(i16, buf, offset, endian)),
            PrimitiveKind::U32 => Value::U32(decode!(u32, buf, offset, endian)),
            PrimitiveKind::I32 => Value::I32(decode!(i32, buf, offset, endian)),
            PrimitiveKind::U64 => Value::U64(decode!(u64, buf, offset, endian)),
            PrimitiveKind::I64 => Value::I64(decode!(i64, buf, offset, endian)),
            PrimitiveKind::F32 => Value::F32(decode!(f32, buf, offset, endian)),
            PrimitiveKind::F64 => Value::F64(decode!(f64, buf, offset, endian)),
        };
        Ok(value)
    }

    fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        endian: Endian,
        value: &Value,
    ) -> Result<Option<usize>> {
        if value.is_null() {
            return Ok(None);
        }
        let endian = self.endian.unwrap_or(endian);
        match self.kind {
            PrimitiveKind::Bool => {
                let flag = match value {
                    Value::Bool(v) => *v,
                    other => other.as_integer().ok_or_else(|| self.mismatch(other))? != 0,
                };
                bytes_mut(buf, offset, 1)?[0] = u8::from(flag);
            }
            PrimitiveKind::U8 => encode!(self.integer::<u8>(value)?, buf, offset, endian),
            PrimitiveKind::I8 => encode!(self.integer::<i8>(value)?, buf, offset, endian),
            PrimitiveKind::U16 => encode!(self.integer::<u16>(value)?, buf, offset, endian),
            PrimitiveKind::I16 => encode!(self.integer::<i16>(value)?, buf, offset, endian),
            PrimitiveKind::U32 => encode!(self.integer::<u32>(value)?, buf, offset, endian),
            PrimitiveKind::I32 => encode!(self.integer::<i32>(value)?, buf, offset, endian),
            PrimitiveKind::U64 => encode!(self.integer::<u64>(value)?, buf, offset, endian),
            PrimitiveKind::I64 => encode!(self.integer::<i64>(value)?, buf, offset, endian),
            PrimitiveKind::F32 => {
                // Keep f32 bits exact (NaN payloads) instead of widening.
                let v = match value {
                    Value::F32(v) => *v,
                    other => self.float(other)? as f32,
                };
                encode!(v, buf, offset, endian)
            }
            PrimitiveKind::F64 => encode!(self.float(value)?, buf, offset, endian),
        }
        Ok(None)
    }
}
