// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The descriptor contract every scalar and composite type implements.

use crate::buffer::Endian;
use crate::error::{Error, Result};
use crate::reactive::{Live, ReactiveContext};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a descriptor.
///
/// Descriptors are never owned by a single container: the same struct
/// descriptor may back a field, an array element and a root binding at once.
pub type DescriptorRef = Arc<dyn TypeDescriptor>;

/// Byte size of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Size {
    /// Always occupies exactly this many bytes.
    Fixed(usize),
    /// Size depends on the encoded value; reported per read/write.
    Dynamic,
}

impl Size {
    /// The fixed byte count, if any.
    pub const fn fixed(self) -> Option<usize> {
        match self {
            Self::Fixed(n) => Some(n),
            Self::Dynamic => None,
        }
    }

    pub const fn is_dynamic(self) -> bool {
        matches!(self, Self::Dynamic)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{}", n),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Describes how to size, align, read and write values of one type.
///
/// Dynamic-size descriptors must report the bytes they actually used:
/// through [`read_sized`](Self::read_sized) on the read path and through the
/// return value of [`write`](Self::write). A layout walk that gets no report
/// fails with [`Error::DynamicSizeContract`].
pub trait TypeDescriptor: fmt::Debug + Send + Sync {
    /// Diagnostic name.
    fn name(&self) -> &str;

    fn size(&self) -> Size;

    /// Placement unit when used as a struct field or array element (>= 1).
    fn align(&self) -> usize;

    /// Byte order this descriptor forces, overriding the caller's.
    fn endian(&self) -> Option<Endian> {
        None
    }

    /// Decode the value stored at `offset`.
    fn read(&self, buf: &[u8], offset: usize, endian: Endian) -> Result<Value>;

    /// Decode the value at `offset` and report the bytes it occupies.
    fn read_sized(
        &self,
        buf: &[u8],
        offset: usize,
        endian: Endian,
    ) -> Result<(Value, Option<usize>)> {
        Ok((self.read(buf, offset, endian)?, self.size().fixed()))
    }

    /// Encode `value` at `offset`, returning the actual size for dynamic types.
    fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        endian: Endian,
        value: &Value,
    ) -> Result<Option<usize>>;

    /// Live view over this type, or `None` for leaf types.
    ///
    /// Leaves are bound by the engine as memoized accessors that re-read the
    /// buffer on every access.
    fn reactive(&self, _ctx: ReactiveContext) -> Option<Live> {
        None
    }
}

/// Round `offset` up to the next multiple of `align`.
///
/// Alignments are not required to be powers of two.
pub fn align_up(offset: usize, align: usize) -> usize {
    let align = align.max(1);
    match offset % align {
        0 => offset,
        rem => offset + (align - rem),
    }
}

/// Byte order a descriptor uses when the caller asks for `endian`.
pub(crate) fn effective_endian(desc: &dyn TypeDescriptor, endian: Endian) -> Endian {
    desc.endian().unwrap_or(endian)
}

/// Resolve the actual size a dynamic descriptor reported.
pub(crate) fn reported_size(desc: &dyn TypeDescriptor, reported: Option<usize>) -> Result<usize> {
    match (desc.size(), reported) {
        (Size::Fixed(n), _) => Ok(n),
        (Size::Dynamic, Some(n)) => Ok(n),
        (Size::Dynamic, None) => {
            log::debug!(
                "[descriptor] '{}' is dynamic-size but reported no size",
                desc.name()
            );
            Err(Error::DynamicSizeContract {
                name: desc.name().to_string(),
            })
        }
    }
}

/// Bytes the value at `offset` occupies, decoding it if the size is dynamic.
pub(crate) fn measure(
    desc: &dyn TypeDescriptor,
    buf: &[u8],
    offset: usize,
    endian: Endian,
) -> Result<usize> {
    match desc.size() {
        Size::Fixed(n) => Ok(n),
        Size::Dynamic => {
            let (_, reported) = desc.read_sized(buf, offset, effective_endian(desc, endian))?;
            reported_size(desc, reported)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(4, 4), 4);
        assert_eq!(align_up(5, 8), 8);
        // non power-of-two alignments are accepted as-is
        assert_eq!(align_up(7, 3), 9);
        // zero is treated as byte alignment
        assert_eq!(align_up(7, 0), 7);
    }

    #[test]
    fn test_size_fixed() {
        assert_eq!(Size::Fixed(4).fixed(), Some(4));
        assert_eq!(Size::Dynamic.fixed(), None);
        assert!(Size::Dynamic.is_dynamic());
        assert_eq!(Size::Dynamic.to_string(), "dynamic");
    }
}
