// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte buffers, endianness and bounded access helpers.
//!
//! Plain `read`/`write` work directly on `&[u8]` / `&mut [u8]`. Live views need
//! a buffer that several views can alias at once, so they go through
//! [`SharedBuffer`] (owning handle) and [`WeakBuffer`] (what a view keeps).

use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

/// Byte order used when encoding multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    /// Little-endian (WebAssembly linear memory, x86, most ARM targets).
    #[default]
    Little,
    /// Big-endian (network order).
    Big,
}

impl Endian {
    /// Byte order of the host.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }
}

impl FromStr for Endian {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(Self::Little),
            "big" | "be" => Ok(Self::Big),
            "native" => Ok(Self::native()),
            other => Err(Error::Definition(format!("Invalid endianness: {}", other))),
        }
    }
}

/// Bounded immutable slice `buf[offset..offset + len]`.
pub(crate) fn bytes(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    match offset.checked_add(len) {
        Some(end) if end <= buf.len() => Ok(&buf[offset..end]),
        _ => Err(Error::OutOfBounds {
            offset,
            len,
            available: buf.len(),
        }),
    }
}

/// Bounded mutable slice `buf[offset..offset + len]`.
pub(crate) fn bytes_mut(buf: &mut [u8], offset: usize, len: usize) -> Result<&mut [u8]> {
    let available = buf.len();
    match offset.checked_add(len) {
        Some(end) if end <= available => Ok(&mut buf[offset..end]),
        _ => Err(Error::OutOfBounds {
            offset,
            len,
            available,
        }),
    }
}

/// Absolute address `base + delta`, failing instead of wrapping.
pub(crate) fn offset_at(base: usize, delta: usize, available: usize) -> Result<usize> {
    base.checked_add(delta).ok_or(Error::OutOfBounds {
        offset: base,
        len: delta,
        available,
    })
}

/// Copy `N` bytes starting at `offset`.
pub(crate) fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes(buf, offset, N)?);
    Ok(out)
}

/// Shared, resizable backing storage for live views.
///
/// Cloning the handle aliases the same bytes. The engine itself never resizes
/// the buffer; callers may (e.g. to mirror a linear-memory grow) and bindings
/// with a relocatable base observe the change on their next access.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<RwLock<Vec<u8>>>,
}

impl SharedBuffer {
    /// Zero-filled buffer of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self::from_vec(vec![0u8; len])
    }

    /// Take ownership of existing bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(bytes)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resize the storage, zero-filling any new bytes.
    pub fn resize(&self, new_len: usize) {
        self.inner.write().resize(new_len, 0);
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.inner.read().clone()
    }

    /// Run `f` with shared access to the bytes.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access to the bytes.
    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Non-owning handle, as held by live views.
    pub fn downgrade(&self) -> WeakBuffer {
        WeakBuffer {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl From<Vec<u8>> for SharedBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.len())
            .finish()
    }
}

/// Weak handle to a [`SharedBuffer`].
///
/// Each access upgrades for the duration of a single read or write, so no
/// lock is ever held across caller code.
#[derive(Clone)]
pub struct WeakBuffer {
    inner: Weak<RwLock<Vec<u8>>>,
}

impl WeakBuffer {
    /// Run `f` with shared access, or fail if the buffer was dropped.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> Result<R>) -> Result<R> {
        let inner = self.inner.upgrade().ok_or(Error::BufferReleased)?;
        let guard = inner.read();
        f(&guard)
    }

    /// Run `f` with exclusive access, or fail if the buffer was dropped.
    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> Result<R>) -> Result<R> {
        let inner = self.inner.upgrade().ok_or(Error::BufferReleased)?;
        let mut guard = inner.write();
        f(&mut guard)
    }

    /// Whether the backing buffer is still alive.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for WeakBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakBuffer")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_slices() {
        let buf = [1u8, 2, 3, 4];
        assert_eq!(bytes(&buf, 1, 2).unwrap(), &[2, 3]);
        assert_eq!(
            bytes(&buf, 3, 2),
            Err(Error::OutOfBounds {
                offset: 3,
                len: 2,
                available: 4
            })
        );
        // overflow must not wrap
        assert!(bytes(&buf, usize::MAX, 2).is_err());
    }

    #[test]
    fn test_offset_at_overflow() {
        assert_eq!(offset_at(4, 8, 16), Ok(12));
        assert_eq!(
            offset_at(usize::MAX - 2, 8, 16),
            Err(Error::OutOfBounds {
                offset: usize::MAX - 2,
                len: 8,
                available: 16
            })
        );
    }

    #[test]
    fn test_endian_parse() {
        assert_eq!("BE".parse::<Endian>().unwrap(), Endian::Big);
        assert_eq!("little".parse::<Endian>().unwrap(), Endian::Little);
        assert!("middle".parse::<Endian>().is_err());
    }

    #[test]
    fn test_weak_buffer_released() {
        let shared = SharedBuffer::new(4);
        let weak = shared.downgrade();
        assert!(weak.with_bytes(|b| Ok(b.len())).is_ok());

        drop(shared);
        assert!(!weak.is_alive());
        assert_eq!(weak.with_bytes(|b| Ok(b.len())), Err(Error::BufferReleased));
    }

    #[test]
    fn test_aliased_handles() {
        let a = SharedBuffer::new(2);
        let b = a.clone();
        b.with_bytes_mut(|bytes| bytes[1] = 7);
        assert_eq!(a.snapshot(), vec![0, 7]);

        a.resize(4);
        assert_eq!(b.len(), 4);
    }
}
