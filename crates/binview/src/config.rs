// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding configuration.

use crate::buffer::Endian;

/// Options applied to a live binding.
///
/// # Example
///
/// ```rust
/// use binview::{BindOptions, Endian};
///
/// let opts = BindOptions::new().endian(Endian::Big).memoize(false);
/// assert_eq!(opts.endian, Endian::Big);
/// assert!(!opts.memoize);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOptions {
    /// Byte order for descriptors that do not force one (default: little).
    pub endian: Endian,
    /// Cache per-key accessors inside views (default: on).
    pub memoize: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            endian: Endian::default(),
            memoize: true,
        }
    }
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Apply an optional per-call byte order.
    pub(crate) fn or_endian(mut self, endian: Option<Endian>) -> Self {
        if let Some(endian) = endian {
            self.endian = endian;
        }
        self
    }
}
