// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Live views over bound buffers.
//!
//! A binding starts from a root [`ReactiveContext`] (weak buffer handle,
//! byte order, base offset resolver). Composite descriptors hand out views
//! whose `get`/`set` translate into buffer accesses at
//! `base() + local_offset`, with `base()` re-evaluated on every access so a
//! relocated region is observed live.
//!
//! Views memoize one accessor per key/index. Memoization only skips
//! rebuilding child contexts; every access still reads the buffer, and
//! writes always go straight through the field descriptor.

mod array_view;
mod reference;
mod struct_view;

pub use array_view::ArrayView;
pub use reference::Ref;
pub use struct_view::StructView;

use crate::buffer::{offset_at, Endian, SharedBuffer, WeakBuffer};
use crate::config::BindOptions;
use crate::descriptor::DescriptorRef;
use crate::error::Result;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Resolver for the absolute start of a binding's root.
#[derive(Clone)]
pub struct BaseOffset(Arc<dyn Fn() -> usize + Send + Sync>);

impl BaseOffset {
    pub fn constant(offset: usize) -> Self {
        Self(Arc::new(move || offset))
    }

    /// Base re-evaluated on every access (e.g. a region that may move).
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn() -> usize + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn resolve(&self) -> usize {
        (self.0)()
    }
}

impl From<usize> for BaseOffset {
    fn from(offset: usize) -> Self {
        Self::constant(offset)
    }
}

impl fmt::Debug for BaseOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BaseOffset(..)")
    }
}

/// Everything a descriptor needs to bind a live view.
#[derive(Clone, Debug)]
pub struct ReactiveContext {
    buffer: WeakBuffer,
    endian: Endian,
    local_offset: usize,
    base: BaseOffset,
    memoize: bool,
}

impl ReactiveContext {
    /// Root context for a new binding.
    pub fn root(buffer: &SharedBuffer, base: BaseOffset, options: &BindOptions) -> Self {
        Self {
            buffer: buffer.downgrade(),
            endian: options.endian,
            local_offset: 0,
            base,
            memoize: options.memoize,
        }
    }

    /// Context for a member placed `offset` bytes into this one.
    pub fn child(&self, offset: usize, endian: Endian) -> Self {
        Self {
            buffer: self.buffer.clone(),
            endian,
            local_offset: self.local_offset.saturating_add(offset),
            base: self.base.clone(),
            memoize: self.memoize,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Offset from the binding root.
    pub fn local_offset(&self) -> usize {
        self.local_offset
    }

    /// Current absolute address (`base() + local_offset`).
    ///
    /// Fails with [`Error::OutOfBounds`](crate::Error::OutOfBounds) when the
    /// sum does not fit in `usize`.
    pub fn absolute_offset(&self) -> Result<usize> {
        let base = self.base.resolve();
        match base.checked_add(self.local_offset) {
            Some(at) => Ok(at),
            None => self.with_bytes(|buf| offset_at(base, self.local_offset, buf.len())),
        }
    }

    pub fn memoize(&self) -> bool {
        self.memoize
    }

    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> Result<R>) -> Result<R> {
        self.buffer.with_bytes(f)
    }

    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> Result<R>) -> Result<R> {
        self.buffer.with_bytes_mut(f)
    }
}

/// Result of reading through a live binding.
#[derive(Clone, Debug)]
pub enum Live {
    /// Leaf value decoded from the buffer at access time.
    Value(Value),
    Struct(StructView),
    Array(ArrayView),
}

impl Live {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructView> {
        match self {
            Self::Struct(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayView> {
        match self {
            Self::Array(view) => Some(view),
            _ => None,
        }
    }

    /// Leaf value, or `None` for views.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Deep materialization of live views back into plain values.
pub trait ToRaw {
    fn to_raw(&self) -> Result<Value>;
}

impl ToRaw for Value {
    fn to_raw(&self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl ToRaw for Live {
    fn to_raw(&self) -> Result<Value> {
        match self {
            Self::Value(v) => Ok(v.clone()),
            Self::Struct(view) => view.to_raw(),
            Self::Array(view) => view.to_raw(),
        }
    }
}

/// Memoizable handle to one bound member.
#[derive(Clone, Debug)]
pub(crate) enum Accessor {
    Leaf {
        desc: DescriptorRef,
        ctx: ReactiveContext,
    },
    View(Live),
}

impl Accessor {
    pub(crate) fn bind(desc: &DescriptorRef, ctx: ReactiveContext) -> Self {
        match desc.reactive(ctx.clone()) {
            Some(view) => Self::View(view),
            None => Self::Leaf {
                desc: desc.clone(),
                ctx,
            },
        }
    }

    pub(crate) fn resolve(&self) -> Result<Live> {
        match self {
            Self::Leaf { desc, ctx } => {
                let at = ctx.absolute_offset()?;
                let endian = ctx.endian();
                ctx.with_bytes(|buf| desc.read(buf, at, endian))
                    .map(Live::Value)
            }
            Self::View(view) => Ok(view.clone()),
        }
    }
}
