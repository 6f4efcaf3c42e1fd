// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Live view over a fixed-length array.

use super::{Accessor, Live, ReactiveContext, ToRaw};
use crate::array::ArrayLayout;
use crate::buffer::offset_at;
use crate::error::{Error, Result};
use crate::value::Value;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Zero-copy accessor for an array bound to a buffer.
///
/// Element access is index based. Bulk operations (`sort_by`, `reverse`,
/// `splice`, ...) run on a materialized copy which is written back only when
/// the element count is unchanged.
#[derive(Clone)]
pub struct ArrayView {
    layout: Arc<ArrayLayout>,
    ctx: ReactiveContext,
    memo: Arc<Mutex<HashMap<usize, Accessor>>>,
}

impl ArrayView {
    pub(crate) fn new(layout: Arc<ArrayLayout>, ctx: ReactiveContext) -> Self {
        Self {
            layout,
            ctx,
            memo: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn name(&self) -> &str {
        self.layout.name()
    }

    pub fn len(&self) -> usize {
        self.layout.length()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn absolute_offset(&self) -> Result<usize> {
        self.ctx.absolute_offset()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                length: self.len(),
            });
        }
        Ok(())
    }

    fn accessor(&self, index: usize) -> Result<Accessor> {
        self.check_index(index)?;
        if self.ctx.memoize() {
            if let Some(accessor) = self.memo.lock().get(&index) {
                return Ok(accessor.clone());
            }
        }
        let endian = self.layout.element_endian(self.ctx.endian());
        let child = self.ctx.child(self.layout.element_offset(index), endian);
        let accessor = Accessor::bind(self.layout.element(), child);
        if self.ctx.memoize() {
            self.memo.lock().insert(index, accessor.clone());
        }
        Ok(accessor)
    }

    /// Element at `index`: leaves decode now, composites return their view.
    pub fn get(&self, index: usize) -> Result<Live> {
        self.accessor(index)?.resolve()
    }

    pub fn get_value(&self, index: usize) -> Result<Value> {
        self.get(index)?.to_raw()
    }

    /// Write one element through the element descriptor.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        self.check_index(index)?;
        let value = value.into();
        let base = self.ctx.absolute_offset()?;
        let relative = self.layout.element_offset(index);
        let endian = self.layout.element_endian(self.ctx.endian());
        let element = self.layout.element();
        self.ctx.with_bytes_mut(|buf| {
            let at = offset_at(base, relative, buf.len())?;
            element.write(buf, at, endian, &value).map(|_| ())
        })
    }

    /// Live elements in index order.
    pub fn iter(&self) -> impl Iterator<Item = Result<Live>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Run `f` on a materialized copy of the elements and write the result
    /// back. Fails with [`Error::ArrayLength`] if `f` changes the count.
    pub fn modify<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<Value>) -> R,
    {
        let mut items = match self.to_raw()? {
            Value::Array(items) => items,
            other => {
                return Err(Error::TypeMismatch {
                    expected: "array".to_string(),
                    got: other.kind_name().to_string(),
                })
            }
        };
        let out = f(&mut items);
        if items.len() != self.len() {
            log::debug!(
                "[view] '{}' rejected length change {} -> {}",
                self.name(),
                self.len(),
                items.len()
            );
            return Err(Error::ArrayLength {
                expected: self.len(),
                actual: items.len(),
            });
        }
        let at = self.ctx.absolute_offset()?;
        let endian = self.ctx.endian();
        self.ctx
            .with_bytes_mut(|buf| self.layout.write_elements(buf, at, endian, &items))?;
        Ok(out)
    }

    pub fn sort_by<F>(&self, compare: F) -> Result<()>
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.modify(|items| items.sort_by(compare))
    }

    pub fn reverse(&self) -> Result<()> {
        self.modify(|items| items.reverse())
    }

    pub fn fill(&self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.modify(|items| items.iter_mut().for_each(|item| *item = value.clone()))
    }

    pub fn rotate_left(&self, mid: usize) -> Result<()> {
        self.modify(|items| {
            if !items.is_empty() {
                let mid = mid % items.len();
                items.rotate_left(mid);
            }
        })
    }

    /// Replace `range` with `replacement`, returning the removed elements.
    /// The replacement must keep the element count.
    pub fn splice(&self, range: Range<usize>, replacement: Vec<Value>) -> Result<Vec<Value>> {
        if range.start > range.end || range.end > self.len() {
            return Err(Error::IndexOutOfBounds {
                index: range.end.max(range.start),
                length: self.len(),
            });
        }
        self.modify(|items| items.splice(range, replacement).collect())
    }
}

impl ToRaw for ArrayView {
    fn to_raw(&self) -> Result<Value> {
        let at = self.ctx.absolute_offset()?;
        let endian = self.ctx.endian();
        self.ctx
            .with_bytes(|buf| self.layout.read_elements(buf, at, endian))
            .map(Value::Array)
    }
}

impl fmt::Debug for ArrayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayView")
            .field("name", &self.layout.name())
            .field("local_offset", &self.ctx.local_offset())
            .finish()
    }
}
