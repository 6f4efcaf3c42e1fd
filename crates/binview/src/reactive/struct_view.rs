// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Live view over a struct layout.

use super::{Accessor, Live, ReactiveContext, ToRaw};
use crate::buffer::{offset_at, Endian};
use crate::descriptor::effective_endian;
use crate::error::Result;
use crate::structs::StructLayout;
use crate::value::Value;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Zero-copy accessor for a struct bound to a buffer.
///
/// Clones share the accessor cache.
#[derive(Clone)]
pub struct StructView {
    layout: Arc<StructLayout>,
    ctx: ReactiveContext,
    memo: Arc<Mutex<HashMap<usize, Accessor>>>,
}

impl StructView {
    pub(crate) fn new(layout: Arc<StructLayout>, ctx: ReactiveContext) -> Self {
        Self {
            layout,
            ctx,
            memo: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Name of the bound struct type.
    pub fn name(&self) -> &str {
        self.layout.name()
    }

    pub fn context(&self) -> &ReactiveContext {
        &self.ctx
    }

    /// Current absolute address of the struct.
    pub fn absolute_offset(&self) -> Result<usize> {
        self.ctx.absolute_offset()
    }

    fn endian(&self) -> Endian {
        self.layout.endian().unwrap_or(self.ctx.endian())
    }

    fn field_offset(&self, idx: usize) -> Result<usize> {
        if let Some(offset) = self.layout.records()[idx].offset() {
            return Ok(offset);
        }
        let base = self.ctx.absolute_offset()?;
        let endian = self.endian();
        self.ctx
            .with_bytes(|buf| self.layout.offset_in(idx, buf, base, endian))
    }

    fn accessor(&self, idx: usize) -> Result<Accessor> {
        let record = &self.layout.records()[idx];
        // Offsets behind a dynamic-size field move with the data.
        let cacheable = self.ctx.memoize() && record.offset().is_some();
        if cacheable {
            if let Some(accessor) = self.memo.lock().get(&idx) {
                return Ok(accessor.clone());
            }
        }

        let offset = self.field_offset(idx)?;
        let endian = effective_endian(record.descriptor().as_ref(), self.endian());
        let accessor = Accessor::bind(record.descriptor(), self.ctx.child(offset, endian));
        if cacheable {
            self.memo.lock().insert(idx, accessor.clone());
        }
        Ok(accessor)
    }

    /// Read a field: leaves decode now, composites return their live view.
    pub fn get(&self, key: &str) -> Result<Live> {
        let idx = self.layout.position(key)?;
        self.accessor(idx)?.resolve()
    }

    /// Read a leaf field as a plain value (composites are materialized).
    pub fn get_value(&self, key: &str) -> Result<Value> {
        self.get(key)?.to_raw()
    }

    /// Write a field straight through its descriptor.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let idx = self.layout.position(key)?;
        let record = &self.layout.records()[idx];
        let base = self.ctx.absolute_offset()?;
        let relative = self.field_offset(idx)?;
        let desc = record.descriptor();
        let endian = effective_endian(desc.as_ref(), self.endian());
        self.ctx.with_bytes_mut(|buf| {
            let at = offset_at(base, relative, buf.len())?;
            desc.write(buf, at, endian, &value).map(|_| ())
        })
    }

    /// Whether `key` names a (non-padding) field.
    pub fn has(&self, key: &str) -> bool {
        self.layout.contains(key)
    }

    /// Field keys in layout order, padding excluded.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.layout.keys()
    }

    pub fn len(&self) -> usize {
        self.keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(key, live)` pairs in layout order.
    pub fn entries(&self) -> Result<Vec<(String, Live)>> {
        self.keys()
            .map(|key| self.get(key).map(|live| (key.to_string(), live)))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn cached_accessors(&self) -> usize {
        self.memo.lock().len()
    }
}

impl ToRaw for StructView {
    fn to_raw(&self) -> Result<Value> {
        let at = self.ctx.absolute_offset()?;
        let endian = self.ctx.endian();
        self.ctx
            .with_bytes(|buf| self.layout.read_at(buf, at, endian))
            .map(|(value, _)| value)
    }
}

impl fmt::Debug for StructView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructView")
            .field("name", &self.layout.name())
            .field("local_offset", &self.ctx.local_offset())
            .finish()
    }
}
