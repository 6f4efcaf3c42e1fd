// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct layout engine.
//!
//! Fields are placed with native struct-packing rules:
//!
//! - each auto-placed field starts at the next multiple of its effective
//!   alignment (`max(override ?? type.align, 1)`);
//! - the total size is rounded up to the largest alignment seen.
//!
//! Fields carrying an explicit `order` are placed first (ascending, ties in
//! declaration order). Fields with an explicit offset move the cursor there
//! without any overlap check, which is how union-style layouts are expressed.
//!
//! Offsets are computed once at [`StructBuilder::build`]. A field following a
//! dynamic-size field has no static offset; read/write walks place it from
//! the sizes reported during that walk.

mod builder;

pub use builder::{FieldOptions, StructBuilder};

use crate::buffer::{offset_at, Endian};
use crate::descriptor::{
    align_up, effective_endian, measure, reported_size, DescriptorRef, Size, TypeDescriptor,
};
use crate::error::{Error, Result};
use crate::reactive::{Live, ReactiveContext, StructView};
use crate::value::Value;
use builder::FieldSpec;
use std::collections::HashMap;
use std::sync::Arc;

/// A placed struct member.
#[derive(Debug, Clone)]
pub struct FieldRecord {
    key: Option<String>,
    desc: DescriptorRef,
    align: usize,
    explicit_offset: Option<usize>,
    order: Option<i64>,
    offset: Option<usize>,
}

impl FieldRecord {
    /// Field key, `None` for padding.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn descriptor(&self) -> &DescriptorRef {
        &self.desc
    }

    /// Effective alignment used for placement.
    pub fn align(&self) -> usize {
        self.align
    }

    /// Offset relative to the struct start, if it does not depend on a
    /// preceding dynamic-size field.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn explicit_offset(&self) -> Option<usize> {
        self.explicit_offset
    }

    pub fn order(&self) -> Option<i64> {
        self.order
    }

    pub fn is_padding(&self) -> bool {
        self.key.is_none()
    }

    /// Where this record starts when the cursor is at `cursor`.
    fn place(&self, cursor: usize) -> usize {
        self.explicit_offset
            .unwrap_or_else(|| align_up(cursor, self.align))
    }
}

/// Frozen layout plan shared by a descriptor and all of its views.
#[derive(Debug)]
pub(crate) struct StructLayout {
    name: String,
    /// Records in layout order.
    records: Vec<FieldRecord>,
    /// Key -> index into `records`.
    index: HashMap<String, usize>,
    /// Declaration-order specs, kept so the layout can be reopened.
    declared: Vec<FieldSpec>,
    max_align: usize,
    size: Size,
    align: usize,
    endian: Option<Endian>,
    size_override: Option<usize>,
    align_override: Option<usize>,
}

impl StructLayout {
    fn compute(builder: StructBuilder) -> Self {
        let StructBuilder {
            name,
            fields,
            size: size_override,
            align: align_override,
            endian,
        } = builder;

        let mut visit: Vec<usize> = (0..fields.len()).collect();
        visit.sort_by_key(|&i| match fields[i].opts.order {
            Some(order) => (0, order, i),
            None => (1, 0, i),
        });

        let mut records = Vec::with_capacity(fields.len());
        let mut index = HashMap::new();
        let mut cursor = Some(0usize);
        let mut max_align = 1usize;

        for i in visit {
            let spec = &fields[i];
            let align = spec.opts.align.unwrap_or_else(|| spec.desc.align()).max(1);
            max_align = max_align.max(align);

            let offset = match spec.opts.offset {
                Some(explicit) => Some(explicit),
                None => cursor.map(|c| align_up(c, align)),
            };
            cursor = match (offset, spec.desc.size()) {
                (Some(start), Size::Fixed(n)) => Some(start + n),
                _ => None,
            };

            if let Some(key) = &spec.key {
                index.insert(key.clone(), records.len());
            }
            records.push(FieldRecord {
                key: spec.key.clone(),
                desc: spec.desc.clone(),
                align,
                explicit_offset: spec.opts.offset,
                order: spec.opts.order,
                offset,
            });
        }

        let size = match (size_override, cursor) {
            (Some(n), _) => Size::Fixed(n),
            (None, Some(end)) => Size::Fixed(align_up(end, max_align)),
            (None, None) => Size::Dynamic,
        };
        let align = align_override.unwrap_or(max_align).max(1);

        log::debug!(
            "[layout] struct '{}' size={} align={} fields={}",
            name,
            size,
            align,
            records.len()
        );

        Self {
            name,
            records,
            index,
            declared: fields,
            max_align,
            size,
            align,
            endian,
            size_override,
            align_override,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn records(&self) -> &[FieldRecord] {
        &self.records
    }

    pub(crate) fn endian(&self) -> Option<Endian> {
        self.endian
    }

    /// Index of the record for `key`.
    pub(crate) fn position(&self, key: &str) -> Result<usize> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| Error::UnknownKey(key.to_string()))
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Non-padding keys in layout order.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(FieldRecord::key)
    }

    /// Walk every record in layout order starting at absolute `base`.
    ///
    /// `visit` receives each record and its absolute offset and returns the
    /// bytes it actually occupied. Returns the struct's total size.
    fn walk<F>(&self, base: usize, available: usize, mut visit: F) -> Result<usize>
    where
        F: FnMut(&FieldRecord, usize) -> Result<usize>,
    {
        let mut cursor = 0usize;
        for record in &self.records {
            let start = record.place(cursor);
            let used = visit(record, offset_at(base, start, available)?)?;
            cursor = offset_at(start, used, available)?;
        }
        Ok(match self.size {
            Size::Fixed(n) => n,
            Size::Dynamic => align_up(cursor, self.max_align),
        })
    }

    /// Offset of record `idx` relative to the struct start.
    ///
    /// Static offsets are returned directly; otherwise the preceding records
    /// are measured against the current buffer contents.
    pub(crate) fn offset_in(
        &self,
        idx: usize,
        buf: &[u8],
        base: usize,
        endian: Endian,
    ) -> Result<usize> {
        let target = &self.records[idx];
        if let Some(offset) = target.offset {
            return Ok(offset);
        }
        let endian = self.endian.unwrap_or(endian);
        let mut cursor = 0usize;
        for record in &self.records[..idx] {
            let start = record.place(cursor);
            let field_endian = effective_endian(record.desc.as_ref(), endian);
            let at = offset_at(base, start, buf.len())?;
            let used = measure(record.desc.as_ref(), buf, at, field_endian)?;
            cursor = offset_at(start, used, buf.len())?;
        }
        Ok(target.place(cursor))
    }

    pub(crate) fn read_at(&self, buf: &[u8], offset: usize, endian: Endian) -> Result<(Value, usize)> {
        let endian = self.endian.unwrap_or(endian);
        let mut fields = HashMap::with_capacity(self.index.len());
        let size = self.walk(offset, buf.len(), |record, at| {
            let desc = record.desc.as_ref();
            let field_endian = effective_endian(desc, endian);
            match &record.key {
                None => measure(desc, buf, at, field_endian),
                Some(key) => {
                    let (value, reported) = desc.read_sized(buf, at, field_endian)?;
                    fields.insert(key.clone(), value);
                    reported_size(desc, reported)
                }
            }
        })?;
        Ok((Value::Struct(fields), size))
    }

    pub(crate) fn write_at(
        &self,
        buf: &mut [u8],
        offset: usize,
        endian: Endian,
        value: &Value,
    ) -> Result<usize> {
        let fields = match value {
            Value::Struct(fields) => Some(fields),
            Value::Null => None,
            other => {
                return Err(Error::TypeMismatch {
                    expected: format!("struct {}", self.name),
                    got: other.kind_name().to_string(),
                })
            }
        };
        let endian = self.endian.unwrap_or(endian);
        let available = buf.len();
        self.walk(offset, available, |record, at| {
            let desc = record.desc.as_ref();
            let field_endian = effective_endian(desc, endian);
            match &record.key {
                None => measure(desc, buf, at, field_endian),
                Some(key) => {
                    let field_value = fields.and_then(|f| f.get(key)).unwrap_or(&Value::Null);
                    let reported = desc.write(buf, at, field_endian, field_value)?;
                    reported_size(desc, reported)
                }
            }
        })
    }
}

/// Placeholder descriptor backing byte-count padding.
#[derive(Debug)]
pub(crate) struct Reserved {
    name: String,
    size: usize,
}

impl Reserved {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            name: format!("padding[{}]", size),
            size,
        }
    }
}

impl TypeDescriptor for Reserved {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> Size {
        Size::Fixed(self.size)
    }

    fn align(&self) -> usize {
        1
    }

    fn read(&self, _buf: &[u8], _offset: usize, _endian: Endian) -> Result<Value> {
        Ok(Value::Null)
    }

    fn write(
        &self,
        _buf: &mut [u8],
        _offset: usize,
        _endian: Endian,
        _value: &Value,
    ) -> Result<Option<usize>> {
        Ok(None)
    }
}

/// Frozen struct descriptor.
///
/// Cheap to clone; clones share the same layout.
#[derive(Debug, Clone)]
pub struct StructDescriptor {
    layout: Arc<StructLayout>,
}

impl StructDescriptor {
    fn from_layout(layout: StructLayout) -> Self {
        Self {
            layout: Arc::new(layout),
        }
    }

    /// Records in layout order, padding included.
    pub fn fields(&self) -> &[FieldRecord] {
        self.layout.records()
    }

    pub fn field(&self, key: &str) -> Option<&FieldRecord> {
        let idx = self.layout.index.get(key)?;
        self.layout.records.get(*idx)
    }

    /// Value keys in layout order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.layout.keys()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.layout.contains(key)
    }

    /// Static offset of `key`; `None` when it follows a dynamic-size field.
    pub fn offset_of(&self, key: &str) -> Result<Option<usize>> {
        let idx = self.layout.position(key)?;
        Ok(self.layout.records[idx].offset)
    }

    /// Largest effective field alignment.
    pub fn max_align(&self) -> usize {
        self.layout.max_align
    }

    /// Reopen as a fresh builder with the same declarations.
    pub fn to_builder(&self) -> StructBuilder {
        StructBuilder {
            name: self.layout.name.clone(),
            fields: self.layout.declared.clone(),
            size: self.layout.size_override,
            align: self.layout.align_override,
            endian: self.layout.endian,
        }
    }
}

impl TypeDescriptor for StructDescriptor {
    fn name(&self) -> &str {
        self.layout.name()
    }

    fn size(&self) -> Size {
        self.layout.size
    }

    fn align(&self) -> usize {
        self.layout.align
    }

    fn endian(&self) -> Option<Endian> {
        self.layout.endian
    }

    fn read(&self, buf: &[u8], offset: usize, endian: Endian) -> Result<Value> {
        self.layout.read_at(buf, offset, endian).map(|(value, _)| value)
    }

    fn read_sized(
        &self,
        buf: &[u8],
        offset: usize,
        endian: Endian,
    ) -> Result<(Value, Option<usize>)> {
        let (value, size) = self.layout.read_at(buf, offset, endian)?;
        Ok((value, Some(size)))
    }

    fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        endian: Endian,
        value: &Value,
    ) -> Result<Option<usize>> {
        self.layout.write_at(buf, offset, endian, value).map(Some)
    }

    fn reactive(&self, ctx: ReactiveContext) -> Option<Live> {
        Some(Live::Struct(StructView::new(self.layout.clone(), ctx)))
    }
}

#[cfg(test)]
mod tests;
