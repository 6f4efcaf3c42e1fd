// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-length array descriptors.

use crate::buffer::{offset_at, Endian};
use crate::descriptor::{effective_endian, DescriptorRef, Size, TypeDescriptor};
use crate::error::{Error, Result};
use crate::reactive::{ArrayView, Live, ReactiveContext};
use crate::value::Value;
use std::sync::Arc;

/// Builder for array descriptors.
#[derive(Debug, Clone)]
pub struct ArrayBuilder {
    element: DescriptorRef,
    length: usize,
    fill: Option<Value>,
    size: Option<usize>,
    align: Option<usize>,
}

impl ArrayBuilder {
    pub fn new(element: DescriptorRef, length: usize) -> Self {
        Self {
            element,
            length,
            fill: None,
            size: None,
            align: None,
        }
    }

    /// Value written into trailing indices when a write supplies fewer
    /// elements than `length`.
    pub fn fill(mut self, value: impl Into<Value>) -> Self {
        self.fill = Some(value.into());
        self
    }

    /// Override `element.size * length`.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Override the element alignment.
    pub fn align(mut self, align: usize) -> Self {
        self.align = Some(align);
        self
    }

    /// Freeze the array. The element type must have a fixed size.
    pub fn build(self) -> Result<ArrayDescriptor> {
        let stride = self.element.size().fixed().ok_or_else(|| {
            Error::Definition(format!(
                "array element '{}' must have a fixed size",
                self.element.name()
            ))
        })?;
        let layout = ArrayLayout {
            name: format!("{}[{}]", self.element.name(), self.length),
            size: self.size.unwrap_or(stride * self.length),
            align: self.align.unwrap_or_else(|| self.element.align()).max(1),
            stride,
            builder: self,
        };
        log::debug!(
            "[layout] array '{}' stride={} size={} align={}",
            layout.name,
            layout.stride,
            layout.size,
            layout.align
        );
        Ok(ArrayDescriptor {
            layout: Arc::new(layout),
        })
    }
}

/// Frozen array plan shared by a descriptor and its views.
#[derive(Debug)]
pub(crate) struct ArrayLayout {
    name: String,
    stride: usize,
    size: usize,
    align: usize,
    builder: ArrayBuilder,
}

impl ArrayLayout {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn length(&self) -> usize {
        self.builder.length
    }

    pub(crate) fn element(&self) -> &DescriptorRef {
        &self.builder.element
    }

    pub(crate) fn element_offset(&self, index: usize) -> usize {
        self.stride * index
    }

    pub(crate) fn element_endian(&self, endian: Endian) -> Endian {
        effective_endian(self.builder.element.as_ref(), endian)
    }

    pub(crate) fn read_elements(
        &self,
        buf: &[u8],
        offset: usize,
        endian: Endian,
    ) -> Result<Vec<Value>> {
        let endian = self.element_endian(endian);
        (0..self.length())
            .map(|i| {
                let at = offset_at(offset, self.element_offset(i), buf.len())?;
                self.builder.element.read(buf, at, endian)
            })
            .collect()
    }

    /// Write `min(items.len(), length)` elements, then `fill` (if any) into
    /// the rest. Without a fill value the remaining bytes stay as they were.
    pub(crate) fn write_elements(
        &self,
        buf: &mut [u8],
        offset: usize,
        endian: Endian,
        items: &[Value],
    ) -> Result<()> {
        let endian = self.element_endian(endian);
        let element = &self.builder.element;
        let available = buf.len();
        let count = items.len().min(self.length());
        for (i, item) in items.iter().take(count).enumerate() {
            let at = offset_at(offset, self.element_offset(i), available)?;
            element.write(buf, at, endian, item)?;
        }
        if let Some(fill) = &self.builder.fill {
            for i in count..self.length() {
                let at = offset_at(offset, self.element_offset(i), available)?;
                element.write(buf, at, endian, fill)?;
            }
        }
        Ok(())
    }
}

/// Frozen array descriptor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ArrayDescriptor {
    layout: Arc<ArrayLayout>,
}

impl ArrayDescriptor {
    pub fn length(&self) -> usize {
        self.layout.length()
    }

    pub fn element(&self) -> &DescriptorRef {
        self.layout.element()
    }

    /// Distance between consecutive elements.
    pub fn stride(&self) -> usize {
        self.layout.stride
    }

    pub fn fill_value(&self) -> Option<&Value> {
        self.layout.builder.fill.as_ref()
    }

    /// Reopen as a fresh builder.
    pub fn to_builder(&self) -> ArrayBuilder {
        self.layout.builder.clone()
    }
}

impl TypeDescriptor for ArrayDescriptor {
    fn name(&self) -> &str {
        self.layout.name()
    }

    fn size(&self) -> Size {
        Size::Fixed(self.layout.size)
    }

    fn align(&self) -> usize {
        self.layout.align
    }

    fn read(&self, buf: &[u8], offset: usize, endian: Endian) -> Result<Value> {
        self.layout
            .read_elements(buf, offset, endian)
            .map(Value::Array)
    }

    fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        endian: Endian,
        value: &Value,
    ) -> Result<Option<usize>> {
        match value {
            Value::Array(items) => self.layout.write_elements(buf, offset, endian, items)?,
            Value::Null => {}
            other => {
                return Err(Error::TypeMismatch {
                    expected: self.layout.name.clone(),
                    got: other.kind_name().to_string(),
                })
            }
        }
        Ok(None)
    }

    fn reactive(&self, ctx: ReactiveContext) -> Option<Live> {
        Some(Live::Array(ArrayView::new(self.layout.clone(), ctx)))
    }
}
