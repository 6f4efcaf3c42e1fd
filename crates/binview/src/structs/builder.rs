// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for struct descriptors.

use super::{Reserved, StructDescriptor, StructLayout};
use crate::buffer::Endian;
use crate::descriptor::DescriptorRef;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Per-field placement options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Alignment override (defaults to the field type's alignment).
    pub align: Option<usize>,
    /// Explicit absolute offset. Skips auto-placement and overlap checks, so
    /// several fields may share bytes like a C union.
    pub offset: Option<usize>,
    /// Layout priority. Ordered fields are placed first, ascending.
    pub order: Option<i64>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn align(mut self, align: usize) -> Self {
        self.align = Some(align);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }
}

/// A declared member (padding has no key).
#[derive(Debug, Clone)]
pub(crate) struct FieldSpec {
    pub(crate) key: Option<String>,
    pub(crate) desc: DescriptorRef,
    pub(crate) opts: FieldOptions,
}

/// Builder for struct descriptors.
///
/// # Example
///
/// ```rust
/// use binview::{PrimitiveKind, StructBuilder};
///
/// let header = StructBuilder::new("Header")
///     .field("tag", PrimitiveKind::U8.descriptor())?
///     .field("length", PrimitiveKind::U32.descriptor())?
///     .build();
///
/// assert_eq!(header.offset_of("length")?, Some(4));
/// # Ok::<(), binview::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct StructBuilder {
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) size: Option<usize>,
    pub(crate) align: Option<usize>,
    pub(crate) endian: Option<Endian>,
}

impl StructBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            size: None,
            align: None,
            endian: None,
        }
    }

    /// Add an auto-placed field.
    pub fn field(self, key: impl Into<String>, desc: DescriptorRef) -> Result<Self> {
        self.field_with(key, desc, FieldOptions::default())
    }

    /// Add a field with placement options.
    pub fn field_with(
        mut self,
        key: impl Into<String>,
        desc: DescriptorRef,
        opts: FieldOptions,
    ) -> Result<Self> {
        let key = key.into();
        if self.contains(&key) {
            return Err(Error::DuplicateKey(key));
        }
        self.fields.push(FieldSpec {
            key: Some(key),
            desc,
            opts,
        });
        Ok(self)
    }

    /// Reserve `bytes` of byte-aligned space.
    pub fn padding(self, bytes: usize) -> Self {
        self.padding_at(bytes, FieldOptions::default())
    }

    /// Reserve `bytes` with explicit placement options.
    pub fn padding_at(self, bytes: usize, opts: FieldOptions) -> Self {
        self.padding_with(Arc::new(Reserved::new(bytes)), opts)
    }

    /// Reserve the space of `desc` without exposing it as a value.
    pub fn padding_with(mut self, desc: DescriptorRef, opts: FieldOptions) -> Self {
        self.fields.push(FieldSpec {
            key: None,
            desc,
            opts,
        });
        self
    }

    /// Replace the type and options of an existing field, keeping its position.
    pub fn update_field(
        mut self,
        key: &str,
        desc: DescriptorRef,
        opts: FieldOptions,
    ) -> Result<Self> {
        let spec = self
            .fields
            .iter_mut()
            .find(|spec| spec.key.as_deref() == Some(key))
            .ok_or_else(|| Error::UnknownKey(key.to_string()))?;
        spec.desc = desc;
        spec.opts = opts;
        Ok(self)
    }

    pub fn remove_field(mut self, key: &str) -> Result<Self> {
        let idx = self
            .fields
            .iter()
            .position(|spec| spec.key.as_deref() == Some(key))
            .ok_or_else(|| Error::UnknownKey(key.to_string()))?;
        self.fields.remove(idx);
        Ok(self)
    }

    /// Override the computed total size.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Override the alignment used when this struct is nested.
    pub fn align(mut self, align: usize) -> Self {
        self.align = Some(align);
        self
    }

    /// Force a byte order for every field without its own.
    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = Some(endian);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields
            .iter()
            .any(|spec| spec.key.as_deref() == Some(key))
    }

    /// Compute the layout and freeze it.
    pub fn build(self) -> StructDescriptor {
        StructDescriptor::from_layout(StructLayout::compute(self))
    }
}
