// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Top-level read/write and binding entry points.
//!
//! Every `endian` argument is optional; `None` falls back to
//! [`BindOptions::default`] (little-endian).

use crate::buffer::{Endian, SharedBuffer};
use crate::config::BindOptions;
use crate::descriptor::{effective_endian, reported_size, DescriptorRef, TypeDescriptor};
use crate::error::Result;
use crate::reactive::{Accessor, BaseOffset, Live, ReactiveContext, Ref, ToRaw};
use crate::value::Value;

fn resolve_endian(endian: Option<Endian>) -> Endian {
    BindOptions::default().or_endian(endian).endian
}

/// Materialize the value of `desc` stored at `offset`.
pub fn read(
    buf: &[u8],
    desc: &dyn TypeDescriptor,
    offset: usize,
    endian: Option<Endian>,
) -> Result<Value> {
    let endian = effective_endian(desc, resolve_endian(endian));
    desc.read(buf, offset, endian)
}

/// Encode `value` as `desc` at `offset`.
pub fn write(
    buf: &mut [u8],
    desc: &dyn TypeDescriptor,
    offset: usize,
    value: &Value,
    endian: Option<Endian>,
) -> Result<()> {
    let endian = effective_endian(desc, resolve_endian(endian));
    desc.write(buf, offset, endian, value).map(|_| ())
}

/// Read `length` consecutive values of `desc`, back to back.
pub fn read_sequence(
    buf: &[u8],
    desc: &dyn TypeDescriptor,
    offset: usize,
    length: usize,
    endian: Option<Endian>,
) -> Result<Vec<Value>> {
    let endian = effective_endian(desc, resolve_endian(endian));
    let mut cursor = offset;
    let mut out = Vec::with_capacity(length);
    for _ in 0..length {
        let (value, reported) = desc.read_sized(buf, cursor, endian)?;
        cursor += reported_size(desc, reported)?;
        out.push(value);
    }
    Ok(out)
}

/// Write `values` as consecutive `desc` items starting at `offset`.
pub fn write_sequence(
    buf: &mut [u8],
    desc: &dyn TypeDescriptor,
    offset: usize,
    values: &[Value],
    endian: Option<Endian>,
) -> Result<()> {
    let endian = effective_endian(desc, resolve_endian(endian));
    let mut cursor = offset;
    for value in values {
        let reported = desc.write(buf, cursor, endian, value)?;
        cursor += reported_size(desc, reported)?;
    }
    Ok(())
}

fn root_context(
    buffer: &SharedBuffer,
    desc: &DescriptorRef,
    base: BaseOffset,
    options: &BindOptions,
) -> ReactiveContext {
    let root = ReactiveContext::root(buffer, base, options);
    let endian = effective_endian(desc.as_ref(), options.endian);
    root.child(0, endian)
}

/// Bind `desc` to `buffer` at `base`.
///
/// Composite types yield a live view; leaf types yield their current value.
///
/// # Example
///
/// ```rust
/// use binview::{reactive, DescriptorRef, PrimitiveKind, SharedBuffer, StructBuilder};
/// use std::sync::Arc;
///
/// let point: DescriptorRef = Arc::new(
///     StructBuilder::new("Point")
///         .field("x", PrimitiveKind::I32.descriptor())?
///         .field("y", PrimitiveKind::I32.descriptor())?
///         .build(),
/// );
/// let buffer = SharedBuffer::new(8);
///
/// let live = reactive(&buffer, &point, 0usize, None)?;
/// let view = live.as_struct().expect("struct view");
/// view.set("y", -3i32)?;
/// assert_eq!(view.get_value("y")?.as_i32(), Some(-3));
/// # Ok::<(), binview::Error>(())
/// ```
pub fn reactive(
    buffer: &SharedBuffer,
    desc: &DescriptorRef,
    base: impl Into<BaseOffset>,
    endian: Option<Endian>,
) -> Result<Live> {
    reactive_with(buffer, desc, base, &BindOptions::default().or_endian(endian))
}

pub fn reactive_with(
    buffer: &SharedBuffer,
    desc: &DescriptorRef,
    base: impl Into<BaseOffset>,
    options: &BindOptions,
) -> Result<Live> {
    let ctx = root_context(buffer, desc, base.into(), options);
    Accessor::bind(desc, ctx).resolve()
}

/// Single-value handle to `desc` at `base`.
pub fn bind_ref(
    buffer: &SharedBuffer,
    desc: &DescriptorRef,
    base: impl Into<BaseOffset>,
    endian: Option<Endian>,
) -> Ref {
    bind_ref_with(buffer, desc, base, &BindOptions::default().or_endian(endian))
}

pub fn bind_ref_with(
    buffer: &SharedBuffer,
    desc: &DescriptorRef,
    base: impl Into<BaseOffset>,
    options: &BindOptions,
) -> Ref {
    Ref::new(desc.clone(), root_context(buffer, desc, base.into(), options))
}

/// Fully materialize a live view, ref or plain value.
pub fn to_raw<T: ToRaw + ?Sized>(item: &T) -> Result<Value> {
    item.to_raw()
}
