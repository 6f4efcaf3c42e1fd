// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Live view behaviour through the public entry points: reactive, bind_ref,
// to_raw, and buffer relocation.

use binview::{
    bind_ref, reactive, reactive_with, read, to_raw, ArrayBuilder, BaseOffset, BindOptions,
    DescriptorRef, Endian, Error, FixedString, PrimitiveKind, SharedBuffer, StructBuilder,
    ToRaw, Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn sensor() -> DescriptorRef {
    let samples = ArrayBuilder::new(PrimitiveKind::I16.descriptor(), 4)
        .fill(0i16)
        .build()
        .expect("array");
    Arc::new(
        StructBuilder::new("Sensor")
            .field("id", PrimitiveKind::U32.descriptor())
            .and_then(|b| b.field("label", Arc::new(FixedString::new(6).filler(0))))
            .and_then(|b| b.field("samples", Arc::new(samples)))
            .and_then(|b| b.field("scale", PrimitiveKind::F64.descriptor()))
            .expect("fields")
            .build(),
    )
}

#[test]
fn test_to_raw_matches_read() {
    let desc = sensor();
    let buffer = SharedBuffer::new(64);
    let live = reactive(&buffer, &desc, 8usize, None).unwrap();
    let view = live.as_struct().expect("struct view");

    view.set("id", 7u32).unwrap();
    view.set("label", "temp").unwrap();
    view.set("samples", vec![1i16, -2]).unwrap();
    view.set("scale", 0.5f64).unwrap();

    let plain = buffer
        .with_bytes(|b| read(b, desc.as_ref(), 8, None))
        .unwrap();
    assert_eq!(to_raw(&live).unwrap(), plain);
    assert_eq!(
        plain,
        Value::record()
            .with("id", 7u32)
            .with("label", "temp")
            .with("samples", vec![1i16, -2, 0, 0])
            .with("scale", 0.5f64)
    );
}

#[test]
fn test_view_write_visible_to_plain_read() {
    let desc = sensor();
    let buffer = SharedBuffer::new(40);
    let live = reactive(&buffer, &desc, 0usize, Some(Endian::Big)).unwrap();
    let view = live.as_struct().unwrap();

    let samples = view.get("samples").unwrap();
    samples.as_array().unwrap().set(2, 300i16).unwrap();

    let plain = buffer
        .with_bytes(|b| read(b, desc.as_ref(), 0, Some(Endian::Big)))
        .unwrap();
    let samples = plain.get_field("samples").and_then(Value::as_array).unwrap();
    assert_eq!(samples[2], Value::I16(300));
}

#[test]
fn test_relocated_region() {
    let desc = sensor();
    let buffer = SharedBuffer::new(32);
    let base = Arc::new(AtomicUsize::new(0));
    let resolver = {
        let base = base.clone();
        BaseOffset::resolver(move || base.load(Ordering::SeqCst))
    };

    let live = reactive(&buffer, &desc, resolver, None).unwrap();
    let view = live.as_struct().unwrap();
    view.set("id", 1u32).unwrap();
    let samples = view.get("samples").unwrap();

    // Grow the buffer and move the region, like a reallocation would.
    buffer.resize(96);
    let old = buffer.snapshot()[..32].to_vec();
    buffer.with_bytes_mut(|b| b[64..96].copy_from_slice(&old));
    base.store(64, Ordering::SeqCst);

    view.set("id", 2u32).unwrap();
    samples.as_array().unwrap().set(0, 5i16).unwrap();

    let bytes = buffer.snapshot();
    assert_eq!(&bytes[0..4], &1u32.to_le_bytes());
    assert_eq!(&bytes[64..68], &2u32.to_le_bytes());
    assert_eq!(&bytes[74..76], &5i16.to_le_bytes());
}

#[test]
fn test_memoization_is_transparent() {
    let desc = sensor();
    let buffer = SharedBuffer::new(40);
    let fast = reactive_with(&buffer, &desc, 0usize, &BindOptions::new()).unwrap();
    let slow =
        reactive_with(&buffer, &desc, 0usize, &BindOptions::new().memoize(false)).unwrap();

    for round in 0u32..3 {
        let writer = if round % 2 == 0 { &fast } else { &slow };
        writer.as_struct().unwrap().set("id", round).unwrap();
        assert_eq!(fast.to_raw().unwrap(), slow.to_raw().unwrap());
    }
}

#[test]
fn test_bind_ref_scalar() {
    let buffer = SharedBuffer::new(4);
    let desc = PrimitiveKind::U32.descriptor();
    let counter = bind_ref(&buffer, &desc, 0usize, Some(Endian::Big));

    for _ in 0..3 {
        let current = counter.get().unwrap().into_value().and_then(|v| v.as_u32());
        counter.set(current.unwrap_or(0) + 1).unwrap();
    }
    assert_eq!(buffer.snapshot(), [0, 0, 0, 3]);
}

#[test]
fn test_released_buffer() {
    let desc = sensor();
    let buffer = SharedBuffer::new(40);
    let live = reactive(&buffer, &desc, 0usize, None).unwrap();
    drop(buffer);
    assert_eq!(to_raw(&live).unwrap_err(), Error::BufferReleased);
}

#[test]
fn test_view_past_buffer_end() {
    let desc = sensor();
    let buffer = SharedBuffer::new(8);
    let live = reactive(&buffer, &desc, 0usize, None).unwrap();
    let view = live.as_struct().unwrap();
    assert!(view.get("id").is_ok());
    assert!(matches!(
        view.get("scale"),
        Err(Error::OutOfBounds { .. })
    ));
}
