// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout and read/write walk tests for struct descriptors.

use super::*;
use crate::custom::CustomDescriptor;
use crate::primitives::PrimitiveKind;
use crate::string::VarString;

fn u8d() -> DescriptorRef {
    PrimitiveKind::U8.descriptor()
}

fn u16d() -> DescriptorRef {
    PrimitiveKind::U16.descriptor()
}

fn u32d() -> DescriptorRef {
    PrimitiveKind::U32.descriptor()
}

#[test]
fn test_natural_alignment() {
    let sample = StructBuilder::new("Sample")
        .field("a", u8d())
        .and_then(|b| b.field("b", PrimitiveKind::F32.descriptor()))
        .expect("fields")
        .build();

    assert_eq!(sample.offset_of("a").unwrap(), Some(0));
    assert_eq!(sample.offset_of("b").unwrap(), Some(4));
    assert_eq!(sample.size(), Size::Fixed(8));
    assert_eq!(sample.align(), 4);

    let mut buf = [0u8; 8];
    let value = Value::record().with("a", 7u8).with("b", 1.5f32);
    sample.write(&mut buf, 0, Endian::Little, &value).unwrap();
    assert_eq!(buf[0], 7);
    assert_eq!(&buf[4..], &1.5f32.to_le_bytes());
    assert_eq!(sample.read(&buf, 0, Endian::Little).unwrap(), value);
}

#[test]
fn test_ordered_fields_first() {
    let desc = StructBuilder::new("Ordered")
        .field("c", u8d())
        .and_then(|b| b.field_with("a", u32d(), FieldOptions::new().order(1)))
        .and_then(|b| b.field_with("b", u16d(), FieldOptions::new().order(0)))
        .expect("fields")
        .build();

    assert_eq!(desc.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
    assert_eq!(desc.offset_of("b").unwrap(), Some(0));
    assert_eq!(desc.offset_of("a").unwrap(), Some(4));
    assert_eq!(desc.offset_of("c").unwrap(), Some(8));
    assert_eq!(desc.size(), Size::Fixed(12));
}

#[test]
fn test_order_ties_keep_declaration_order() {
    let desc = StructBuilder::new("Ties")
        .field_with("x", u8d(), FieldOptions::new().order(5))
        .and_then(|b| b.field_with("y", u8d(), FieldOptions::new().order(5)))
        .and_then(|b| b.field_with("z", u8d(), FieldOptions::new().order(-2)))
        .expect("fields")
        .build();
    assert_eq!(desc.keys().collect::<Vec<_>>(), ["z", "x", "y"]);
}

#[test]
fn test_explicit_offset_overlaps() {
    let desc = StructBuilder::new("Union")
        .field("word", u32d())
        .and_then(|b| b.field_with("low", u16d(), FieldOptions::new().offset(0)))
        .expect("fields")
        .build();

    assert_eq!(desc.offset_of("low").unwrap(), Some(0));
    assert_eq!(desc.size(), Size::Fixed(4));

    let mut buf = [0u8; 4];
    let value = Value::record().with("word", 0xAABB_CCDDu32);
    desc.write(&mut buf, 0, Endian::Little, &value).unwrap();
    let read = desc.read(&buf, 0, Endian::Little).unwrap();
    assert_eq!(read.get_field("low"), Some(&Value::U16(0xCCDD)));

    // Later records in layout order win on overlap.
    let both = Value::record().with("word", 0u32).with("low", 0xFFFFu16);
    desc.write(&mut buf, 0, Endian::Little, &both).unwrap();
    assert_eq!(buf, [0xFF, 0xFF, 0, 0]);
}

#[test]
fn test_padding_is_skipped() {
    let desc = StructBuilder::new("Padded")
        .field("a", u8d())
        .expect("field")
        .padding(2)
        .field("b", u8d())
        .expect("field")
        .build();

    assert_eq!(desc.offset_of("b").unwrap(), Some(3));
    assert_eq!(desc.fields().len(), 3);
    assert!(desc.fields()[1].is_padding());
    assert_eq!(desc.keys().count(), 2);

    let mut buf = [0xEEu8; 4];
    desc.write(
        &mut buf,
        0,
        Endian::Little,
        &Value::record().with("a", 1u8).with("b", 2u8),
    )
    .unwrap();
    assert_eq!(buf, [1, 0xEE, 0xEE, 2]);

    let read = desc.read(&buf, 0, Endian::Little).unwrap();
    assert_eq!(read.as_struct().map(|f| f.len()), Some(2));
}

#[test]
fn test_alignment_override() {
    let packed = StructBuilder::new("Packed")
        .field("a", u8d())
        .and_then(|b| b.field_with("b", u32d(), FieldOptions::new().align(1)))
        .expect("fields")
        .build();
    assert_eq!(packed.offset_of("b").unwrap(), Some(1));
    assert_eq!(packed.size(), Size::Fixed(5));
    assert_eq!(packed.max_align(), 1);

    let odd = StructBuilder::new("Odd")
        .field("a", u8d())
        .and_then(|b| b.field_with("b", u8d(), FieldOptions::new().align(3)))
        .expect("fields")
        .build();
    assert_eq!(odd.offset_of("b").unwrap(), Some(3));
    assert_eq!(odd.size(), Size::Fixed(6));
}

#[test]
fn test_size_and_align_override() {
    let desc = StructBuilder::new("Sized")
        .field("a", u32d())
        .expect("field")
        .size(16)
        .align(8)
        .build();
    assert_eq!(desc.size(), Size::Fixed(16));
    assert_eq!(desc.align(), 8);
    assert_eq!(desc.max_align(), 4);
}

#[test]
fn test_nested_struct_alignment() {
    let inner = StructBuilder::new("Inner")
        .field("tag", u8d())
        .and_then(|b| b.field("value", PrimitiveKind::U64.descriptor()))
        .expect("fields")
        .build();
    assert_eq!(inner.size(), Size::Fixed(16));

    let outer = StructBuilder::new("Outer")
        .field("flag", u8d())
        .and_then(|b| b.field("inner", Arc::new(inner)))
        .expect("fields")
        .build();
    assert_eq!(outer.offset_of("inner").unwrap(), Some(8));
    assert_eq!(outer.size(), Size::Fixed(24));

    let mut buf = [0u8; 24];
    let value = Value::record()
        .with("flag", 1u8)
        .with("inner", Value::record().with("tag", 2u8).with("value", 3u64));
    outer.write(&mut buf, 0, Endian::Big, &value).unwrap();
    assert_eq!(buf[8], 2);
    assert_eq!(&buf[16..], &3u64.to_be_bytes());
    assert_eq!(outer.read(&buf, 0, Endian::Big).unwrap(), value);
}

#[test]
fn test_forced_struct_endian() {
    let desc = StructBuilder::new("Net")
        .field("port", u16d())
        .expect("field")
        .endian(Endian::Big)
        .build();
    let mut buf = [0u8; 2];
    desc.write(
        &mut buf,
        0,
        Endian::Little,
        &Value::record().with("port", 0x1F90u16),
    )
    .unwrap();
    assert_eq!(buf, [0x1F, 0x90]);
}

#[test]
fn test_dynamic_field_offsets() {
    let desc = StructBuilder::new("Message")
        .field("tag", u8d())
        .and_then(|b| b.field("name", Arc::new(VarString::new())))
        .and_then(|b| b.field("after", u16d()))
        .expect("fields")
        .build();

    assert_eq!(desc.offset_of("name").unwrap(), Some(4));
    assert_eq!(desc.offset_of("after").unwrap(), None);
    assert!(desc.size().is_dynamic());

    let mut buf = [0u8; 32];
    let value = Value::record()
        .with("tag", 1u8)
        .with("name", "abc")
        .with("after", 7u16);
    let written = desc.write(&mut buf, 0, Endian::Little, &value).unwrap();
    // tag | pad | len(4) | "abc" | pad | after, rounded to 4
    assert_eq!(written, Some(16));
    assert_eq!(&buf[4..8], &3u32.to_le_bytes());
    assert_eq!(&buf[8..11], b"abc");
    assert_eq!(&buf[12..14], &7u16.to_le_bytes());

    let (read, size) = desc.read_sized(&buf, 0, Endian::Little).unwrap();
    assert_eq!(read, value);
    assert_eq!(size, Some(16));
}

#[test]
fn test_dynamic_size_contract() {
    let silent = CustomDescriptor::new("silent", Size::Dynamic, 1)
        .reader(|_, _, _| Ok((Value::Null, None)))
        .writer(|_, _, _, _| Ok(None));
    let desc = StructBuilder::new("Broken")
        .field("blob", Arc::new(silent))
        .and_then(|b| b.field("after", u8d()))
        .expect("fields")
        .build();

    let mut buf = [0u8; 8];
    let expected = Error::DynamicSizeContract {
        name: "silent".into(),
    };
    assert_eq!(desc.read(&buf, 0, Endian::Little).unwrap_err(), expected);
    assert_eq!(
        desc.write(&mut buf, 0, Endian::Little, &Value::record())
            .unwrap_err(),
        expected
    );
}

#[test]
fn test_missing_keys_leave_bytes() {
    let desc = StructBuilder::new("Pair")
        .field("a", u16d())
        .and_then(|b| b.field("b", u16d()))
        .expect("fields")
        .build();

    let mut buf = [0xAAu8; 4];
    desc.write(&mut buf, 0, Endian::Little, &Value::record().with("b", 1u16))
        .unwrap();
    assert_eq!(buf, [0xAA, 0xAA, 1, 0]);

    desc.write(&mut buf, 0, Endian::Little, &Value::Null).unwrap();
    assert_eq!(buf, [0xAA, 0xAA, 1, 0]);

    let err = desc
        .write(&mut buf, 0, Endian::Little, &Value::U8(1))
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_to_builder_is_independent() {
    let base = StructBuilder::new("Base")
        .field("a", u8d())
        .expect("field")
        .build();
    let extended = base
        .to_builder()
        .field("b", u32d())
        .expect("field")
        .build();

    assert_eq!(base.size(), Size::Fixed(1));
    assert!(!base.contains_key("b"));
    assert_eq!(extended.size(), Size::Fixed(8));
    assert_eq!(extended.name(), "Base");
}

#[test]
fn test_update_and_remove_field() {
    let desc = StructBuilder::new("Editable")
        .field("a", u8d())
        .and_then(|b| b.field("b", u8d()))
        .and_then(|b| b.field("c", u8d()))
        .and_then(|b| b.update_field("b", u32d(), FieldOptions::new()))
        .and_then(|b| b.remove_field("c"))
        .expect("edits")
        .build();

    assert_eq!(desc.keys().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(desc.offset_of("b").unwrap(), Some(4));
    assert_eq!(
        desc.offset_of("c").unwrap_err(),
        Error::UnknownKey("c".into())
    );
}

#[test]
fn test_empty_struct() {
    let desc = StructBuilder::new("Empty").build();
    assert_eq!(desc.size(), Size::Fixed(0));
    assert_eq!(desc.align(), 1);
    assert_eq!(
        desc.read(&[], 0, Endian::Little).unwrap(),
        Value::record()
    );
}

#[test]
fn test_offset_overflow_is_out_of_bounds() {
    let desc = StructBuilder::new("Skip")
        .padding(8)
        .field("a", u8d())
        .expect("field")
        .build();

    let buf = [0u8; 16];
    let at = usize::MAX - 2;
    assert!(matches!(
        desc.read(&buf, at, Endian::Little),
        Err(Error::OutOfBounds { offset, .. }) if offset == at
    ));

    let mut buf = [0u8; 16];
    let value = Value::record().with("a", 1u8);
    assert!(matches!(
        desc.write(&mut buf, at, Endian::Little, &value),
        Err(Error::OutOfBounds { .. })
    ));
    assert_eq!(buf, [0u8; 16]);
}

#[test]
fn test_padding_at_explicit_offset() {
    let desc = StructBuilder::new("Header")
        .field("tag", u8d())
        .expect("field")
        .padding_at(2, FieldOptions::new().offset(4))
        .field("len", u8d())
        .expect("field")
        .build();

    assert_eq!(desc.fields()[1].offset(), Some(4));
    assert_eq!(desc.offset_of("len").unwrap(), Some(6));
    assert_eq!(desc.size(), Size::Fixed(7));
}
