// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # binview - Binary layouts and live buffer views
//!
//! Describe the binary layout of integers, floats, fixed-capacity strings,
//! arrays and nested structs, then either materialize them as plain
//! [`Value`]s or bind a shared byte buffer to a live view whose reads and
//! writes go straight to the underlying bytes (a C struct overlaid on raw
//! memory, e.g. WebAssembly linear memory).
//!
//! ## Quick Start
//!
//! ```rust
//! use binview::{read, write, PrimitiveKind, StructBuilder, TypeDescriptor, Value};
//!
//! let sample = StructBuilder::new("Sample")
//!     .field("a", PrimitiveKind::U8.descriptor())?
//!     .field("b", PrimitiveKind::F32.descriptor())?
//!     .build();
//! assert_eq!(sample.size().fixed(), Some(8));
//!
//! let mut buf = [0u8; 8];
//! let value = Value::record().with("a", 7u8).with("b", 1.5f32);
//! write(&mut buf, &sample, 0, &value, None)?;
//! assert_eq!(read(&buf, &sample, 0, None)?, value);
//! # Ok::<(), binview::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  api: read / write / *_sequence / reactive / bind_ref / to_raw |
//! +---------------------------------------------------------------+
//! |  reactive: ReactiveContext -> StructView / ArrayView / Ref     |
//! +---------------------------------------------------------------+
//! |  layout: StructBuilder / ArrayBuilder -> frozen descriptors    |
//! +---------------------------------------------------------------+
//! |  leaves: primitives | strings | custom descriptors             |
//! +---------------------------------------------------------------+
//! |  buffer: Endian | SharedBuffer | WeakBuffer                    |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Layout contract every type implements |
//! | [`StructBuilder`] | Declares fields, computes offsets on `build()` |
//! | [`ArrayBuilder`] | Fixed-length arrays of fixed-size elements |
//! | [`SharedBuffer`] | Bytes shared between the caller and live views |
//! | [`StructView`] / [`ArrayView`] | Live, memoized accessors |
//!
//! ## Features
//!
//! - `schema-loaders` (default): YAML layout definitions via [`loaders`].

pub mod api;
pub mod array;
pub mod buffer;
pub mod config;
pub mod custom;
pub mod descriptor;
pub mod error;
#[cfg(feature = "schema-loaders")]
pub mod loaders;
pub mod primitives;
pub mod reactive;
pub mod string;
pub mod structs;
pub mod value;

pub use api::{
    bind_ref, bind_ref_with, reactive, reactive_with, read, read_sequence, to_raw, write,
    write_sequence,
};
pub use array::{ArrayBuilder, ArrayDescriptor};
pub use buffer::{Endian, SharedBuffer, WeakBuffer};
pub use config::BindOptions;
pub use custom::CustomDescriptor;
pub use descriptor::{align_up, DescriptorRef, Size, TypeDescriptor};
pub use error::{Error, Result};
pub use primitives::{Primitive, PrimitiveKind};
pub use reactive::{ArrayView, BaseOffset, Live, ReactiveContext, Ref, StructView, ToRaw};
pub use string::{FixedString, Latin1, StringCodec, Utf8, VarString};
pub use structs::{FieldOptions, FieldRecord, StructBuilder, StructDescriptor};
pub use value::Value;

#[cfg(feature = "schema-loaders")]
pub use loaders::SchemaLoader;
