// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout loaders.
//!
//! Struct layouts can be declared in a YAML document instead of code and
//! resolved into [`StructDescriptor`](crate::StructDescriptor)s at runtime.
//!
//! # Example
//!
//! ```rust,ignore
//! use binview::loaders::SchemaLoader;
//!
//! let doc = SchemaLoader::load_from_file("layouts.yaml")?;
//! let header = SchemaLoader::resolve(&doc, "Header")?;
//! ```

pub mod yaml;

pub use yaml::{SchemaLoader, YamlField, YamlSchemaDocument, YamlStruct};
