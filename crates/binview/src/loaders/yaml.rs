// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML layout loader.
//!
//! # Example YAML
//!
//! ```yaml
//! # layouts.yaml
//! structs:
//!   Point:
//!     fields:
//!       - name: x
//!         type: i32
//!       - name: y
//!         type: i32
//!
//!   Header:
//!     endian: big
//!     fields:
//!       - name: tag
//!         type: u8
//!       - padding: 3
//!       - name: origin
//!         type: Point
//!       - name: samples
//!         type: u16
//!         length: 4
//!         fill: 0
//!       - name: label
//!         type: string
//!         capacity: 8
//!         filler: 0
//! ```

use crate::array::ArrayBuilder;
use crate::buffer::Endian;
use crate::descriptor::DescriptorRef;
use crate::error::{Error, Result};
use crate::primitives::{Primitive, PrimitiveKind};
use crate::string::{FixedString, VarString};
use crate::structs::{FieldOptions, StructBuilder, StructDescriptor};
use crate::value::Value;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// YAML layout loader.
pub struct SchemaLoader;

/// Root YAML document structure.
#[derive(Debug, Deserialize, Default)]
pub struct YamlSchemaDocument {
    /// Named struct layouts.
    #[serde(default)]
    pub structs: HashMap<String, YamlStruct>,
}

/// A single struct layout in YAML format.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct YamlStruct {
    /// Members in declaration order.
    pub fields: Vec<YamlField>,
    /// Total size override.
    pub size: Option<usize>,
    /// Alignment override when nested.
    pub align: Option<usize>,
    /// Forced byte order: little, big or native.
    pub endian: Option<String>,
}

/// A struct member in YAML format.
///
/// Either a named field (`name` + `type`) or anonymous `padding`.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct YamlField {
    pub name: Option<String>,

    /// Primitive name, `string`, `varstring`, or another struct's name.
    #[serde(rename = "type")]
    pub type_name: Option<String>,

    /// Turns the field into an array of this many elements.
    pub length: Option<usize>,
    /// Array fill value for short writes.
    pub fill: Option<serde_yaml::Value>,

    /// Capacity in bytes (`type: string` only).
    pub capacity: Option<usize>,
    /// Pad/terminator byte (`type: string` only).
    pub filler: Option<u8>,

    pub align: Option<usize>,
    pub offset: Option<usize>,
    pub order: Option<i64>,
    /// Forced byte order for primitive and struct fields.
    pub endian: Option<String>,

    /// Reserve this many bytes without a key.
    pub padding: Option<usize>,
}

impl YamlField {
    fn options(&self) -> FieldOptions {
        FieldOptions {
            align: self.align,
            offset: self.offset,
            order: self.order,
        }
    }
}

impl SchemaLoader {
    /// Load layouts from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<YamlSchemaDocument> {
        let yaml_content = fs::read_to_string(path)
            .map_err(|e| Error::Schema(format!("Failed to read YAML file: {}", e)))?;
        Self::parse_yaml(&yaml_content)
    }

    /// Parse YAML content.
    pub fn parse_yaml(yaml_content: &str) -> Result<YamlSchemaDocument> {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| Error::Schema(format!("Failed to parse YAML: {}", e)))
    }

    /// Build the struct named `name`, resolving referenced structs first.
    pub fn resolve(doc: &YamlSchemaDocument, name: &str) -> Result<StructDescriptor> {
        Resolver::new(doc).resolve_struct(name)
    }

    /// Build every struct in the document.
    pub fn resolve_all(doc: &YamlSchemaDocument) -> Result<HashMap<String, StructDescriptor>> {
        let mut resolver = Resolver::new(doc);
        let mut names: Vec<&String> = doc.structs.keys().collect();
        names.sort();
        for name in names {
            resolver.resolve_struct(name)?;
        }
        Ok(resolver.resolved)
    }

    /// Load a file and resolve all of its structs.
    pub fn load_structs<P: AsRef<Path>>(path: P) -> Result<HashMap<String, StructDescriptor>> {
        let doc = Self::load_from_file(path)?;
        Self::resolve_all(&doc)
    }
}

/// Memoizing resolver with a stack of structs under construction.
struct Resolver<'a> {
    doc: &'a YamlSchemaDocument,
    resolved: HashMap<String, StructDescriptor>,
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(doc: &'a YamlSchemaDocument) -> Self {
        Self {
            doc,
            resolved: HashMap::new(),
            stack: Vec::new(),
        }
    }

    fn resolve_struct(&mut self, name: &str) -> Result<StructDescriptor> {
        if let Some(desc) = self.resolved.get(name) {
            return Ok(desc.clone());
        }
        if self.stack.iter().any(|n| n == name) {
            return Err(Error::Schema(format!(
                "Cyclic struct reference: {} -> {}",
                self.stack.join(" -> "),
                name
            )));
        }
        let doc = self.doc;
        let def = doc
            .structs
            .get(name)
            .ok_or_else(|| Error::Schema(format!("Struct '{}' not found", name)))?;

        self.stack.push(name.to_string());
        let built = self.build_struct(name, def);
        self.stack.pop();
        let desc = built?;

        log::debug!(
            "[loaders] resolved struct '{}' ({} fields)",
            name,
            def.fields.len()
        );
        self.resolved.insert(name.to_string(), desc.clone());
        Ok(desc)
    }

    fn build_struct(&mut self, name: &str, def: &YamlStruct) -> Result<StructDescriptor> {
        let mut builder = StructBuilder::new(name);
        if let Some(size) = def.size {
            builder = builder.size(size);
        }
        if let Some(align) = def.align {
            builder = builder.align(align);
        }
        if let Some(endian) = &def.endian {
            builder = builder.endian(parse_endian(endian, name)?);
        }

        for (idx, field) in def.fields.iter().enumerate() {
            if let Some(bytes) = field.padding {
                if field.name.is_some() || field.type_name.is_some() {
                    return Err(Error::Schema(format!(
                        "Struct '{}' field #{}: padding cannot have a name or type",
                        name, idx
                    )));
                }
                builder = builder.padding_at(bytes, field.options());
                continue;
            }

            let key = field.name.as_deref().ok_or_else(|| {
                Error::Schema(format!("Struct '{}' field #{}: missing name", name, idx))
            })?;
            let desc = self.field_descriptor(name, key, field)?;
            builder = builder.field_with(key, desc, field.options())?;
        }
        Ok(builder.build())
    }

    fn field_descriptor(
        &mut self,
        owner: &str,
        key: &str,
        field: &YamlField,
    ) -> Result<DescriptorRef> {
        let context = format!("{}.{}", owner, key);
        let type_name = field
            .type_name
            .as_deref()
            .ok_or_else(|| Error::Schema(format!("Field '{}': missing type", context)))?;
        let endian = field
            .endian
            .as_deref()
            .map(|e| parse_endian(e, &context))
            .transpose()?;

        let element: DescriptorRef = match type_name {
            "string" => {
                let capacity = field.capacity.ok_or_else(|| {
                    Error::Schema(format!("Field '{}': string requires a capacity", context))
                })?;
                let mut string = FixedString::new(capacity);
                if let Some(filler) = field.filler {
                    string = string.filler(filler);
                }
                Arc::new(string)
            }
            "varstring" => Arc::new(VarString::new()),
            other => match other.parse::<PrimitiveKind>() {
                Ok(kind) => {
                    let primitive = Primitive::new(kind);
                    Arc::new(match endian {
                        Some(e) => primitive.with_endian(e),
                        None => primitive,
                    })
                }
                Err(_) => {
                    let nested = self.resolve_struct(other)?;
                    match endian {
                        Some(e) => Arc::new(nested.to_builder().endian(e).build()),
                        None => Arc::new(nested),
                    }
                }
            },
        };

        match field.length {
            None => Ok(element),
            Some(length) => {
                let mut array = ArrayBuilder::new(element, length);
                if let Some(fill) = &field.fill {
                    array = array.fill(yaml_to_value(fill)?);
                }
                Ok(Arc::new(array.build()?))
            }
        }
    }
}

fn parse_endian(raw: &str, context: &str) -> Result<Endian> {
    raw.parse::<Endian>()
        .map_err(|_| Error::Schema(format!("'{}': invalid endianness '{}'", context, raw)))
}

fn yaml_to_value(raw: &serde_yaml::Value) -> Result<Value> {
    use serde_yaml::Value as Yaml;
    Ok(match raw {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::U64(u)
            } else if let Some(i) = n.as_i64() {
                Value::I64(i)
            } else {
                Value::F64(n.as_f64().unwrap_or_default())
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => {
            Value::Array(items.iter().map(yaml_to_value).collect::<Result<_>>()?)
        }
        Yaml::Mapping(map) => {
            let mut fields = HashMap::with_capacity(map.len());
            for (k, v) in map {
                let key = k
                    .as_str()
                    .ok_or_else(|| Error::Schema("Fill keys must be strings".to_string()))?;
                fields.insert(key.to_string(), yaml_to_value(v)?);
            }
            Value::Struct(fields)
        }
        Yaml::Tagged(tagged) => yaml_to_value(&tagged.value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Size, TypeDescriptor};

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
structs:
  Sample:
    fields:
      - name: a
        type: u8
      - name: b
        type: f32
"#;

        let doc = SchemaLoader::parse_yaml(yaml).expect("valid YAML should parse");
        assert!(doc.structs.contains_key("Sample"));

        let sample = SchemaLoader::resolve(&doc, "Sample").expect("struct should resolve");
        assert_eq!(sample.size(), Size::Fixed(8));
        assert_eq!(sample.offset_of("b").unwrap(), Some(4));
    }

    #[test]
    fn test_nested_arrays_and_strings() {
        let yaml = r#"
structs:
  Point:
    fields:
      - name: x
        type: i32
      - name: y
        type: i32
  Header:
    endian: big
    fields:
      - name: tag
        type: u8
      - padding: 3
      - name: origin
        type: Point
      - name: samples
        type: u16
        length: 4
        fill: 0
      - name: label
        type: string
        capacity: 8
        filler: 0
"#;

        let doc = SchemaLoader::parse_yaml(yaml).unwrap();
        let all = SchemaLoader::resolve_all(&doc).unwrap();
        let header = &all["Header"];
        assert_eq!(header.offset_of("origin").unwrap(), Some(4));
        assert_eq!(header.offset_of("samples").unwrap(), Some(12));
        assert_eq!(header.offset_of("label").unwrap(), Some(20));
        assert_eq!(header.size(), Size::Fixed(28));
        assert_eq!(header.endian(), Some(Endian::Big));
        assert_eq!(header.keys().collect::<Vec<_>>(), ["tag", "origin", "samples", "label"]);
    }

    #[test]
    fn test_field_options() {
        let yaml = r#"
structs:
  Union:
    fields:
      - name: word
        type: u32
      - name: low
        type: u16
        offset: 0
      - name: first
        type: u8
        order: -1
      - name: packed
        type: u64
        align: 1
"#;

        let doc = SchemaLoader::parse_yaml(yaml).unwrap();
        let desc = SchemaLoader::resolve(&doc, "Union").unwrap();
        assert_eq!(desc.keys().next(), Some("first"));
        assert_eq!(desc.offset_of("low").unwrap(), Some(0));
        assert_eq!(desc.offset_of("word").unwrap(), Some(4));
        // The explicit offset moved the cursor back to 2.
        assert_eq!(desc.offset_of("packed").unwrap(), Some(2));
    }

    #[test]
    fn test_cycle_detected() {
        let yaml = r#"
structs:
  A:
    fields:
      - name: b
        type: B
  B:
    fields:
      - name: a
        type: A
"#;

        let doc = SchemaLoader::parse_yaml(yaml).unwrap();
        let err = SchemaLoader::resolve(&doc, "A").unwrap_err();
        assert!(matches!(err, Error::Schema(msg) if msg.contains("A -> B -> A")));
    }

    #[test]
    fn test_unknown_struct() {
        let yaml = r#"
structs:
  Holder:
    fields:
      - name: inner
        type: Missing
"#;

        let doc = SchemaLoader::parse_yaml(yaml).unwrap();
        assert!(matches!(
            SchemaLoader::resolve(&doc, "Holder"),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_invalid_definitions() {
        let no_capacity = r#"
structs:
  S:
    fields:
      - name: label
        type: string
"#;
        let doc = SchemaLoader::parse_yaml(no_capacity).unwrap();
        assert!(matches!(SchemaLoader::resolve(&doc, "S"), Err(Error::Schema(_))));

        let bad_endian = r#"
structs:
  S:
    endian: middle
    fields: []
"#;
        let doc = SchemaLoader::parse_yaml(bad_endian).unwrap();
        assert!(matches!(SchemaLoader::resolve(&doc, "S"), Err(Error::Schema(_))));

        let dynamic_array = r#"
structs:
  S:
    fields:
      - name: names
        type: varstring
        length: 2
"#;
        let doc = SchemaLoader::parse_yaml(dynamic_array).unwrap();
        assert!(matches!(SchemaLoader::resolve(&doc, "S"), Err(Error::Definition(_))));
    }

    #[test]
    fn test_empty_document() {
        let doc = SchemaLoader::parse_yaml("{}").unwrap();
        assert!(SchemaLoader::resolve_all(&doc).unwrap().is_empty());
        assert!(matches!(SchemaLoader::parse_yaml("structs: ["), Err(Error::Schema(_))));
    }
}
