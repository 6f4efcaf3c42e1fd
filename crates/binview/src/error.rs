// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for layout definition and buffer access.

use std::fmt;

/// Errors raised while defining layouts or accessing bound buffers.
///
/// Every variant signals a programming error (invalid schema or violated
/// precondition). Nothing here is transient, so callers never retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Definition Errors
    // ========================================================================
    /// Descriptor used before a required operation was configured, or an
    /// invalid definition (e.g. dynamic-size array element).
    Definition(String),
    /// A field with this key already exists.
    DuplicateKey(String),
    /// No field with this key exists.
    UnknownKey(String),
    /// Schema document could not be parsed or resolved.
    Schema(String),

    // ========================================================================
    // Layout Walk Errors
    // ========================================================================
    /// A dynamic-size descriptor did not report how many bytes it used.
    DynamicSizeContract {
        /// Name of the offending descriptor.
        name: String,
    },
    /// A whole-array operation changed the number of elements.
    ArrayLength { expected: usize, actual: usize },

    // ========================================================================
    // Access Errors
    // ========================================================================
    /// Buffer access past the end of the backing storage.
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },
    /// Array view index past the fixed length.
    IndexOutOfBounds { index: usize, length: usize },
    /// The value shape does not match the descriptor.
    TypeMismatch { expected: String, got: String },
    /// Numeric value does not fit the target primitive.
    ValueOutOfRange { kind: String, value: String },
    /// The buffer behind a live view has been dropped.
    BufferReleased,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definition(msg) => write!(f, "Definition error: {}", msg),
            Self::DuplicateKey(key) => write!(f, "Duplicate key: {}", key),
            Self::UnknownKey(key) => write!(f, "Unknown key: {}", key),
            Self::Schema(msg) => write!(f, "Schema error: {}", msg),
            Self::DynamicSizeContract { name } => write!(
                f,
                "Dynamic-size descriptor '{}' did not report its actual size",
                name
            ),
            Self::ArrayLength { expected, actual } => write!(
                f,
                "Array length changed: fixed length {}, operation produced {}",
                expected, actual
            ),
            Self::OutOfBounds {
                offset,
                len,
                available,
            } => write!(
                f,
                "Out of bounds: {} bytes at offset {} exceed buffer of {} bytes",
                len, offset, available
            ),
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "Index out of bounds: {} >= {}", index, length)
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Self::ValueOutOfRange { kind, value } => {
                write!(f, "Value {} out of range for {}", value, kind)
            }
            Self::BufferReleased => write!(f, "Buffer behind live view was released"),
        }
    }
}

impl std::error::Error for Error {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
