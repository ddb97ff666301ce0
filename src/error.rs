//! Error taxonomy shared across schema compilation and codec execution.
//!
//! Mirrors the split the teacher crate draws between build-time and
//! runtime failures: [`CompileError`] is the one compile-time kind
//! (`SCHEMA_INVALID`), the rest are runtime kinds raised by [`crate::engine`].
use thiserror::Error;

use crate::record::Value;

/// `spec.md` §4's compile-time failures: malformed schema text, or a
/// schema whose declarations violate an invariant from §3.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CompileError {
    #[error("unknown type token {token:?}")]
    UnknownTypeToken { token: String },

    #[error("integer bit-width must be in 1..=64, got {size}")]
    IntegerWidthOutOfRange { size: u32 },

    #[error("integer/float field cannot have zero width")]
    ZeroWidthField,

    #[error("unsupported float width {size}: only 32 and 64 are allowed")]
    UnsupportedFloatWidth { size: u32 },

    #[error(
        "string field {name:?} is not admissible at bit offset {offset}: strings must start at offset 0"
    )]
    StringNotByteAligned { name: String, offset: u8 },

    #[error("open sequence {name:?} must be immediately followed by a magic-checked field")]
    OpenSequenceWithoutMagic { name: String },

    #[error("duplicate field name {name:?}")]
    DuplicateFieldName { name: String },

    #[error("length expression for {name:?} references unknown identifier {identifier:?}")]
    UnknownIdentifier { name: String, identifier: String },

    #[error("sub-parser call {name:?} references unregistered schema {schema:?}")]
    UnknownSchema { name: String, schema: String },

    #[error("malformed length expression {text:?}: {reason}")]
    MalformedExpr { text: String, reason: String },

    #[error("magic literal for {name:?} is empty")]
    EmptyMagicLiteral { name: String },

    #[error("malformed field declaration: {reason}")]
    MalformedDeclaration { reason: String },

    #[error(
        "extra parameter {name:?} declared after the first field; extra parameters must come first"
    )]
    ExtraParamAfterField { name: String },
}

/// Raised when a magic-checked field's observed value does not equal the
/// literal the schema declared (`spec.md` §6 `MAGIC_MISMATCH`).
#[derive(Debug, Error, PartialEq, Clone)]
#[error("magic mismatch on {field_name:?}: expected {expected:?}, observed {observed:?} ({size_bits} bits)")]
pub struct MagicMismatch {
    pub field_name: String,
    pub size_bits: u32,
    pub expected: Value,
    pub observed: Value,
}

/// Raised when the stream returns fewer bytes than requested
/// (`spec.md` §6 `IO_ERROR`).
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("I/O error: requested {requested} bytes at cursor {cursor}")]
pub struct IoError {
    pub requested: usize,
    pub cursor: u64,
}

/// Raised on write when a fixed-length string field's actual length does
/// not match the declared length (`spec.md` §6 `LENGTH_MISMATCH`).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("length mismatch on {field_name:?}: declared {declared}, actual {actual}")]
pub struct LengthMismatch {
    pub field_name: String,
    pub declared: usize,
    pub actual: usize,
}

/// Union of every error a call to [`crate::engine::get`] or
/// [`crate::engine::put`] can raise.
#[derive(Debug, Error, Clone)]
pub enum RuntimeError {
    #[error(transparent)]
    MagicMismatch(#[from] MagicMismatch),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    LengthMismatch(#[from] LengthMismatch),
}
