//! `schemabin`: a declarative binary-format compiler. A terse schema
//! describing a binary record's byte- and bit-level layout compiles
//! into a matched reader/writer codec pair — `get` consumes a byte
//! stream and yields a structured [`record::Record`], `put` consumes a
//! record and emits the exact byte sequence. The two are inverses of
//! each other for well-formed input.
//!
//! Two ways to run a compiled schema, both built on the same
//! [`schema::CompiledSchema`] intermediate representation:
//! - [`engine`] interprets it directly against any [`stream::Stream`].
//! - [`codegen`] emits Rust source text for a downstream crate's own
//!   `build.rs`, for callers who want the schema baked into a fixed
//!   struct ahead of time rather than interpreted at call time.
pub mod bits;
pub mod codegen;
pub mod engine;
pub mod error;
pub mod record;
pub mod registry;
pub mod schema;
pub mod stream;

pub use error::{CompileError, RuntimeError};
pub use record::{Record, Value};
pub use registry::SchemaRegistry;
pub use schema::CompiledSchema;
