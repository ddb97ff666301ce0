//! Compiled intermediate representation — the output of
//! [`crate::schema::compile`], consumed by [`crate::engine`] and
//! [`crate::codegen`] alike (`spec.md` §9 Design Note (b)'s "compiled
//! intermediate representation").
use crate::record::{Record, Value};
use crate::schema::expr::Expr;
use crate::schema::layout::BitPlan;
use crate::schema::types::Container;

/// A literal used in a magic (`= literal`) check.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i128),
    Bytes(Vec<u8>),
}

/// One extra parameter declared at the schema's head (`spec.md` §3
/// "zero or more extra parameter declarations"), threaded positionally
/// into `get`/`put`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
}

/// How a single field's bits are read/written, folding `spec.md` §4.3's
/// five branches into one enum so [`crate::engine`] and
/// [`crate::codegen`] can both dispatch on it with one `match` each.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCodec {
    /// Whole-byte-aligned or sub-byte signed integer. `container` is the
    /// [`Container`] chosen once at compile time (`schema::types::container`)
    /// so the engine never re-derives it from `size` at runtime.
    SignedInt {
        size: u32,
        plan: BitPlan,
        container: Container,
    },
    /// Whole-byte-aligned or sub-byte unsigned integer.
    UnsignedInt {
        size: u32,
        plan: BitPlan,
        container: Container,
    },
    /// `f32`/`f64`, always whole-byte-aligned (size is a multiple of 8).
    Float { size: u32 },
    /// NUL-terminated string.
    NulString,
    /// Fixed-length byte string.
    FixedString { len: u32 },
    /// Reference to another compiled schema, registered by name.
    SubParser { schema: String, args: Vec<Expr> },
}

impl FieldCodec {
    /// `true` for the families §4.3 calls "whole-byte-aligned":
    /// `size % 8 == 0` and the entry bit offset is `0`.
    pub fn is_byte_aligned(&self) -> bool {
        match self {
            FieldCodec::SignedInt { size, plan, .. } | FieldCodec::UnsignedInt { size, plan, .. } => {
                size % 8 == 0 && plan.shift == 0 && plan.read_bytes == plan.skip_bytes
            }
            FieldCodec::Float { .. } | FieldCodec::NulString | FieldCodec::FixedString { .. } => {
                true
            }
            FieldCodec::SubParser { .. } => true,
        }
    }
}

/// How a sequence (`name[expr]` / `name[]`) is terminated.
#[derive(Debug, Clone, PartialEq)]
pub enum SeqTermination {
    /// `name[expr]`: read/write exactly `expr` elements.
    Count(Expr),
    /// `name[]`: read elements until the following magic field's bytes
    /// are peeked; write all buffered elements then the magic field.
    Magic,
}

/// What record slot (if any) a declaration produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// `name`: a single named field.
    Named(String),
    /// `_`: no record field is emitted.
    Anonymous,
}

/// One compiled field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan {
    pub slot: Slot,
    pub codec: FieldCodec,
    /// `Some` when this is a sequence (`name[...]`); the element reuses
    /// the same `codec`.
    pub sequence: Option<SeqTermination>,
    /// `Some` when this is a magic-checked field (`= literal`).
    pub magic: Option<Literal>,
    /// The read-side bit offset on entry to this declaration (`0..7`).
    pub read_entry_offset: u8,
    /// The write-side bit offset on entry to this declaration (`0..7`).
    pub write_entry_offset: u8,
}

impl FieldPlan {
    pub fn name(&self) -> Option<&str> {
        match &self.slot {
            Slot::Named(n) => Some(n.as_str()),
            Slot::Anonymous => None,
        }
    }
}

/// The fully-resolved schema: extra parameters plus an ordered list of
/// field plans, ready to drive [`crate::engine::get`]/[`crate::engine::put`]
/// or [`crate::codegen::emit`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    pub name: String,
    pub params: Vec<Param>,
    pub fields: Vec<FieldPlan>,
}

impl CompiledSchema {
    /// Look up an extra parameter's value by name among the arguments
    /// passed to `get`/`put`.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

/// A length-expression resolver closure reads from: extra parameters
/// plus fields already decoded/assembled, keyed by name.
pub fn resolve_against<'a>(
    params: &'a [Param],
    param_values: &'a [Value],
    fields_so_far: &'a Record,
) -> impl FnMut(&str) -> Option<i128> + 'a {
    move |name: &str| {
        if let Some(idx) = params.iter().position(|p| p.name == name) {
            return param_values.get(idx).and_then(Value::as_i128);
        }
        fields_so_far.get(name).and_then(Value::as_i128)
    }
}
