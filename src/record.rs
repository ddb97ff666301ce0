//! Runtime representation of a decoded record: a flat, insertion-ordered
//! tuple of named field values, plus the value enum fields are held in.
use indexmap::IndexMap;

/// One decoded field value. Containers match [`crate::schema::types::Container`]
/// one-for-one; `Seq` holds the elements of a repeated field and `Record` holds
/// the result of an embedded sub-parser call.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    /// A string field, NUL-terminated or fixed-length. Byte strings, per spec.
    Bytes(Vec<u8>),
    /// Elements of a `name[expr]` or `name[]` sequence.
    Seq(Vec<Value>),
    /// The record produced by an embedded sub-parser invocation.
    Record(Record),
}

impl Value {
    /// Interpret the value as a plain integer, for use in length expressions
    /// and sub-parser argument forwarding. Floats, bytes, sequences, and
    /// nested records have no integral reading and return `None`.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Value::I8(v) => v as i128,
            Value::I16(v) => v as i128,
            Value::I32(v) => v as i128,
            Value::I64(v) => v as i128,
            Value::U8(v) => v as i128,
            Value::U16(v) => v as i128,
            Value::U32(v) => v as i128,
            Value::U64(v) => v as i128,
            _ => return None,
        })
    }
}

/// A decoded (or to-be-encoded) record: named fields in declaration order.
/// Anonymous declarations (`_`) never appear here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Names in insertion order, for iterating a record generically.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
