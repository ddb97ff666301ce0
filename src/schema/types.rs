//! Type-token decoder — `spec.md` §4.1.
//!
//! Resolves a single type-token (the text before `:` in a field
//! declaration) into a [`TypeDecl`]. Grounded on the teacher's own
//! `build_core::type_helpers`, which maps a PGN manifest's `fieldType`
//! string onto a `(bit-width, container)` pair the same way.
use crate::error::CompileError;
use crate::schema::expr::Expr;

/// The decoded shape of one type-token, before the schema compiler has
/// seen the field's bit offset (so before a [`crate::record::Value`]
/// container is chosen for an integer — that still needs `size`).
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDecl {
    /// Bare integer literal token: signed integer of `size` bits.
    SignedInt { size: u32 },
    /// `u<N>`: unsigned integer of `size` bits.
    UnsignedInt { size: u32 },
    /// `f32` / `f64`.
    Float { size: u32 },
    /// `s`: NUL-terminated string.
    NulString,
    /// `s<N>`: fixed `len`-byte string.
    FixedString { len: u32 },
    /// `*name(args…)`: reference to another compiled schema.
    SubParser { schema: String, args: Vec<Expr> },
}

/// The machine-integer (or float/byte-string) type a decoded field's
/// value is held in at runtime, one variant per [`crate::record::Value`]
/// scalar case — the glossary's "`Container` — the machine-integer type
/// used to hold a field's value in the record, sized to the next
/// power-of-two ≥ the field's bit width." Chosen once at compile time by
/// [`TypeDecl::container`] and carried inside [`crate::schema::ir::FieldCodec`]
/// so the engine never has to re-derive it from a bit width at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bytes,
}

impl TypeDecl {
    /// The bit width actually occupied on the wire. `0` for NUL strings
    /// (length is data-dependent) and sub-parsers (delegated entirely).
    pub fn wire_bits(&self) -> u32 {
        match *self {
            TypeDecl::SignedInt { size } | TypeDecl::UnsignedInt { size } => size,
            TypeDecl::Float { size } => size,
            TypeDecl::FixedString { len } => len * 8,
            TypeDecl::NulString | TypeDecl::SubParser { .. } => 0,
        }
    }

    /// The runtime [`Container`] this type-token's values are held in.
    /// `Bytes` for strings; sub-parsers have no single container (their
    /// value is a nested [`crate::record::Record`]) and are never routed
    /// through this method — callers dispatch on `FieldCodec::SubParser`
    /// before needing one.
    pub fn container(&self) -> Container {
        match *self {
            TypeDecl::SignedInt { size } => match next_container_width(size) {
                8 => Container::I8,
                16 => Container::I16,
                32 => Container::I32,
                _ => Container::I64,
            },
            TypeDecl::UnsignedInt { size } => match next_container_width(size) {
                8 => Container::U8,
                16 => Container::U16,
                32 => Container::U32,
                _ => Container::U64,
            },
            TypeDecl::Float { size: 32 } => Container::F32,
            TypeDecl::Float { .. } => Container::F64,
            TypeDecl::NulString | TypeDecl::FixedString { .. } | TypeDecl::SubParser { .. } => {
                Container::Bytes
            }
        }
    }
}

fn next_container_width(size: u32) -> u32 {
    match size {
        0 => 0,
        1..=8 => 8,
        9..=16 => 16,
        17..=32 => 32,
        _ => 64,
    }
}

/// Parse one type-token's text (e.g. `"8"`, `"u16"`, `"f32"`, `"s"`,
/// `"s<4>"`, `"*list(size)"`) into a [`TypeDecl`].
pub fn decode(token: &str) -> Result<TypeDecl, CompileError> {
    let token = token.trim();
    if let Some(rest) = token.strip_prefix('*') {
        return decode_sub_parser(rest);
    }
    if token == "f32" {
        return Ok(TypeDecl::Float { size: 32 });
    }
    if token == "f64" {
        return Ok(TypeDecl::Float { size: 64 });
    }
    if let Some(rest) = token.strip_prefix('f') {
        let size = parse_width(token, rest)?;
        return Err(CompileError::UnsupportedFloatWidth { size });
    }
    if token == "s" {
        return Ok(TypeDecl::NulString);
    }
    if let Some(rest) = token.strip_prefix('s') {
        let len = parse_angle_width(token, rest)?;
        return Ok(TypeDecl::FixedString { len });
    }
    if let Some(rest) = token.strip_prefix('u') {
        let size = parse_width(token, rest)?;
        if size == 0 {
            return Err(CompileError::ZeroWidthField);
        }
        if size > 64 {
            return Err(CompileError::IntegerWidthOutOfRange { size });
        }
        return Ok(TypeDecl::UnsignedInt { size });
    }
    if let Ok(size) = token.parse::<u32>() {
        if size == 0 {
            return Err(CompileError::ZeroWidthField);
        }
        if size > 64 {
            return Err(CompileError::IntegerWidthOutOfRange { size });
        }
        return Ok(TypeDecl::SignedInt { size });
    }
    Err(CompileError::UnknownTypeToken {
        token: token.to_string(),
    })
}

fn parse_width(token: &str, rest: &str) -> Result<u32, CompileError> {
    rest.parse::<u32>()
        .map_err(|_| CompileError::UnknownTypeToken {
            token: token.to_string(),
        })
}

/// Parses the `<N>` in `s<N>`.
fn parse_angle_width(token: &str, rest: &str) -> Result<u32, CompileError> {
    let inner = rest
        .strip_prefix('<')
        .and_then(|r| r.strip_suffix('>'))
        .ok_or_else(|| CompileError::UnknownTypeToken {
            token: token.to_string(),
        })?;
    inner
        .trim()
        .parse::<u32>()
        .map_err(|_| CompileError::UnknownTypeToken {
            token: token.to_string(),
        })
}

fn decode_sub_parser(rest: &str) -> Result<TypeDecl, CompileError> {
    let open = rest.find('(').ok_or_else(|| CompileError::UnknownTypeToken {
        token: format!("*{rest}"),
    })?;
    let close = rest.rfind(')').ok_or_else(|| CompileError::UnknownTypeToken {
        token: format!("*{rest}"),
    })?;
    if close < open {
        return Err(CompileError::UnknownTypeToken {
            token: format!("*{rest}"),
        });
    }
    let schema = rest[..open].trim().to_string();
    let args_text = &rest[open + 1..close];
    let args = if args_text.trim().is_empty() {
        Vec::new()
    } else {
        args_text
            .split(',')
            .map(|a| crate::schema::expr::parse(a.trim()))
            .collect::<Result<Vec<_>, _>>()?
    };
    Ok(TypeDecl::SubParser { schema, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_integer_is_signed() {
        assert_eq!(decode("8").unwrap(), TypeDecl::SignedInt { size: 8 });
        assert_eq!(decode("3").unwrap(), TypeDecl::SignedInt { size: 3 });
    }

    #[test]
    fn u_prefix_is_unsigned() {
        assert_eq!(decode("u16").unwrap(), TypeDecl::UnsignedInt { size: 16 });
    }

    #[test]
    fn floats_are_32_or_64_only() {
        assert_eq!(decode("f32").unwrap(), TypeDecl::Float { size: 32 });
        assert_eq!(decode("f64").unwrap(), TypeDecl::Float { size: 64 });
        assert!(decode("f16").is_err());
    }

    #[test]
    fn strings() {
        assert_eq!(decode("s").unwrap(), TypeDecl::NulString);
        assert_eq!(decode("s<4>").unwrap(), TypeDecl::FixedString { len: 4 });
    }

    #[test]
    fn sub_parser_reference() {
        let decl = decode("*list(size)").unwrap();
        match decl {
            TypeDecl::SubParser { schema, args } => {
                assert_eq!(schema, "list");
                assert_eq!(args.len(), 1);
            }
            _ => panic!("expected SubParser"),
        }
    }

    #[test]
    fn zero_and_oversized_widths_fail() {
        assert!(decode("0").is_err());
        assert!(decode("u0").is_err());
        assert!(decode("u65").is_err());
        assert!(decode("65").is_err());
    }

    #[test]
    fn unknown_token_fails() {
        assert!(decode("bogus").is_err());
    }

    #[test]
    fn signed_container_picks_the_smallest_fit() {
        assert_eq!(TypeDecl::SignedInt { size: 3 }.container(), Container::I8);
        assert_eq!(TypeDecl::SignedInt { size: 8 }.container(), Container::I8);
        assert_eq!(TypeDecl::SignedInt { size: 11 }.container(), Container::I16);
        assert_eq!(TypeDecl::SignedInt { size: 32 }.container(), Container::I32);
        assert_eq!(TypeDecl::SignedInt { size: 57 }.container(), Container::I64);
    }

    #[test]
    fn unsigned_container_picks_the_smallest_fit() {
        assert_eq!(decode("u16").unwrap().container(), Container::U16);
        assert_eq!(decode("u32").unwrap().container(), Container::U32);
        assert_eq!(decode("u64").unwrap().container(), Container::U64);
    }

    #[test]
    fn float_and_string_containers() {
        assert_eq!(decode("f32").unwrap().container(), Container::F32);
        assert_eq!(decode("f64").unwrap().container(), Container::F64);
        assert_eq!(decode("s").unwrap().container(), Container::Bytes);
        assert_eq!(decode("s<4>").unwrap().container(), Container::Bytes);
    }
}
