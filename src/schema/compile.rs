//! Schema compiler — `spec.md` §4.4 / §4.5.
//!
//! Walks a [`crate::schema::parser::RawSchema`] exactly once, threading
//! a running bit offset, a `seen_fields` list for length-expression
//! validation, and producing a [`CompiledSchema`]. Grounded on the
//! teacher's `build_core::gen_pgns`, which performs the analogous
//! single pass over a PGN manifest, accumulating a `Vec<FieldDescriptor>`
//! while validating field names and repeat-set shapes as it goes.
use log::debug;

use crate::error::CompileError;
use crate::registry::SchemaRegistry;
use crate::schema::expr::Expr;
use crate::schema::ir::{CompiledSchema, FieldCodec, FieldPlan, Literal, Param, SeqTermination, Slot};
use crate::schema::layout::plan_bits;
use crate::schema::parser::{self, RawField, RawKind, RawSchema};
use crate::schema::types::{self, TypeDecl};

/// Compile schema source text into a [`CompiledSchema`] named `name`,
/// resolving any `*schema(args…)` sub-parser references against
/// `registry`.
pub fn compile(
    name: &str,
    source: &str,
    registry: &SchemaRegistry,
) -> Result<CompiledSchema, CompileError> {
    let raw: RawSchema = parser::parse(source)?;

    let mut params = Vec::with_capacity(raw.params.len());
    for p in &raw.params {
        types::decode(&p.type_text)?;
        params.push(Param {
            name: p.name.clone(),
        });
    }

    let mut seen_fields: Vec<String> = Vec::new();
    let mut fields: Vec<FieldPlan> = Vec::with_capacity(raw.fields.len());
    let mut offset: u8 = 0;

    for (i, rf) in raw.fields.iter().enumerate() {
        let type_decl = types::decode(&rf.type_text)?;
        let field_name = slot_name_or_anon(rf);

        if let RawKind::Named(n) | RawKind::SeqCount(n, _) | RawKind::SeqOpen(n) = &rf.kind {
            if seen_fields.iter().any(|s| s == n) {
                return Err(CompileError::DuplicateFieldName { name: n.clone() });
            }
        }

        let requires_byte_alignment = matches!(
            type_decl,
            TypeDecl::NulString | TypeDecl::FixedString { .. } | TypeDecl::SubParser { .. }
        );
        if requires_byte_alignment && offset != 0 {
            return Err(CompileError::StringNotByteAligned {
                name: field_name.clone(),
                offset,
            });
        }

        if let RawKind::SeqOpen(_) = &rf.kind {
            match raw.fields.get(i + 1) {
                Some(next) if next.magic_text.is_some() => {}
                _ => {
                    return Err(CompileError::OpenSequenceWithoutMagic {
                        name: field_name.clone(),
                    })
                }
            }
        }

        if let TypeDecl::SubParser { schema, args } = &type_decl {
            if !registry.contains(schema) {
                return Err(CompileError::UnknownSchema {
                    name: field_name.clone(),
                    schema: schema.clone(),
                });
            }
            for arg in args {
                validate_identifiers(arg, &seen_fields, &params, &field_name)?;
            }
        }

        let magic = match &rf.magic_text {
            Some(text) => Some(parser::parse_literal_text(text)?),
            None => None,
        };
        if let Some(Literal::Bytes(lit)) = &magic {
            if lit.is_empty() {
                return Err(CompileError::EmptyMagicLiteral {
                    name: field_name.clone(),
                });
            }
        }

        let codec = build_codec(&type_decl, offset, &magic);

        let sequence = match &rf.kind {
            RawKind::SeqCount(_, expr_text) => {
                let expr = crate::schema::expr::parse(expr_text)?;
                validate_identifiers(&expr, &seen_fields, &params, &field_name)?;
                Some(SeqTermination::Count(expr))
            }
            RawKind::SeqOpen(_) => Some(SeqTermination::Magic),
            _ => None,
        };

        let slot = match &rf.kind {
            RawKind::Anonymous => Slot::Anonymous,
            RawKind::Named(n) | RawKind::SeqCount(n, _) | RawKind::SeqOpen(n) => {
                Slot::Named(n.clone())
            }
        };

        debug!(
            "field {:?}: codec={:?} entry_offset={} sequence={:?} magic={:?}",
            field_name, codec, offset, sequence, magic
        );

        let entry_offset = offset;
        offset = exit_offset(&type_decl, &sequence, offset);

        fields.push(FieldPlan {
            slot: slot.clone(),
            codec,
            sequence,
            magic,
            read_entry_offset: entry_offset,
            write_entry_offset: entry_offset,
        });

        if let Slot::Named(n) = &slot {
            seen_fields.push(n.clone());
        }
    }

    Ok(CompiledSchema {
        name: name.to_string(),
        params,
        fields,
    })
}

fn slot_name_or_anon(rf: &RawField) -> String {
    match &rf.kind {
        RawKind::Anonymous => "_".to_string(),
        RawKind::Named(n) | RawKind::SeqCount(n, _) | RawKind::SeqOpen(n) => n.clone(),
    }
}

fn validate_identifiers(
    expr: &Expr,
    seen_fields: &[String],
    params: &[Param],
    field_name: &str,
) -> Result<(), CompileError> {
    for id in expr.identifiers() {
        let known = seen_fields.iter().any(|s| s == id) || params.iter().any(|p| p.name == id);
        if !known {
            return Err(CompileError::UnknownIdentifier {
                name: field_name.to_string(),
                identifier: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Builds the [`FieldCodec`] for one declaration. A NUL-terminated
/// string carrying a magic literal has its size inferred from the
/// literal's byte length (`spec.md` §4.4: "For string magic, size is
/// inferred from the literal's byte length") — it becomes, in effect, a
/// fixed-length read of exactly those bytes rather than a NUL search.
fn build_codec(type_decl: &TypeDecl, offset: u8, magic: &Option<Literal>) -> FieldCodec {
    match type_decl {
        TypeDecl::SignedInt { size } => FieldCodec::SignedInt {
            size: *size,
            plan: plan_bits(*size, offset),
            container: type_decl.container(),
        },
        TypeDecl::UnsignedInt { size } => FieldCodec::UnsignedInt {
            size: *size,
            plan: plan_bits(*size, offset),
            container: type_decl.container(),
        },
        TypeDecl::Float { size } => FieldCodec::Float { size: *size },
        TypeDecl::NulString => match magic {
            Some(Literal::Bytes(lit)) => FieldCodec::FixedString {
                len: lit.len() as u32,
            },
            _ => FieldCodec::NulString,
        },
        TypeDecl::FixedString { len } => FieldCodec::FixedString { len: *len },
        TypeDecl::SubParser { schema, args } => FieldCodec::SubParser {
            schema: schema.clone(),
            args: args.clone(),
        },
    }
}

/// Computes the bit offset the *next* declaration enters at.
///
/// For a single whole-byte or sub-byte value this is exactly
/// `plan_bits(..).exit_offset`. For a sequence whose element width is a
/// multiple of 8 (or a string/sub-parser element), every element
/// re-enters at offset 0, so the exit offset is unconditionally 0. For a
/// sub-byte sequence with a literal element count, the exact exit offset
/// is computed by walking the plan `count` times; with a non-literal
/// count (the general case), this compiler assumes the schema author
/// sized the sequence to a whole number of bit-cycles (`spec.md` §3's
/// own invariant) and leaves the offset unchanged — `crate::engine`
/// never relies on this value at runtime, since its bit accumulator
/// tracks the true offset dynamically regardless (`spec.md` §9's
/// blessed alternative to textual unrolling).
fn exit_offset(type_decl: &TypeDecl, sequence: &Option<SeqTermination>, entry_offset: u8) -> u8 {
    let element_bits = type_decl.wire_bits();
    match sequence {
        None => {
            if matches!(
                type_decl,
                TypeDecl::NulString | TypeDecl::FixedString { .. } | TypeDecl::SubParser { .. }
            ) {
                0
            } else {
                plan_bits(element_bits.max(1), entry_offset).exit_offset
            }
        }
        Some(SeqTermination::Count(Expr::Literal(n))) if element_bits % 8 != 0 => {
            let mut off = entry_offset;
            for _ in 0..*n {
                off = plan_bits(element_bits, off).exit_offset;
            }
            off
        }
        Some(_) => {
            if element_bits % 8 != 0 {
                entry_offset
            } else {
                0
            }
        }
    }
}
