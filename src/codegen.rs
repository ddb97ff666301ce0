//! Build-time source generator — `spec.md` §9 Design Note (a).
//!
//! Grounded on the teacher's `build_core::gen_pgns::run_pgns_gen` /
//! `type_helpers`, which walk a manifest and `writeln!` Rust source into
//! a `String` destined for `OUT_DIR` and pulled in with `include!`. This
//! module does the same for one named schema: it emits a `get_<name>` /
//! `put_<name>` function pair a downstream crate's own `build.rs` can
//! write out and `include!`, exactly the pattern demonstrated in
//! `demos/quickstart.rs`.
//!
//! Unlike the teacher's `PgnDescriptor`, which is plain data (`&'static
//! str` names, fixed arrays) and so can be written out as a literal
//! `static`, a [`CompiledSchema`] owns `String`/`Vec`/`Box<Expr>` values
//! — it has no `const`-representable form. Rather than re-deriving every
//! `spec.md` §4.3 branch a second time as inlined generated bit-math
//! (duplicating `engine::get_field`/`put_field` verbatim in generated
//! text), the emitted functions embed the original schema source as a
//! string literal, compile it once into a `CompiledSchema` behind a
//! `OnceLock`, and delegate to [`crate::engine`]. This keeps the two
//! dispatches — interpreted and generated — in lock-step by
//! construction: there is only one `match` over `FieldCodec` in the
//! whole crate.
use std::fmt::Write;

use crate::schema::ir::CompiledSchema;

/// Emit a `get_<name>` / `put_<name>` function pair bound to `schema`'s
/// source text, for a downstream crate's `build.rs` to write to
/// `OUT_DIR` and `include!`.
///
/// `schema_source` is re-embedded verbatim (not re-derived from
/// `schema`) so the generated code and the [`CompiledSchema`] this
/// crate already validated compile from identical text.
pub fn emit(schema: &CompiledSchema, schema_source: &str) -> Result<String, std::fmt::Error> {
    let name = &schema.name;
    let mut out = String::new();

    writeln!(out, "// Generated by schemabin::codegen for schema {name:?}.")?;
    writeln!(out, "// {} field(s), {} extra parameter(s).", schema.fields.len(), schema.params.len())?;
    #[cfg(feature = "debug-echo")]
    log::trace!("codegen: emitting get_{name}/put_{name} for schema {name:?}");

    writeln!(out)?;
    writeln!(out, "static {}_SOURCE: &str = {:?};", name.to_uppercase(), schema_source)?;
    writeln!(
        out,
        "static {}_SCHEMA: ::std::sync::OnceLock<::schemabin::CompiledSchema> = ::std::sync::OnceLock::new();",
        name.to_uppercase()
    )?;
    writeln!(out)?;
    writeln!(out, "fn {name}_schema(registry: &::schemabin::SchemaRegistry) -> &'static ::schemabin::CompiledSchema {{")?;
    writeln!(
        out,
        "    {}_SCHEMA.get_or_init(|| ::schemabin::schema::compile({:?}, {}_SOURCE, registry).expect(\"schema embedded by codegen must compile\"))",
        name.to_uppercase(),
        name,
        name.to_uppercase()
    )?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(
        out,
        "pub fn get_{name}<S: ::schemabin::stream::Stream + ?Sized>(stream: &mut S, params: &[::schemabin::Value], registry: &::schemabin::SchemaRegistry) -> Result<::schemabin::Record, ::schemabin::RuntimeError> {{"
    )?;
    writeln!(out, "    ::schemabin::engine::get({name}_schema(registry), stream, params, registry)")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(
        out,
        "pub fn put_{name}<S: ::schemabin::stream::Stream + ?Sized>(stream: &mut S, record: &::schemabin::Record, params: &[::schemabin::Value], registry: &::schemabin::SchemaRegistry) -> Result<(), ::schemabin::RuntimeError> {{"
    )?;
    writeln!(out, "    ::schemabin::engine::put({name}_schema(registry), stream, record, params, registry)")?;
    writeln!(out, "}}")?;

    Ok(out)
}
