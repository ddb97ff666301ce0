//! Quickstart: compile a schema once, then either interpret it directly
//! with [`schemabin::engine`] or hand the generated source text to a
//! downstream `build.rs` via [`schemabin::codegen`].
//!
//! Run with `cargo run --example quickstart`.
use schemabin::schema::compile;
use schemabin::stream::VecStream;
use schemabin::{Record, SchemaRegistry, Value};

const SOURCE: &str = r#"u8: count; 8: samples[count]; s: label"#;

fn main() {
    let registry = SchemaRegistry::new();
    let schema = compile("reading", SOURCE, &registry).expect("schema text is valid");

    let mut record = Record::new();
    record.insert("count", Value::U8(3));
    record.insert(
        "samples",
        Value::Seq(vec![Value::I8(10), Value::I8(20), Value::I8(30)]),
    );
    record.insert("label", Value::Bytes(b"sensor-a".to_vec()));

    let mut stream = VecStream::new();
    schemabin::engine::put(&schema, &mut stream, &record, &[], &registry).expect("encode");
    println!("encoded: {:02x?}", stream.as_slice());

    stream.set_position(0);
    let decoded = schemabin::engine::get(&schema, &mut stream, &[], &registry).expect("decode");
    assert_eq!(decoded, record);
    println!("decoded: {decoded:?}");

    // A downstream build.rs would instead do this at compile time and
    // write the result to `OUT_DIR`, then `include!` it:
    let generated = schemabin::codegen::emit(&schema, SOURCE).expect("formatting never fails here");
    println!("\n--- generated source ---\n{generated}");
}
