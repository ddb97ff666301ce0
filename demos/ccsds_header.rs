//! Round-trips the CCSDS space-packet primary header `spec.md` §4.2 and
//! §8 use as their running example: three sub-byte fields followed by
//! an 11-bit APID, all packed into two bytes.
//!
//! Run with `cargo run --example ccsds_header`.
use schemabin::schema::compile;
use schemabin::stream::VecStream;
use schemabin::{Record, SchemaRegistry, Value};

fn main() {
    let registry = SchemaRegistry::new();
    let schema = compile(
        "ccsds_primary_header",
        "u3: version; u1: packet_type; u1: secondary_header; u11: apid",
        &registry,
    )
    .expect("schema text is valid");

    let mut record = Record::new();
    record.insert("version", Value::U8(0));
    record.insert("packet_type", Value::U8(0));
    record.insert("secondary_header", Value::U8(1));
    record.insert("apid", Value::U16(6));

    let mut stream = VecStream::new();
    schemabin::engine::put(&schema, &mut stream, &record, &[], &registry).expect("encode");
    println!("encoded bytes: {:02x?}", stream.as_slice());
    assert_eq!(stream.as_slice(), &[0x08, 0x06]);

    stream.set_position(0);
    let decoded = schemabin::engine::get(&schema, &mut stream, &[], &registry).expect("decode");
    println!("decoded: {decoded:?}");
    assert_eq!(decoded, record);
}
