// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Recursive types through indirect references, schema loading, and
// invalidation of lazily resolved codecs.

use artisan_extensions::{
    ArtisanError, CodecRegistry, DecodeLimits, FormatError, GenerationError, RegistryConfig,
    SchemaError, Value,
};

const LIST: &str = "
    // singly linked list
    struct Node {
        value: i32;
        next: optional ref Node;
    }
";

fn list(values: &[i32]) -> Value {
    values.iter().rev().fold(Value::Null, |next, v| {
        Value::structure([("value", Value::I32(*v)), ("next", next)])
    })
}

#[test]
fn recursive_list_round_trips() {
    let _ = env_logger::try_init();

    let registry = CodecRegistry::new();
    registry.load_schema(LIST).unwrap();
    let codec = registry.get_or_create_by_name("Node").unwrap();

    let value = list(&[1, 2, 3]);
    let bytes = codec.encode_to_vec(&value).unwrap();
    assert_eq!(
        bytes,
        [
            0x00, 0x00, 0x00, 0x01, 0x01, //
            0x00, 0x00, 0x00, 0x02, 0x01, //
            0x00, 0x00, 0x00, 0x03, 0x00,
        ]
    );
    assert_eq!(codec.decode_from_slice(&bytes).unwrap(), value);
    assert!(codec.dependencies().is_empty());
}

#[test]
fn depth_limit_stops_deep_input() {
    let registry = CodecRegistry::with_config(RegistryConfig {
        limits: DecodeLimits::default().with_max_depth(3),
    });
    registry.load_schema(LIST).unwrap();
    let codec = registry.get_or_create_by_name("Node").unwrap();

    let shallow = codec.encode_to_vec(&list(&[1, 2, 3])).unwrap();
    assert!(codec.decode_from_slice(&shallow).is_ok());

    // Written by a peer with wider limits.
    let mut deep = Vec::new();
    codec
        .encode_with_limits(&list(&[1, 2, 3, 4]), &mut deep, DecodeLimits::default())
        .unwrap();
    assert!(matches!(
        codec.decode_from_slice(&deep),
        Err(ArtisanError::Format(FormatError::DepthExceeded(3)))
    ));
}

#[test]
fn encode_refuses_values_deeper_than_decode_accepts() {
    let registry = CodecRegistry::new();
    registry.load_schema(LIST).unwrap();
    let codec = registry.get_or_create_by_name("Node").unwrap();
    let max_depth = codec.limits().max_depth;

    let values: Vec<i32> = (0..max_depth as i32).collect();
    let bytes = codec.encode_to_vec(&list(&values)).unwrap();
    assert_eq!(bytes.len(), 5 * max_depth);
    assert_eq!(codec.decode_from_slice(&bytes).unwrap(), list(&values));

    let values: Vec<i32> = (0..=max_depth as i32).collect();
    assert!(matches!(
        codec.encode_to_vec(&list(&values)),
        Err(ArtisanError::Format(FormatError::DepthExceeded(d))) if d == max_depth
    ));

    let shallow = CodecRegistry::with_config(RegistryConfig {
        limits: DecodeLimits::default().with_max_depth(3),
    });
    shallow.load_schema(LIST).unwrap();
    let codec = shallow.get_or_create_by_name("Node").unwrap();
    assert!(codec.encode_to_vec(&list(&[1, 2, 3])).is_ok());
    assert!(matches!(
        codec.encode_to_vec(&list(&[1, 2, 3, 4])),
        Err(ArtisanError::Format(FormatError::DepthExceeded(3)))
    ));
}

#[test]
fn inline_cycle_is_rejected_at_load() {
    let registry = CodecRegistry::new();
    let err = registry
        .load_schema("struct A { b: B; } struct B { a: A; }")
        .unwrap_err();
    assert!(matches!(err, SchemaError::Descriptor(_)));
    assert!(registry.descriptor("A").is_none());
}

#[test]
fn schema_with_unions_and_forward_references() {
    let registry = CodecRegistry::new();
    registry
        .load_schema(
            "
            struct Drawing { shapes: seq<Shape, 8>; }
            union Shape {
                Circle { center: Point; radius: f32; }
                Empty = 9;
            }
            struct Point { x: i16; y: i16; }
            ",
        )
        .unwrap();
    let codec = registry.get_or_create_by_name("Drawing").unwrap();

    let value = Value::structure([(
        "shapes",
        Value::Sequence(vec![
            Value::variant(
                "Circle",
                [
                    (
                        "center",
                        Value::structure([("x", Value::I16(-1)), ("y", Value::I16(2))]),
                    ),
                    ("radius", Value::F32(1.0)),
                ],
            ),
            Value::unit_variant("Empty"),
        ]),
    )]);
    let bytes = codec.encode_to_vec(&value).unwrap();
    assert_eq!(
        bytes,
        [
            0x00, 0x00, 0x00, 0x02, //
            0x00, 0xFF, 0xFF, 0x00, 0x02, 0x3F, 0x80, 0x00, 0x00, //
            0x09,
        ]
    );
    assert_eq!(codec.decode_from_slice(&bytes).unwrap(), value);
    assert_eq!(registry.len(), 3);
}

#[test]
fn lazy_reference_follows_replacement() {
    let registry = CodecRegistry::new();
    registry
        .load_schema("struct Holder { item: optional ref Item; } struct Item { a: u8; }")
        .unwrap();
    let holder = registry.get_or_create_by_name("Holder").unwrap();

    let with_item = |fields: Vec<(&str, Value)>| {
        Value::structure([("item", Value::structure(fields))])
    };
    let bytes = holder
        .encode_to_vec(&with_item(vec![("a", Value::U8(5))]))
        .unwrap();
    assert_eq!(bytes, [0x01, 0x05]);

    let wider = artisan_extensions::TypeDescriptorBuilder::new("Item")
        .field("a", artisan_extensions::PrimitiveKind::U8)
        .field("b", artisan_extensions::PrimitiveKind::U8)
        .build()
        .unwrap();
    registry.get_or_create(&wider).unwrap();

    let bytes = holder
        .encode_to_vec(&with_item(vec![("a", Value::U8(5)), ("b", Value::U8(6))]))
        .unwrap();
    assert_eq!(bytes, [0x01, 0x05, 0x06]);
}

#[test]
fn dropped_registry_fails_lazy_resolution() {
    let registry = CodecRegistry::new();
    registry.load_schema(LIST).unwrap();
    let codec = registry.get_or_create_by_name("Node").unwrap();
    drop(registry);

    assert!(codec.encode_to_vec(&list(&[1])).is_ok());
    assert!(matches!(
        codec.encode_to_vec(&list(&[1, 2])),
        Err(ArtisanError::Generation(GenerationError::RegistryDropped { .. }))
    ));
}
