// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Exactly-once codec generation under concurrent first access.

use artisan_extensions::{CodecRegistry, PrimitiveKind, TypeDescriptorBuilder, ValueKind};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 16;

#[test]
fn concurrent_first_requests_share_one_codec() {
    let _ = env_logger::try_init();

    let registry = CodecRegistry::new();
    let desc = TypeDescriptorBuilder::new("Telemetry")
        .field("stamp", PrimitiveKind::U64)
        .sequence_field("readings", PrimitiveKind::F32)
        .build()
        .unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = registry.clone();
            let desc = desc.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.get_or_create(&desc).unwrap()
            })
        })
        .collect();

    let codecs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for codec in &codecs[1..] {
        assert!(Arc::ptr_eq(&codecs[0], codec));
    }

    let stats = registry.stats();
    assert_eq!(stats.generations, 1);
    assert_eq!(stats.failures, 0);
    assert_eq!(stats.hits + stats.misses, THREADS as u64);
}

#[test]
fn concurrent_requests_through_shared_dependency() {
    let registry = CodecRegistry::new();
    let point = TypeDescriptorBuilder::new("Point")
        .field("x", PrimitiveKind::I32)
        .field("y", PrimitiveKind::I32)
        .build()
        .unwrap();
    registry.register(point.clone()).unwrap();

    let users: Vec<_> = (0..4)
        .map(|i| {
            TypeDescriptorBuilder::new(format!("Shape{}", i))
                .sequence_field("corners", ValueKind::nested("Point"))
                .build()
                .unwrap()
        })
        .collect();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = registry.clone();
            let desc = users[i % users.len()].clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.get_or_create(&desc).unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // One codec per shape plus the shared point.
    assert_eq!(registry.stats().generations, 5);
    assert_eq!(registry.len(), 5);
    let point_codec = registry.get(&point).unwrap();
    for desc in &users {
        let codec = registry.get(desc).unwrap();
        assert_eq!(codec.dependencies(), &[point_codec.key()]);
    }
}

#[test]
fn failed_generation_can_be_retried() {
    let registry = CodecRegistry::new();
    let path = TypeDescriptorBuilder::new("Path")
        .nested_field("start", "Point")
        .build()
        .unwrap();
    assert!(registry.get_or_create(&path).is_err());
    assert!(registry.is_empty());

    let point = TypeDescriptorBuilder::new("Point")
        .field("x", PrimitiveKind::I32)
        .build()
        .unwrap();
    registry.register(point).unwrap();
    let codec = registry.get_or_create(&path).unwrap();
    assert_eq!(codec.dependencies().len(), 1);
}

#[test]
fn cached_codec_stays_visible_during_concurrent_lookups() {
    const ROUNDS: usize = 2_000;

    let registry = CodecRegistry::new();
    let desc = TypeDescriptorBuilder::new("Sample")
        .field("id", PrimitiveKind::U32)
        .build()
        .unwrap();
    let installed = registry.get_or_create(&desc).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = registry.clone();
            let desc = desc.clone();
            let installed = Arc::clone(&installed);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS {
                    if i % 2 == 0 {
                        let codec = registry.get_or_create(&desc).unwrap();
                        assert!(Arc::ptr_eq(&codec, &installed));
                    } else {
                        let codec = registry.get(&desc).expect("cached codec");
                        assert!(Arc::ptr_eq(&codec, &installed));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = registry.stats();
    assert_eq!(stats.generations, 1);
    assert_eq!(stats.hits, (THREADS / 2 * ROUNDS) as u64);
}
