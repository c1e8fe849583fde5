//! Decode Plan Benchmarks
//!
//! Measures the cost of applying a memoized decode plan across the shapes
//! this crate supports:
//!
//! - **Leaf decode**: strings, escaped strings, numbers, booleans
//! - **Container decode**: lists, maps, nested structs
//! - **Any-value decode**: heterogeneous input with no static shape
//! - **Plan resolution**: first-touch `describe::<T>()` vs. a warm cache hit
//! - **Deep/wide structures**: nesting depth and field count
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench leaf_decode
//! cargo bench deep_nesting
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use decode_plan::{decodable_struct, report_plan, unmarshal, AnyValue, Engine, EngineConfig};

#[derive(Debug, Default, PartialEq)]
struct Address {
    city: String,
    zip: String,
}

decodable_struct! {
    Address { city: String, zip: String }
}

#[derive(Debug, Default, PartialEq)]
struct Person {
    name: String,
    age: i64,
    active: bool,
    address: Address,
    tags: Vec<String>,
}

decodable_struct! {
    Person { name: String, age: i64, active: bool, address: Address, tags: Vec<String> }
}

#[derive(Debug, Default, PartialEq)]
struct Node {
    value: i64,
    next: Option<Box<Node>>,
}

decodable_struct! {
    Node { value: i64, next: Option<Box<Node>> }
}

// ============================================================================
// Leaf Decode Benchmarks
// ============================================================================

fn bench_leaf_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaf_decode");

    group.throughput(Throughput::Elements(1));
    group.bench_function("plain_string", |b| {
        b.iter(|| {
            let mut dest = String::new();
            unmarshal(black_box(br#""hello world""#), &mut dest).unwrap();
        });
    });

    group.bench_function("escaped_string", |b| {
        b.iter(|| {
            let mut dest = String::new();
            unmarshal(black_box(br#""line one\nline two\tend""#), &mut dest).unwrap();
        });
    });

    group.bench_function("integer", |b| {
        b.iter(|| {
            let mut dest = 0i64;
            unmarshal(black_box(b"-123456"), &mut dest).unwrap();
        });
    });

    group.bench_function("float", |b| {
        b.iter(|| {
            let mut dest = 0f64;
            unmarshal(black_box(b"-3.14159e10"), &mut dest).unwrap();
        });
    });

    group.bench_function("boolean", |b| {
        b.iter(|| {
            let mut dest = false;
            unmarshal(black_box(b"true"), &mut dest).unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Container Decode Benchmarks
// ============================================================================

fn bench_container_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_decode");

    let small_list = br#"[1, 2, 3, 4, 5]"#;
    group.bench_function("list_of_5_ints", |b| {
        b.iter(|| {
            let mut dest: Vec<i64> = Vec::new();
            unmarshal(black_box(small_list.as_slice()), &mut dest).unwrap();
        });
    });

    let large_list = {
        let mut s = String::from("[");
        for i in 0..500 {
            if i > 0 {
                s.push_str(", ");
            }
            s.push_str(&i.to_string());
        }
        s.push(']');
        s
    };
    group.bench_function("list_of_500_ints", |b| {
        b.iter(|| {
            let mut dest: Vec<i64> = Vec::new();
            unmarshal(black_box(large_list.as_bytes()), &mut dest).unwrap();
        });
    });

    let person_json =
        br#"{"name": "Ada", "age": 36, "active": true, "address": {"city": "London", "zip": "W1"}, "tags": ["mathematician", "programmer"]}"#;
    group.bench_function("nested_struct", |b| {
        b.iter(|| {
            let mut dest = Person::default();
            unmarshal(black_box(person_json.as_slice()), &mut dest).unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Any-value Decode Benchmarks
// ============================================================================

fn bench_any_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("any_decode");

    let mixed = br#"{"a": 1, "b": "two", "c": [true, null, 3.5], "d": {"nested": "value"}}"#;
    group.bench_function("mixed_object", |b| {
        b.iter(|| {
            let mut dest = AnyValue::default();
            unmarshal(black_box(mixed.as_slice()), &mut dest).unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Plan Resolution Benchmarks
// ============================================================================

fn bench_plan_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_resolution");

    group.bench_function("first_touch_describe", |b| {
        b.iter(|| {
            // A fresh engine each iteration forces first-touch plan
            // compilation rather than a warm cache hit.
            let engine = Engine::default();
            let mut dest = Person::default();
            engine
                .unmarshal(black_box(br#"{"name": "x", "age": 1}"#), &mut dest)
                .unwrap();
        });
    });

    group.bench_function("warm_cache_hit", |b| {
        let engine = Engine::default();
        let mut dest = Person::default();
        engine.unmarshal(br#"{"name": "x"}"#, &mut dest).unwrap();
        b.iter(|| {
            engine
                .unmarshal(black_box(br#"{"name": "y", "age": 2}"#), &mut dest)
                .unwrap();
        });
    });

    group.bench_function("report_plan", |b| {
        b.iter(|| {
            black_box(report_plan::<Person>());
        });
    });

    group.finish();
}

// ============================================================================
// Replace vs Append Benchmarks
// ============================================================================

fn bench_append_slices(c: &mut Criterion) {
    let mut group = c.benchmark_group("append_slices");

    let replace_engine = Engine::default();
    group.bench_function("replace_existing_list", |b| {
        b.iter(|| {
            let mut dest = vec!["a".to_string(), "b".to_string(), "c".to_string()];
            replace_engine
                .unmarshal(black_box(br#"["d", "e"]"#), &mut dest)
                .unwrap();
        });
    });

    let append_engine = Engine::new(EngineConfig {
        append_slices: true,
        ..EngineConfig::default()
    });
    group.bench_function("append_to_existing_list", |b| {
        b.iter(|| {
            let mut dest = vec!["a".to_string(), "b".to_string(), "c".to_string()];
            append_engine
                .unmarshal(black_box(br#"["d", "e"]"#), &mut dest)
                .unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Deep / Wide Structure Benchmarks
// ============================================================================

fn bench_deep_nesting(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_nesting");
    group.sample_size(50);

    for depth in [5, 10, 25, 50].iter() {
        let mut json = String::new();
        for _ in 0..*depth {
            json.push_str(r#"{"value": 1, "next": "#);
        }
        json.push_str("null");
        for _ in 0..*depth {
            json.push('}');
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{depth}_levels")),
            &json,
            |b, json| {
                b.iter(|| {
                    let mut dest = Node::default();
                    unmarshal(black_box(json.as_bytes()), &mut dest).unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_wide_object(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_object");

    let mut json = String::from("{");
    for i in 0..50 {
        if i > 0 {
            json.push_str(", ");
        }
        json.push_str(&format!(r#""field{i}": "value{i}""#));
    }
    json.push('}');

    group.bench_function("50_unmatched_keys", |b| {
        b.iter(|| {
            // None of these keys match `Address`'s two fields, so every
            // entry falls through to the `AnyValue`-skip fallback path.
            let mut dest = Address::default();
            unmarshal(black_box(json.as_bytes()), &mut dest).unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_leaf_decode,
    bench_container_decode,
    bench_any_decode,
    bench_plan_resolution,
    bench_append_slices,
    bench_deep_nesting,
    bench_wide_object,
);

criterion_main!(benches);
