//! Routing benchmarks.
//!
//! Run with: `cargo bench -p heron-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use heron_router::RoutingTree;
use http::Method;

fn build_tree(num_routes: usize) -> RoutingTree<String> {
    let mut tree = RoutingTree::new();

    // Static routes
    for i in 0..num_routes / 3 {
        tree.register("GET", &format!("/api/v1/resource{i}"), format!("getResource{i}"))
            .expect("unique route");
    }

    // Single-segment wildcard routes
    for i in 0..num_routes / 3 {
        tree.register("GET", &format!("/api/v1/resource{i}/*"), format!("getResourceById{i}"))
            .expect("unique route");
    }

    // Deep wildcard routes
    for i in 0..num_routes / 3 {
        tree.register("*", &format!("/assets/bundle{i}/**"), format!("assets{i}"))
            .expect("unique route");
    }

    tree
}

fn bench_static_match(c: &mut Criterion) {
    let tree = build_tree(100);

    c.bench_function("static_match", |b| {
        b.iter(|| {
            black_box(tree.lookup(&Method::GET, "/api/v1/resource20"));
        });
    });
}

fn bench_wildcard_match(c: &mut Criterion) {
    let tree = build_tree(100);

    c.bench_function("wildcard_match", |b| {
        b.iter(|| {
            black_box(tree.lookup(&Method::GET, "/api/v1/resource25/12345"));
        });
    });
}

fn bench_deep_wildcard_match(c: &mut Criterion) {
    let tree = build_tree(100);

    c.bench_function("deep_wildcard_match", |b| {
        b.iter(|| {
            black_box(tree.lookup(&Method::GET, "/assets/bundle10/css/vendor/site.css"));
        });
    });
}

fn bench_miss(c: &mut Criterion) {
    let tree = build_tree(100);

    c.bench_function("miss", |b| {
        b.iter(|| {
            black_box(tree.lookup(&Method::GET, "/api/v2/nonexistent/path"));
        });
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_size");

    for size in [30, 300, 3000] {
        let tree = build_tree(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &tree, |b, tree| {
            b.iter(|| black_box(tree.lookup(&Method::GET, "/api/v1/resource5/99")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_static_match,
    bench_wildcard_match,
    bench_deep_wildcard_match,
    bench_miss,
    bench_scaling
);
criterion_main!(benches);
