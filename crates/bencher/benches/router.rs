use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dispatch_http::connection::Connection;
use dispatch_http::protocol::HttpMethod;
use dispatch_web::Router;
use dispatch_web::handler_fn;
use dispatch_web::pattern::RoutePattern;
use dispatch_web::router::{any, get, post};

fn noop(_conn: &mut Connection) {}

fn create_router() -> Router {
    Router::builder()
        .route("/", get(handler_fn(noop)))
        .route("/about", get(handler_fn(noop)))
        .route("/users", get(handler_fn(noop)))
        .route("/users", post(handler_fn(noop)))
        .route("/users/<int:id>", get(handler_fn(noop)))
        .route("/users/<int:id>/posts/<int:post>", get(handler_fn(noop)))
        .route("/prices/<float:value>", get(handler_fn(noop)))
        .route("/colors/<[0-9a-f]{6}:color>", get(handler_fn(noop)))
        .route("/files/<name>", any(handler_fn(noop)))
        .build()
        .expect("routes should compile")
}

fn benchmark_route_lookup(criterion: &mut Criterion) {
    let router = create_router();
    let cases = [
        ("first", "/", HttpMethod::Get),
        ("typed_params", "/users/42/posts/7", HttpMethod::Get),
        ("custom_regex", "/colors/00ff7a", HttpMethod::Get),
        ("last", "/files/report", HttpMethod::Delete),
        ("miss", "/nowhere/at/all", HttpMethod::Get),
    ];

    let mut group = criterion.benchmark_group("route_lookup");
    for (name, path, method) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(path, method), |b, &(path, method)| {
            b.iter(|| black_box(router.at(black_box(path), method).is_found()));
        });
    }
    group.finish();
}

fn benchmark_pattern_compile(criterion: &mut Criterion) {
    criterion.bench_function("pattern_compile", |b| {
        b.iter(|| black_box(RoutePattern::compile(black_box("/users/<int:id>/posts/<string:slug>/<\\\\d{4}:year>"))));
    });
}

criterion_group!(routing, benchmark_route_lookup, benchmark_pattern_compile);
criterion_main!(routing);
