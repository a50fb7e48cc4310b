use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use docserver::request::Request;

fn simple_request_parse_benchmark(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost:8000\r\nUser-Agent: Test\r\n\r\n";

    c.bench_function("simple_request_parse", |b| {
        b.iter(|| {
            let _ = Request::try_from(black_box(request), 0).unwrap();
        });
    });
}

fn browser_request_parse_benchmark(c: &mut Criterion) {
    let request = b"GET /guide/setup.md?raw HTTP/1.1\r\n\
                    Host: localhost:8000\r\n\
                    User-Agent: Mozilla/5.0 (X11; Linux x86_64)\r\n\
                    Accept: text/html,application/xhtml+xml\r\n\
                    Accept-Language: en-US,en;q=0.9\r\n\
                    Connection: keep-alive\r\n\
                    \r\n";

    c.bench_function("browser_request_parse", |b| {
        b.iter(|| {
            let _ = Request::try_from(black_box(request), 0).unwrap();
        });
    });
}

fn request_parse_target_forms_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_parse_target");

    let targets = [
        ("short", "/"),
        ("nested", "/docs/guide/chapter-1/setup.md"),
        ("encoded", "/docs/my%20notes/%E4%B8%AD%E6%96%87.md"),
        ("absolute_form", "http://localhost:8000/docs/index.md?raw=1"),
        ("traversal", "/../../../../../../etc/passwd"),
    ];

    for (name, target) in targets.iter() {
        let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target);
        group.bench_with_input(BenchmarkId::from_parameter(name), &request, |b, request| {
            b.iter(|| {
                let _ = Request::try_from(black_box(request.as_bytes()), 0).unwrap();
            });
        });
    }

    group.finish();
}

fn request_reject_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_reject");

    let requests = [
        ("garbage", b"GARBAGE\r\n\r\n".as_slice()),
        ("bad_version", b"GET / HTTP/9.9\r\n\r\n".as_slice()),
        ("nul_byte", b"GET /index.md%00.txt HTTP/1.1\r\n\r\n".as_slice()),
    ];

    for (name, request) in requests.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), request, |b, request| {
            b.iter(|| {
                let _ = Request::try_from(black_box(request), 0).unwrap_err();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    simple_request_parse_benchmark,
    browser_request_parse_benchmark,
    request_parse_target_forms_benchmark,
    request_reject_benchmark
);
criterion_main!(benches);
