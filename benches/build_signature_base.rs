use criterion::{criterion_group, criterion_main, Criterion};
use http::{Method, Request, Uri};
use http_message_signatures::{signature_base, SignatureParameter};
use std::{hint::black_box, time::Duration};

const COMPONENTS: &[&str] = &[
    "@method",
    "@authority",
    "@path",
    r#"@query-param;name="pet""#,
    "Content-Type",
    "Content-Digest",
    "Content-Length",
];

fn build_signature_base(c: &mut Criterion) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(Uri::from_static("https://example.com/foo?param=value&pet=dog"))
        .header("Host", "example.com")
        .header("Date", "Tue, 20 Apr 2021 02:07:55 GMT")
        .header("Content-Type", "application/json")
        .header(
            "Content-Digest",
            "sha-512=:WZDPaVn/7XgHaAy8pmojAkGWoRx2UFChF41A2svX+TaPm+AbwAgBWnrIiYllu7BNNyealdVLvRwEmTHWXvJwew==:",
        )
        .header("Content-Length", "18")
        .body(())
        .unwrap();

    let parameters = [
        SignatureParameter::Created {
            time: None,
            tolerance: Duration::ZERO,
        },
        SignatureParameter::KeyId("test-key-ecc-p256".into()),
    ];

    c.bench_function("build_signature_base", |b| {
        b.iter(|| {
            let base =
                signature_base::build(black_box(&request), COMPONENTS, black_box(&parameters))
                    .unwrap();
            black_box(base.serialise().unwrap())
        });
    });
}

criterion_group!(signature_base_group, build_signature_base);
criterion_main!(signature_base_group);
