use std::hint::black_box;

use bencher::{FORM_REQUEST, MULTIPART_BODY, SMALL_REQUEST, TestCase, URLENCODED_BODY};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dispatch_http::codec::RequestDecoder;
use dispatch_http::codec::form::decode_body;
use dispatch_http::connection::ParsedRequest;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;

fn benchmark_request_decoder(criterion: &mut Criterion) {
    let test_cases = [TestCase::new("small_request", SMALL_REQUEST), TestCase::new("form_request", FORM_REQUEST)];
    let mut group = criterion.benchmark_group("request_decoder");

    for case in test_cases {
        group.throughput(Throughput::Bytes(case.input().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            let mut request_decoder = RequestDecoder::new();
            b.iter_batched_ref(
                || BytesMut::from(case.input().content()),
                |bytes_mut| {
                    let request = request_decoder.decode(bytes_mut).expect("input should be a valid request").unwrap();
                    black_box(ParsedRequest::parse(request).expect("request should initialize"));
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_body_decoder(criterion: &mut Criterion) {
    let test_cases = [TestCase::new("urlencoded", URLENCODED_BODY), TestCase::new("multipart", MULTIPART_BODY)];
    let mut group = criterion.benchmark_group("body_decoder");

    for case in test_cases {
        group.throughput(Throughput::Bytes(case.input().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            let input = case.input();
            b.iter(|| black_box(decode_body(input.content_type(), input.content().as_bytes())));
        });
    }

    group.finish();
}

criterion_group!(decoder, benchmark_request_decoder, benchmark_body_decoder);
criterion_main!(decoder);
