use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rpkt_ip6::classifier::*;
use rpkt_ip6::conf::ClassifierConf;

mod frame;
use frame::FRAME_BYTES;

fn rule(pattern: &str) -> MatchRule {
    parse_pattern(0, pattern).unwrap()
}

pub fn b1(c: &mut Criterion) {
    let vers = rule("ip vers 6");
    c.bench_function("classify_vers", |b| {
        b.iter(|| {
            assert!(classify(&vers, black_box(&FRAME_BYTES[..])));
        })
    });
}

pub fn b2(c: &mut Criterion) {
    let port = rule("src or dst udp port 5000");
    c.bench_function("classify_port", |b| {
        b.iter(|| {
            assert!(classify(&port, black_box(&FRAME_BYTES[..])));
        })
    });
}

pub fn b3(c: &mut Criterion) {
    let cls = Ip6Classifier::new(ClassifierConf::new([
        "ip vers 6",
        "dst net 2001:db8:0:2::",
        "src host 2001:db8::1 2001:db8::2 2001:db8:0:1::10",
        "ip frag",
        "tcp port 80 443",
        "udp port 53",
        "icmp type 128",
        "ip CoS 0",
    ]))
    .unwrap();
    c.bench_function("classify_all", |b| {
        b.iter(|| {
            assert!(cls.matches(black_box(&FRAME_BYTES[..])).count() == 5);
        })
    });
}

pub fn b4(c: &mut Criterion) {
    c.bench_function("parse_pattern", |b| {
        b.iter(|| {
            parse_pattern(0, black_box("src and dst net 2001:db8:: fe80:: 2001:db8:1::")).unwrap()
        })
    });
}

criterion_group!(benches, b1, b2, b3, b4);
criterion_main!(benches);
