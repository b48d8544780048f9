use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rpkt_ip6::conf::FragmenterConf;
use rpkt_ip6::fragmenter::*;
use rpkt_ip6::{Packet, PortQueues};

mod frame;
use frame::large_frame;

pub fn b1(c: &mut Criterion) {
    let pkt = large_frame(8000);
    c.bench_function("fragment_descriptors", |b| {
        b.iter(|| {
            let frags = fragment(black_box(&pkt[..]), 1280, 1).unwrap().unwrap();
            assert!(frags.count() == 7);
        })
    });
}

pub fn b2(c: &mut Criterion) {
    let pkt = Packet::new(large_frame(8000));
    let frag = Ip6Fragmenter::new(FragmenterConf::default()).unwrap();
    c.bench_function("fragment_packets", |b| {
        b.iter(|| {
            let mut out = PortQueues::new(1);
            frag.fragment_with_ident(black_box(pkt.clone()), 1, &mut out);
            assert!(out.total() == 7);
        })
    });
}

criterion_group!(benches, b1, b2);
criterion_main!(benches);
