use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rpkt_ip6::ipv6::*;
use smoltcp::wire;

mod frame;
use frame::FRAME_BYTES;

fn walk_fixed(buf: &[u8]) {
    let ip = Ipv6Header::new(buf).unwrap();
    assert!(ip.version() == 6);
    assert!(ip.next_header() == IpProtocol::HOPOPT);
    assert!(ip.payload_len() == 40);
    assert!(ip.hop_limit() == 64);
}

fn walk_chain(buf: &[u8]) {
    let mut last = None;
    for item in HeaderChain::new(buf).unwrap() {
        last = Some(item.unwrap());
    }
    let last = last.unwrap();
    assert!(last.header == ExtHeader::UpperLayer(IpProtocol::UDP));
    assert!(last.offset == 56);
}

fn smol_fixed(buf: &[u8]) {
    let ip = wire::Ipv6Packet::new_checked(buf).unwrap();
    assert!(ip.version() == 6);
    assert!(ip.next_header() == wire::IpProtocol::HopByHop);
    assert!(ip.payload_len() == 40);
    assert!(ip.hop_limit() == 64);
}

pub fn b1(c: &mut Criterion) {
    c.bench_function("walk_fixed", |b| {
        b.iter(|| {
            walk_fixed(black_box(&FRAME_BYTES[..]));
        })
    });
}

pub fn b2(c: &mut Criterion) {
    c.bench_function("walk_chain", |b| {
        b.iter(|| {
            walk_chain(black_box(&FRAME_BYTES[..]));
        })
    });
}

pub fn b3(c: &mut Criterion) {
    c.bench_function("smol_fixed", |b| {
        b.iter(|| {
            smol_fixed(black_box(&FRAME_BYTES[..]));
        })
    });
}

criterion_group!(benches, b1, b2, b3);
criterion_main!(benches);
