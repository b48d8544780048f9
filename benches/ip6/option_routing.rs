use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rpkt_ip6::hopbyhop::*;
use rpkt_ip6::routing::*;
use rpkt_ip6::Packet;

mod frame;
use frame::FRAME_BYTES;

fn type0_frame() -> Vec<u8> {
    let mut pkt = FRAME_BYTES[..40].to_vec();
    pkt[4..6].copy_from_slice(&56u16.to_be_bytes());
    pkt[6] = 43;
    pkt.extend_from_slice(&[59, 6, 0, 3, 0, 0, 0, 0]);
    for i in 0..3u8 {
        let mut a = [0u8; 16];
        a[0] = 0x20;
        a[1] = 0x01;
        a[15] = i + 1;
        pkt.extend_from_slice(&a);
    }
    pkt
}

pub fn b1(c: &mut Criterion) {
    let hbh = Ip6HopByHop::new();
    c.bench_function("hbh_outcome", |b| {
        b.iter(|| {
            assert!(hbh.outcome(black_box(&FRAME_BYTES[..])) == Some(HbhOutcome::RouterAlert));
        })
    });
}

pub fn b2(c: &mut Criterion) {
    let pkt = type0_frame();
    c.bench_function("routing_segment", |b| {
        b.iter(|| match inspect(black_box(&pkt[..])) {
            RoutingDecision::NextSegment {
                header_offset,
                addr_index,
            } => {
                let routed = next_segment(Packet::from_slice(&pkt[..]), header_offset, addr_index)
                    .unwrap();
                assert!(routed.data()[43] == 2);
            }
            _ => panic!(),
        })
    });
}

criterion_group!(benches, b1, b2);
criterion_main!(benches);
