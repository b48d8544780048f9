//! Type-0 Routing header processing.

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};

use crate::element::{Element, Output};
use crate::ipv6::{
    ExtHeader, HeaderChain, Ipv6Header, RoutingHeader, DEST_ADDR_POS, HOP_LIMIT_POS,
    IPV6_HEADER_LEN, ROUTING_HEADER_FIXED_LEN, TYPE0_MAX_ADDRS,
};
use crate::packet::read_at;
use crate::{Error, Packet, Result};

const SEGMENTS_LEFT_POS: usize = 3;

/// Why a packet is refused by the routing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Truncated,
    HopLimitExhausted,
    OddHeaderLength(u8),
    TooManyAddresses(usize),
    SegmentsLeftExceeded { segments_left: u8, total_addrs: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Forward the packet unmodified.
    Forward,
    /// Visit the next segment listed in the routing header at
    /// `header_offset`: the destination is swapped with address `addr_index`.
    NextSegment {
        header_offset: usize,
        addr_index: usize,
    },
    Drop(DropReason),
}

/// Decide what to do with `pkt` without modifying it.
pub fn inspect(pkt: &[u8]) -> RoutingDecision {
    let hdr = match Ipv6Header::new(pkt) {
        Ok(hdr) => hdr,
        Err(_) => return RoutingDecision::Drop(DropReason::Truncated),
    };
    if hdr.hop_limit() == 0 {
        return RoutingDecision::Drop(DropReason::HopLimitExhausted);
    }

    let chain = match HeaderChain::new(pkt) {
        Ok(chain) => chain,
        Err(_) => return RoutingDecision::Drop(DropReason::Truncated),
    };
    for item in chain {
        let item = match item {
            Ok(item) => item,
            Err(err) => {
                warn!("forwarding packet with a malformed header chain: {}", err);
                return RoutingDecision::Forward;
            }
        };
        match item.header {
            ExtHeader::Routing { .. } => {
                return match read_at(pkt, item.offset, item.len) {
                    Ok(buf) => segment(&RoutingHeader::new_unchecked(buf), item.offset),
                    Err(err) => {
                        warn!("forwarding packet with a truncated routing header: {}", err);
                        RoutingDecision::Forward
                    }
                };
            }
            header if header.is_terminal() => {
                debug!("no routing header before {:?}", header.protocol());
                return RoutingDecision::Forward;
            }
            _ => {}
        }
    }
    RoutingDecision::Forward
}

fn segment(rh: &RoutingHeader<&[u8]>, header_offset: usize) -> RoutingDecision {
    if rh.routing_type() != 0 {
        warn!(
            "routing type {} is not supported, forwarding unmodified",
            rh.routing_type()
        );
        return RoutingDecision::Forward;
    }
    if rh.hdr_ext_len() % 2 != 0 {
        return RoutingDecision::Drop(DropReason::OddHeaderLength(rh.hdr_ext_len()));
    }
    let total_addrs = rh.total_addrs();
    if total_addrs > TYPE0_MAX_ADDRS {
        return RoutingDecision::Drop(DropReason::TooManyAddresses(total_addrs));
    }
    if rh.segments_left() == 0 {
        debug!("routing header has no segments left");
        return RoutingDecision::Forward;
    }
    match rh.next_to_visit() {
        Some(addr_index) => RoutingDecision::NextSegment {
            header_offset,
            addr_index,
        },
        None => RoutingDecision::Drop(DropReason::SegmentsLeftExceeded {
            segments_left: rh.segments_left(),
            total_addrs,
        }),
    }
}

/// Execute one routing segment on an exclusive copy of `pkt`.
///
/// The destination address and address `addr_index` of the routing header
/// at `header_offset` trade places, and both the hop limit and segments left
/// are decremented.
pub fn next_segment(pkt: Packet, header_offset: usize, addr_index: usize) -> Result<Packet> {
    let ip = Ipv6Header::new_unchecked(pkt.read(0, IPV6_HEADER_LEN)?);
    let hdr_ext_len = pkt.read(header_offset, ROUTING_HEADER_FIXED_LEN)?[1];
    let rh_len = (usize::from(hdr_ext_len) + 1) * 8;
    let rh = RoutingHeader::new_unchecked(pkt.read(header_offset, rh_len)?);

    let addr_offset = header_offset + ROUTING_HEADER_FIXED_LEN + 16 * addr_index;
    if addr_index >= rh.total_addrs() || rh.segments_left() == 0 || ip.hop_limit() == 0 {
        return Err(Error::BufferBounds {
            offset: addr_offset,
            len: 16,
            total: pkt.len(),
        });
    }

    let next_dst = rh.addr(addr_index);
    let old_dst = ip.dest_ip();
    let segments_left = rh.segments_left() - 1;
    let hop_limit = ip.hop_limit() - 1;

    let mut wpkt = pkt.uniqueify();
    wpkt.write(addr_offset, &old_dst.octets())?;
    wpkt.write(header_offset + SEGMENTS_LEFT_POS, &[segments_left])?;
    wpkt.write(DEST_ADDR_POS, &next_dst.octets())?;
    wpkt.write(HOP_LIMIT_POS, &[hop_limit])?;

    Ok(wpkt.freeze())
}

/// Forwards packets along their Type-0 routing header.
#[derive(Debug, Default)]
pub struct Ip6Routing {
    drops: AtomicU64,
}

impl Ip6Routing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    fn drop_packet(&self, reason: DropReason) {
        match reason {
            DropReason::HopLimitExhausted => debug!("hop limit is zero"),
            reason => warn!("dropping packet with invalid routing header: {:?}", reason),
        }
        self.drops.fetch_add(1, Ordering::Relaxed);
    }
}

impl Element for Ip6Routing {
    fn class_name(&self) -> &'static str {
        "IP6Routing"
    }

    fn port_count(&self) -> String {
        "1/1".to_string()
    }

    fn push(&self, pkt: Packet, out: &mut dyn Output) {
        match inspect(pkt.data()) {
            RoutingDecision::Forward => out.push(0, pkt),
            RoutingDecision::NextSegment {
                header_offset,
                addr_index,
            } => match next_segment(pkt, header_offset, addr_index) {
                Ok(pkt) => out.push(0, pkt),
                Err(err) => {
                    warn!("routing segment failed: {}", err);
                    self.drops.fetch_add(1, Ordering::Relaxed);
                }
            },
            RoutingDecision::Drop(reason) => self.drop_packet(reason),
        }
    }

    fn read_handler(&self, name: &str) -> Option<String> {
        match name {
            "drops" => Some(self.drops().to_string()),
            _ => None,
        }
    }
}
