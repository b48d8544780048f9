use std::net::Ipv6Addr;

use byteorder::{ByteOrder, NetworkEndian};

use crate::ipv6::{ExtHeader, HeaderChain, IpProtocol, Ipv6Header};
use crate::packet::read_at;

use super::rules::{Argument, MatchRule, RuleType, SubSubType, SubType};

const LOW_64: u128 = 0xffff_ffff_ffff_ffff;

/// Evaluate `rule` against the packet bytes `pkt`.
///
/// Packets shorter than the fixed header and packets with a malformed
/// extension header chain never match a rule that inspects them.
pub fn classify(rule: &MatchRule, pkt: &[u8]) -> bool {
    match rule.rule_type {
        RuleType::True | RuleType::Ether => return true,
        RuleType::False => return false,
        _ => {}
    }

    let hdr = match Ipv6Header::new(pkt) {
        Ok(hdr) => hdr,
        Err(_) => return false,
    };

    match rule.rule_type {
        RuleType::Ip => match rule.sub_type {
            Some(SubType::IpProto) => match_transport(rule, pkt),
            Some(SubType::Frag) => has_fragment(pkt) == Some(true),
            Some(SubType::Unfrag) => has_fragment(pkt) == Some(false),
            Some(SubType::Vers) => any_num(rule, u32::from(hdr.version())),
            Some(SubType::Hll) => any_num(rule, u32::from(hdr.hop_limit())),
            Some(SubType::Cos) => any_num(rule, u32::from(hdr.traffic_class())),
            Some(SubType::Flow) => any_num(rule, hdr.flow_label()),
            _ => false,
        },
        RuleType::Icmp | RuleType::Tcp | RuleType::Udp => match_transport(rule, pkt),
        RuleType::Src | RuleType::Dst => match rule.sub_sub_type {
            Some(SubSubType::Host) | Some(SubSubType::Net) => {
                match_addrs(rule, hdr.source_ip(), hdr.dest_ip())
            }
            _ => match_transport(rule, pkt),
        },
        RuleType::True | RuleType::Ether => true,
        RuleType::False => false,
    }
}

fn any_num(rule: &MatchRule, value: u32) -> bool {
    rule.args
        .iter()
        .any(|arg| matches!(arg, Argument::Num(n) if *n == value))
}

/// `Some(true)` once the chain reaches a Fragment header, `None` when the
/// chain is malformed before one.
///
/// Everything behind a Fragment header may be fragment data, so the walk
/// stops there.
fn has_fragment(pkt: &[u8]) -> Option<bool> {
    for item in HeaderChain::new(pkt).ok()? {
        match item {
            Ok(item) if matches!(item.header, ExtHeader::Fragment { .. }) => return Some(true),
            Ok(_) => {}
            Err(err) => {
                log::debug!("chain walk stopped: {}", err);
                return None;
            }
        }
    }
    Some(false)
}

fn addr_matches(kind: Option<SubSubType>, addr: Ipv6Addr, arg: &Argument) -> bool {
    let target = match arg {
        Argument::Addr(target) => u128::from(*target),
        Argument::Num(_) => return false,
    };
    let addr = u128::from(addr);
    match kind {
        Some(SubSubType::Host) => addr == target,
        Some(SubSubType::Net) => target & LOW_64 == 0 && (addr ^ target) >> 64 == 0,
        _ => false,
    }
}

fn match_addrs(rule: &MatchRule, src: Ipv6Addr, dst: Ipv6Addr) -> bool {
    let kind = rule.sub_sub_type;
    rule.args.iter().any(|arg| match rule.sub_type {
        Some(SubType::Src) => addr_matches(kind, src, arg),
        Some(SubType::Dst) => addr_matches(kind, dst, arg),
        Some(SubType::SrcAndDst) => addr_matches(kind, src, arg) && addr_matches(kind, dst, arg),
        Some(SubType::SrcOrDst) => addr_matches(kind, src, arg) || addr_matches(kind, dst, arg),
        _ => false,
    })
}

struct UpperLayer {
    offset: usize,
    proto: IpProtocol,
    later_fragment: bool,
}

fn find_upper_layer(pkt: &[u8]) -> Option<UpperLayer> {
    let mut later_fragment = false;
    for item in HeaderChain::new(pkt).ok()? {
        let item = match item {
            Ok(item) => item,
            Err(err) => {
                log::debug!("chain walk stopped: {}", err);
                return None;
            }
        };
        match item.header {
            ExtHeader::Fragment { frag_off, .. } => later_fragment |= frag_off != 0,
            ExtHeader::UpperLayer(proto) => {
                return Some(UpperLayer {
                    offset: item.offset,
                    proto,
                    later_fragment,
                })
            }
            _ => {}
        }
    }
    None
}

fn match_transport(rule: &MatchRule, pkt: &[u8]) -> bool {
    let wanted = match rule.sub_sub_type {
        Some(SubSubType::Tcp) => IpProtocol::TCP,
        Some(SubSubType::Udp) => IpProtocol::UDP,
        Some(SubSubType::Icmp) => IpProtocol::ICMPV6,
        _ => return false,
    };
    let upper = match find_upper_layer(pkt) {
        Some(upper) if upper.proto == wanted => upper,
        _ => return false,
    };
    if rule.sub_type == Some(SubType::IpProto) {
        return true;
    }
    if upper.later_fragment {
        return false;
    }

    if wanted == IpProtocol::ICMPV6 {
        return match read_at(pkt, upper.offset, 1) {
            Ok(icmp) => any_num(rule, u32::from(icmp[0])),
            Err(_) => false,
        };
    }

    let ports = match read_at(pkt, upper.offset, 4) {
        Ok(ports) => ports,
        Err(_) => return false,
    };
    let src_port = u32::from(NetworkEndian::read_u16(&ports[0..2]));
    let dst_port = u32::from(NetworkEndian::read_u16(&ports[2..4]));
    rule.args.iter().any(|arg| {
        let port = match arg {
            Argument::Num(port) => *port,
            Argument::Addr(_) => return false,
        };
        match rule.sub_type {
            Some(SubType::Src) => port == src_port,
            Some(SubType::Dst) => port == dst_port,
            Some(SubType::SrcAndDst) => port == src_port && port == dst_port,
            Some(SubType::SrcOrDst) => port == src_port || port == dst_port,
            _ => false,
        }
    })
}
