#![allow(dead_code)]

use std::net::Ipv6Addr;

pub const SRC: &str = "2001:db8:0:1::10";
pub const DST: &str = "2001:db8:0:2::20";

pub fn addr(s: &str) -> Ipv6Addr {
    s.parse().unwrap()
}

/// Decode a hex dump into packet bytes, ignoring whitespace.
pub fn hex_to_packet(content: &str) -> Vec<u8> {
    let digits: String = content.chars().filter(|c| !c.is_whitespace()).collect();

    let mut res = Vec::new();
    let mut start_idx = 0;
    while start_idx < digits.len() {
        res.push(u8::from_str_radix(&digits[start_idx..start_idx + 2], 16).unwrap());
        start_idx += 2;
    }
    res
}

/// Builds an IPv6 packet out of a fixed header and raw header bytes.
#[derive(Clone, Debug)]
pub struct Ip6Builder {
    pub traffic_class: u8,
    pub flow_label: u32,
    pub hop_limit: u8,
    pub src: Ipv6Addr,
    pub dst: Ipv6Addr,
}

impl Default for Ip6Builder {
    fn default() -> Self {
        Self {
            traffic_class: 0,
            flow_label: 0,
            hop_limit: 64,
            src: addr(SRC),
            dst: addr(DST),
        }
    }
}

impl Ip6Builder {
    /// A packet whose fixed header announces `next_header` and whose
    /// payload length covers `rest`.
    pub fn build(&self, next_header: u8, rest: &[u8]) -> Vec<u8> {
        let word = 6u32 << 28 | u32::from(self.traffic_class) << 20 | self.flow_label;
        let mut pkt = Vec::with_capacity(40 + rest.len());
        pkt.extend_from_slice(&word.to_be_bytes());
        pkt.extend_from_slice(&(rest.len() as u16).to_be_bytes());
        pkt.push(next_header);
        pkt.push(self.hop_limit);
        pkt.extend_from_slice(&self.src.octets());
        pkt.extend_from_slice(&self.dst.octets());
        pkt.extend_from_slice(rest);
        pkt
    }
}

pub fn ipv6(next_header: u8, rest: &[u8]) -> Vec<u8> {
    Ip6Builder::default().build(next_header, rest)
}

/// An options header (Hop-by-Hop or Destination) holding `options`,
/// padded with Pad1 to a multiple of 8 bytes.
pub fn options_header(next_header: u8, options: &[u8]) -> Vec<u8> {
    let len = (options.len() + 2 + 7) / 8 * 8;
    let mut hdr = vec![next_header, (len / 8 - 1) as u8];
    hdr.extend_from_slice(options);
    hdr.resize(len, 0);
    hdr
}

pub fn routing0(next_header: u8, segments_left: u8, addrs: &[Ipv6Addr]) -> Vec<u8> {
    let mut hdr = vec![next_header, (addrs.len() * 2) as u8, 0, segments_left, 0, 0, 0, 0];
    for a in addrs {
        hdr.extend_from_slice(&a.octets());
    }
    hdr
}

pub fn frag(next_header: u8, frag_off: u16, more: bool, ident: u32) -> Vec<u8> {
    let mut hdr = vec![next_header, 0];
    hdr.extend_from_slice(&(frag_off << 3 | u16::from(more)).to_be_bytes());
    hdr.extend_from_slice(&ident.to_be_bytes());
    hdr
}

pub fn udp(src_port: u16, dst_port: u16, payload_len: usize) -> Vec<u8> {
    let mut hdr = Vec::with_capacity(8 + payload_len);
    hdr.extend_from_slice(&src_port.to_be_bytes());
    hdr.extend_from_slice(&dst_port.to_be_bytes());
    hdr.extend_from_slice(&((8 + payload_len) as u16).to_be_bytes());
    hdr.extend_from_slice(&[0, 0]);
    hdr.extend((0..payload_len).map(|i| (i % 251) as u8));
    hdr
}

pub fn tcp(src_port: u16, dst_port: u16) -> Vec<u8> {
    let mut hdr = Vec::with_capacity(20);
    hdr.extend_from_slice(&src_port.to_be_bytes());
    hdr.extend_from_slice(&dst_port.to_be_bytes());
    hdr.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0, 0x50, 0x02, 0xff, 0xff, 0, 0, 0, 0]);
    hdr
}

pub fn icmp(icmp_type: u8, code: u8) -> Vec<u8> {
    vec![icmp_type, code, 0, 0, 0, 1, 0, 1]
}

pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}
