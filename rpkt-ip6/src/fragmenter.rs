//! Fragmentation of packets exceeding an MTU.
//!
//! A packet is split into an unfragmentable part (the fixed header and the
//! leading Hop-by-Hop, Destination and Routing headers) and a fragmentable
//! part. Every fragment repeats the unfragmentable part, follows it with a
//! Fragment header and carries an 8-byte aligned slice of the fragmentable
//! part.

use std::sync::atomic::{AtomicU64, Ordering};

use log::{trace, warn};
use rand::Rng;

use crate::conf::{FragmenterConf, MIN_MTU};
use crate::element::{Element, Output};
use crate::ipv6::{
    FragHeader, HeaderChain, IpProtocol, Ipv6Header, FRAG_HEADER_LEN, IPV6_HEADER_LEN,
    PAYLOAD_LEN_POS,
};
use crate::packet::read_at;
use crate::{Error, Packet, Result, WritablePacket};

/// Layout of the headers that every fragment repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnfragmentablePart {
    /// Byte length, fixed header included.
    pub len: usize,
    /// Offset of the next-header byte that is rewritten to Fragment.
    pub link_offset: usize,
    /// The type of the first header of the fragmentable part.
    pub next_header: IpProtocol,
}

impl UnfragmentablePart {
    /// Scan the leading Hop-by-Hop, Destination and Routing headers.
    ///
    /// A malformed chain ends the scan, so everything before the broken
    /// header is treated as unfragmentable.
    pub fn scan(pkt: &[u8]) -> Result<Self> {
        let hdr = Ipv6Header::new(pkt).map_err(|buf| Error::Truncated(buf.len()))?;
        let mut part = Self {
            len: IPV6_HEADER_LEN,
            link_offset: 6,
            next_header: hdr.next_header(),
        };

        for item in HeaderChain::new(pkt)? {
            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    warn!("unfragmentable part ends at a malformed header: {}", err);
                    break;
                }
            };
            match item.header.next_header() {
                Some(next_header) if item.header.is_unfragmentable() => {
                    part = Self {
                        len: item.end(),
                        link_offset: item.offset,
                        next_header,
                    };
                }
                _ => break,
            }
        }
        Ok(part)
    }
}

/// One fragment produced from an original packet.
#[derive(Debug, Clone, Copy)]
pub struct FragmentDescriptor<'a> {
    pub unfragmentable: &'a [u8],
    /// Offset of the fragment's payload in 8-byte units.
    pub frag_off: u16,
    pub m_flag: bool,
    pub ident: u32,
    pub payload: &'a [u8],
    link_offset: usize,
    next_header: IpProtocol,
}

impl<'a> FragmentDescriptor<'a> {
    /// Length of the packet built by [`Self::to_packet`].
    pub fn packet_len(&self) -> usize {
        self.unfragmentable.len() + FRAG_HEADER_LEN + self.payload.len()
    }

    /// Assemble the fragment packet.
    pub fn to_packet(&self) -> Result<Packet> {
        let mut pkt = WritablePacket::with_capacity(self.packet_len());
        pkt.extend_from_slice(self.unfragmentable);

        let payload_len = (self.packet_len() - IPV6_HEADER_LEN) as u16;
        pkt.write(self.link_offset, &[IpProtocol::IPV6_FRAG.raw()])?;
        pkt.write(PAYLOAD_LEN_POS, &payload_len.to_be_bytes())?;

        let mut frag_buf = [0u8; FRAG_HEADER_LEN];
        let mut frag = FragHeader::new_unchecked(&mut frag_buf[..]);
        frag.set_next_header(self.next_header);
        frag.set_frag_off(self.frag_off);
        frag.set_m_flag(self.m_flag);
        frag.set_ident(self.ident);
        pkt.extend_from_slice(&frag_buf[..]);

        pkt.extend_from_slice(self.payload);
        Ok(pkt.freeze())
    }
}

/// Iterator over the fragments of one packet.
#[derive(Debug, Clone)]
pub struct Fragments<'a> {
    unfragmentable: &'a [u8],
    part: UnfragmentablePart,
    fragmentable: &'a [u8],
    capacity: usize,
    offset: usize,
    ident: u32,
}

impl<'a> Fragments<'a> {
    /// Payload bytes each fragment but the last one carries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn part(&self) -> &UnfragmentablePart {
        &self.part
    }
}

impl<'a> Iterator for Fragments<'a> {
    type Item = FragmentDescriptor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.fragmentable.len() {
            return None;
        }

        let end = (self.offset + self.capacity).min(self.fragmentable.len());
        let desc = FragmentDescriptor {
            unfragmentable: self.unfragmentable,
            frag_off: (self.offset / 8) as u16,
            m_flag: end < self.fragmentable.len(),
            ident: self.ident,
            payload: &self.fragmentable[self.offset..end],
            link_offset: self.part.link_offset,
            next_header: self.part.next_header,
        };
        self.offset = end;
        Some(desc)
    }
}

/// Split `pkt` into fragments no longer than `mtu`.
///
/// Returns `Ok(None)` when the packet already fits. Fails when the declared
/// payload exceeds the buffer or when the unfragmentable part leaves no room
/// for an 8-byte data unit.
pub fn fragment(pkt: &[u8], mtu: usize, ident: u32) -> Result<Option<Fragments<'_>>> {
    let hdr = Ipv6Header::new(pkt).map_err(|buf| Error::Truncated(buf.len()))?;
    let total = IPV6_HEADER_LEN + usize::from(hdr.payload_len());
    if total > pkt.len() {
        return Err(Error::BufferBounds {
            offset: IPV6_HEADER_LEN,
            len: usize::from(hdr.payload_len()),
            total: pkt.len(),
        });
    }
    if total <= mtu {
        return Ok(None);
    }

    let part = UnfragmentablePart::scan(pkt)?;
    if part.len > total {
        return Err(Error::BufferBounds {
            offset: 0,
            len: part.len,
            total,
        });
    }
    let capacity = mtu
        .checked_sub(FRAG_HEADER_LEN + part.len)
        .map(|room| room & !7)
        .unwrap_or(0);
    if capacity == 0 {
        return Err(Error::InvalidMtu(mtu));
    }

    Ok(Some(Fragments {
        unfragmentable: read_at(pkt, 0, part.len)?,
        fragmentable: read_at(pkt, part.len, total - part.len)?,
        part,
        capacity,
        offset: 0,
        ident,
    }))
}

#[derive(Debug)]
pub struct Ip6Fragmenter {
    mtu: usize,
    drops: AtomicU64,
    fragments: AtomicU64,
}

impl Ip6Fragmenter {
    pub fn new(conf: FragmenterConf) -> Result<Self> {
        if conf.mtu < MIN_MTU {
            return Err(Error::InvalidMtu(conf.mtu));
        }
        Ok(Self {
            mtu: conf.mtu,
            drops: AtomicU64::new(0),
            fragments: AtomicU64::new(0),
        })
    }

    pub fn mtu(&self) -> usize {
        self.mtu
    }

    pub fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    pub fn fragments(&self) -> u64 {
        self.fragments.load(Ordering::Relaxed)
    }

    /// Fragment `pkt` using `ident` as the fragmentation id.
    pub fn fragment_with_ident(&self, pkt: Packet, ident: u32, out: &mut dyn Output) {
        let frags = match fragment(pkt.data(), self.mtu, ident) {
            Ok(Some(frags)) => frags,
            Ok(None) => {
                out.push(0, pkt);
                return;
            }
            Err(err) => {
                warn!("dropping packet that can not be fragmented: {}", err);
                self.drops.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        for desc in frags {
            trace!(
                "fragment id {:#010x} offset {} len {} more {}",
                desc.ident,
                desc.frag_off,
                desc.payload.len(),
                desc.m_flag
            );
            match desc.to_packet() {
                Ok(frag) => {
                    self.fragments.fetch_add(1, Ordering::Relaxed);
                    out.push(0, frag);
                }
                Err(err) => {
                    warn!("dropping fragment that can not be assembled: {}", err);
                    self.drops.fetch_add(1, Ordering::Relaxed);
                    return;
                }
            }
        }
    }
}

impl Default for Ip6Fragmenter {
    fn default() -> Self {
        Self {
            mtu: FragmenterConf::default().mtu,
            drops: AtomicU64::new(0),
            fragments: AtomicU64::new(0),
        }
    }
}

impl Element for Ip6Fragmenter {
    fn class_name(&self) -> &'static str {
        "IP6Fragmenter"
    }

    fn port_count(&self) -> String {
        "1/1".to_string()
    }

    fn push(&self, pkt: Packet, out: &mut dyn Output) {
        let ident = rand::thread_rng().gen::<u32>();
        self.fragment_with_ident(pkt, ident, out);
    }

    fn read_handler(&self, name: &str) -> Option<String> {
        match name {
            "drops" => Some(self.drops().to_string()),
            "fragments" => Some(self.fragments().to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(next_header: u8, ext: &[u8], payload_len: usize) -> Vec<u8> {
        let plen = ext.len() + payload_len;
        let mut pkt = vec![0u8; IPV6_HEADER_LEN];
        pkt[0] = 0x60;
        pkt[4] = (plen >> 8) as u8;
        pkt[5] = plen as u8;
        pkt[6] = next_header;
        pkt[7] = 64;
        pkt.extend_from_slice(ext);
        pkt.extend((0..payload_len).map(|i| i as u8));
        pkt
    }

    #[test]
    fn unfragmentable_part_stops_at_first_other_header() {
        let hbh = [60, 0, 0, 0, 0, 0, 0, 0];
        let dest = [43, 0, 0, 0, 0, 0, 0, 0];
        let routing = [60, 0, 0, 0, 0, 0, 0, 0];
        let dest2 = [17, 0, 0, 0, 0, 0, 0, 0];
        let ext = [&hbh[..], &dest[..], &routing[..], &dest2[..]].concat();
        let pkt = packet(0, &ext, 16);

        let part = UnfragmentablePart::scan(&pkt).unwrap();
        assert_eq!(part.len, 72);
        assert_eq!(part.link_offset, 64);
        assert_eq!(part.next_header, IpProtocol::UDP);

        let pkt = packet(17, &[], 16);
        let part = UnfragmentablePart::scan(&pkt).unwrap();
        assert_eq!(part.len, 40);
        assert_eq!(part.link_offset, 6);
        assert_eq!(part.next_header, IpProtocol::UDP);
    }

    #[test]
    fn malformed_chain_limits_unfragmentable_part() {
        let hbh = [200, 0, 0, 0, 0, 0, 0, 0];
        let pkt = packet(0, &hbh, 16);
        let part = UnfragmentablePart::scan(&pkt).unwrap();
        assert_eq!(part.len, 48);
        assert_eq!(part.next_header, IpProtocol::from(200));
    }

    #[test]
    fn slices_are_aligned_and_contiguous() {
        let pkt = packet(17, &[], 100);
        let frags: Vec<_> = fragment(&pkt, 96, 9).unwrap().unwrap().collect();

        // (96 - 8 - 40) & !7 = 48
        assert_eq!(frags.len(), 3);
        assert_eq!(
            frags.iter().map(|f| f.payload.len()).collect::<Vec<_>>(),
            [48, 48, 4]
        );
        assert_eq!(
            frags.iter().map(|f| f.frag_off).collect::<Vec<_>>(),
            [0, 6, 12]
        );
        assert_eq!(
            frags.iter().map(|f| f.m_flag).collect::<Vec<_>>(),
            [true, true, false]
        );
        let joined: Vec<u8> = frags.iter().flat_map(|f| f.payload.iter().copied()).collect();
        assert_eq!(&joined[..], &pkt[40..]);

        let first = frags[0].to_packet().unwrap();
        assert_eq!(first.len(), 96);
        assert_eq!(first.data()[6], 44);
        assert_eq!(&first.data()[4..6], &[0, 56]);
        assert_eq!(&first.data()[40..48], &[17, 0, 0, 1, 0, 0, 0, 9]);

        let last = frags[2].to_packet().unwrap();
        assert_eq!(&last.data()[4..6], &[0, 12]);
        assert_eq!(&last.data()[40..48], &[17, 0, 0, 96, 0, 0, 0, 9]);
    }

    #[test]
    fn fitting_packets_are_not_fragmented() {
        let pkt = packet(17, &[], 1240);
        assert!(fragment(&pkt, 1280, 0).unwrap().is_none());
    }

    #[test]
    fn rejects_inconsistent_packets() {
        let mut pkt = packet(17, &[], 200);
        pkt.truncate(120);
        assert!(matches!(
            fragment(&pkt, 64, 0),
            Err(Error::BufferBounds { .. })
        ));

        // a 32 byte hop-by-hop header leaves no room below a 72 byte mtu
        let mut hbh = vec![17, 3];
        hbh.resize(32, 0);
        let pkt = packet(0, &hbh, 64);
        assert_eq!(fragment(&pkt, 72, 0).unwrap_err(), Error::InvalidMtu(72));
    }

    #[test]
    fn element_counters() {
        assert!(Ip6Fragmenter::new(FragmenterConf::new(55)).is_err());
        let frag = Ip6Fragmenter::new(FragmenterConf::new(MIN_MTU)).unwrap();

        let mut out = crate::PortQueues::new(1);
        frag.push(Packet::new(packet(17, &[], 20)), &mut out);
        frag.push(Packet::from_slice(&[0x60; 12]), &mut out);

        assert_eq!(out.port(0).len(), 3);
        assert_eq!(frag.read_handler("fragments").as_deref(), Some("3"));
        assert_eq!(frag.read_handler("drops").as_deref(), Some("1"));

        let ids: Vec<u32> = out
            .port(0)
            .iter()
            .map(|p| FragHeader::new(&p.data()[40..]).unwrap().ident())
            .collect();
        assert!(ids.iter().all(|id| *id == ids[0]));
    }
}
