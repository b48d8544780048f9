use bytes::Buf;

use crate::packet::read_at;
use crate::{Cursor, Error, Result};

use super::{ext_header_len, FragHeader, IpProtocol, Ipv6Header, IPV6_HEADER_LEN};

/// One entry of an IPv6 header chain.
///
/// Non-terminal variants carry the next-header value that links to the
/// following entry. `Auth`, `NoNextHeader` and `UpperLayer` end the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtHeader {
    HopByHop {
        next_header: IpProtocol,
    },
    Routing {
        next_header: IpProtocol,
        routing_type: u8,
        segments_left: u8,
    },
    Fragment {
        next_header: IpProtocol,
        frag_off: u16,
        m_flag: bool,
        ident: u32,
    },
    Destination {
        next_header: IpProtocol,
    },
    /// Skipped without interpreting its content.
    Esp {
        next_header: IpProtocol,
    },
    /// Authentication header, not parsed any further.
    Auth,
    NoNextHeader,
    UpperLayer(IpProtocol),
}

impl ExtHeader {
    /// The next-header value of a non-terminal entry.
    pub fn next_header(&self) -> Option<IpProtocol> {
        match *self {
            ExtHeader::HopByHop { next_header }
            | ExtHeader::Routing { next_header, .. }
            | ExtHeader::Fragment { next_header, .. }
            | ExtHeader::Destination { next_header }
            | ExtHeader::Esp { next_header } => Some(next_header),
            ExtHeader::Auth | ExtHeader::NoNextHeader | ExtHeader::UpperLayer(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_header().is_none()
    }

    /// The header type value identifying this entry.
    pub fn protocol(&self) -> IpProtocol {
        match *self {
            ExtHeader::HopByHop { .. } => IpProtocol::HOPOPT,
            ExtHeader::Routing { .. } => IpProtocol::IPV6_ROUTE,
            ExtHeader::Fragment { .. } => IpProtocol::IPV6_FRAG,
            ExtHeader::Destination { .. } => IpProtocol::IPV6_OPTS,
            ExtHeader::Esp { .. } => IpProtocol::ESP,
            ExtHeader::Auth => IpProtocol::AH,
            ExtHeader::NoNextHeader => IpProtocol::IPV6_NO_NXT,
            ExtHeader::UpperLayer(proto) => proto,
        }
    }

    /// Whether the header belongs to the unfragmentable part of a packet.
    pub fn is_unfragmentable(&self) -> bool {
        matches!(
            self,
            ExtHeader::HopByHop { .. } | ExtHeader::Destination { .. } | ExtHeader::Routing { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainItem {
    /// Offset of the header from the start of the packet.
    pub offset: usize,
    /// Byte length of the header, 0 for terminal entries.
    pub len: usize,
    /// Offset of the byte holding the value that announced this header:
    /// byte 6 of the fixed header or byte 0 of the previous extension header.
    pub link_offset: usize,
    pub header: ExtHeader,
}

impl ChainItem {
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Walks the extension header chain of a packet.
///
/// The walk yields one [`ChainItem`] per header and stops after a terminal
/// entry or the first error. Every header is checked against the buffer
/// length before any of its fields are read, so a malformed chain ends in
/// [`Error::BufferBounds`] or [`Error::UnknownHeader`].
#[derive(Debug, Clone)]
pub struct HeaderChain<'a> {
    cursor: Cursor<'a>,
    next_header: IpProtocol,
    link_offset: usize,
    done: bool,
}

impl<'a> HeaderChain<'a> {
    /// Start walking right after the fixed header of `pkt`.
    pub fn new(pkt: &'a [u8]) -> Result<Self> {
        let hdr = Ipv6Header::new(pkt).map_err(|buf| Error::Truncated(buf.len()))?;
        Ok(Self::from_offset(
            pkt,
            IPV6_HEADER_LEN,
            hdr.next_header(),
            super::header::NEXT_HEADER_POS,
        ))
    }

    /// Start walking at `offset`, where a header of type `next_header` is
    /// expected. `link_offset` is the position of the byte announcing it.
    /// `offset` must not exceed the length of `pkt`.
    fn from_offset(
        pkt: &'a [u8],
        offset: usize,
        next_header: IpProtocol,
        link_offset: usize,
    ) -> Self {
        let mut cursor = Cursor::new(pkt);
        cursor.advance(offset);
        Self {
            cursor,
            next_header,
            link_offset,
            done: false,
        }
    }

    fn terminal(&mut self, header: ExtHeader) -> ChainItem {
        self.done = true;
        ChainItem {
            offset: self.cursor.cursor(),
            len: 0,
            link_offset: self.link_offset,
            header,
        }
    }

    fn step(&mut self) -> Result<ChainItem> {
        let offset = self.cursor.cursor();
        let proto = self.next_header;

        match proto {
            IpProtocol::AH => return Ok(self.terminal(ExtHeader::Auth)),
            IpProtocol::IPV6_NO_NXT => return Ok(self.terminal(ExtHeader::NoNextHeader)),
            _ if proto.is_upper_layer() => return Ok(self.terminal(ExtHeader::UpperLayer(proto))),
            _ => {}
        }

        let unknown = Error::UnknownHeader {
            offset,
            next_header: proto.raw(),
        };
        if ext_header_len(proto, 0).is_none() {
            return Err(unknown);
        }

        let pkt = self.cursor.buf();
        let hdr_ext_len = read_at(pkt, offset, 2)?[1];
        let len = ext_header_len(proto, hdr_ext_len).ok_or(unknown)?;
        let chunk = read_at(pkt, offset, len)?;

        let next_header = IpProtocol::from(chunk[0]);
        let header = match proto {
            IpProtocol::HOPOPT => ExtHeader::HopByHop { next_header },
            IpProtocol::IPV6_OPTS => ExtHeader::Destination { next_header },
            IpProtocol::IPV6_ROUTE => ExtHeader::Routing {
                next_header,
                routing_type: chunk[2],
                segments_left: chunk[3],
            },
            IpProtocol::IPV6_FRAG => {
                let frag = FragHeader::new_unchecked(chunk);
                ExtHeader::Fragment {
                    next_header,
                    frag_off: frag.frag_off(),
                    m_flag: frag.m_flag(),
                    ident: frag.ident(),
                }
            }
            _ => ExtHeader::Esp { next_header },
        };

        let item = ChainItem {
            offset,
            len,
            link_offset: self.link_offset,
            header,
        };
        self.cursor.advance(len);
        self.next_header = next_header;
        self.link_offset = offset;
        Ok(item)
    }
}

impl<'a> Iterator for HeaderChain<'a> {
    type Item = Result<ChainItem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let res = self.step();
        if res.is_err() {
            self.done = true;
        }
        Some(res)
    }
}

impl<'a> std::iter::FusedIterator for HeaderChain<'a> {}
