use super::{IpProtocol, Ipv6Addr};

header_field_val_accessors! {
    (next_header, next_header_mut, 0),
    (hdr_ext_len, hdr_ext_len_mut, 1),
    (routing_type, routing_type_mut, 2),
    (segments_left, segments_left_mut, 3),
}

/// Length of the routing header part that precedes the address list.
pub const ROUTING_HEADER_FIXED_LEN: usize = 8;

/// The largest address list a Type-0 routing header may carry.
pub const TYPE0_MAX_ADDRS: usize = 23;

/// RFC2460 - Sec. 4.4, with the Type-0 address list layout.
///
/// ```text
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Next Header  |  Hdr Ext Len  | Routing Type=0| Segments Left |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Reserved                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          Address[1..n]                        |
/// ```
///
/// `new` verifies that the buffer covers the whole header, so the address
/// accessors only have to check the index against [`Self::total_addrs`].
#[derive(Clone, Copy, Debug)]
pub struct RoutingHeader<T> {
    buf: T,
}

impl<T: AsRef<[u8]>> RoutingHeader<T> {
    #[inline]
    pub fn new(buf: T) -> Result<Self, T> {
        let data = buf.as_ref();
        if data.len() >= ROUTING_HEADER_FIXED_LEN
            && data.len() >= (usize::from(*hdr_ext_len(data)) + 1) * 8
        {
            Ok(Self { buf })
        } else {
            Err(buf)
        }
    }

    #[inline]
    pub fn new_unchecked(buf: T) -> Self {
        Self { buf }
    }

    #[inline]
    pub fn next_header(&self) -> IpProtocol {
        (*next_header(self.buf.as_ref())).into()
    }

    #[inline]
    pub fn hdr_ext_len(&self) -> u8 {
        *hdr_ext_len(self.buf.as_ref())
    }

    #[inline]
    pub fn header_len(&self) -> usize {
        (usize::from(self.hdr_ext_len()) + 1) * 8
    }

    #[inline]
    pub fn routing_type(&self) -> u8 {
        *routing_type(self.buf.as_ref())
    }

    #[inline]
    pub fn segments_left(&self) -> u8 {
        *segments_left(self.buf.as_ref())
    }

    /// Number of 128-bit addresses in the list.
    #[inline]
    pub fn total_addrs(&self) -> usize {
        usize::from(self.hdr_ext_len()) / 2
    }

    /// Index of the address that the next segment visits.
    #[inline]
    pub fn next_to_visit(&self) -> Option<usize> {
        self.total_addrs()
            .checked_sub(usize::from(self.segments_left()))
    }

    #[inline]
    pub fn addr(&self, idx: usize) -> Ipv6Addr {
        assert!(idx < self.total_addrs());

        let mut octets = [0; 16];
        octets.copy_from_slice(&self.buf.as_ref()[8 + 16 * idx..24 + 16 * idx]);
        Ipv6Addr::from(octets)
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> RoutingHeader<T> {
    #[inline]
    pub fn set_next_header(&mut self, value: IpProtocol) {
        *next_header_mut(self.buf.as_mut()) = value.into();
    }

    /// Changing the length also changes how many addresses the view exposes.
    #[inline]
    pub fn set_hdr_ext_len(&mut self, value: u8) {
        *hdr_ext_len_mut(self.buf.as_mut()) = value;
    }

    #[inline]
    pub fn set_routing_type(&mut self, value: u8) {
        *routing_type_mut(self.buf.as_mut()) = value;
    }

    #[inline]
    pub fn set_segments_left(&mut self, value: u8) {
        *segments_left_mut(self.buf.as_mut()) = value;
    }

    #[inline]
    pub fn addr_mut(&mut self, idx: usize) -> &mut [u8] {
        assert!(idx < self.total_addrs());

        &mut self.buf.as_mut()[8 + 16 * idx..24 + 16 * idx]
    }

    #[inline]
    pub fn set_addr(&mut self, idx: usize, value: &Ipv6Addr) {
        self.addr_mut(idx).copy_from_slice(&value.octets());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type0(addrs: &[Ipv6Addr], segments_left: u8) -> Vec<u8> {
        let mut buf = vec![0u8; ROUTING_HEADER_FIXED_LEN + 16 * addrs.len()];
        let mut hdr = RoutingHeader::new_unchecked(&mut buf[..]);
        hdr.set_next_header(IpProtocol::UDP);
        hdr.set_hdr_ext_len((addrs.len() * 2) as u8);
        hdr.set_routing_type(0);
        hdr.set_segments_left(segments_left);
        for (idx, addr) in addrs.iter().enumerate() {
            hdr.set_addr(idx, addr);
        }
        buf
    }

    #[test]
    fn address_list() {
        let addrs: Vec<Ipv6Addr> = ["2001:db8::a", "2001:db8::b", "2001:db8::c"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let mut buf = type0(&addrs, 2);

        let mut hdr = RoutingHeader::new(&mut buf[..]).unwrap();
        assert_eq!(hdr.header_len(), 56);
        assert_eq!(hdr.total_addrs(), 3);
        assert_eq!(hdr.routing_type(), 0);
        assert_eq!(hdr.next_to_visit(), Some(1));
        assert_eq!(hdr.addr(2), addrs[2]);

        hdr.set_addr(1, &Ipv6Addr::LOCALHOST);
        hdr.set_segments_left(1);
        assert_eq!(hdr.addr(1), Ipv6Addr::LOCALHOST);
        assert_eq!(hdr.segments_left(), 1);
        assert_eq!(hdr.next_header(), IpProtocol::UDP);

        hdr.set_routing_type(2);
        assert_eq!(hdr.routing_type(), 2);
    }

    #[test]
    fn segments_left_beyond_list() {
        let buf = type0(&[Ipv6Addr::LOCALHOST], 4);
        let hdr = RoutingHeader::new(&buf[..]).unwrap();
        assert_eq!(hdr.next_to_visit(), None);
    }

    #[test]
    fn truncated_address_list() {
        let buf = type0(&[Ipv6Addr::LOCALHOST, Ipv6Addr::UNSPECIFIED], 1);
        assert!(RoutingHeader::new(&buf[..buf.len() - 1]).is_err());
        assert!(RoutingHeader::new(&buf[..4]).is_err());
    }
}
