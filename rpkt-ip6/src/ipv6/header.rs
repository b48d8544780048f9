use byteorder::{ByteOrder, NetworkEndian};

use super::{IpProtocol, Ipv6Addr};

header_field_val_accessors! {
    (next_header, next_header_mut, 6),
    (hop_limit, hop_limit_mut, 7),
}

header_field_range_accessors! {
    (first_word, first_word_mut, 0..4),
    (payload_len, payload_len_mut, 4..6),
    (src_ip, src_ip_mut, 8..24),
    (dst_ip, dst_ip_mut, 24..40),
}

pub const IPV6_HEADER_LEN: usize = 40;

// Byte offsets of fields inside the fixed header.
pub(crate) const PAYLOAD_LEN_POS: usize = 4;
pub(crate) const NEXT_HEADER_POS: usize = 6;
pub(crate) const HOP_LIMIT_POS: usize = 7;
pub(crate) const DEST_ADDR_POS: usize = 24;

/// RFC8200 - Sec. 3
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |Version| Traffic Class |           Flow Label                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |         Payload Length        |  Next Header  |   Hop Limit   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Ipv6Header<T> {
    buf: T,
}

impl<T: AsRef<[u8]>> Ipv6Header<T> {
    #[inline]
    pub fn new(buf: T) -> Result<Self, T> {
        if buf.as_ref().len() >= IPV6_HEADER_LEN {
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
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[0..IPV6_HEADER_LEN]
    }

    /// The version, traffic class and flow label word in host byte order.
    #[inline]
    pub fn first_word(&self) -> u32 {
        NetworkEndian::read_u32(first_word(self.buf.as_ref()))
    }

    #[inline]
    pub fn version(&self) -> u8 {
        (self.first_word() >> 28) as u8
    }

    #[inline]
    pub fn check_version(&self) -> bool {
        self.version() == 6
    }

    #[inline]
    pub fn traffic_class(&self) -> u8 {
        ((self.first_word() >> 20) & 0xff) as u8
    }

    #[inline]
    pub fn dscp(&self) -> u8 {
        self.traffic_class() >> 2
    }

    #[inline]
    pub fn ecn(&self) -> u8 {
        self.traffic_class() & 0x03
    }

    #[inline]
    pub fn flow_label(&self) -> u32 {
        self.first_word() & 0x000f_ffff
    }

    #[inline]
    pub fn payload_len(&self) -> u16 {
        NetworkEndian::read_u16(payload_len(self.buf.as_ref()))
    }

    #[inline]
    pub fn next_header(&self) -> IpProtocol {
        (*next_header(self.buf.as_ref())).into()
    }

    #[inline]
    pub fn hop_limit(&self) -> u8 {
        *hop_limit(self.buf.as_ref())
    }

    #[inline]
    pub fn source_ip(&self) -> Ipv6Addr {
        let mut octets = [0; 16];
        octets.copy_from_slice(src_ip(self.buf.as_ref()));
        Ipv6Addr::from(octets)
    }

    #[inline]
    pub fn dest_ip(&self) -> Ipv6Addr {
        let mut octets = [0; 16];
        octets.copy_from_slice(dst_ip(self.buf.as_ref()));
        Ipv6Addr::from(octets)
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Ipv6Header<T> {
    #[inline]
    fn set_first_word(&mut self, value: u32) {
        NetworkEndian::write_u32(first_word_mut(self.buf.as_mut()), value);
    }

    #[inline]
    pub fn set_version(&mut self, value: u8) {
        assert!(value <= 0x0f);
        let word = self.first_word();
        self.set_first_word((word & 0x0fff_ffff) | (u32::from(value) << 28));
    }

    #[inline]
    pub fn set_traffic_class(&mut self, value: u8) {
        let word = self.first_word();
        self.set_first_word((word & 0xf00f_ffff) | (u32::from(value) << 20));
    }

    #[inline]
    pub fn set_flow_label(&mut self, value: u32) {
        assert!(value <= 0xfffff);
        let word = self.first_word();
        self.set_first_word((word & 0xfff0_0000) | value);
    }

    #[inline]
    pub fn set_payload_len(&mut self, value: u16) {
        NetworkEndian::write_u16(payload_len_mut(self.buf.as_mut()), value);
    }

    #[inline]
    pub fn set_next_header(&mut self, value: IpProtocol) {
        *next_header_mut(self.buf.as_mut()) = value.into();
    }

    #[inline]
    pub fn set_hop_limit(&mut self, value: u8) {
        *hop_limit_mut(self.buf.as_mut()) = value;
    }

    #[inline]
    pub fn set_source_ip(&mut self, value: &Ipv6Addr) {
        src_ip_mut(self.buf.as_mut()).copy_from_slice(&value.octets());
    }

    #[inline]
    pub fn set_dest_ip(&mut self, value: &Ipv6Addr) {
        dst_ip_mut(self.buf.as_mut()).copy_from_slice(&value.octets());
    }
}
