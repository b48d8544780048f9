use byteorder::{ByteOrder, NetworkEndian};

use super::IpProtocol;

header_field_val_accessors! {
    (next_header, next_header_mut, 0),
}

header_field_range_accessors! {
    (frag_off, frag_off_mut, 2..4),
    (ident, ident_mut, 4..8),
}

pub const FRAG_HEADER_LEN: usize = 8;

/// RFC8200 - Sec. 4.5
///
/// ```text
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Next Header  |   Reserved    |      Fragment Offset    |Res|M|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Identification                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FragHeader<T> {
    buf: T,
}

impl<T: AsRef<[u8]>> FragHeader<T> {
    #[inline]
    pub fn new(buf: T) -> Result<Self, T> {
        if buf.as_ref().len() >= FRAG_HEADER_LEN {
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
        &self.buf.as_ref()[0..FRAG_HEADER_LEN]
    }

    #[inline]
    pub fn next_header(&self) -> IpProtocol {
        (*next_header(self.buf.as_ref())).into()
    }

    /// Fragment offset in 8-byte units.
    #[inline]
    pub fn frag_off(&self) -> u16 {
        NetworkEndian::read_u16(frag_off(self.buf.as_ref())) >> 3
    }

    /// The two reserved bits between the offset and the M flag.
    #[inline]
    pub fn res(&self) -> u8 {
        ((NetworkEndian::read_u16(frag_off(self.buf.as_ref())) >> 1) & 0x03) as u8
    }

    /// true: more frags
    /// false: last frag
    #[inline]
    pub fn m_flag(&self) -> bool {
        (NetworkEndian::read_u16(frag_off(self.buf.as_ref())) & 1) == 1
    }

    #[inline]
    pub fn ident(&self) -> u32 {
        NetworkEndian::read_u32(ident(self.buf.as_ref()))
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> FragHeader<T> {
    #[inline]
    pub fn set_next_header(&mut self, value: IpProtocol) {
        *next_header_mut(self.buf.as_mut()) = value.into();
    }

    /// Zero the reserved byte and the two reserved offset bits.
    #[inline]
    pub fn adjust_reserved(&mut self) {
        self.buf.as_mut()[1] = 0;

        let data = frag_off_mut(self.buf.as_mut());
        let raw = NetworkEndian::read_u16(data);
        NetworkEndian::write_u16(data, raw & 0xfff9);
    }

    #[inline]
    pub fn set_frag_off(&mut self, value: u16) {
        assert!(value <= 0x1fff);
        let data = frag_off_mut(self.buf.as_mut());
        let low = NetworkEndian::read_u16(data) & 0x07;
        NetworkEndian::write_u16(data, value << 3 | low);
    }

    #[inline]
    pub fn set_m_flag(&mut self, value: bool) {
        let data = frag_off_mut(self.buf.as_mut());
        let raw = NetworkEndian::read_u16(data) & 0xfffe;
        NetworkEndian::write_u16(data, raw | u16::from(value));
    }

    #[inline]
    pub fn set_ident(&mut self, value: u32) {
        NetworkEndian::write_u32(ident_mut(self.buf.as_mut()), value);
    }
}
