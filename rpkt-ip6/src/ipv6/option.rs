use bytes::Buf;

use crate::Cursor;

const PAD1: u8 = 0;
const PADN: u8 = 1;

/// A TLV option found inside a Hop-by-Hop or Destination options header.
#[derive(Debug)]
pub enum Ipv6TlvOption<'a> {
    Pad1,
    PadN,
    Generic(GenericTlvOption<&'a [u8]>),
}

#[derive(Debug)]
pub struct GenericTlvOption<T> {
    buf: T,
}

impl<T: AsRef<[u8]>> GenericTlvOption<T> {
    #[inline]
    pub fn option_type(&self) -> u8 {
        self.buf.as_ref()[0]
    }

    #[inline]
    pub fn option_data_len(&self) -> u8 {
        self.buf.as_ref()[1]
    }

    #[inline]
    pub fn option_data(&self) -> &[u8] {
        let opt_len = usize::from(self.option_data_len()) + 2;
        &self.buf.as_ref()[2..opt_len]
    }
}

/// Iterates the options of an options header.
///
/// Each item carries the option's byte offset from the start of the header.
/// Iteration stops when an option runs past the end of the header; the
/// iterator then reports itself invalid and [`Ipv6TlvOptionIter::remaining`]
/// returns the truncated bytes.
#[derive(Debug)]
pub struct Ipv6TlvOptionIter<'a> {
    cursor: Cursor<'a>,
    valid: bool,
}

impl<'a> Ipv6TlvOptionIter<'a> {
    /// Iterate the options of `header`, the whole options header including
    /// its next-header and length bytes.
    #[inline]
    pub fn from_header_bytes(header: &'a [u8]) -> Self {
        let mut cursor = Cursor::new(header);
        cursor.advance(header.len().min(2));
        Self {
            cursor,
            valid: true,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        self.cursor.chunk_shared_lifetime()
    }

    pub fn check_header_bytes(header: &'a [u8]) -> bool {
        let mut reader = Self::from_header_bytes(header);
        for _ in &mut reader {}
        reader.valid
    }
}

impl<'a> Iterator for Ipv6TlvOptionIter<'a> {
    type Item = (usize, Ipv6TlvOption<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.valid || !self.cursor.has_remaining() {
            return None;
        }

        let offset = self.cursor.cursor();
        let chunk = self.cursor.chunk_shared_lifetime();
        if chunk[0] == PAD1 {
            self.cursor.advance(1);
            return Some((offset, Ipv6TlvOption::Pad1));
        }

        if chunk.len() < 2 || chunk.len() < usize::from(chunk[1]) + 2 {
            self.valid = false;
            return None;
        }

        let opt_len = usize::from(chunk[1]) + 2;
        self.cursor.advance(opt_len);
        match chunk[0] {
            PADN => Some((offset, Ipv6TlvOption::PadN)),
            _ => Some((
                offset,
                Ipv6TlvOption::Generic(GenericTlvOption {
                    buf: &chunk[..opt_len],
                }),
            )),
        }
    }
}
