use bytes::{Bytes, BytesMut};

use crate::{Error, Result};

/// A packet buffer that may be shared by several owners.
///
/// Cloning is cheap and shares the underlying bytes, which is how a packet is
/// fanned out to several outputs. Writers must call [`Packet::uniqueify`]
/// first, which only copies the bytes when another owner still exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    buf: Bytes,
}

impl Packet {
    #[inline]
    pub fn new<B: Into<Bytes>>(buf: B) -> Self {
        Self { buf: buf.into() }
    }

    #[inline]
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            buf: Bytes::copy_from_slice(data),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.buf[..]
    }

    /// Read `len` bytes starting at `offset`.
    #[inline]
    pub fn read(&self, offset: usize, len: usize) -> Result<&[u8]> {
        read_at(&self.buf, offset, len)
    }

    /// Obtain an exclusively owned, writable packet.
    ///
    /// The bytes are reused when `self` is the only owner, otherwise they are
    /// copied into a fresh buffer.
    pub fn uniqueify(self) -> WritablePacket {
        let buf = match self.buf.try_into_mut() {
            Ok(buf) => buf,
            Err(shared) => BytesMut::from(&shared[..]),
        };
        WritablePacket { buf }
    }
}

/// An exclusively owned packet buffer that can be modified in place.
#[derive(Debug)]
pub struct WritablePacket {
    buf: BytesMut,
}

impl WritablePacket {
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.buf[..]
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..]
    }

    /// Append bytes at the tail of the packet.
    #[inline]
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Overwrite bytes starting at `offset`.
    #[inline]
    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let end = checked_range(offset, data.len(), self.buf.len())?;
        self.buf[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Turn the buffer back into a shareable packet.
    #[inline]
    pub fn freeze(self) -> Packet {
        Packet {
            buf: self.buf.freeze(),
        }
    }
}

/// Borrow `len` bytes of `buf` starting at `offset`.
#[inline]
pub(crate) fn read_at(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    checked_range(offset, len, buf.len()).map(|end| &buf[offset..end])
}

#[inline]
fn checked_range(offset: usize, len: usize, total: usize) -> Result<usize> {
    match offset.checked_add(len) {
        Some(end) if end <= total => Ok(end),
        _ => Err(Error::BufferBounds { offset, len, total }),
    }
}
