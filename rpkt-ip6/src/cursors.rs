use bytes::Buf;

/// A read-only view over packet bytes that remembers where it started.
///
/// Advancing the cursor narrows the visible chunk; `cursor()` reports how far
/// it has moved from the start of the original buffer.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    chunk: &'a [u8],
    start: &'a [u8],
}

impl<'a> Cursor<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor {
            chunk: buf,
            start: buf,
        }
    }

    /// The whole buffer the cursor was created from.
    #[inline]
    pub fn buf(&self) -> &'a [u8] {
        self.start
    }

    #[inline]
    pub fn chunk_shared_lifetime(&self) -> &'a [u8] {
        self.chunk
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.start.len() - self.chunk.len()
    }
}

impl<'a> Buf for Cursor<'a> {
    #[inline]
    fn remaining(&self) -> usize {
        self.chunk.len()
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        self.chunk
    }

    #[inline]
    fn advance(&mut self, cnt: usize) {
        assert!(cnt <= self.chunk.len());
        self.chunk = &self.chunk[cnt..];
    }
}
