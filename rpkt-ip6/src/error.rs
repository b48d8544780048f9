quick_error! {
    /// The error type shared by every stage.
    ///
    /// `Syntax` and `InvalidMtu` are configuration errors and are returned
    /// to the caller that builds an element. The remaining variants describe
    /// a single malformed packet; elements turn them into drops or
    /// pass-through decisions and never propagate them out of `push`.
    #[derive(Debug, Eq, PartialEq, Clone)]
    pub enum Error {
        Syntax { pattern: usize, token: String, reason: &'static str } {
            display("syntax error in pattern {} at {:?}: {}", pattern, token, reason)
        }
        InvalidMtu(mtu: usize) {
            display("mtu {} can not carry a fragment with a non-empty payload", mtu)
        }
        UnknownHeader { offset: usize, next_header: u8 } {
            display("unrecognized extension header type {} at offset {}", next_header, offset)
        }
        BufferBounds { offset: usize, len: usize, total: usize } {
            display("access of {} bytes at offset {} exceeds packet length {}", len, offset, total)
        }
        Truncated(len: usize) {
            display("packet of {} bytes is shorter than the ipv6 header", len)
        }
    }
}

impl Error {
    /// Whether the error describes a broken extension header chain.
    pub fn is_malformed_chain(&self) -> bool {
        matches!(
            self,
            Error::UnknownHeader { .. } | Error::BufferBounds { .. } | Error::Truncated(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
