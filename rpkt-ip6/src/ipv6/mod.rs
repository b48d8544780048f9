//! IPv6 fixed header, extension headers and the extension header chain.

pub use std::net::Ipv6Addr;

enum_sim! {
    /// An enum-like type for the IPv6 next-header values handled by this crate.
    pub struct IpProtocol (u8) {
        /// Hop-by-Hop options header.
        HOPOPT = 0,

        /// TCP.
        TCP = 6,

        /// UDP.
        UDP = 17,

        /// Encapsulated IPv6.
        IPV6 = 41,

        /// Routing header.
        IPV6_ROUTE = 43,

        /// Fragment header.
        IPV6_FRAG = 44,

        /// Encapsulating security payload.
        ESP = 50,

        /// Authentication header.
        AH = 51,

        /// ICMPv6.
        ICMPV6 = 58,

        /// No next header.
        IPV6_NO_NXT = 59,

        /// Destination options header.
        IPV6_OPTS = 60,
    }
}

impl IpProtocol {
    /// Whether the value names a transport protocol whose header ends the chain.
    #[inline]
    pub fn is_upper_layer(&self) -> bool {
        matches!(
            *self,
            IpProtocol::TCP | IpProtocol::UDP | IpProtocol::ICMPV6 | IpProtocol::IPV6
        )
    }
}

/// Byte length of an extension header of type `proto` whose length field is
/// `hdr_ext_len`.
///
/// Returns `None` for types that do not carry a length rule (upper-layer
/// protocols, the Authentication header, no-next-header and unknown types).
#[inline]
pub fn ext_header_len(proto: IpProtocol, hdr_ext_len: u8) -> Option<usize> {
    match proto {
        IpProtocol::HOPOPT | IpProtocol::IPV6_ROUTE | IpProtocol::IPV6_OPTS => {
            Some((usize::from(hdr_ext_len) + 1) * 8)
        }
        IpProtocol::IPV6_FRAG => Some(FRAG_HEADER_LEN),
        IpProtocol::ESP => Some((usize::from(hdr_ext_len) + 2) * 4),
        _ => None,
    }
}

mod header;
pub use header::{Ipv6Header, IPV6_HEADER_LEN};
pub(crate) use header::{DEST_ADDR_POS, HOP_LIMIT_POS, PAYLOAD_LEN_POS};

mod frag;
pub use frag::{FragHeader, FRAG_HEADER_LEN};

mod routing;
pub use routing::{RoutingHeader, ROUTING_HEADER_FIXED_LEN, TYPE0_MAX_ADDRS};

mod option;
pub use option::{GenericTlvOption, Ipv6TlvOption, Ipv6TlvOptionIter};

mod chain;
pub use chain::{ChainItem, ExtHeader, HeaderChain};
