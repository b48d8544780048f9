//! Configuration of the processing elements.

use crate::ipv6::{FRAG_HEADER_LEN, IPV6_HEADER_LEN};

/// Default fragmenter MTU, the minimum IPv6 link MTU.
pub const DEFAULT_MTU: usize = 1280;

/// The smallest MTU that leaves room for one 8-byte fragment data unit
/// behind the fixed header and the Fragment header.
pub const MIN_MTU: usize = IPV6_HEADER_LEN + FRAG_HEADER_LEN + 8;

/// Configuration of [`Ip6Classifier`](crate::classifier::Ip6Classifier).
///
/// Each pattern gets the output port equal to its position in `patterns`.
#[derive(Clone, Debug, Default)]
pub struct ClassifierConf {
    pub patterns: Vec<String>,
}

impl ClassifierConf {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Configuration of [`Ip6Fragmenter`](crate::fragmenter::Ip6Fragmenter).
#[derive(Clone, Debug)]
pub struct FragmenterConf {
    pub mtu: usize,
}

impl FragmenterConf {
    pub fn new(mtu: usize) -> Self {
        Self { mtu }
    }
}

impl Default for FragmenterConf {
    fn default() -> Self {
        Self { mtu: DEFAULT_MTU }
    }
}
