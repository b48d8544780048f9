//! Hop-by-Hop options inspection.

use std::sync::atomic::{AtomicU64, Ordering};

use byteorder::{ByteOrder, NetworkEndian};
use log::{debug, warn};

use crate::element::{Element, Output};
use crate::ipv6::{
    ExtHeader, HeaderChain, IpProtocol, Ipv6Header, Ipv6TlvOption, Ipv6TlvOptionIter,
};
use crate::Packet;

pub const ROUTER_ALERT: u8 = 5;
pub const JUMBO_PAYLOAD: u8 = 194;

/// Jumbo Payload lengths must exceed the range of the payload length field.
const JUMBO_MIN_LEN: u32 = 65536;

/// Result of scanning the options of a Hop-by-Hop header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HbhOutcome {
    Normal,
    Jumbo,
    RouterAlert,
    JumboError,
    UnrecognizedOption,
}

impl HbhOutcome {
    /// The output port a packet with this outcome leaves through.
    pub fn port(&self) -> usize {
        match self {
            HbhOutcome::Normal | HbhOutcome::UnrecognizedOption => 0,
            HbhOutcome::Jumbo => 1,
            HbhOutcome::RouterAlert => 2,
            HbhOutcome::JumboError => 3,
        }
    }
}

/// Classify the options of `header`, a complete Hop-by-Hop header.
///
/// Scanning stops at the first Jumbo Payload option, well formed Router
/// Alert option or unrecognized option. A misaligned or malformed Router
/// Alert is skipped.
pub fn classify_options(header: &[u8]) -> HbhOutcome {
    let mut iter = Ipv6TlvOptionIter::from_header_bytes(header);
    for (offset, opt) in &mut iter {
        let opt = match opt {
            Ipv6TlvOption::Pad1 | Ipv6TlvOption::PadN => continue,
            Ipv6TlvOption::Generic(opt) => opt,
        };

        match opt.option_type() {
            ROUTER_ALERT => {
                if opt.option_data_len() == 2 && offset % 2 == 0 {
                    return HbhOutcome::RouterAlert;
                }
                warn!(
                    "router alert option at offset {} with length {} is malformed",
                    offset,
                    opt.option_data_len()
                );
            }
            JUMBO_PAYLOAD => {
                if offset % 4 != 2 {
                    warn!("jumbo payload option at offset {} is misaligned", offset);
                    return HbhOutcome::JumboError;
                }
                if opt.option_data_len() != 4 {
                    warn!(
                        "jumbo payload option has length {}",
                        opt.option_data_len()
                    );
                    return HbhOutcome::JumboError;
                }
                let jumbo_len = NetworkEndian::read_u32(opt.option_data());
                if jumbo_len < JUMBO_MIN_LEN {
                    warn!("jumbo payload length {} is too small", jumbo_len);
                    return HbhOutcome::JumboError;
                }
                return HbhOutcome::Jumbo;
            }
            other => {
                debug!("unrecognized hop-by-hop option {}", other);
                return HbhOutcome::UnrecognizedOption;
            }
        }
    }

    if iter.is_valid() {
        return HbhOutcome::Normal;
    }

    // An option that runs past the end of the header. A single trailing
    // byte can not start an option and is ignored.
    match iter.remaining() {
        [JUMBO_PAYLOAD, _, ..] => {
            warn!("jumbo payload option is truncated");
            HbhOutcome::JumboError
        }
        [opt_type, _, ..] if *opt_type != ROUTER_ALERT && *opt_type != 1 => {
            debug!("unrecognized hop-by-hop option {}", opt_type);
            HbhOutcome::UnrecognizedOption
        }
        _ => HbhOutcome::Normal,
    }
}

/// Sorts packets by their Hop-by-Hop options.
///
/// Output 0 carries packets without a Hop-by-Hop header or without a
/// decisive option, 1 valid Jumbo Payload packets, 2 Router Alert packets
/// and 3 packets with an invalid Jumbo Payload option.
#[derive(Debug, Default)]
pub struct Ip6HopByHop {
    drops: AtomicU64,
}

impl Ip6HopByHop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    /// The outcome for a complete packet, `None` when it must be dropped.
    pub fn outcome(&self, pkt: &[u8]) -> Option<HbhOutcome> {
        let hdr = match Ipv6Header::new(pkt) {
            Ok(hdr) => hdr,
            Err(_) => {
                warn!("packet of {} bytes is shorter than the ipv6 header", pkt.len());
                return None;
            }
        };
        if hdr.hop_limit() == 0 {
            debug!("hop limit is zero");
            return None;
        }

        let first = HeaderChain::new(pkt).ok()?.next()?;
        let item = match first {
            Ok(item) => item,
            Err(err) if hdr.next_header() == IpProtocol::HOPOPT => {
                warn!("hop-by-hop header is malformed: {}", err);
                return None;
            }
            Err(_) => return Some(HbhOutcome::Normal),
        };
        if !matches!(item.header, ExtHeader::HopByHop { .. }) {
            return Some(HbhOutcome::Normal);
        }

        let outcome = classify_options(&pkt[item.offset..item.end()]);
        if outcome == HbhOutcome::Jumbo && hdr.payload_len() != 0 {
            warn!(
                "jumbo payload packet has payload length {}",
                hdr.payload_len()
            );
            return Some(HbhOutcome::JumboError);
        }
        Some(outcome)
    }
}

impl Element for Ip6HopByHop {
    fn class_name(&self) -> &'static str {
        "IP6HopByHop"
    }

    fn port_count(&self) -> String {
        "1/4".to_string()
    }

    fn push(&self, pkt: Packet, out: &mut dyn Output) {
        match self.outcome(pkt.data()) {
            Some(outcome) => out.push(outcome.port(), pkt),
            None => {
                self.drops.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn read_handler(&self, name: &str) -> Option<String> {
        match name {
            "drops" => Some(self.drops().to_string()),
            _ => None,
        }
    }
}
