//! Classification of packets against textual filter patterns.
//!
//! Every configured pattern owns one output port. A packet is cloned to
//! the port of each pattern it matches, so it may leave through zero, one
//! or several ports.

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};

use crate::conf::ClassifierConf;
use crate::element::{Element, Output};
use crate::ipv6::IPV6_HEADER_LEN;
use crate::{Packet, Result};

mod token;
pub use token::{tokenize, Token};

mod rules;
pub use rules::{parse_pattern, Argument, MatchRule, RuleType, SubSubType, SubType};

mod eval;
pub use eval::classify;

#[derive(Debug)]
pub struct Ip6Classifier {
    rules: Vec<MatchRule>,
    drops: AtomicU64,
}

impl Ip6Classifier {
    /// Compile every pattern of `conf`.
    ///
    /// The first malformed pattern fails the whole configuration.
    pub fn new(conf: ClassifierConf) -> Result<Self> {
        let rules = conf
            .patterns
            .iter()
            .enumerate()
            .map(|(output, pattern)| parse_pattern(output, pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rules,
            drops: AtomicU64::new(0),
        })
    }

    /// Output ports of the rules matching `pkt`, in configuration order.
    pub fn matches<'s>(&'s self, pkt: &'s [u8]) -> impl Iterator<Item = usize> + 's {
        self.rules
            .iter()
            .filter(move |rule| classify(rule, pkt))
            .map(|rule| rule.output)
    }

    pub fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }
}

impl Element for Ip6Classifier {
    fn class_name(&self) -> &'static str {
        "IP6Classifier"
    }

    fn port_count(&self) -> String {
        format!("1/{}", self.rules.len())
    }

    fn push(&self, pkt: Packet, out: &mut dyn Output) {
        if pkt.len() < IPV6_HEADER_LEN {
            warn!("dropping {} byte packet shorter than the ipv6 header", pkt.len());
            self.drops.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let mut matched = 0;
        for port in self.matches(pkt.data()) {
            out.push(port, pkt.clone());
            matched += 1;
        }
        if matched == 0 {
            debug!("packet matched none of {} patterns", self.rules.len());
        }
    }

    fn read_handler(&self, name: &str) -> Option<String> {
        match name {
            "drops" => Some(self.drops().to_string()),
            _ => None,
        }
    }
}
