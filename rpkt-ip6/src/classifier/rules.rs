//! Filter rules and the recursive-descent parser producing them.
//!
//! ```text
//! pattern       := "ip" ip_clause | "icmp" icmp_clause | "src" src_clause
//!                | "dst" dst_clause | "ether" | "tcp" port_clause
//!                | "udp" port_clause | "true" | "false"
//! ip_clause     := "proto" ("tcp"|"udp"|"icmp")
//!                | "vers" NUM+ | "frag" | "unfrag"
//!                | "hll" NUM+ | "CoS" NUM+ | "flow" NUM+
//! icmp_clause   := "type" NUM+
//! src_clause    := "and" "dst" target_clause | "or" "dst" target_clause | target_clause
//! dst_clause    := target_clause
//! target_clause := "host" ADDR+ | "net" ADDR+ | "tcp" port_clause | "udp" port_clause
//! port_clause   := "port" NUM+
//! ```

use std::net::Ipv6Addr;

use crate::{Error, Result};

use super::token::{tokenize, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleType {
    Ip,
    Icmp,
    Src,
    Dst,
    Ether,
    Tcp,
    Udp,
    True,
    False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubType {
    IpProto,
    Vers,
    Frag,
    Unfrag,
    Hll,
    Cos,
    Flow,
    IcmpType,
    Src,
    Dst,
    SrcAndDst,
    SrcOrDst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubSubType {
    Host,
    Net,
    Tcp,
    Udp,
    Icmp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    Num(u32),
    Addr(Ipv6Addr),
}

/// A compiled filter pattern.
///
/// `args` is OR-matched: the rule holds when the observed value equals any
/// of the arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule {
    pub rule_type: RuleType,
    pub sub_type: Option<SubType>,
    pub sub_sub_type: Option<SubSubType>,
    pub args: Vec<Argument>,
    pub output: usize,
}

impl MatchRule {
    fn new(rule_type: RuleType, output: usize) -> Self {
        Self {
            rule_type,
            sub_type: None,
            sub_sub_type: None,
            args: Vec::new(),
            output,
        }
    }
}

/// Compile the pattern at position `output` of the configuration.
pub fn parse_pattern(output: usize, pattern: &str) -> Result<MatchRule> {
    let tokens = tokenize(pattern);
    let mut parser = Parser {
        output,
        tokens: &tokens[..],
        pos: 0,
    };
    let rule = parser.pattern()?;
    parser.finish()?;
    Ok(rule)
}

struct Parser<'t, 'a> {
    output: usize,
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn error(&self, reason: &'static str) -> Error {
        let token = match self.tokens.get(self.pos) {
            Some(tok) => tok.text.to_string(),
            None => String::new(),
        };
        Error::Syntax {
            pattern: self.output,
            token,
            reason,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(|tok| tok.text)
    }

    fn bump(&mut self) -> Option<&'a str> {
        let text = self.peek()?;
        self.pos += 1;
        Some(text)
    }

    /// Consume a keyword out of `choices`, reporting `reason` otherwise.
    fn keyword(&mut self, choices: &[&str], reason: &'static str) -> Result<&'a str> {
        match self.peek() {
            Some(text) if choices.contains(&text) => {
                self.pos += 1;
                Ok(text)
            }
            _ => Err(self.error(reason)),
        }
    }

    fn finish(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error("unexpected trailing word")),
        }
    }

    fn pattern(&mut self) -> Result<MatchRule> {
        let output = self.output;
        let word = self.keyword(
            &[
                "ip", "icmp", "src", "dst", "ether", "tcp", "udp", "true", "false",
            ],
            "expected a filter type",
        )?;
        match word {
            "ip" => self.ip_clause(MatchRule::new(RuleType::Ip, output)),
            "icmp" => {
                let mut rule = MatchRule::new(RuleType::Icmp, output);
                rule.sub_sub_type = Some(SubSubType::Icmp);
                self.keyword(&["type"], "expected \"type\"")?;
                rule.sub_type = Some(SubType::IcmpType);
                rule.args = self.numbers()?;
                Ok(rule)
            }
            "src" => self.src_clause(MatchRule::new(RuleType::Src, output)),
            "dst" => {
                let mut rule = MatchRule::new(RuleType::Dst, output);
                rule.sub_type = Some(SubType::Dst);
                self.target_clause(rule)
            }
            "tcp" | "udp" => {
                let (rule_type, proto) = if word == "tcp" {
                    (RuleType::Tcp, SubSubType::Tcp)
                } else {
                    (RuleType::Udp, SubSubType::Udp)
                };
                let mut rule = MatchRule::new(rule_type, output);
                rule.sub_type = Some(SubType::SrcOrDst);
                rule.sub_sub_type = Some(proto);
                self.port_clause(rule)
            }
            "ether" => Ok(MatchRule::new(RuleType::Ether, output)),
            "true" => Ok(MatchRule::new(RuleType::True, output)),
            _ => Ok(MatchRule::new(RuleType::False, output)),
        }
    }

    fn ip_clause(&mut self, mut rule: MatchRule) -> Result<MatchRule> {
        let word = self.keyword(
            &["proto", "vers", "frag", "unfrag", "hll", "CoS", "flow"],
            "expected an ip field",
        )?;
        let sub_type = match word {
            "proto" => SubType::IpProto,
            "vers" => SubType::Vers,
            "frag" => SubType::Frag,
            "unfrag" => SubType::Unfrag,
            "hll" => SubType::Hll,
            "CoS" => SubType::Cos,
            _ => SubType::Flow,
        };
        rule.sub_type = Some(sub_type);

        match sub_type {
            SubType::IpProto => {
                let proto = self.keyword(&["tcp", "udp", "icmp"], "expected a protocol")?;
                rule.sub_sub_type = Some(match proto {
                    "tcp" => SubSubType::Tcp,
                    "udp" => SubSubType::Udp,
                    _ => SubSubType::Icmp,
                });
            }
            SubType::Frag | SubType::Unfrag => {}
            _ => rule.args = self.numbers()?,
        }
        Ok(rule)
    }

    fn src_clause(&mut self, mut rule: MatchRule) -> Result<MatchRule> {
        match self.peek() {
            Some("and") | Some("or") => {
                let combined = if self.bump() == Some("and") {
                    SubType::SrcAndDst
                } else {
                    SubType::SrcOrDst
                };
                self.keyword(&["dst"], "expected \"dst\"")?;
                rule.sub_type = Some(combined);
            }
            _ => rule.sub_type = Some(SubType::Src),
        }
        self.target_clause(rule)
    }

    fn target_clause(&mut self, mut rule: MatchRule) -> Result<MatchRule> {
        let word = self.keyword(
            &["host", "net", "tcp", "udp"],
            "expected \"host\", \"net\", \"tcp\" or \"udp\"",
        )?;
        match word {
            "host" | "net" => {
                rule.sub_sub_type = Some(if word == "host" {
                    SubSubType::Host
                } else {
                    SubSubType::Net
                });
                rule.args = self.addresses()?;
                Ok(rule)
            }
            "tcp" => {
                rule.sub_sub_type = Some(SubSubType::Tcp);
                self.port_clause(rule)
            }
            _ => {
                rule.sub_sub_type = Some(SubSubType::Udp);
                self.port_clause(rule)
            }
        }
    }

    fn port_clause(&mut self, mut rule: MatchRule) -> Result<MatchRule> {
        self.keyword(&["port"], "expected \"port\"")?;
        rule.args = self.numbers()?;
        Ok(rule)
    }

    /// One or more decimal literals up to the end of the pattern.
    fn numbers(&mut self) -> Result<Vec<Argument>> {
        self.arguments("expected a number", |text| {
            text.parse::<u32>().ok().map(Argument::Num)
        })
    }

    /// One or more IPv6 address literals up to the end of the pattern.
    fn addresses(&mut self) -> Result<Vec<Argument>> {
        self.arguments("expected an ipv6 address", |text| {
            text.parse::<Ipv6Addr>().ok().map(Argument::Addr)
        })
    }

    fn arguments<F>(&mut self, reason: &'static str, parse: F) -> Result<Vec<Argument>>
    where
        F: Fn(&str) -> Option<Argument>,
    {
        let mut args = Vec::new();
        while let Some(text) = self.peek() {
            let arg = parse(text).ok_or_else(|| self.error(reason))?;
            args.push(arg);
            self.pos += 1;
        }
        if args.is_empty() {
            return Err(self.error(reason));
        }
        Ok(args)
    }
}
