#![warn(missing_debug_implementations, rust_2018_idioms)]

//! IPv6 header-level processing stages for a packet-forwarding pipeline.
//!
//! The crate walks IPv6 extension header chains and provides four
//! independent stages built on top of that walk:
//!
//! - [`classifier::Ip6Classifier`]: matches packets against textual filter
//!   patterns and fans them out to one output per pattern.
//! - [`fragmenter::Ip6Fragmenter`]: splits packets exceeding an MTU into
//!   fragments carrying a Fragment extension header.
//! - [`hopbyhop::Ip6HopByHop`]: inspects Hop-by-Hop options (Jumbo Payload,
//!   Router Alert).
//! - [`routing::Ip6Routing`]: executes Type-0 Routing header segments.

#[macro_use]
extern crate quick_error;

#[macro_use]
mod macros;

mod cursors;
pub use cursors::Cursor;

mod error;
pub use error::{Error, Result};

mod packet;
pub use packet::{Packet, WritablePacket};

pub mod conf;
pub mod element;
pub use element::{Element, Output, PortQueues};

pub mod ipv6;

pub mod classifier;
pub mod fragmenter;
pub mod hopbyhop;
pub mod routing;
