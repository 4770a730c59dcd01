//! # Streaming AT command driver for ESP8266 WiFi modules
//!
//! Blocking, allocation free driver talking to the ESP8266 AT firmware over any
//! [embedded-io](embedded_io) serial transport. Replies are parsed byte by byte while they are
//! received, so no reply buffer is needed.
//!
//! Inbound socket data (`+IPD` frames) may arrive at any time, even in the middle of a command
//! reply. It's separated from the reply stream by the serial link and buffered per
//! link.
//!
//! ## Usage
//!
//! * [Adapter](crate::adapter::Adapter): Creation, bring-up and basic commands
//! * [WIFI](crate::wifi): Access point and interface configuration
//! * [TCP/IP](crate::stack): Opening links, sending and receiving data
//! * [SharedAdapter](crate::shared::SharedAdapter): Access from multiple execution contexts
//!
//! ## Features
//!
//! * `examples`: Mocks for doc examples, enabled by default
//! * `log`: Logging by the [log] crate
//! * `defmt`: Logging by [defmt](https://docs.rs/defmt) and `defmt::Format` for public types
//! * `strict`: Fails on warnings
#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

#[macro_use]
mod fmt;

pub mod adapter;
pub(crate) mod commands;
#[cfg(feature = "examples")]
pub mod example;
pub(crate) mod inbound;
pub(crate) mod link;
pub(crate) mod matcher;
pub mod notice;
pub mod registry;
pub(crate) mod responses;
pub(crate) mod scanner;
pub mod shared;
pub mod stack;
pub mod status;
pub mod wifi;

#[cfg(test)]
mod tests;
