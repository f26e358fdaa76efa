//! Cross-crate tests: target expansion feeding the sweep engine, with a
//! scripted pinger instead of real ICMP sockets.

pub mod utils;

#[cfg(test)]
mod sweep;
