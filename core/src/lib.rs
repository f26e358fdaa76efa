//! Probing engine for jollyip.
//!
//! [`sweep::run`] drives one ICMP probe per address through a [`pinger::Pinger`]
//! and folds the outcomes into a [`jollyip_common::sweep::ProbeSummary`].

pub mod pinger;
pub mod resolver;
pub mod sweep;
pub mod system;
