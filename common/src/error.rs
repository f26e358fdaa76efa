//! Errors raised while turning a target expression into addresses.

use std::net::IpAddr;

use thiserror::Error;

/// A malformed target expression.
///
/// `clause` holds the offending comma-separated unit, trimmed, so the user can
/// see which part of a long expression was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid target '{clause}': {kind}")]
pub struct ParseError {
    pub clause: String,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expression is empty")]
    EmptyExpression,

    #[error("clause {position} is empty")]
    EmptyClause { position: usize },

    #[error("'{input}' is not an IPv4 or IPv6 address")]
    InvalidAddress { input: String },

    #[error("'{input}' is not a valid prefix length")]
    InvalidPrefix { input: String },

    #[error("prefix /{prefix} is out of range (0-{max})")]
    PrefixOutOfRange { prefix: u32, max: u8 },

    #[error("'{input}' is neither an address nor a final {component}")]
    InvalidRangeTail {
        input: String,
        component: &'static str,
    },

    #[error("{start} and {end} belong to different address families")]
    FamilyMismatch { start: IpAddr, end: IpAddr },

    #[error("range end {end} precedes range start {start}")]
    DescendingRange { start: IpAddr, end: IpAddr },

    #[error("expression expands to more than {limit} addresses")]
    TooManyAddresses { limit: usize },
}

impl ParseError {
    pub fn new(clause: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self {
            clause: clause.into(),
            kind,
        }
    }
}
