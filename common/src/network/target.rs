//! # Target Expressions
//!
//! Parses the compact target syntax accepted on the command line and expands
//! it into a flat [`IpCollection`].
//!
//! An expression is a comma-separated list of clauses, each one of:
//! * A single IPv4/IPv6 address (e.g. `192.0.2.1`, `2001:db8::1`).
//! * A CIDR block (e.g. `192.0.2.64/29`, `2001:db8::/126`).
//! * A dash range, either abbreviated (`192.0.2.1-6`, `2001:db8::1-a`) or with
//!   two full addresses (`192.0.2.1-192.0.3.9`).
//!
//! Every clause is parsed before any of them is expanded, so a syntax error in
//! the last clause never costs the expansion of the first ones.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::debug;
use crate::error::{ParseError, ParseErrorKind};
use crate::network::range::{self, IpCollection, IpRange};

/// Upper bound on the number of addresses an expression may expand into.
pub const DEFAULT_MAX_TARGETS: usize = 1 << 20;

/// Knobs that change how clauses expand, not how they parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Drop network/broadcast addresses from CIDR blocks.
    pub hosts_only: bool,
    pub max_targets: usize,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            hosts_only: false,
            max_targets: DEFAULT_MAX_TARGETS,
        }
    }
}

/// The part after the dash of a range clause, resolved once at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeTail {
    /// Replaces the final octet (IPv4) or hextet (IPv6) of the start address.
    LastComponent(u16),
    FullAddress(IpAddr),
}

impl RangeTail {
    /// Produces the end address of a range starting at `start`.
    pub fn resolve(self, start: IpAddr) -> IpAddr {
        match (self, start) {
            (RangeTail::FullAddress(end), _) => end,
            (RangeTail::LastComponent(last), IpAddr::V4(v4)) => {
                let mut octets = v4.octets();
                octets[3] = last as u8;
                IpAddr::from(octets)
            }
            (RangeTail::LastComponent(last), IpAddr::V6(v6)) => {
                let mut segments = v6.segments();
                segments[7] = last;
                IpAddr::from(segments)
            }
        }
    }
}

/// A single parsed clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// One specific host.
    Host { target_addr: IpAddr },
    /// A CIDR block, expanded according to [`ExpandOptions::hosts_only`].
    Cidr { base_addr: IpAddr, prefix: u8 },
    /// An inclusive, ascending range.
    Range { ip_range: IpRange },
}

impl Target {
    /// Appends this clause's addresses to `collection`, enforcing `max_targets`.
    fn extend_into(
        &self,
        collection: &mut IpCollection,
        options: &ExpandOptions,
    ) -> Result<(), ParseErrorKind> {
        let too_many = ParseErrorKind::TooManyAddresses {
            limit: options.max_targets,
        };

        let ip_range = match self {
            Target::Host { target_addr } => IpRange::single(*target_addr),
            Target::Range { ip_range } => *ip_range,
            Target::Cidr { base_addr, prefix } if options.hosts_only => {
                range::cidr_hosts(*base_addr, *prefix)?
            }
            Target::Cidr { base_addr, prefix } => range::cidr_range(*base_addr, *prefix)?,
        };

        if ip_range.len() > options.max_targets as u128 {
            return Err(too_many);
        }
        collection.add_range(&ip_range);
        if collection.len() > options.max_targets {
            return Err(too_many);
        }
        Ok(())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Host { target_addr } => write!(f, "{target_addr}"),
            Target::Cidr { base_addr, prefix } => write!(f, "{base_addr}/{prefix}"),
            Target::Range { ip_range } => write!(f, "{}-{}", ip_range.start_addr, ip_range.end_addr),
        }
    }
}

impl FromStr for Target {
    type Err = ParseError;

    /// Parses exactly one clause; commas are not accepted here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clause = s.trim();
        parse_clause(clause).map_err(|kind| ParseError::new(clause, kind))
    }
}

/// One clause together with the text it was parsed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clause {
    pub text: String,
    pub target: Target,
}

/// A fully parsed, not yet expanded, target expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetExpression {
    pub clauses: Vec<Clause>,
}

impl TargetExpression {
    /// Expands every clause in order into a deduplicated collection.
    pub fn expand(&self, options: &ExpandOptions) -> Result<IpCollection, ParseError> {
        let mut collection = IpCollection::new();

        for clause in &self.clauses {
            clause
                .target
                .extend_into(&mut collection, options)
                .map_err(|kind| ParseError::new(clause.text.as_str(), kind))?;
            debug!("Expanded {} -> {} addresses so far", clause.target, collection.len());
        }

        Ok(collection)
    }
}

impl FromStr for TargetExpression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseError::new(s, ParseErrorKind::EmptyExpression));
        }

        let mut clauses = Vec::new();
        for (idx, part) in s.split(',').enumerate() {
            let text = part.trim();
            if text.is_empty() {
                return Err(ParseError::new(
                    text,
                    ParseErrorKind::EmptyClause { position: idx + 1 },
                ));
            }
            let target = parse_clause(text).map_err(|kind| ParseError::new(text, kind))?;
            clauses.push(Clause {
                text: text.to_string(),
                target,
            });
        }

        Ok(Self { clauses })
    }
}

/// Parses and expands an expression in one step.
pub fn expand(expression: &str, options: &ExpandOptions) -> Result<IpCollection, ParseError> {
    expression.parse::<TargetExpression>()?.expand(options)
}

/// Tries CIDR, then range, then single-address syntax.
fn parse_clause(clause: &str) -> Result<Target, ParseErrorKind> {
    if let Some((addr_str, prefix_str)) = clause.split_once('/') {
        return parse_cidr(addr_str, prefix_str);
    }
    if let Some((start_str, tail_str)) = clause.split_once('-') {
        return parse_range(start_str, tail_str);
    }
    parse_host(clause).map(|target_addr| Target::Host { target_addr })
}

fn parse_host(s: &str) -> Result<IpAddr, ParseErrorKind> {
    s.trim()
        .parse::<IpAddr>()
        .map_err(|_| ParseErrorKind::InvalidAddress { input: s.trim().to_string() })
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr(addr_str: &str, prefix_str: &str) -> Result<Target, ParseErrorKind> {
    let base_addr = parse_host(addr_str)?;
    let prefix_str = prefix_str.trim();

    if prefix_str.is_empty() || !prefix_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidPrefix {
            input: prefix_str.to_string(),
        });
    }

    let max = range::max_prefix(&base_addr);
    let prefix = match prefix_str.parse::<u32>() {
        Ok(prefix) if prefix <= u32::from(max) => prefix as u8,
        Ok(prefix) => return Err(ParseErrorKind::PrefixOutOfRange { prefix, max }),
        Err(_) => return Err(ParseErrorKind::PrefixOutOfRange { prefix: u32::MAX, max }),
    };

    Ok(Target::Cidr { base_addr, prefix })
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_range(start_str: &str, tail_str: &str) -> Result<Target, ParseErrorKind> {
    let start_addr = parse_host(start_str)?;
    let tail = parse_range_tail(tail_str.trim(), &start_addr)?;
    let end_addr = tail.resolve(start_addr);

    let ip_range = IpRange::new(start_addr, end_addr)?;
    Ok(Target::Range { ip_range })
}

/// Decides whether the tail is a full address or a bare final component.
///
/// A bare component is decimal (0-255) after an IPv4 start and hexadecimal
/// (1-4 digits) after an IPv6 start, mirroring how each family writes it.
fn parse_range_tail(tail: &str, start_addr: &IpAddr) -> Result<RangeTail, ParseErrorKind> {
    if let Ok(full_addr) = tail.parse::<IpAddr>() {
        return Ok(RangeTail::FullAddress(full_addr));
    }

    let last = match start_addr {
        IpAddr::V4(_) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
            tail.parse::<u8>().ok().map(u16::from)
        }
        IpAddr::V6(_) if (1..=4).contains(&tail.len()) && tail.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u16::from_str_radix(tail, 16).ok()
        }
        _ => None,
    };

    last.map(RangeTail::LastComponent)
        .ok_or_else(|| ParseErrorKind::InvalidRangeTail {
            input: tail.to_string(),
            component: match start_addr {
                IpAddr::V4(_) => "octet",
                IpAddr::V6(_) => "hextet",
            },
        })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
