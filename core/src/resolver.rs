//! Hostname fallback for targets that are not address expressions.

use std::net::IpAddr;

use anyhow::Context;
use tokio::net::lookup_host;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Checks RFC 1123 hostname syntax: dot-separated labels of letters, digits
/// and inner hyphens. A single trailing dot is accepted.
pub fn is_hostname(s: &str) -> bool {
    let name = s.strip_suffix('.').unwrap_or(s);
    if name.is_empty() || name.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

/// Resolves `name` and returns its first address, if any.
pub async fn resolve_hostname(name: &str) -> anyhow::Result<Option<IpAddr>> {
    let mut addrs = lookup_host((name, 0))
        .await
        .with_context(|| format!("'{name}' is not DNS-resolvable"))?;

    Ok(addrs.next().map(|sock_addr| sock_addr.ip()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
