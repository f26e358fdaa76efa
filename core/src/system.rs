//! Host capability checks.

use jollyip_common::warn;

/// Whether the process runs with root privileges.
pub fn is_privileged() -> bool {
    is_root::is_root()
}

/// Logs a heads-up when raw ICMP sockets are likely to be refused.
///
/// Unprivileged ICMP sockets exist on some systems, so this only warns; the
/// socket creation in [`crate::pinger::IcmpPinger`] has the final word.
pub fn warn_if_unprivileged() {
    if !is_privileged() {
        warn!("Not running as root, ICMP sockets may be refused");
    }
}
