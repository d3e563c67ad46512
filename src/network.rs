//! Local address discovery for the startup banner.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

// Any routable address works; connecting a UDP socket sends nothing.
const PROBE_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 9);

/// Returns the host's LAN IPv4 address, if one can be determined.
///
/// Asks the OS which interface it would route outbound traffic through.
/// Loopback and unspecified answers are discarded.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(PROBE_ADDR).ok()?;

    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if is_lan_candidate(ip) => Some(ip),
        _ => None,
    }
}

/// Host name to print in URLs: the LAN address, or `localhost`.
pub fn display_host() -> String {
    local_ipv4()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "localhost".to_string())
}

fn is_lan_candidate(ip: Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified()
}
