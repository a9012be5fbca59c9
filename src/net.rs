// wfrun — Local network address discovery for `IP_LOCAL`

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// Public address used only to select the outbound interface; no packet is sent.
const ROUTE_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 9);

/// Best-effort non-loopback IPv4 address of this host.
///
/// Connecting a UDP socket makes the OS pick the route (and so the source
/// address) without any traffic. Returns `None` when there is no usable route.
pub fn local_ipv4() -> Option<String> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    if let Err(e) = socket.connect(ROUTE_ADDR) {
        tracing::debug!("No route for local address discovery: {}", e);
        return None;
    }

    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if usable(ip) => Some(ip.to_string()),
        _ => None,
    }
}

fn usable(ip: Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified()
}
