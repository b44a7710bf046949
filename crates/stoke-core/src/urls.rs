//! URLs to show for a server bound to `host:port`.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Local and network URLs of a running server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrls {
    pub local_url_for_terminal: String,
    pub local_url_for_browser: String,
    /// Only present when the server listens on every interface and a
    /// private-network address was found.
    pub lan_url_for_terminal: Option<String>,
    pub lan_url_for_config: Option<String>,
}

/// Compute the URLs for a server, probing for a LAN address when `host`
/// is unspecified (`0.0.0.0` or `::`).
pub fn prepare_urls(protocol: &str, host: &str, port: u16) -> ServerUrls {
    let lan = if is_unspecified_host(host) {
        detect_lan_ip()
    } else {
        None
    };
    prepare_urls_with_lan(protocol, host, port, lan)
}

/// Same as [`prepare_urls`] with the LAN address supplied by the caller.
///
/// ```
/// use stoke_core::prepare_urls_with_lan;
/// use std::net::{IpAddr, Ipv4Addr};
///
/// let urls = prepare_urls_with_lan("http", "0.0.0.0", 3000, Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 7))));
/// assert_eq!(urls.local_url_for_terminal, "http://localhost:3000/");
/// assert_eq!(urls.lan_url_for_terminal.as_deref(), Some("http://192.168.1.7:3000/"));
/// ```
pub fn prepare_urls_with_lan(protocol: &str, host: &str, port: u16, lan: Option<IpAddr>) -> ServerUrls {
    let unspecified = is_unspecified_host(host);
    let pretty_host = if unspecified { "localhost" } else { host };

    let (lan_url_for_terminal, lan_url_for_config) = match lan {
        Some(ip) if unspecified && is_private(&ip) => {
            let ip = ip.to_string();
            (Some(format_url(protocol, &ip, port)), Some(ip))
        }
        _ => (None, None),
    };

    let local = format_url(protocol, pretty_host, port);
    ServerUrls {
        local_url_for_terminal: local.clone(),
        local_url_for_browser: local,
        lan_url_for_terminal,
        lan_url_for_config,
    }
}

pub fn is_unspecified_host(host: &str) -> bool {
    host == "0.0.0.0" || host == "::"
}

fn format_url(protocol: &str, host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("{}://[{}]:{}/", protocol, host, port)
    } else {
        format!("{}://{}:{}/", protocol, host, port)
    }
}

fn is_private(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(_) => false,
    }
}

/// Address of the interface that would route outward. Connecting a UDP
/// socket sends nothing; it only selects the source address.
fn detect_lan_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(10, 255, 255, 255), 1)).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified() && !ip.is_loopback()).then_some(ip)
}
