//! IP address extraction utilities
//!
//! The socket peer is the client unless the service is configured to sit
//! behind trusted proxies, in which case the client is read from
//! `X-Forwarded-For`.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Client address for rate limiting.
///
/// With `trusted_proxy_count == 0` forwarding headers are ignored, since
/// any client can set them. With N trusted proxies the client is the entry
/// N positions from the right of the `X-Forwarded-For` chain.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if trusted_proxy_count > 0 {
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| from_forwarded_for(v, trusted_proxy_count))
        {
            return ip;
        }
    }

    socket_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// The chain reads `client, proxy1, proxy2, ...`; each trusted proxy
/// appends the address it received the request from.
fn from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<String> {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let pos = ips.len().checked_sub(trusted_proxy_count)?;
    let candidate = ips.get(pos)?;
    candidate.parse::<IpAddr>().ok().map(|ip| ip.to_string())
}
