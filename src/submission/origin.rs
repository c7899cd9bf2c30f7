use std::net::IpAddr;

use axum::http::HeaderMap;
use ipnet::IpNet;

use crate::storage::PUBLIC_PREFIX;

/// Scheme and host the client used to reach us, for building public URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicOrigin {
    pub scheme: &'static str,
    pub host: String,
}

impl PublicOrigin {
    pub fn upload_url(&self, file_name: &str) -> String {
        format!("{}://{}{PUBLIC_PREFIX}{file_name}", self.scheme, self.host)
    }
}

/// Work out the public origin of a request.
///
/// We never terminate TLS ourselves, so a request only counts as secured when
/// a trusted proxy says so through `X-Forwarded-Proto`. `X-Forwarded-Host` is
/// honoured under the same condition.
pub fn resolve(
    headers: &HeaderMap,
    authority: Option<&str>,
    peer_addr: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> PublicOrigin {
    let peer = peer_addr.unwrap_or(IpAddr::from([127, 0, 0, 1]));
    let via_proxy =
        !trusted_proxies.is_empty() && trusted_proxies.iter().any(|net| net.contains(&peer));

    let scheme = match via_proxy.then(|| forwarded(headers, "x-forwarded-proto")).flatten() {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };

    let host = via_proxy
        .then(|| forwarded(headers, "x-forwarded-host"))
        .flatten()
        .or_else(|| headers.get("host").and_then(|v| v.to_str().ok()))
        .or(authority)
        .unwrap_or("localhost")
        .to_string();

    PublicOrigin { scheme, host }
}

/// First entry of a comma-separated forwarding header.
fn forwarded<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
