use axum::http::Request;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_governor::{key_extractor::KeyExtractor, GovernorError};

/// Buckets requests by client IP for the governor layers.
///
/// Device fleets usually report in from behind NAT or a reverse proxy, where
/// the peer address is the proxy, not the client. Proxy headers are consulted
/// first; anything unidentifiable shares the localhost bucket so limiting
/// still applies under Docker and local development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIpKeyExtractor;

fn forwarded_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    // First hop in the X-Forwarded-For chain is the original client
    let header = req.headers().get("x-forwarded-for")?.to_str().ok()?;
    header.split(',').next()?.trim().parse().ok()
}

fn real_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    req.headers().get("x-real-ip")?.to_str().ok()?.parse().ok()
}

fn peer_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    req.extensions()
        .get::<axum::extract::ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        Ok(forwarded_ip(req)
            .or_else(|| real_ip(req))
            .or_else(|| peer_ip(req))
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}
