//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only order submission is limited: every accepted submission posts to the
//! backend and opens a chat with the restaurant.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor for the client IP.
///
/// Checks the usual reverse proxy headers first, then the socket peer
/// address. Requests with neither (in-process test clients) share the
/// loopback key.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl ClientIpKeyExtractor {
    fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        // X-Forwarded-For first IP in the chain, then X-Real-IP
        if let Some(ip) = Self::header_ip(req, "x-forwarded-for")
            .or_else(|| Self::header_ip(req, "x-real-ip"))
        {
            return Ok(ip);
        }

        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return Ok(addr.ip());
        }

        Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for order submission: ~6 orders per minute per IP.
///
/// Configuration: 1 request every 10 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(10)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn order_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(10) // Replenish 1 token every 10 seconds
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(10) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/order");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let req = request(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(
            ClientIpKeyExtractor.extract(&req).ok(),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn test_connect_info_used_without_headers() {
        let mut req = request(&[]);
        let peer: SocketAddr = ([198, 51, 100, 2], 40000).into();
        req.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(ClientIpKeyExtractor.extract(&req).ok(), Some(peer.ip()));
    }

    #[test]
    fn test_unknown_client_falls_back_to_loopback() {
        assert_eq!(
            ClientIpKeyExtractor.extract(&request(&[])).ok(),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
    }
}
