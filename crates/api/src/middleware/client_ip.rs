//! Client IP extractor.
//!
//! Forwarding headers are only honoured when `TRUST_PROXY_HEADERS` is set.
//! Behind a proxy the last `X-Forwarded-For` hop is the address the proxy
//! itself saw; earlier hops are whatever the client sent.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::state::AppState;

/// The caller's IP, or `"unknown"` when neither a trusted header nor the
/// socket peer is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let forwarded = state
            .config
            .trust_proxy_headers
            .then(|| last_forwarded_hop(&parts.headers))
            .flatten();
        let ip = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());
        Ok(ClientIp(ip))
    }
}

/// The last non-empty `X-Forwarded-For` entry.
fn last_forwarded_hop(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .last()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn last_hop_wins_over_client_supplied_entries() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.9, 10.0.0.1 , 203.0.113.7"),
        );
        assert_eq!(last_forwarded_hop(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn repeated_headers_and_blanks() {
        let mut headers = HeaderMap::new();
        headers.append("x-forwarded-for", HeaderValue::from_static("198.51.100.9"));
        headers.append("x-forwarded-for", HeaderValue::from_static("203.0.113.7, "));
        assert_eq!(last_forwarded_hop(&headers).as_deref(), Some("203.0.113.7"));
        assert_eq!(last_forwarded_hop(&HeaderMap::new()), None);
    }
}
