//! Originating client address, proxy aware

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

use super::error::ApiError;
use crate::constants::CLIENT_IP_MAX_LEN;

/// First entry of X-Forwarded-For, trimmed; `None` when absent or blank
pub fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    if first.is_empty() || first.len() > CLIENT_IP_MAX_LEN {
        return None;
    }
    Some(first.to_string())
}

/// Forwarded address if a proxy supplied one, else the peer address
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    forwarded_for(headers).or_else(|| peer.map(|addr| addr.ip().to_string()))
}

/// Extractor for the address ratings are keyed by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        resolve_client_ip(&parts.headers, peer)
            .map(ClientIp)
            .ok_or_else(|| ApiError::BadRequest("Unable to determine client address.".to_string()))
    }
}
