use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::{net::SocketAddr, time::Instant};

use crate::logging::log_http_request;

/// Client address as seen through a reverse proxy, falling back to the socket peer
pub fn get_real_ip(addr: Option<SocketAddr>, headers: &HeaderMap) -> Option<String> {
    // X-Forwarded-For may carry a chain; the first hop is the client
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(str::to_string)
        .or_else(|| addr.map(|a| a.ip().to_string()))
}

/// Access log middleware. The peer address comes from `ConnectInfo` when the
/// server was started with it; proxy headers take precedence either way.
pub async fn http_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let real_ip = get_real_ip(peer, request.headers());

    let response = next.run(request).await;

    log_http_request(
        &method,
        &uri,
        response.status().as_u16(),
        start.elapsed(),
        real_ip.as_deref(),
    );

    response
}
