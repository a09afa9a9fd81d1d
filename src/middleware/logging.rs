//! Logging middleware
//!
//! Provides request logging functionality.

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::net::SocketAddr;
use std::time::Instant;

/// Log every request with its client, outcome and duration
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    let started = Instant::now();
    let response = next.run(request).await;

    info!(
        "{} {} {} -> {} ({} ms)",
        client,
        method,
        uri,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
