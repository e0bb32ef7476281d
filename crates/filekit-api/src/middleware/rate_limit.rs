use crate::error::HttpAppError;
use crate::state::RateLimitState;
use crate::utils::ip_extraction::extract_client_ip;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use filekit_core::AppError;
use filekit_infra::get_request_id;
use std::net::SocketAddr;

fn set_header(headers: &mut HeaderMap, name: &'static str, value: impl ToString) {
    if let Ok(header_value) = HeaderValue::from_str(&value.to_string()) {
        headers.insert(name, header_value);
    }
}

/// Fixed-window rate limiting for the processing routes.
///
/// # Headers
/// - `X-RateLimit-Limit`: requests allowed per minute
/// - `X-RateLimit-Remaining`: requests left in the current minute
/// - `Retry-After`: seconds until the window resets (only on 429 responses)
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_ip = extract_client_ip(
        request.headers(),
        socket_addr.as_ref(),
        rate_limit.trusted_proxy_count,
    );

    let decision = rate_limit.limiter.check(&client_ip).await;

    if decision.allowed {
        let mut response = next.run(request).await;
        let headers = response.headers_mut();
        set_header(headers, "X-RateLimit-Limit", decision.limit);
        set_header(headers, "X-RateLimit-Remaining", decision.remaining);
        return response;
    }

    tracing::warn!(
        client_ip = %client_ip,
        request_id = get_request_id(&request).as_deref().unwrap_or("-"),
        path = %request.uri().path(),
        limit = decision.limit,
        "Rate limit exceeded"
    );

    let mut response = HttpAppError(AppError::RateLimited {
        retry_after_secs: decision.retry_after_secs,
    })
    .into_response();
    let headers = response.headers_mut();
    set_header(headers, "X-RateLimit-Limit", decision.limit);
    set_header(headers, "X-RateLimit-Remaining", 0);
    set_header(headers, "Retry-After", decision.retry_after_secs.max(1));
    response
}
