//! Route configuration and setup

use crate::handlers;
use crate::middleware::rate_limit_middleware;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use filekit_core::Config;
use filekit_infra::{request_id_middleware, security_headers_middleware, SecurityHeaders};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and text fields on top of the file bytes.
///
/// The cap is enforced by `DefaultBodyLimit` alone so that the multipart
/// extractor reports an oversized body as 413.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the full router.
///
/// Layers run outermost first: request id, security headers, trace, CORS,
/// body limit. Only the processing routes are rate limited.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = config.max_upload_size_bytes().saturating_add(FORM_OVERHEAD_BYTES);
    let security_headers = SecurityHeaders::for_environment(config.is_production());

    let process_routes = Router::new()
        .route("/process/{tool_id}", post(handlers::process::process_tool))
        .route(
            "/process/{category}/{tool_id}",
            post(handlers::process::process_tool_in_category),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.rate_limit.clone(),
            rate_limit_middleware,
        ));

    let app = Router::new()
        .route("/", get(handlers::pages::home))
        .route("/tools", get(handlers::pages::all_tools))
        .route("/tools/{category}", get(handlers::pages::category))
        .route("/tool/{tool_id}", get(handlers::pages::tool))
        .route("/download/{filename}", get(handlers::download::download_file))
        .route("/jobs/{job_id}", get(handlers::jobs::get_job))
        .route("/health", get(handlers::health::health))
        .route("/api/status", get(handlers::health::status))
        .route("/api/tools", get(handlers::health::catalog))
        .merge(process_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            security_headers,
            security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_rejects_bad_origin() {
        let config = Config {
            cors_origins: vec!["https://ok.example.com".to_string(), "bad\norigin".to_string()],
            ..Config::default()
        };
        assert!(setup_cors(&config).is_err());
    }

    #[test]
    fn test_cors_accepts_explicit_origins() {
        let config = Config {
            cors_origins: vec!["https://files.example.com".to_string()],
            ..Config::default()
        };
        assert!(setup_cors(&config).is_ok());
    }
}
