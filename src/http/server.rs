//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch requests through the transformation pipeline
//! - Forward requests to the matched origin server
//! - Map upstream failures to a client-visible 502

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ProxyConfig, ProxySettings};
use crate::http::request::{client_host, inbound_from_parts, RequestIdLayer, X_REQUEST_ID};
use crate::observability::metrics;
use crate::proxy::{build_outbound_headers, build_outbound_response, ProxyResponse};
use crate::routing::ProxyRouter;
use crate::upstream::OriginClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub client: OriginClient,
    pub settings: ProxySettings,
    pub max_body_bytes: usize,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let proxy_router = Arc::new(ProxyRouter::from_config(config.routes.clone()));
        let client = OriginClient::new();

        let state = AppState {
            router: proxy_router,
            client,
            settings: config.proxy.clone(),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Looks up the route, runs the transformation pipeline, and forwards the
/// request to the origin.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let path = request.uri().path().to_string();
    let method = request.method().to_string();

    let route = match state.router.match_path(&path) {
        Some(route) => route.clone(),
        None => {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
            metrics::record_request(&method, 404, "none", start_time);
            return (StatusCode::NOT_FOUND, "No matching route found").into_response();
        }
    };

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!(request_id = %request_id, "Request body exceeded limit");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let inbound = inbound_from_parts(&parts, body);
    let target_url = route.origin.resolve(&inbound.full_path, inbound.is_secure);
    let outbound_headers = build_outbound_headers(&inbound, &route.origin);

    tracing::debug!(
        request_id = %request_id,
        method = %inbound.method,
        route = %route.name,
        target_url = %target_url,
        "Forwarding to origin"
    );

    match state
        .client
        .request(
            &target_url,
            &inbound.method,
            &outbound_headers,
            inbound.body.clone(),
        )
        .await
    {
        Ok(origin_response) => {
            metrics::record_request(
                &inbound.method,
                origin_response.status,
                &route.origin.host_and_port,
                start_time,
            );

            let host = client_host(&parts);
            let proxy_response = build_outbound_response(
                &outbound_headers,
                &origin_response,
                &host,
                &route.origin,
                &inbound.method,
                inbound.is_secure,
                &state.settings.default_content_type,
            );
            serialize_response(proxy_response)
        }
        Err(error) => {
            tracing::error!(request_id = %request_id, error = %error, "Upstream error");
            metrics::record_request(
                &inbound.method,
                502,
                &route.origin.host_and_port,
                start_time,
            );
            (StatusCode::BAD_GATEWAY, "Origin request failed").into_response()
        }
    }
}

/// Serialize a ProxyResponse back onto the wire, emitting an expiring
/// Set-Cookie for every cookie the pipeline marked for deletion.
fn serialize_response(proxy_response: ProxyResponse) -> Response {
    let status =
        StatusCode::from_u16(proxy_response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut builder = Response::builder().status(status);

    if let Some(headers) = builder.headers_mut() {
        for (name, value) in proxy_response.headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes());
            let value = HeaderValue::from_str(value);
            if let (Ok(name), Ok(value)) = (name, value) {
                headers.append(name, value);
            }
        }
        for cookie in &proxy_response.expired_cookies {
            let expired = format!(
                "{}=\"\"; expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path=/",
                cookie
            );
            if let Ok(value) = HeaderValue::from_str(&expired) {
                headers.append(header::SET_COOKIE, value);
            }
        }
    }

    builder
        .body(Body::from(proxy_response.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
