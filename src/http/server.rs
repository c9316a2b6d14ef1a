//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all protected routes
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Consult the decision engine on behalf of handlers
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::engine::{Decision, Policy, RequestDetails, RoutePolicies, SharedEngine};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::ApiError;
use crate::http::routes::{
    bot_detection::bot_detection,
    health::health,
    protect::{protect_get, protect_post},
    rate_limit::rate_limit,
    sensitive_info::sensitive_info,
    shield::shield,
    signup::signup,
};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
    pub policies: Arc<RoutePolicies>,
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(engine: SharedEngine, config: &GatewayConfig) -> Self {
        Self {
            engine,
            policies: Arc::new(RoutePolicies::from_config(&config.policies)),
            trust_forwarded_for: config.security.trust_forwarded_for,
        }
    }

    /// Ask the engine for a decision. Denials are returned as decisions;
    /// only a failed call becomes an error.
    pub async fn decide(
        &self,
        route: &'static str,
        request_id: &str,
        details: &RequestDetails,
        policy: &Policy,
    ) -> Result<Decision, ApiError> {
        match self.engine.decide(details, policy).await {
            Ok(decision) => {
                let reason = decision.denial_reason();
                if decision.is_error() {
                    tracing::warn!(
                        request_id = %request_id,
                        route,
                        decision_id = %decision.id,
                        "Engine reported an error, failing open"
                    );
                } else if decision.is_denied() {
                    tracing::info!(
                        request_id = %request_id,
                        route,
                        decision_id = %decision.id,
                        ip = %details.ip,
                        reason = reason.kind(),
                        "Request denied"
                    );
                } else {
                    tracing::debug!(
                        request_id = %request_id,
                        route,
                        decision_id = %decision.id,
                        "Request allowed"
                    );
                }
                metrics::record_decision(route, decision.conclusion.as_str(), reason.kind());
                Ok(decision)
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    route,
                    error = %e,
                    "Decision engine call failed"
                );
                metrics::record_engine_failure(e.kind());
                Err(ApiError::Engine(e))
            }
        }
    }
}

/// HTTP server for the protection gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server around the given engine.
    pub fn new(config: GatewayConfig, engine: SharedEngine) -> Self {
        let state = AppState::new(engine, &config);
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(protect_get).post(protect_post))
        .route("/bot-detection", get(bot_detection))
        .route("/rate-limit", get(rate_limit))
        .route("/sensitive-info", post(sensitive_info))
        .route("/shield", post(shield))
        .route("/signup-protection", post(signup));

    Router::new()
        .nest("/api/protect", api)
        .route("/health", get(health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.security.max_body_size))
        .layer(middleware::from_fn(track_requests))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
}

/// Request counter and latency histogram keyed by matched route.
async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(route, response.status().as_u16(), start);
    response
}
