//! HTTP API for the marketplace
//!
//! Provides REST endpoints for:
//! - Accounts (creator and brand registration, profile updates)
//! - Reputation (standing, admin rep events)
//! - Gigs (posting, feed, access reports, acceptance, submissions, review)
//! - Squads
//! - Security middleware (auth, rate limiting, headers)

pub mod creators;
pub mod extract;
pub mod gigs;
pub mod middleware;
pub mod reputation;
pub mod squads;

use axum::{
    Json, Router,
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::accounts::AccountService;
use crate::gigs::GigService;
use crate::reputation::ReputationManager;
use crate::squads::SquadService;
use crate::store::MarketplaceStore;

pub use extract::ApiJson;
pub use middleware::{
    RateLimiter, SecurityMiddlewareConfig, SecurityState, auth_middleware, body_size_middleware,
    logging_middleware, rate_limit_middleware, security_headers_middleware,
};

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn MarketplaceStore>,
    pub accounts: Arc<AccountService>,
    pub reputation: Arc<ReputationManager>,
    pub gigs: Arc<GigService>,
    pub squads: Arc<SquadService>,
    /// Required in `x-admin-key` for admin endpoints; `None` disables them
    pub admin_api_key: Option<String>,
}

impl ApiState {
    /// Wire every service onto one store.
    pub fn new(
        store: Arc<dyn MarketplaceStore>,
        reputation: Arc<ReputationManager>,
        admin_api_key: Option<String>,
    ) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(store.clone())),
            gigs: Arc::new(GigService::new(store.clone(), reputation.clone())),
            squads: Arc::new(SquadService::new(store.clone(), reputation.clone())),
            reputation,
            store,
            admin_api_key,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store: state.store.backend_tag(),
    })
}

/// All routes, without the middleware stack.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(creators::routes())
        .merge(reputation::routes())
        .merge(gigs::routes())
        .merge(squads::routes())
        .with_state(state)
}

/// Routes wrapped in the full middleware stack, outermost last.
pub fn create_app(state: ApiState, security: SecurityState) -> Router {
    create_router(state)
        .layer(from_fn_with_state(security.clone(), body_size_middleware))
        .layer(from_fn_with_state(security.clone(), auth_middleware))
        .layer(from_fn_with_state(security.clone(), rate_limit_middleware))
        .layer(from_fn_with_state(security, logging_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
}
