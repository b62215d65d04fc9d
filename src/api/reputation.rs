//! Reputation API Endpoints
//!
//! Standing lookups for creators and the admin-only rep adjustment.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::ApiState;
use crate::api::extract::ApiJson;
use crate::error::{GigletError, GigletResult};
use crate::reputation::{CreatorStanding, RepAward, RepEvent, ReputationThresholds};

#[derive(Debug, Serialize)]
pub struct ReputationResponse {
    pub rep: u32,
    #[serde(flatten)]
    pub standing: CreatorStanding,
}

/// GET /creators/{id}/reputation
pub async fn get_reputation(
    State(state): State<ApiState>,
    Path(creator_id): Path<String>,
) -> GigletResult<Json<ReputationResponse>> {
    let creator = state.reputation.get_creator(&creator_id).await?;
    Ok(Json(ReputationResponse {
        rep: creator.rep,
        standing: state.reputation.standing_for(&creator),
    }))
}

/// POST /creators/{id}/rep - admin only
pub async fn post_rep_event(
    State(state): State<ApiState>,
    Path(creator_id): Path<String>,
    headers: HeaderMap,
    ApiJson(event): ApiJson<RepEvent>,
) -> GigletResult<Json<RepAward>> {
    require_admin(&state, &headers)?;

    let award = state.reputation.award_rep(&creator_id, event).await?;
    info!(
        creator_id = %creator_id,
        event = award.event,
        rep = award.change.current,
        "Admin rep event applied"
    );
    Ok(Json(award))
}

/// GET /reputation/thresholds
pub async fn get_thresholds(State(state): State<ApiState>) -> Json<ReputationThresholds> {
    Json(state.reputation.thresholds().clone())
}

pub(crate) fn require_admin(state: &ApiState, headers: &HeaderMap) -> GigletResult<()> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return Err(GigletError::Forbidden(
            "Admin endpoints are disabled".to_string(),
        ));
    };
    let provided = headers.get("x-admin-key").and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        Ok(())
    } else {
        warn!("Rejected admin request with missing or wrong admin key");
        Err(GigletError::Unauthorized)
    }
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/creators/{id}/reputation", get(get_reputation))
        .route("/creators/{id}/rep", post(post_rep_event))
        .route("/reputation/thresholds", get(get_thresholds))
}
