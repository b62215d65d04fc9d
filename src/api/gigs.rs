//! Gig and submission endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::ApiState;
use crate::api::extract::ApiJson;
use crate::error::GigletResult;
use crate::gigs::{AccessReport, EvaluationOutcome, NewGig, ReviewOutcome, ReviewRequest};
use crate::models::{Gig, GigStatus, Submission};

#[derive(Debug, Deserialize)]
pub struct AcceptRequest {
    pub creator_id: String,
}

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub success: bool,
    pub already_accepted: bool,
    pub gig_status: GigStatus,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub creator_id: String,
    pub content_url: String,
}

#[derive(Debug, Deserialize)]
pub struct EvaluationRequest {
    pub quality_score: u8,
    #[serde(default)]
    pub summary: String,
}

/// POST /gigs
pub async fn create_gig(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<NewGig>,
) -> GigletResult<(StatusCode, Json<Gig>)> {
    let gig = state.gigs.create_gig(request).await?;
    Ok((StatusCode::CREATED, Json(gig)))
}

/// GET /gigs/{id}
pub async fn get_gig(
    State(state): State<ApiState>,
    Path(gig_id): Path<String>,
) -> GigletResult<Json<Gig>> {
    Ok(Json(state.gigs.get_gig(&gig_id).await?))
}

/// GET /gigs/{id}/access/{creator_id}
pub async fn get_access(
    State(state): State<ApiState>,
    Path((gig_id, creator_id)): Path<(String, String)>,
) -> GigletResult<Json<AccessReport>> {
    let report = state
        .gigs
        .access_report(&gig_id, &creator_id, Utc::now())
        .await?;
    Ok(Json(report))
}

/// POST /gigs/{id}/accept
pub async fn accept_gig(
    State(state): State<ApiState>,
    Path(gig_id): Path<String>,
    ApiJson(request): ApiJson<AcceptRequest>,
) -> GigletResult<Json<AcceptResponse>> {
    let outcome = state.gigs.accept_gig(&gig_id, &request.creator_id).await?;
    Ok(Json(AcceptResponse {
        success: true,
        already_accepted: outcome.already_accepted,
        gig_status: outcome.gig.status,
    }))
}

/// POST /gigs/{id}/submissions
pub async fn submit(
    State(state): State<ApiState>,
    Path(gig_id): Path<String>,
    ApiJson(request): ApiJson<SubmitRequest>,
) -> GigletResult<(StatusCode, Json<Submission>)> {
    let submission = state
        .gigs
        .submit(&gig_id, &request.creator_id, &request.content_url)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /gigs/{id}/submissions
pub async fn list_submissions(
    State(state): State<ApiState>,
    Path(gig_id): Path<String>,
) -> GigletResult<Json<Vec<Submission>>> {
    state.gigs.get_gig(&gig_id).await?;
    Ok(Json(state.gigs.list_submissions(&gig_id).await?))
}

/// GET /submissions/{id}
pub async fn get_submission(
    State(state): State<ApiState>,
    Path(submission_id): Path<String>,
) -> GigletResult<Json<Submission>> {
    Ok(Json(state.gigs.get_submission(&submission_id).await?))
}

/// POST /submissions/{id}/evaluation
pub async fn record_evaluation(
    State(state): State<ApiState>,
    Path(submission_id): Path<String>,
    ApiJson(request): ApiJson<EvaluationRequest>,
) -> GigletResult<Json<EvaluationOutcome>> {
    let outcome = state
        .gigs
        .record_evaluation(&submission_id, request.quality_score, request.summary)
        .await?;
    Ok(Json(outcome))
}

/// POST /submissions/{id}/review
pub async fn review(
    State(state): State<ApiState>,
    Path(submission_id): Path<String>,
    ApiJson(request): ApiJson<ReviewRequest>,
) -> GigletResult<Json<ReviewOutcome>> {
    Ok(Json(state.gigs.review(&submission_id, request).await?))
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/gigs", post(create_gig))
        .route("/gigs/{id}", get(get_gig))
        .route("/gigs/{id}/access/{creator_id}", get(get_access))
        .route("/gigs/{id}/accept", post(accept_gig))
        .route("/gigs/{id}/submissions", post(submit).get(list_submissions))
        .route("/submissions/{id}", get(get_submission))
        .route("/submissions/{id}/evaluation", post(record_evaluation))
        .route("/submissions/{id}/review", post(review))
}
