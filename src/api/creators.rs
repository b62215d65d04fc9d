//! Account endpoints and creator-facing lists

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::accounts::{ProfileUpdate, RegisterCreator};
use crate::api::ApiState;
use crate::api::extract::ApiJson;
use crate::error::GigletResult;
use crate::gigs::FeedEntry;
use crate::models::{Creator, Payment, User, UserRole};

#[derive(Debug, Deserialize)]
pub struct RegisterBrandRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub creator_id: String,
    pub total: usize,
    pub gigs: Vec<FeedEntry>,
}

#[derive(Debug, Serialize)]
pub struct PaymentsResponse {
    pub creator_id: String,
    pub total_cents: i64,
    pub payments: Vec<Payment>,
}

/// POST /creators
pub async fn register_creator(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<RegisterCreator>,
) -> GigletResult<(StatusCode, Json<Creator>)> {
    let creator = state.accounts.register_creator(request).await?;
    Ok((StatusCode::CREATED, Json(creator)))
}

/// POST /brands
pub async fn register_brand(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<RegisterBrandRequest>,
) -> GigletResult<(StatusCode, Json<User>)> {
    let user = state
        .accounts
        .register_user(&request.email, UserRole::Brand)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /creators/{id}
pub async fn update_creator(
    State(state): State<ApiState>,
    Path(creator_id): Path<String>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> GigletResult<Json<Creator>> {
    Ok(Json(state.accounts.update_profile(&creator_id, update).await?))
}

/// GET /creators/{id}/feed
pub async fn get_feed(
    State(state): State<ApiState>,
    Path(creator_id): Path<String>,
) -> GigletResult<Json<FeedResponse>> {
    let gigs = state.gigs.feed(&creator_id, Utc::now()).await?;
    Ok(Json(FeedResponse {
        creator_id,
        total: gigs.len(),
        gigs,
    }))
}

/// GET /creators/{id}/payments
pub async fn get_payments(
    State(state): State<ApiState>,
    Path(creator_id): Path<String>,
) -> GigletResult<Json<PaymentsResponse>> {
    let payments = state.gigs.list_payments(&creator_id).await?;
    Ok(Json(PaymentsResponse {
        total_cents: payments.iter().map(|p| p.amount_cents).sum(),
        creator_id,
        payments,
    }))
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/creators", post(register_creator))
        .route("/creators/{id}", patch(update_creator))
        .route("/creators/{id}/feed", get(get_feed))
        .route("/creators/{id}/payments", get(get_payments))
        .route("/brands", post(register_brand))
}
