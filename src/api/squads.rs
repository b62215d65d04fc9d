//! Squad endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use crate::api::ApiState;
use crate::api::extract::ApiJson;
use crate::error::GigletResult;
use crate::models::Squad;
use crate::squads::JoinOutcome;

#[derive(Debug, Deserialize)]
pub struct CreateSquadRequest {
    pub owner_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinSquadRequest {
    pub creator_id: String,
}

/// POST /squads
pub async fn create_squad(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<CreateSquadRequest>,
) -> GigletResult<(StatusCode, Json<JoinOutcome>)> {
    let outcome = state
        .squads
        .create_squad(&request.owner_id, &request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /squads/{id}
pub async fn get_squad(
    State(state): State<ApiState>,
    Path(squad_id): Path<String>,
) -> GigletResult<Json<Squad>> {
    Ok(Json(state.squads.get_squad(&squad_id).await?))
}

/// POST /squads/{id}/join
pub async fn join_squad(
    State(state): State<ApiState>,
    Path(squad_id): Path<String>,
    ApiJson(request): ApiJson<JoinSquadRequest>,
) -> GigletResult<Json<JoinOutcome>> {
    Ok(Json(
        state
            .squads
            .join_squad(&squad_id, &request.creator_id)
            .await?,
    ))
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/squads", post(create_squad))
        .route("/squads/{id}", get(get_squad))
        .route("/squads/{id}/join", post(join_squad))
}
