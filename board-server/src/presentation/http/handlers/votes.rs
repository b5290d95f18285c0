use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::vote_ledger::VoteOutcome;
use crate::domain::vote::VoteDirection;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::AppPath;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum VoteDirectionDto {
    None,
    Up,
    Down,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoteResponseDto {
    pub(crate) post_id: i64,
    pub(crate) score: i64,
    /// The caller's vote after this request; `none` when it was toggled off.
    pub(crate) direction: VoteDirectionDto,
}

impl From<VoteDirection> for VoteDirectionDto {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::None => Self::None,
            VoteDirection::Up => Self::Up,
            VoteDirection::Down => Self::Down,
        }
    }
}

impl From<VoteOutcome> for VoteResponseDto {
    fn from(outcome: VoteOutcome) -> Self {
        Self {
            post_id: outcome.post_id,
            score: outcome.score,
            direction: outcome.direction.into(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/upvote",
    tag = "votes",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Vote applied or toggled off", body = VoteResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Too many concurrent votes, retry"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn upvote(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(post_id): AppPath<i64>,
) -> AppResult<(StatusCode, Json<VoteResponseDto>)> {
    let outcome = state.votes.upvote(post_id, auth.user_id).await?;
    Ok((StatusCode::OK, Json(VoteResponseDto::from(outcome))))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/downvote",
    tag = "votes",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Vote applied or toggled off", body = VoteResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Too many concurrent votes, retry"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn downvote(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(post_id): AppPath<i64>,
) -> AppResult<(StatusCode, Json<VoteResponseDto>)> {
    let outcome = state.votes.downvote(post_id, auth.user_id).await?;
    Ok((StatusCode::OK, Json(VoteResponseDto::from(outcome))))
}
