use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::posts::PostDetailDto;
use crate::domain::post::CreateCommentRequest;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{AppJson, AppPath};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCommentDto {
    #[validate(length(min = 1, max = 10000))]
    pub(crate) body: String,
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment added, updated post returned", body = PostDetailDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(post_id): AppPath<i64>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    dto.validate()?;
    let req = CreateCommentRequest { body: dto.body };

    let post = state.board.add_comment(post_id, auth.author(), req).await?;
    Ok((StatusCode::CREATED, Json(PostDetailDto::from(post))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/comments/{comment_id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither comment author nor post author"),
        (status = 404, description = "Post or comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn remove_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath((post_id, comment_id)): AppPath<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .board
        .remove_comment(post_id, comment_id, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
