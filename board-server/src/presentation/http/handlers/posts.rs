use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::feed_paginator::{FeedPage, RankedPost};
use crate::domain::error::DomainError;
use crate::domain::post::{Attachment, Comment, CreatePostRequest, Post, UpdatePostRequest};
use crate::domain::user::AuthorSummary;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{AppJson, AppPath, AppQuery};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttachmentDto {
    #[validate(length(min = 1))]
    pub(crate) id: String,
    #[validate(length(min = 1))]
    pub(crate) mime_type: String,
    #[validate(range(min = 0))]
    pub(crate) size_bytes: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    pub(crate) link: Option<String>,
    pub(crate) body: Option<String>,
    #[validate(nested)]
    pub(crate) attachment: Option<AttachmentDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    pub(crate) link: Option<String>,
    pub(crate) body: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct FeedQuery {
    pub(crate) page: Option<i64>,
    pub(crate) limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttachmentInfoDto {
    pub(crate) id: String,
    pub(crate) mime_type: String,
    pub(crate) size_bytes: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) body: String,
    pub(crate) author: AuthorDto,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDetailDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) link: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) author: AuthorDto,
    pub(crate) score: i64,
    pub(crate) comment_count: u64,
    pub(crate) attachment: Option<AttachmentInfoDto>,
    pub(crate) comments: Vec<CommentDto>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeedPostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) link: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) author: AuthorDto,
    pub(crate) score: i64,
    pub(crate) hot_score: f64,
    pub(crate) comment_count: u64,
    pub(crate) attachment: Option<AttachmentInfoDto>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeedResponseDto {
    pub(crate) posts: Vec<FeedPostDto>,
    pub(crate) page: u64,
    pub(crate) limit: u64,
    pub(crate) total_posts: u64,
    pub(crate) total_pages: u64,
}

impl From<AuthorSummary> for AuthorDto {
    fn from(author: AuthorSummary) -> Self {
        Self {
            id: author.id,
            username: author.username,
        }
    }
}

impl From<AttachmentDto> for Attachment {
    fn from(dto: AttachmentDto) -> Self {
        Self {
            id: dto.id,
            mime_type: dto.mime_type,
            size_bytes: dto.size_bytes,
        }
    }
}

impl From<Attachment> for AttachmentInfoDto {
    fn from(attachment: Attachment) -> Self {
        Self {
            id: attachment.id,
            mime_type: attachment.mime_type,
            size_bytes: attachment.size_bytes,
        }
    }
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            body: comment.body,
            author: comment.author.into(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

impl From<Post> for PostDetailDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            link: post.link,
            body: post.body,
            author: post.author.into(),
            score: post.score,
            comment_count: post.comments.len() as u64,
            attachment: post.attachment.map(AttachmentInfoDto::from),
            comments: post.comments.into_iter().map(CommentDto::from).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<RankedPost> for FeedPostDto {
    fn from(entry: RankedPost) -> Self {
        let post = entry.post;
        Self {
            id: post.id,
            title: post.title,
            link: post.link,
            body: post.body,
            author: post.author.into(),
            score: post.score,
            hot_score: entry.hot_score,
            comment_count: post.comment_count,
            attachment: post.attachment.map(AttachmentInfoDto::from),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<FeedPage> for FeedResponseDto {
    fn from(page: FeedPage) -> Self {
        Self {
            posts: page.posts.into_iter().map(FeedPostDto::from).collect(),
            page: page.page,
            limit: page.limit,
            total_posts: page.total_posts,
            total_pages: page.total_pages,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Posts per page (default 20, max 100)")
    ),
    responses(
        (status = 200, description = "Ranked feed page", body = FeedResponseDto),
        (status = 400, description = "Invalid page or limit"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_feed(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<FeedQuery>,
) -> AppResult<(StatusCode, Json<FeedResponseDto>)> {
    let page = query.page.unwrap_or(1);
    let limit = query
        .limit
        .unwrap_or_else(|| i64::from(state.feed_limits.default_limit));
    if limit > i64::from(state.feed_limits.max_limit) {
        return Err(DomainError::Validation {
            field: "limit",
            message: "exceeds maximum page size",
        }
        .into());
    }

    let feed = state.feed.get_feed(page, limit).await?;
    Ok((StatusCode::OK, Json(FeedResponseDto::from(feed))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post with comments", body = PostDetailDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    let post = state.board.get_post(id).await?;
    Ok((StatusCode::OK, Json(PostDetailDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDetailDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(dto): AppJson<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        link: dto.link,
        body: dto.body,
        attachment: dto.attachment.map(Attachment::from),
    };

    let post = state.board.create_post(auth.author(), req).await?;
    Ok((StatusCode::CREATED, Json(PostDetailDto::from(post))))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDetailDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        link: dto.link,
        body: dto.body,
    };

    let post = state.board.update_post(auth.user_id, id, req).await?;
    Ok((StatusCode::OK, Json(PostDetailDto::from(post))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    state.board.delete_post(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
