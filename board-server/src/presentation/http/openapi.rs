use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::comments::CreateCommentDto;
use crate::presentation::http::handlers::posts::{
    AttachmentDto, AttachmentInfoDto, AuthorDto, CommentDto, CreatePostDto, FeedPostDto,
    FeedQuery, FeedResponseDto, PostDetailDto, UpdatePostDto,
};
use crate::presentation::http::handlers::votes::{VoteDirectionDto, VoteResponseDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::posts::get_feed,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::votes::upvote,
        crate::presentation::http::handlers::votes::downvote,
        crate::presentation::http::handlers::comments::add_comment,
        crate::presentation::http::handlers::comments::remove_comment
    ),
    components(
        schemas(
            AttachmentDto,
            AttachmentInfoDto,
            AuthorDto,
            CommentDto,
            CreatePostDto,
            UpdatePostDto,
            CreateCommentDto,
            FeedQuery,
            FeedPostDto,
            FeedResponseDto,
            PostDetailDto,
            VoteDirectionDto,
            VoteResponseDto
        )
    ),
    tags(
        (name = "posts", description = "Ranked feed and post endpoints"),
        (name = "votes", description = "Vote toggling"),
        (name = "comments", description = "Comments embedded in posts")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
