use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{add_comment, remove_comment};
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_feed, get_post, update_post,
};
use crate::presentation::http::handlers::votes::{downvote, upvote};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(get_feed))
        .route("/{id}", get(get_post));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/{id}", put(update_post).delete(delete_post))
        .route("/{id}/upvote", post(upvote))
        .route("/{id}/downvote", post(downvote))
        .route("/{id}/comments", post(add_comment))
        .route("/{id}/comments/{comment_id}", delete(remove_comment))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
