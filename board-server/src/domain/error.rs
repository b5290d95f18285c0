use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("forbidden")]
    Forbidden,

    #[error("vote on post {post_id} could not be committed after {attempts} attempts")]
    ConflictRetryExhausted { post_id: i64, attempts: u32 },

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub(crate) fn post_not_found(post_id: i64) -> Self {
        Self::NotFound(format!("post id: {post_id}"))
    }

    pub(crate) fn comment_not_found(comment_id: i64) -> Self {
        Self::NotFound(format!("comment id: {comment_id}"))
    }
}
