use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{Attachment, Comment, Post, PostSummary};
use crate::domain::user::AuthorSummary;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) link: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) author: AuthorSummary,
    pub(crate) attachment: Option<Attachment>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) link: Option<String>,
    pub(crate) body: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) body: String,
    pub(crate) author: AuthorSummary,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    /// Full post with author and comments in creation order.
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    /// Every post, without comment bodies. Ranking happens above this layer.
    async fn list_summaries(&self) -> Result<Vec<PostSummary>, DomainError>;
    /// `None` when the post does not exist.
    async fn append_comment(
        &self,
        post_id: i64,
        input: NewComment,
    ) -> Result<Option<Comment>, DomainError>;
    async fn remove_comment(&self, post_id: i64, comment_id: i64) -> Result<bool, DomainError>;
}

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        (**self).get_post(id).await
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        (**self).update_post_owned(post_id, owner_id, patch).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        (**self).delete_post(id).await
    }

    async fn list_summaries(&self) -> Result<Vec<PostSummary>, DomainError> {
        (**self).list_summaries().await
    }

    async fn append_comment(
        &self,
        post_id: i64,
        input: NewComment,
    ) -> Result<Option<Comment>, DomainError> {
        (**self).append_comment(post_id, input).await
    }

    async fn remove_comment(&self, post_id: i64, comment_id: i64) -> Result<bool, DomainError> {
        (**self).remove_comment(post_id, comment_id).await
    }
}
