use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::vote::VoteDirection;

/// Consistent read of a post's score together with one user's direction.
/// `version` changes on every committed vote for the post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VoteSnapshot {
    pub(crate) direction: VoteDirection,
    pub(crate) score: i64,
    pub(crate) version: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VoteCommit {
    Committed { score: i64 },
    /// Another vote landed after the snapshot was taken.
    Conflict,
    PostMissing,
}

#[async_trait]
pub(crate) trait VoteRepository: Send + Sync {
    async fn load_vote(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<VoteSnapshot>, DomainError>;

    /// Stores `next` for the user and adds `delta` to the score, but only if
    /// the post is still at `expected_version`.
    async fn commit_vote(
        &self,
        post_id: i64,
        user_id: i64,
        expected_version: i64,
        next: VoteDirection,
        delta: i64,
    ) -> Result<VoteCommit, DomainError>;
}

#[async_trait]
impl<T: VoteRepository + ?Sized> VoteRepository for Arc<T> {
    async fn load_vote(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<VoteSnapshot>, DomainError> {
        (**self).load_vote(post_id, user_id).await
    }

    async fn commit_vote(
        &self,
        post_id: i64,
        user_id: i64,
        expected_version: i64,
        next: VoteDirection,
        delta: i64,
    ) -> Result<VoteCommit, DomainError> {
        (**self)
            .commit_vote(post_id, user_id, expected_version, next, delta)
            .await
    }
}
