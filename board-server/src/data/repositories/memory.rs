use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::data::post_repository::{NewComment, NewPost, PostPatch, PostRepository};
use crate::data::vote_repository::{VoteCommit, VoteRepository, VoteSnapshot};
use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post, PostSummary};
use crate::domain::vote::VoteDirection;

/// Process-local board storage. Every operation takes the lock once and
/// never awaits while holding it.
#[derive(Debug, Default)]
pub(crate) struct InMemoryBoardStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    last_post_id: i64,
    last_comment_id: i64,
    posts: BTreeMap<i64, PostRecord>,
}

#[derive(Debug)]
struct PostRecord {
    post: Post,
    version: i64,
    votes: HashMap<i64, VoteDirection>,
}

impl InMemoryBoardStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Unexpected("board store lock poisoned".to_string()))
    }

    #[cfg(test)]
    pub(crate) fn insert_post(&self, post: Post) {
        let mut state = self.state().expect("board store lock poisoned");
        state.last_post_id = state.last_post_id.max(post.id);
        state.posts.insert(
            post.id,
            PostRecord {
                post,
                version: 0,
                votes: HashMap::new(),
            },
        );
    }

    #[cfg(test)]
    pub(crate) fn active_vote_weight_sum(&self, post_id: i64) -> i64 {
        let state = self.state().expect("board store lock poisoned");
        state
            .posts
            .get(&post_id)
            .map(|record| record.votes.values().map(|direction| direction.weight()).sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl PostRepository for InMemoryBoardStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.state()?;
        state.last_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: state.last_post_id,
            title: input.title,
            link: input.link,
            body: input.body,
            author: input.author,
            score: 0,
            attachment: input.attachment,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(
            post.id,
            PostRecord {
                post: post.clone(),
                version: 0,
                votes: HashMap::new(),
            },
        );
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let state = self.state()?;
        Ok(state.posts.get(&id).map(|record| record.post.clone()))
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.state()?;
        let Some(record) = state
            .posts
            .get_mut(&post_id)
            .filter(|record| record.post.author.id == owner_id)
        else {
            return Ok(None);
        };

        record.post.title = patch.title;
        record.post.link = patch.link;
        record.post.body = patch.body;
        record.post.updated_at = Utc::now();
        Ok(Some(record.post.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.state()?;
        Ok(state.posts.remove(&id).is_some())
    }

    async fn list_summaries(&self) -> Result<Vec<PostSummary>, DomainError> {
        let state = self.state()?;
        Ok(state
            .posts
            .values()
            .map(|record| record.post.summary())
            .collect())
    }

    async fn append_comment(
        &self,
        post_id: i64,
        input: NewComment,
    ) -> Result<Option<Comment>, DomainError> {
        let mut state = self.state()?;
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }
        state.last_comment_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: state.last_comment_id,
            body: input.body,
            author: input.author,
            created_at: now,
            updated_at: now,
        };
        if let Some(record) = state.posts.get_mut(&post_id) {
            record.post.comments.push(comment.clone());
        }
        Ok(Some(comment))
    }

    async fn remove_comment(&self, post_id: i64, comment_id: i64) -> Result<bool, DomainError> {
        let mut state = self.state()?;
        let Some(record) = state.posts.get_mut(&post_id) else {
            return Ok(false);
        };
        let before = record.post.comments.len();
        record.post.comments.retain(|comment| comment.id != comment_id);
        Ok(record.post.comments.len() < before)
    }
}

#[async_trait]
impl VoteRepository for InMemoryBoardStore {
    async fn load_vote(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<VoteSnapshot>, DomainError> {
        let state = self.state()?;
        Ok(state.posts.get(&post_id).map(|record| VoteSnapshot {
            direction: record.votes.get(&user_id).copied().unwrap_or_default(),
            score: record.post.score,
            version: record.version,
        }))
    }

    async fn commit_vote(
        &self,
        post_id: i64,
        user_id: i64,
        expected_version: i64,
        next: VoteDirection,
        delta: i64,
    ) -> Result<VoteCommit, DomainError> {
        let mut state = self.state()?;
        let Some(record) = state.posts.get_mut(&post_id) else {
            return Ok(VoteCommit::PostMissing);
        };
        if record.version != expected_version {
            return Ok(VoteCommit::Conflict);
        }

        match next {
            VoteDirection::None => record.votes.remove(&user_id),
            direction => record.votes.insert(user_id, direction),
        };
        record.post.score += delta;
        record.version += 1;
        Ok(VoteCommit::Committed {
            score: record.post.score,
        })
    }
}
