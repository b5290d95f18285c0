use chrono::{DateTime, Utc};
use tracing::debug;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::pagination::PageRequest;
use crate::domain::post::PostSummary;
use crate::domain::ranking::{compare_ranked, hot_score};

#[derive(Debug, Clone)]
pub(crate) struct RankedPost {
    pub(crate) post: PostSummary,
    pub(crate) hot_score: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct FeedPage {
    pub(crate) posts: Vec<RankedPost>,
    pub(crate) page: u64,
    pub(crate) limit: u64,
    pub(crate) total_posts: u64,
    pub(crate) total_pages: u64,
}

pub(crate) struct FeedPaginator<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> FeedPaginator<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn get_feed(&self, page: i64, limit: i64) -> Result<FeedPage, DomainError> {
        self.get_feed_at(page, limit, Utc::now()).await
    }

    pub(crate) async fn get_feed_at(
        &self,
        page: i64,
        limit: i64,
        now: DateTime<Utc>,
    ) -> Result<FeedPage, DomainError> {
        let request = PageRequest::new(page, limit)?;
        let candidates = self.repo.list_summaries().await?;
        let total_posts = candidates.len() as u64;

        let ranked = rank_posts(candidates, now);
        let posts = request.window(ranked);
        debug!(
            page = request.page(),
            limit = request.limit(),
            total_posts,
            returned = posts.len(),
            "feed page built"
        );

        Ok(FeedPage {
            posts,
            page: request.page(),
            limit: request.limit(),
            total_posts,
            total_pages: request.total_pages(total_posts),
        })
    }
}

/// Scores every post at `now` and orders the feed best-first.
pub(crate) fn rank_posts(posts: Vec<PostSummary>, now: DateTime<Utc>) -> Vec<RankedPost> {
    let mut ranked: Vec<RankedPost> = posts
        .into_iter()
        .map(|post| RankedPost {
            hot_score: hot_score(post.score, post.created_at, now),
            post,
        })
        .collect();

    ranked.sort_by(|a, b| {
        compare_ranked(
            (a.hot_score, a.post.created_at, a.post.id),
            (b.hot_score, b.post.created_at, b.post.id),
        )
    });
    ranked
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};

    use super::{FeedPaginator, rank_posts};
    use crate::data::post_repository::{NewComment, NewPost, PostPatch, PostRepository};
    use crate::domain::error::DomainError;
    use crate::domain::post::{Comment, Post, PostSummary};
    use crate::domain::user::AuthorSummary;

    #[derive(Clone)]
    struct FakeFeedRepo {
        summaries: Arc<Mutex<Vec<PostSummary>>>,
        list_calls: Arc<Mutex<u32>>,
    }

    impl FakeFeedRepo {
        fn with(summaries: Vec<PostSummary>) -> Self {
            Self {
                summaries: Arc::new(Mutex::new(summaries)),
                list_calls: Arc::new(Mutex::new(0)),
            }
        }
    }

    #[async_trait]
    impl PostRepository for FakeFeedRepo {
        async fn create_post(&self, _input: NewPost) -> Result<Post, DomainError> {
            Err(DomainError::Unexpected("not used".to_string()))
        }

        async fn get_post(&self, _id: i64) -> Result<Option<Post>, DomainError> {
            Ok(None)
        }

        async fn update_post_owned(
            &self,
            _post_id: i64,
            _owner_id: i64,
            _patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            Ok(None)
        }

        async fn delete_post(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn list_summaries(&self) -> Result<Vec<PostSummary>, DomainError> {
            *self.list_calls.lock().expect("list_calls mutex poisoned") += 1;
            Ok(self
                .summaries
                .lock()
                .expect("summaries mutex poisoned")
                .clone())
        }

        async fn append_comment(
            &self,
            _post_id: i64,
            _input: NewComment,
        ) -> Result<Option<Comment>, DomainError> {
            Ok(None)
        }

        async fn remove_comment(&self, _post_id: i64, _comment_id: i64) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    fn summary(id: i64, score: i64, created_at: DateTime<Utc>) -> PostSummary {
        PostSummary {
            id,
            title: format!("post {id}"),
            link: None,
            body: None,
            author: AuthorSummary::new(1, "alice"),
            score,
            comment_count: 0,
            attachment: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn younger_post_outranks_older_with_equal_score() {
        let now = Utc::now();
        let ranked = rank_posts(
            vec![
                summary(2, 10, now - Duration::hours(10)),
                summary(1, 10, now - Duration::hours(1)),
            ],
            now,
        );

        let ids: Vec<_> = ranked.iter().map(|entry| entry.post.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(ranked[0].hot_score > ranked[1].hot_score);
    }

    #[test]
    fn votes_can_outweigh_age() {
        let now = Utc::now();
        let ranked = rank_posts(
            vec![
                summary(1, 0, now - Duration::minutes(30)),
                summary(2, 500, now - Duration::hours(6)),
            ],
            now,
        );
        assert_eq!(ranked[0].post.id, 2);
    }

    #[test]
    fn equal_hot_scores_prefer_newer_post() {
        let now = Utc::now();
        // both clamp to zero age, so only the timestamp separates them
        let ranked = rank_posts(
            vec![
                summary(1, 4, now + Duration::minutes(1)),
                summary(2, 4, now + Duration::minutes(5)),
            ],
            now,
        );
        assert_eq!(ranked[0].hot_score, ranked[1].hot_score);
        assert_eq!(ranked[0].post.id, 2);
    }

    #[tokio::test]
    async fn get_feed_windows_and_counts_pages() {
        let now = Utc::now();
        let posts = (1..=13)
            .map(|id| summary(id, 0, now - Duration::hours(id)))
            .collect();
        let paginator = FeedPaginator::new(FakeFeedRepo::with(posts));

        let last = paginator
            .get_feed_at(3, 5, now)
            .await
            .expect("feed must build");
        assert_eq!(last.total_posts, 13);
        assert_eq!(last.total_pages, 3);
        let ids: Vec<_> = last.posts.iter().map(|entry| entry.post.id).collect();
        assert_eq!(ids, vec![11, 12, 13]);

        let beyond = paginator
            .get_feed_at(9, 5, now)
            .await
            .expect("feed must build");
        assert!(beyond.posts.is_empty());
        assert_eq!(beyond.total_pages, 3);
    }

    #[tokio::test]
    async fn empty_board_has_zero_pages() {
        let paginator = FeedPaginator::new(FakeFeedRepo::with(Vec::new()));
        let feed = paginator.get_feed(1, 10).await.expect("feed must build");
        assert!(feed.posts.is_empty());
        assert_eq!(feed.total_pages, 0);
    }

    #[tokio::test]
    async fn invalid_query_is_rejected_before_repository_call() {
        let repo = FakeFeedRepo::with(Vec::new());
        let paginator = FeedPaginator::new(repo.clone());

        let err = paginator.get_feed(0, 10).await.expect_err("page 0 is invalid");
        assert!(matches!(err, DomainError::Validation { field: "page", .. }));

        let err = paginator.get_feed(1, -5).await.expect_err("negative limit is invalid");
        assert!(matches!(err, DomainError::Validation { field: "limit", .. }));

        assert_eq!(*repo.list_calls.lock().expect("list_calls mutex poisoned"), 0);
    }
}
