use tracing::{debug, warn};

use crate::data::vote_repository::{VoteCommit, VoteRepository};
use crate::domain::error::DomainError;
use crate::domain::vote::{VoteAction, VoteDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VoteOutcome {
    pub(crate) post_id: i64,
    pub(crate) score: i64,
    pub(crate) applied_delta: i64,
    pub(crate) direction: VoteDirection,
}

/// Applies votes with an optimistic read-transition-commit loop. Every
/// attempt re-reads the user's direction, so a retried request never counts
/// twice.
pub(crate) struct VoteLedger<V: VoteRepository> {
    repo: V,
    max_attempts: u32,
}

impl<V: VoteRepository> VoteLedger<V> {
    pub(crate) fn with_max_attempts(repo: V, max_attempts: u32) -> Self {
        Self {
            repo,
            max_attempts: max_attempts.max(1),
        }
    }

    pub(crate) async fn upvote(&self, post_id: i64, user_id: i64) -> Result<VoteOutcome, DomainError> {
        self.apply_vote(post_id, user_id, VoteAction::Upvote).await
    }

    pub(crate) async fn downvote(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<VoteOutcome, DomainError> {
        self.apply_vote(post_id, user_id, VoteAction::Downvote).await
    }

    pub(crate) async fn apply_vote(
        &self,
        post_id: i64,
        user_id: i64,
        action: VoteAction,
    ) -> Result<VoteOutcome, DomainError> {
        for attempt in 1..=self.max_attempts {
            let snapshot = self
                .repo
                .load_vote(post_id, user_id)
                .await?
                .ok_or_else(|| DomainError::post_not_found(post_id))?;
            let transition = action.apply_to(snapshot.direction);

            let commit = self
                .repo
                .commit_vote(
                    post_id,
                    user_id,
                    snapshot.version,
                    transition.next,
                    transition.delta,
                )
                .await?;

            match commit {
                VoteCommit::Committed { score } => {
                    debug!(
                        post_id,
                        user_id,
                        previous = snapshot.score,
                        delta = transition.delta,
                        score,
                        attempt,
                        "vote committed"
                    );
                    return Ok(VoteOutcome {
                        post_id,
                        score,
                        applied_delta: transition.delta,
                        direction: transition.next,
                    });
                }
                VoteCommit::Conflict => {
                    debug!(post_id, user_id, attempt, "vote conflict, retrying");
                    tokio::task::yield_now().await;
                }
                VoteCommit::PostMissing => return Err(DomainError::post_not_found(post_id)),
            }
        }

        warn!(
            post_id,
            user_id,
            attempts = self.max_attempts,
            "vote retries exhausted"
        );
        Err(DomainError::ConflictRetryExhausted {
            post_id,
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::VoteLedger;
    use crate::data::repositories::memory::InMemoryBoardStore;
    use crate::data::vote_repository::{VoteCommit, VoteRepository, VoteSnapshot};
    use crate::domain::error::DomainError;
    use crate::domain::post::Post;
    use crate::domain::user::AuthorSummary;
    use crate::domain::vote::{VoteAction, VoteDirection};

    struct AlwaysConflictingRepo {
        commits: AtomicU32,
    }

    #[async_trait]
    impl VoteRepository for AlwaysConflictingRepo {
        async fn load_vote(
            &self,
            _post_id: i64,
            _user_id: i64,
        ) -> Result<Option<VoteSnapshot>, DomainError> {
            Ok(Some(VoteSnapshot {
                direction: VoteDirection::None,
                score: 0,
                version: 0,
            }))
        }

        async fn commit_vote(
            &self,
            _post_id: i64,
            _user_id: i64,
            _expected_version: i64,
            _next: VoteDirection,
            _delta: i64,
        ) -> Result<VoteCommit, DomainError> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(VoteCommit::Conflict)
        }
    }

    /// Loses the race a fixed number of times before committing.
    struct FlakyRepo {
        conflicts_left: Mutex<u32>,
        committed: Mutex<Vec<(i64, VoteDirection, i64)>>,
    }

    #[async_trait]
    impl VoteRepository for FlakyRepo {
        async fn load_vote(
            &self,
            _post_id: i64,
            _user_id: i64,
        ) -> Result<Option<VoteSnapshot>, DomainError> {
            Ok(Some(VoteSnapshot {
                direction: VoteDirection::Down,
                score: -1,
                version: 3,
            }))
        }

        async fn commit_vote(
            &self,
            _post_id: i64,
            user_id: i64,
            _expected_version: i64,
            next: VoteDirection,
            delta: i64,
        ) -> Result<VoteCommit, DomainError> {
            let mut left = self.conflicts_left.lock().expect("conflicts mutex poisoned");
            if *left > 0 {
                *left -= 1;
                return Ok(VoteCommit::Conflict);
            }
            self.committed
                .lock()
                .expect("committed mutex poisoned")
                .push((user_id, next, delta));
            Ok(VoteCommit::Committed { score: -1 + delta })
        }
    }

    fn store_with_post(post_id: i64) -> Arc<InMemoryBoardStore> {
        let store = Arc::new(InMemoryBoardStore::new());
        let now = Utc::now();
        store.insert_post(Post {
            id: post_id,
            title: "post".to_string(),
            link: None,
            body: None,
            author: AuthorSummary::new(1, "author"),
            score: 0,
            attachment: None,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        store
    }

    #[tokio::test]
    async fn double_upvote_returns_to_original_score() {
        let ledger = VoteLedger::with_max_attempts(store_with_post(1), 8);

        let first = ledger.upvote(1, 10).await.expect("upvote");
        assert_eq!(first.score, 1);
        assert_eq!(first.direction, VoteDirection::Up);

        let second = ledger.upvote(1, 10).await.expect("upvote again");
        assert_eq!(second.score, 0);
        assert_eq!(second.applied_delta, -1);
        assert_eq!(second.direction, VoteDirection::None);
    }

    #[tokio::test]
    async fn flip_from_down_to_up_moves_score_by_two() {
        let ledger = VoteLedger::with_max_attempts(store_with_post(1), 8);

        let down = ledger.downvote(1, 10).await.expect("downvote");
        assert_eq!(down.score, -1);

        let up = ledger.upvote(1, 10).await.expect("upvote");
        assert_eq!(up.applied_delta, 2);
        assert_eq!(up.score, down.score + 2);
        assert_eq!(up.direction, VoteDirection::Up);
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let ledger = VoteLedger::with_max_attempts(store_with_post(1), 8);
        let err = ledger.upvote(2, 10).await.expect_err("post 2 is missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn score_equals_sum_of_active_votes_after_mixed_sequence() {
        let store = store_with_post(1);
        let ledger = VoteLedger::with_max_attempts(store.clone(), 8);

        let mut last_score = 0;
        for step in 0..60_i64 {
            let user_id = step % 7;
            let action = if (step * 5 + user_id) % 3 == 0 {
                VoteAction::Downvote
            } else {
                VoteAction::Upvote
            };
            last_score = ledger
                .apply_vote(1, user_id, action)
                .await
                .expect("vote")
                .score;
        }

        assert_eq!(last_score, store.active_vote_weight_sum(1));
    }

    #[tokio::test]
    async fn retries_transient_conflicts_with_fresh_state() {
        let repo = FlakyRepo {
            conflicts_left: Mutex::new(2),
            committed: Mutex::new(Vec::new()),
        };
        let ledger = VoteLedger::with_max_attempts(repo, 3);

        let outcome = ledger.upvote(1, 10).await.expect("third attempt commits");
        assert_eq!(outcome.applied_delta, 2);
        assert_eq!(outcome.score, 1);

        let committed = ledger.repo.committed.lock().expect("committed mutex poisoned");
        assert_eq!(committed.as_slice(), &[(10, VoteDirection::Up, 2)]);
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let repo = AlwaysConflictingRepo {
            commits: AtomicU32::new(0),
        };
        let ledger = VoteLedger::with_max_attempts(repo, 4);

        let err = ledger.downvote(5, 10).await.expect_err("must give up");
        assert!(matches!(
            err,
            DomainError::ConflictRetryExhausted {
                post_id: 5,
                attempts: 4
            }
        ));
        assert_eq!(ledger.repo.commits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_votes_from_distinct_users_lose_no_updates() {
        let store = store_with_post(1);
        let ledger = Arc::new(VoteLedger::with_max_attempts(store.clone(), 10_000));

        let mut expected: HashMap<i64, VoteDirection> = HashMap::new();
        let mut handles = Vec::new();
        for user_id in 1..=100_i64 {
            let first = if user_id % 2 == 0 {
                VoteAction::Upvote
            } else {
                VoteAction::Downvote
            };
            // every fifth user changes their mind afterwards
            let second = (user_id % 5 == 0).then_some(match first {
                VoteAction::Upvote => VoteAction::Downvote,
                VoteAction::Downvote => VoteAction::Upvote,
            });

            let mut direction = first.apply_to(VoteDirection::None).next;
            if let Some(second) = second {
                direction = second.apply_to(direction).next;
            }
            expected.insert(user_id, direction);

            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.apply_vote(1, user_id, first).await?;
                if let Some(second) = second {
                    ledger.apply_vote(1, user_id, second).await?;
                }
                Ok::<_, DomainError>(())
            }));
        }

        for handle in handles {
            handle.await.expect("task panicked").expect("vote failed");
        }

        let expected_score: i64 = expected.values().map(|direction| direction.weight()).sum();
        let snapshot = store
            .load_vote(1, 0)
            .await
            .expect("load")
            .expect("post exists");
        assert_eq!(snapshot.score, expected_score);
        assert_eq!(store.active_vote_weight_sum(1), expected_score);
    }
}
