use std::sync::Arc;

use crate::application::board_service::BoardService;
use crate::application::feed_paginator::FeedPaginator;
use crate::application::vote_ledger::VoteLedger;
use crate::data::post_repository::PostRepository;
use crate::data::vote_repository::VoteRepository;
use crate::infrastructure::jwt::JwtVerifier;

pub(crate) mod http;

pub(crate) type SharedPostRepository = Arc<dyn PostRepository>;
pub(crate) type SharedVoteRepository = Arc<dyn VoteRepository>;

#[derive(Debug, Clone, Copy)]
pub(crate) struct FeedLimits {
    pub(crate) default_limit: u32,
    pub(crate) max_limit: u32,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) board: Arc<BoardService<SharedPostRepository>>,
    pub(crate) feed: Arc<FeedPaginator<SharedPostRepository>>,
    pub(crate) votes: Arc<VoteLedger<SharedVoteRepository>>,
    pub(crate) jwt: Arc<JwtVerifier>,
    pub(crate) feed_limits: FeedLimits,
}

impl AppState {
    pub(crate) fn new(
        posts: SharedPostRepository,
        votes: SharedVoteRepository,
        jwt: JwtVerifier,
        vote_max_attempts: u32,
        feed_limits: FeedLimits,
    ) -> Self {
        Self {
            board: Arc::new(BoardService::new(posts.clone())),
            feed: Arc::new(FeedPaginator::new(posts)),
            votes: Arc::new(VoteLedger::with_max_attempts(votes, vote_max_attempts)),
            jwt: Arc::new(jwt),
            feed_limits,
        }
    }
}
