pub(crate) mod error;
pub(crate) mod pagination;
pub(crate) mod post;
pub(crate) mod ranking;
pub(crate) mod user;
pub(crate) mod vote;
