pub(crate) mod board_service;
pub(crate) mod feed_paginator;
pub(crate) mod vote_ledger;
