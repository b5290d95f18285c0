use super::error::DomainError;

/// A user's current stance on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum VoteDirection {
    #[default]
    None,
    Up,
    Down,
}

/// What a vote request asks for. There is no "clear" action: voting the
/// same way twice clears the vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VoteAction {
    Upvote,
    Downvote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VoteTransition {
    pub(crate) next: VoteDirection,
    pub(crate) delta: i64,
}

impl VoteDirection {
    pub(crate) fn weight(self) -> i64 {
        match self {
            VoteDirection::None => 0,
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    /// Storage form: votes are kept as `1`/`-1`, a missing row means `None`.
    pub(crate) fn to_db(self) -> Option<i16> {
        match self {
            VoteDirection::None => None,
            VoteDirection::Up => Some(1),
            VoteDirection::Down => Some(-1),
        }
    }

    pub(crate) fn from_db(value: Option<i16>) -> Result<Self, DomainError> {
        match value {
            None => Ok(VoteDirection::None),
            Some(1) => Ok(VoteDirection::Up),
            Some(-1) => Ok(VoteDirection::Down),
            Some(other) => Err(DomainError::Unexpected(format!(
                "invalid stored vote direction: {other}"
            ))),
        }
    }
}

impl VoteAction {
    pub(crate) fn direction(self) -> VoteDirection {
        match self {
            VoteAction::Upvote => VoteDirection::Up,
            VoteAction::Downvote => VoteDirection::Down,
        }
    }

    /// Resolves the next direction and the score delta for a user whose
    /// recorded direction is `current`.
    pub(crate) fn apply_to(self, current: VoteDirection) -> VoteTransition {
        let requested = self.direction();
        if current == requested {
            return VoteTransition {
                next: VoteDirection::None,
                delta: -requested.weight(),
            };
        }

        VoteTransition {
            next: requested,
            delta: requested.weight() - current.weight(),
        }
    }
}
