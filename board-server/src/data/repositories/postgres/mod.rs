pub(crate) mod post_repository;
pub(crate) mod vote_repository;

use crate::domain::error::DomainError;

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Foreign-key violations mean a referenced row is gone; everything else is
/// a storage failure.
pub(crate) fn map_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
    {
        let target = match db_err.constraint() {
            Some(constraint) if constraint.ends_with("post_id_fkey") => "post",
            _ => "user",
        };
        return DomainError::NotFound(target.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
