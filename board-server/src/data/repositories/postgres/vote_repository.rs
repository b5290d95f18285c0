use async_trait::async_trait;
use sqlx::PgPool;

use super::map_db_error;
use crate::data::vote_repository::{VoteCommit, VoteRepository, VoteSnapshot};
use crate::domain::error::DomainError;
use crate::domain::vote::VoteDirection;

#[derive(Debug, Clone)]
pub(crate) struct PostgresVoteRepository {
    pool: PgPool,
}

impl PostgresVoteRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    score: i64,
    version: i64,
    direction: Option<i16>,
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn load_vote(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<VoteSnapshot>, DomainError> {
        let row = sqlx::query_as::<_, VoteRow>(
            r#"
            SELECT p.score, p.version, v.direction
            FROM posts p
            LEFT JOIN post_votes v ON v.post_id = p.id AND v.user_id = $2
            WHERE p.id = $1
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(|row| {
            Ok(VoteSnapshot {
                direction: VoteDirection::from_db(row.direction)?,
                score: row.score,
                version: row.version,
            })
        })
        .transpose()
    }

    async fn commit_vote(
        &self,
        post_id: i64,
        user_id: i64,
        expected_version: i64,
        next: VoteDirection,
        delta: i64,
    ) -> Result<VoteCommit, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let updated: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE posts
            SET score = score + $3,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING score
            "#,
        )
        .bind(post_id)
        .bind(expected_version)
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some((score,)) = updated else {
            tx.rollback().await.map_err(map_db_error)?;
            let (exists,): (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
                    .bind(post_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_db_error)?;
            return Ok(if exists {
                VoteCommit::Conflict
            } else {
                VoteCommit::PostMissing
            });
        };

        match next.to_db() {
            Some(direction) => {
                sqlx::query(
                    r#"
                    INSERT INTO post_votes (post_id, user_id, direction)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (post_id, user_id)
                    DO UPDATE SET direction = EXCLUDED.direction, updated_at = NOW()
                    "#,
                )
                .bind(post_id)
                .bind(user_id)
                .bind(direction)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            }
            None => {
                sqlx::query(
                    r#"
                    DELETE FROM post_votes
                    WHERE post_id = $1 AND user_id = $2
                    "#,
                )
                .bind(post_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            }
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(VoteCommit::Committed { score })
    }
}
