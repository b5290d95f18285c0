use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::map_db_error;
use crate::data::post_repository::{NewComment, NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Attachment, Comment, Post, PostSummary};
use crate::domain::user::AuthorSummary;

const POST_COLUMNS: &str = r#"
    p.id,
    p.title,
    p.link,
    p.body,
    p.author_id,
    u.username AS author_username,
    p.score,
    p.attachment_id,
    p.attachment_mime_type,
    p.attachment_size_bytes,
    p.created_at,
    p.updated_at,
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count
"#;

const COMMENT_COLUMNS: &str = r#"
    c.id,
    c.body,
    c.author_id,
    u.username AS author_username,
    c.created_at,
    c.updated_at
"#;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn with_comments(&self, row: Option<PostRow>) -> Result<Option<Post>, DomainError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let comments = self.load_comments(row.id).await?;
        Ok(Some(row.into_post(comments)))
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    link: Option<String>,
    body: Option<String>,
    author_id: i64,
    author_username: String,
    score: i64,
    attachment_id: Option<String>,
    attachment_mime_type: Option<String>,
    attachment_size_bytes: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    comment_count: i64,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    body: String,
    author_id: i64,
    author_username: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn attachment(&self) -> Option<Attachment> {
        match (
            &self.attachment_id,
            &self.attachment_mime_type,
            self.attachment_size_bytes,
        ) {
            (Some(id), Some(mime_type), Some(size_bytes)) => Some(Attachment {
                id: id.clone(),
                mime_type: mime_type.clone(),
                size_bytes,
            }),
            _ => None,
        }
    }

    fn into_post(self, comments: Vec<Comment>) -> Post {
        Post {
            attachment: self.attachment(),
            id: self.id,
            title: self.title,
            link: self.link,
            body: self.body,
            author: AuthorSummary::new(self.author_id, self.author_username),
            score: self.score,
            comments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn into_summary(self) -> PostSummary {
        PostSummary {
            attachment: self.attachment(),
            id: self.id,
            title: self.title,
            link: self.link,
            body: self.body,
            author: AuthorSummary::new(self.author_id, self.author_username),
            score: self.score,
            comment_count: self.comment_count.max(0) as u64,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            body: row.body,
            author: AuthorSummary::new(row.author_id, row.author_username),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let (attachment_id, attachment_mime_type, attachment_size_bytes) = match input.attachment {
            Some(attachment) => (
                Some(attachment.id),
                Some(attachment.mime_type),
                Some(attachment.size_bytes),
            ),
            None => (None, None, None),
        };

        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (
                    title, link, body, author_id,
                    attachment_id, attachment_mime_type, attachment_size_bytes
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(input.title)
            .bind(input.link)
            .bind(input.body)
            .bind(input.author.id)
            .bind(attachment_id)
            .bind(attachment_mime_type)
            .bind(attachment_size_bytes)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.into_post(Vec::new()))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        self.with_comments(row).await
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET title = $3,
                    link = $4,
                    body = $5,
                    updated_at = NOW()
                WHERE id = $1 AND author_id = $2
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(owner_id)
            .bind(patch.title)
            .bind(patch.link)
            .bind(patch.body)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        self.with_comments(row).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_summaries(&self) -> Result<Vec<PostSummary>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            "#
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(PostRow::into_summary).collect())
    }

    async fn append_comment(
        &self,
        post_id: i64,
        input: NewComment,
    ) -> Result<Option<Comment>, DomainError> {
        let sql = format!(
            r#"
            WITH c AS (
                INSERT INTO comments (post_id, author_id, body)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM c
            JOIN users u ON u.id = c.author_id
            "#
        );
        let result = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(post_id)
            .bind(input.author.id)
            .bind(input.body)
            .fetch_one(&self.pool)
            .await;

        match result.map_err(map_db_error) {
            Ok(row) => Ok(Some(Comment::from(row))),
            Err(DomainError::NotFound(target)) if target == "post" => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn remove_comment(&self, post_id: i64, comment_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND post_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
