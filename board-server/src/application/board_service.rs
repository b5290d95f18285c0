use tracing::info;

use crate::data::post_repository::{NewComment, NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{CreateCommentRequest, CreatePostRequest, Post, UpdatePostRequest};
use crate::domain::user::AuthorSummary;

pub(crate) struct BoardService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> BoardService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_post(
        &self,
        author: AuthorSummary,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            link: req.link,
            body: req.body,
            author,
            attachment: req.attachment,
        };
        let post = self.repo.create_post(new_post).await?;
        info!(post_id = post.id, author_id = post.author.id, "post created");
        Ok(post)
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.repo
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let original_post = self.get_post(post_id).await?;
        if original_post.author.id != actor_user_id {
            return Err(DomainError::Forbidden);
        }

        let patch = PostPatch {
            title: req.title,
            link: req.link,
            body: req.body,
        };
        self.repo
            .update_post_owned(post_id, actor_user_id, patch)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let original_post = self.get_post(post_id).await?;
        if original_post.author.id != actor_user_id {
            return Err(DomainError::Forbidden);
        }

        let deleted = self.repo.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::post_not_found(post_id));
        }
        info!(post_id, "post deleted");
        Ok(())
    }

    /// Appends a comment and returns the post as it looks afterwards.
    pub(crate) async fn add_comment(
        &self,
        post_id: i64,
        author: AuthorSummary,
        req: CreateCommentRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let comment = self
            .repo
            .append_comment(
                post_id,
                NewComment {
                    body: req.body,
                    author,
                },
            )
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        info!(post_id, comment_id = comment.id, "comment added");

        self.get_post(post_id).await
    }

    /// The comment's author and the post's author may both remove a comment.
    pub(crate) async fn remove_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        requester_id: i64,
    ) -> Result<(), DomainError> {
        let post = self.get_post(post_id).await?;
        let comment = post
            .comment(comment_id)
            .ok_or_else(|| DomainError::comment_not_found(comment_id))?;

        if comment.author.id != requester_id && post.author.id != requester_id {
            return Err(DomainError::Forbidden);
        }

        let removed = self.repo.remove_comment(post_id, comment_id).await?;
        if !removed {
            return Err(DomainError::comment_not_found(comment_id));
        }
        info!(post_id, comment_id, "comment removed");
        Ok(())
    }
}
