use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateUrl;

use super::error::DomainError;
use super::user::AuthorSummary;

const MAX_TITLE_CHARS: usize = 255;
const MAX_COMMENT_CHARS: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) link: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) author: AuthorSummary,
    pub(crate) score: i64,
    pub(crate) attachment: Option<Attachment>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Feed view of a post: comments collapsed into a count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostSummary {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) link: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) author: AuthorSummary,
    pub(crate) score: i64,
    pub(crate) comment_count: u64,
    pub(crate) attachment: Option<Attachment>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) body: String,
    pub(crate) author: AuthorSummary,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Descriptor of a file stored elsewhere. The board never reads the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Attachment {
    pub(crate) id: String,
    pub(crate) mime_type: String,
    pub(crate) size_bytes: i64,
}

impl Post {
    pub(crate) fn comment(&self, comment_id: i64) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == comment_id)
    }

    pub(crate) fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id,
            title: self.title.clone(),
            link: self.link.clone(),
            body: self.body.clone(),
            author: self.author.clone(),
            score: self.score,
            comment_count: self.comments.len() as u64,
            attachment: self.attachment.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) link: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) attachment: Option<Attachment>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            link: normalize_link(self.link.as_deref())?,
            body: normalize_body(self.body.as_deref()),
            attachment: self.attachment.map(validate_attachment).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) link: Option<String>,
    pub(crate) body: Option<String>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            link: normalize_link(self.link.as_deref())?,
            body: normalize_body(self.body.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateCommentRequest {
    pub(crate) body: String,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let body = self.body.trim();
        if body.is_empty() || body.chars().count() > MAX_COMMENT_CHARS {
            return Err(DomainError::Validation {
                field: "body",
                message: "must be 1..10000 chars",
            });
        }
        Ok(Self {
            body: body.to_string(),
        })
    }
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_link(link: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(link) = link.map(str::trim).filter(|link| !link.is_empty()) else {
        return Ok(None);
    };
    let link = link.to_string();
    if !link.validate_url() {
        return Err(DomainError::Validation {
            field: "link",
            message: "must be a valid url",
        });
    }
    Ok(Some(link))
}

fn normalize_body(body: Option<&str>) -> Option<String> {
    body.map(str::trim)
        .filter(|body| !body.is_empty())
        .map(str::to_string)
}

fn validate_attachment(attachment: Attachment) -> Result<Attachment, DomainError> {
    if attachment.id.trim().is_empty() {
        return Err(DomainError::Validation {
            field: "attachment.id",
            message: "must not be empty",
        });
    }
    if attachment.mime_type.trim().is_empty() {
        return Err(DomainError::Validation {
            field: "attachment.mime_type",
            message: "must not be empty",
        });
    }
    if attachment.size_bytes < 0 {
        return Err(DomainError::Validation {
            field: "attachment.size_bytes",
            message: "must be >= 0",
        });
    }
    Ok(attachment)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{
        Attachment, Comment, CreateCommentRequest, CreatePostRequest, DomainError, Post,
        UpdatePostRequest,
    };
    use crate::domain::user::AuthorSummary;

    #[test]
    fn create_post_request_validate_rejects_empty_title() {
        let req = CreatePostRequest {
            title: "   ".to_string(),
            link: None,
            body: Some("valid body".to_string()),
            attachment: None,
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn create_post_request_validate_normalizes_fields() {
        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            link: Some("  https://example.com/a  ".to_string()),
            body: Some("   ".to_string()),
            attachment: None,
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.link.as_deref(), Some("https://example.com/a"));
        assert!(validated.body.is_none());
    }

    #[test]
    fn create_post_request_validate_rejects_bad_link() {
        let req = CreatePostRequest {
            title: "title".to_string(),
            link: Some("not a url".to_string()),
            body: None,
            attachment: None,
        };

        let err = req.validate().expect_err("link must be rejected");
        assert_validation_field(err, "link");
    }

    #[test]
    fn create_post_request_validate_rejects_negative_attachment_size() {
        let req = CreatePostRequest {
            title: "title".to_string(),
            link: None,
            body: None,
            attachment: Some(Attachment {
                id: "file-1".to_string(),
                mime_type: "image/png".to_string(),
                size_bytes: -1,
            }),
        };

        let err = req.validate().expect_err("size must be rejected");
        assert_validation_field(err, "attachment.size_bytes");
    }

    #[test]
    fn update_post_request_validate_rejects_long_title() {
        let req = UpdatePostRequest {
            title: "x".repeat(256),
            link: None,
            body: None,
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn title_limit_counts_chars_not_bytes() {
        let accepted = UpdatePostRequest {
            title: "é".repeat(200),
            link: None,
            body: None,
        }
        .validate()
        .expect("200 two-byte chars fit the limit");
        assert_eq!(accepted.title.chars().count(), 200);

        let at_limit = UpdatePostRequest {
            title: "é".repeat(255),
            link: None,
            body: None,
        };
        assert!(at_limit.validate().is_ok());

        let err = UpdatePostRequest {
            title: "é".repeat(256),
            link: None,
            body: None,
        }
        .validate()
        .expect_err("256 chars must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn comment_request_requires_body() {
        let err = CreateCommentRequest {
            body: " \n ".to_string(),
        }
        .validate()
        .expect_err("empty body must be rejected");
        assert_validation_field(err, "body");

        let ok = CreateCommentRequest {
            body: "  nice  ".to_string(),
        }
        .validate()
        .expect("must validate");
        assert_eq!(ok.body, "nice");
    }

    #[test]
    fn summary_counts_comments() {
        let now = Utc::now();
        let author = AuthorSummary::new(1, "alice");
        let comment = |id| Comment {
            id,
            body: "hi".to_string(),
            author: author.clone(),
            created_at: now,
            updated_at: now,
        };
        let post = Post {
            id: 7,
            title: "t".to_string(),
            link: None,
            body: None,
            author: author.clone(),
            score: 3,
            attachment: None,
            comments: vec![comment(1), comment(2)],
            created_at: now,
            updated_at: now,
        };

        let summary = post.summary();
        assert_eq!(summary.comment_count, 2);
        assert_eq!(summary.score, 3);
        assert!(post.comment(2).is_some());
        assert!(post.comment(3).is_none());
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
